//! Events that drive the controller

use super::state::TurnTicket;
use crate::backend::BackendError;
use crate::session::SessionId;

/// Events that trigger controller transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
    },
    NewChat,
    SwitchSession {
        id: SessionId,
    },
    ClearSession {
        id: SessionId,
    },
    SelectModel {
        model: Option<String>,
    },
    CancelTurn,

    // Backend events
    CompletionReceived {
        ticket: TurnTicket,
        result: Result<String, BackendError>,
    },
}
