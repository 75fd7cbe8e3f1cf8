//! Turn state and view-model types

use crate::backend::CompletionRequest;
use crate::session::{Message, SessionId, SessionSummary};
use uuid::Uuid;

/// Where a session's pending slot stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    /// No placeholder, no request outstanding
    #[default]
    Idle,
    /// Placeholder shown, request `turn_id` outstanding
    Sending { turn_id: Uuid },
}

/// Per-session turn bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTurn {
    pub phase: TurnPhase,
    /// Message from the last failed turn, cleared by the next success
    pub error: Option<String>,
}

impl SessionTurn {
    pub fn is_sending(&self) -> bool {
        matches!(self.phase, TurnPhase::Sending { .. })
    }

    pub fn turn_id(&self) -> Option<Uuid> {
        match self.phase {
            TurnPhase::Sending { turn_id } => Some(turn_id),
            TurnPhase::Idle => None,
        }
    }
}

/// An issued request, bound to the session that was active when it was sent.
///
/// The completion is written back into `session_id` no matter which session is
/// active when it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTicket {
    pub turn_id: Uuid,
    pub session_id: SessionId,
    pub request: CompletionRequest,
}

/// Snapshot of everything the rendering layer needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub active_id: Option<SessionId>,
    pub messages: Vec<Message>,
    pub loading: bool,
    pub error: Option<String>,
    pub model: Option<String>,
    /// Every session in creation order
    pub sessions: Vec<SessionSummary>,
}
