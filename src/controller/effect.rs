//! Effects produced by controller transitions

use super::state::TurnTicket;
use uuid::Uuid;

/// Effects to be executed after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue the network call for a freshly sent turn
    RequestCompletion { ticket: TurnTicket },

    /// Abandon an outstanding request
    CancelCompletion { turn_id: Uuid },

    /// Write the full session collection to durable storage
    PersistSessions,
}

impl Effect {
    pub fn request(ticket: TurnTicket) -> Self {
        Effect::RequestCompletion { ticket }
    }

    pub fn cancel(turn_id: Uuid) -> Self {
        Effect::CancelCompletion { turn_id }
    }
}
