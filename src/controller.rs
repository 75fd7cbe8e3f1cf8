//! Conversation controller
//!
//! Drives one turn at a time per session: optimistic user message, a
//! placeholder while the request is out, then replacement or removal.
//! Transitions only return effects; the runtime executes them.

mod effect;
pub mod event;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{TurnTicket, ViewModel};
pub use transition::{ConversationController, TransitionError};
