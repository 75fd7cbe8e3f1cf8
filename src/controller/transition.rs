//! Conversation controller transitions
//!
//! The controller owns the injected `SessionStore` and a turn record per
//! session. Every operation either mutates state and returns the effects to
//! run, or returns a `TransitionError` without touching anything.

use super::state::{SessionTurn, TurnPhase, TurnTicket, ViewModel};
use super::{Effect, Event};
use crate::backend::{find_model, BackendError, CompletionRequest};
use crate::session::{Message, SessionId, SessionStore};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Rejected operations. None of these change state, and none are shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A response is already pending for this session")]
    TurnInFlight,
    #[error("No session with id {0}")]
    UnknownSession(SessionId),
    #[error("Model {0} is not in the catalog")]
    UnknownModel(String),
    #[error("No request in flight for the active session")]
    NoTurnInFlight,
}

pub struct ConversationController {
    store: SessionStore,
    turns: HashMap<SessionId, SessionTurn>,
    model: Option<String>,
}

impl ConversationController {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            turns: HashMap::new(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Hand the store back for teardown
    pub fn into_store(self) -> SessionStore {
        self.store
    }

    /// Apply one event
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        match event {
            Event::UserMessage { text } => {
                self.send(&text).map(|ticket| vec![Effect::request(ticket)])
            }
            Event::NewChat => {
                self.new_chat();
                Ok(vec![Effect::PersistSessions])
            }
            Event::SwitchSession { id } => self.switch_session(&id).map(|()| vec![]),
            Event::ClearSession { id } => self.clear_session(&id),
            Event::SelectModel { model } => self.select_model(model).map(|()| vec![]),
            Event::CancelTurn => self
                .cancel_active_turn()
                .map(|turn_id| vec![Effect::cancel(turn_id)]),
            Event::CompletionReceived { ticket, result } => Ok(self.resolve(&ticket, result)),
        }
    }

    // ============================================================
    // Sending
    // ============================================================

    /// Start a turn in the active session: append the user message and a
    /// placeholder, and return the ticket for the network call.
    pub fn send(&mut self, text: &str) -> Result<TurnTicket, TransitionError> {
        if text.trim().is_empty() {
            return Err(TransitionError::EmptyMessage);
        }

        let session_id = match self.store.active_id() {
            Some(id) => id.clone(),
            None => self.store.create_session(),
        };

        if self.turn(&session_id).is_sending() {
            return Err(TransitionError::TurnInFlight);
        }

        let session = self
            .store
            .get_mut(&session_id)
            .ok_or_else(|| TransitionError::UnknownSession(session_id.clone()))?;
        if session.has_pending() {
            return Err(TransitionError::TurnInFlight);
        }
        session.messages.push(Message::user(text));
        session.messages.push(Message::placeholder());

        let turn_id = Uuid::new_v4();
        self.turns.entry(session_id.clone()).or_default().phase = TurnPhase::Sending { turn_id };

        tracing::debug!(session_id = %session_id, turn_id = %turn_id, "Turn started");

        Ok(TurnTicket {
            turn_id,
            session_id,
            request: CompletionRequest::new(text, self.model.clone()),
        })
    }

    /// Finish a turn in the session it was issued from.
    ///
    /// Success replaces the placeholder in place; failure removes it and sets
    /// the session's error. The user message stays either way. Tickets for
    /// removed sessions or superseded turns are dropped.
    pub fn resolve(
        &mut self,
        ticket: &TurnTicket,
        result: Result<String, BackendError>,
    ) -> Vec<Effect> {
        let current = self.turns.get(&ticket.session_id).and_then(SessionTurn::turn_id);
        if current != Some(ticket.turn_id) {
            tracing::warn!(
                session_id = %ticket.session_id,
                turn_id = %ticket.turn_id,
                "Dropping completion for a turn that is no longer pending"
            );
            return vec![];
        }

        let Some(session) = self.store.get_mut(&ticket.session_id) else {
            tracing::warn!(session_id = %ticket.session_id, "Dropping completion for removed session");
            self.turns.remove(&ticket.session_id);
            return vec![];
        };
        let pending = session.pending_index();

        // A blank completion is a failed turn whatever the client returned
        let result = result.and_then(|completion| {
            if completion.trim().is_empty() {
                Err(BackendError::empty_completion())
            } else {
                Ok(completion)
            }
        });

        let turn = self.turns.entry(ticket.session_id.clone()).or_default();
        turn.phase = TurnPhase::Idle;

        match result {
            Ok(completion) => {
                let answer = Message::assistant(completion);
                match pending {
                    Some(index) => session.messages[index] = answer,
                    None => session.messages.push(answer),
                }
                turn.error = None;
                tracing::debug!(session_id = %ticket.session_id, turn_id = %ticket.turn_id, "Turn resolved");
            }
            Err(e) => {
                if let Some(index) = pending {
                    session.messages.remove(index);
                }
                tracing::warn!(
                    session_id = %ticket.session_id,
                    turn_id = %ticket.turn_id,
                    error = %e,
                    "Turn failed"
                );
                turn.error = Some(e.user_message());
            }
        }

        vec![Effect::PersistSessions]
    }

    // ============================================================
    // Session management
    // ============================================================

    /// Start a fresh session and make it active. Earlier sessions are kept.
    pub fn new_chat(&mut self) -> SessionId {
        let id = self.store.create_session();
        self.turns.insert(id.clone(), SessionTurn::default());
        id
    }

    /// Activate another session. In-flight requests keep running and still
    /// resolve into the session they came from.
    pub fn switch_session(&mut self, id: &SessionId) -> Result<(), TransitionError> {
        if self.store.select_session(id) {
            Ok(())
        } else {
            Err(TransitionError::UnknownSession(id.clone()))
        }
    }

    /// Delete a session, cancelling its request if one is outstanding.
    /// Clearing the last session starts a fresh one.
    pub fn clear_session(&mut self, id: &SessionId) -> Result<Vec<Effect>, TransitionError> {
        if self.store.remove_session(id).is_none() {
            return Err(TransitionError::UnknownSession(id.clone()));
        }

        let mut effects = vec![];
        if let Some(turn_id) = self.turns.remove(id).and_then(|t| t.turn_id()) {
            effects.push(Effect::cancel(turn_id));
        }
        if self.store.is_empty() {
            self.new_chat();
        }
        effects.push(Effect::PersistSessions);
        Ok(effects)
    }

    /// Choose the model forwarded with subsequent requests
    pub fn select_model(&mut self, model: Option<String>) -> Result<(), TransitionError> {
        if let Some(id) = &model {
            if find_model(id).is_none() {
                return Err(TransitionError::UnknownModel(id.clone()));
            }
        }
        self.model = model;
        Ok(())
    }

    /// Turn id of the active session's outstanding request
    pub fn cancel_active_turn(&self) -> Result<Uuid, TransitionError> {
        self.store
            .active_id()
            .and_then(|id| self.turns.get(id))
            .and_then(SessionTurn::turn_id)
            .ok_or(TransitionError::NoTurnInFlight)
    }

    // ============================================================
    // View
    // ============================================================

    fn turn(&self, id: &SessionId) -> SessionTurn {
        self.turns.get(id).cloned().unwrap_or_default()
    }

    pub fn loading(&self) -> bool {
        self.store
            .active_id()
            .is_some_and(|id| self.turn(id).is_sending())
    }

    pub fn error(&self) -> Option<String> {
        self.store.active_id().and_then(|id| self.turn(id).error)
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn view(&self) -> ViewModel {
        ViewModel {
            active_id: self.store.active_id().cloned(),
            messages: self
                .store
                .active()
                .map(|s| s.messages.clone())
                .unwrap_or_default(),
            loading: self.loading(),
            error: self.error(),
            model: self.model.clone(),
            sessions: self.store.list_sessions(),
        }
    }
}
