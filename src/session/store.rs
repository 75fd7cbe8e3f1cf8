//! Multi-session store with best-effort persistence

use super::message::{Message, Role, Session, SessionId, SessionSummary};
use super::storage::{KeyValueStore, StorageResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Fixed key the whole session collection is stored under
pub const STORAGE_KEY: &str = "chatHistory";

/// Persisted form of a message; placeholders never reach this type
#[derive(Debug, Serialize, Deserialize)]
struct StoredMessage {
    role: Role,
    message: String,
}

/// Session id -> ordered messages, and nothing else
type StoredSessions = BTreeMap<String, Vec<StoredMessage>>;

/// Owns every session, the active-session pointer, and durable storage.
///
/// Invariant: when `sessions` is non-empty, `active_id` names one of them.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    /// Creation order
    sessions: Vec<Session>,
    active_id: Option<SessionId>,
    /// Highest id ever issued, so removed ids are never handed out again
    last_issued: Option<i64>,
}

impl SessionStore {
    /// Load persisted sessions and activate the most recent one, creating a
    /// fresh session when storage holds none.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let sessions = Self::load(storage.as_ref());
        let active_id = sessions.last().map(|s| s.id.clone());
        let last_issued = sessions.iter().filter_map(|s| s.id.millis()).max();
        let mut store = Self {
            storage,
            sessions,
            active_id,
            last_issued,
        };

        if store.sessions.is_empty() {
            store.create_session();
        }

        tracing::info!(
            sessions = store.sessions.len(),
            active = ?store.active_id.as_ref().map(SessionId::as_str),
            "Session store opened"
        );
        store
    }

    /// Read the persisted collection.
    ///
    /// Never fails: missing, unreadable, or corrupt data yields an empty
    /// collection.
    pub fn load(storage: &dyn KeyValueStore) -> Vec<Session> {
        let raw = match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored sessions, starting empty");
                return Vec::new();
            }
        };

        let stored: StoredSessions = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Stored sessions are corrupt, starting empty");
                return Vec::new();
            }
        };

        let mut sessions: Vec<Session> = stored
            .into_iter()
            .map(|(id, messages)| Session {
                id: SessionId::new(id),
                messages: messages
                    .into_iter()
                    .map(|m| Message {
                        role: m.role,
                        text: m.message,
                        pending: false,
                    })
                    .collect(),
            })
            .collect();

        // Ids are creation timestamps; anything unparseable sorts first
        sessions.sort_by(|a, b| {
            (a.id.millis().unwrap_or(i64::MIN), a.id.as_str())
                .cmp(&(b.id.millis().unwrap_or(i64::MIN), b.id.as_str()))
        });
        sessions
    }

    /// Write the full collection. Failures are logged and swallowed.
    pub fn save(&self) {
        match self.write_all() {
            Ok(()) => tracing::debug!(sessions = self.sessions.len(), "Sessions saved"),
            Err(e) => tracing::error!(error = %e, "Failed to save sessions"),
        }
    }

    fn write_all(&self) -> StorageResult<()> {
        let stored: StoredSessions = self
            .sessions
            .iter()
            .map(|session| {
                let messages = session
                    .persisted_messages()
                    .map(|m| StoredMessage {
                        role: m.role,
                        message: m.text.clone(),
                    })
                    .collect();
                (session.id.as_str().to_string(), messages)
            })
            .collect();

        let json = serde_json::to_string(&stored)?;
        self.storage.set(STORAGE_KEY, &json)
    }

    /// Create an empty session, make it active, and return its id
    pub fn create_session(&mut self) -> SessionId {
        let now = Utc::now().timestamp_millis();
        let next = match self.last_issued {
            Some(last) if last >= now => last.checked_add(1),
            _ => Some(now),
        };

        let id = if let Some(millis) = next {
            self.last_issued = Some(millis);
            SessionId::from_millis(millis)
        } else {
            // Stored ids reached the top of the timestamp range
            tracing::warn!("Session timestamps exhausted, using a random id");
            SessionId::new(Uuid::new_v4().to_string())
        };
        self.sessions.push(Session::new(id.clone()));
        self.active_id = Some(id.clone());
        tracing::info!(session_id = %id, "Created session");
        id
    }

    /// Activate `id`. Unknown ids are ignored; returns whether the switch happened.
    pub fn select_session(&mut self, id: &SessionId) -> bool {
        if self.get(id).is_none() {
            tracing::debug!(session_id = %id, "Ignoring selection of unknown session");
            return false;
        }
        self.active_id = Some(id.clone());
        true
    }

    /// Summaries in creation order
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(SessionSummary::from).collect()
    }

    /// Delete a session. If it was active, the most recent remaining session
    /// becomes active, or nothing is active when none remain.
    pub fn remove_session(&mut self, id: &SessionId) -> Option<Session> {
        let index = self.sessions.iter().position(|s| &s.id == id)?;
        let removed = self.sessions.remove(index);

        if self.active_id.as_ref() == Some(id) {
            self.active_id = self.sessions.last().map(|s| s.id.clone());
        }

        tracing::info!(session_id = %id, "Removed session");
        Some(removed)
    }

    /// Final write before the store is dropped
    pub fn close(self) {
        self.save();
        tracing::info!("Session store closed");
    }

    pub fn active_id(&self) -> Option<&SessionId> {
        self.active_id.as_ref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active_id.as_ref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
