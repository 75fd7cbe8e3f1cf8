//! Message and session data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

/// A single transcript entry.
///
/// `pending` marks the transient placeholder shown while a request is in
/// flight. A placeholder is either replaced in place or removed; it is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub pending: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            pending: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            pending: false,
        }
    }

    /// Assistant placeholder awaiting a completion
    pub fn placeholder() -> Self {
        Self {
            role: Role::Assistant,
            text: String::new(),
            pending: true,
        }
    }
}

/// Session identifier: creation time in Unix epoch milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Milliseconds since the epoch, if the id is a timestamp
    pub fn millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.millis().and_then(DateTime::from_timestamp_millis)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One conversation: an append-only, chronological list of messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            messages: Vec::new(),
        }
    }

    /// Position of the placeholder, if one exists
    pub fn pending_index(&self) -> Option<usize> {
        self.messages.iter().position(|m| m.pending)
    }

    pub fn has_pending(&self) -> bool {
        self.pending_index().is_some()
    }

    /// Messages that belong in durable storage (placeholder excluded)
    pub fn persisted_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.pending)
    }
}

/// Read-only description of a session for enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub created_at: Option<DateTime<Utc>>,
    pub message_count: usize,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            created_at: session.id.created_at(),
            message_count: session.persisted_messages().count(),
        }
    }
}
