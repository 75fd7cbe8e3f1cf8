//! Conversation sessions and their persistence
//!
//! `SessionStore` is the only component that touches durable storage. The
//! whole collection is written as one record under a fixed key.

mod message;
mod storage;
mod store;

pub use message::{Message, Role, Session, SessionId, SessionSummary};
pub use storage::{JsonFileStore, KeyValueStore, StorageError};
#[cfg(test)]
pub use storage::MemoryStore;
pub use store::{SessionStore, STORAGE_KEY};
