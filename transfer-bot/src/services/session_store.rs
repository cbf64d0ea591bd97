//! In-memory, per-chat storage of connection settings.
//!
//! Sessions live for the lifetime of the process. A chat's session is
//! created on its first configuration command and never removed.

use crate::models::{ChatId, Session};
use dashmap::DashMap;

pub trait SessionStore: Send + Sync {
    /// Set (or replace) the source URI, creating the session if needed.
    fn set_source(&self, chat_id: ChatId, uri: String);

    /// Set (or replace) the target URI, creating the session if needed.
    fn set_target(&self, chat_id: ChatId, uri: String);

    /// Snapshot of the chat's session. Unknown chats get an empty session.
    fn get(&self, chat_id: ChatId) -> Session;
}

/// `SessionStore` backed by a sharded concurrent map. Each update holds the
/// shard lock for its key, so writes to one chat are applied atomically and
/// writes to different chats never block each other for long.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<ChatId, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn set_source(&self, chat_id: ChatId, uri: String) {
        self.sessions.entry(chat_id).or_default().source_uri = Some(uri);
        tracing::info!(chat_id = %chat_id, "Set source URI");
    }

    fn set_target(&self, chat_id: ChatId, uri: String) {
        self.sessions.entry(chat_id).or_default().target_uri = Some(uri);
        tracing::info!(chat_id = %chat_id, "Set target URI");
    }

    fn get(&self, chat_id: ChatId) -> Session {
        self.sessions
            .get(&chat_id)
            .map(|session| session.value().clone())
            .unwrap_or_default()
    }
}
