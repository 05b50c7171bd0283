mod filesystem;
pub mod persisted;
mod storage;

pub use filesystem::{default_storage_dir, FilesystemStorage};
pub use storage::{MemoryStorage, StateStorage};

use crate::error::{NexoraError, Result};
use crate::models::{ChatSession, Message};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Storage key the chat history is kept under
pub const CHAT_STORE_KEY: &str = "nexora-chat-store";

const SESSION_SUFFIX_LEN: usize = 9;

/// Single source of truth for chat history.
///
/// Every mutating operation applies its change in memory first and then
/// writes the whole state through to storage. A failed write comes back
/// as `NexoraError::PersistenceError`, but the in-memory change has
/// already happened and the store stays fully usable.
pub struct ChatStore {
    sessions: Vec<ChatSession>,
    current_session_id: Option<String>,
    storage: Arc<dyn StateStorage>,
}

impl ChatStore {
    /// A store with no sessions that will persist to `storage`
    pub fn empty(storage: Arc<dyn StateStorage>) -> Self {
        Self {
            sessions: Vec::new(),
            current_session_id: None,
            storage,
        }
    }

    /// Rehydrate the store from `storage`; an empty slot gives an empty store
    pub fn open(storage: Arc<dyn StateStorage>) -> Result<Self> {
        let Some(contents) = storage.load()? else {
            return Ok(Self::empty(storage));
        };
        let state = persisted::decode(&contents)?;

        let mut store = Self {
            sessions: state.sessions,
            current_session_id: state
                .current_session_id
                .or(state.current_session.map(|session| session.id)),
            storage,
        };
        store.repair_current();
        tracing::debug!(
            sessions = store.sessions.len(),
            current = ?store.current_session_id,
            "chat store rehydrated"
        );
        Ok(store)
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.session(id))
    }

    /// The last `limit` messages of the current session, oldest first
    pub fn recent_messages(&self, limit: usize) -> &[Message] {
        match self.current_session() {
            Some(session) => {
                let start = session.messages.len().saturating_sub(limit);
                &session.messages[start..]
            }
            None => &[],
        }
    }

    /// Start an empty session, put it first and make it current
    pub fn create_new_session(&mut self) -> Result<String> {
        let id = self.insert_new_session();
        self.persist()?;
        Ok(id)
    }

    /// Make `id` current; returns `false` if no such session exists
    pub fn switch_session(&mut self, id: &str) -> Result<bool> {
        if self.session(id).is_none() {
            return Ok(false);
        }
        self.current_session_id = Some(id.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Remove a session; the current one moves to the first remaining session
    pub fn delete_session(&mut self, id: &str) -> Result<bool> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return Ok(false);
        }

        if self.current_session_id.as_deref() == Some(id) {
            self.current_session_id = self.sessions.first().map(|s| s.id.clone());
        }
        self.persist()?;
        Ok(true)
    }

    /// Append to the current session, creating one if none is current.
    /// Returns the id of the session the message landed in.
    pub fn add_message(&mut self, message: Message) -> Result<String> {
        let id = match self.current_session_id.clone() {
            Some(id) => id,
            None => {
                tracing::debug!("no current session, creating one");
                self.insert_new_session()
            }
        };

        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| NexoraError::Other(format!("current session {} is missing", id)))?;
        tracing::debug!(
            session = %id,
            role = %message.role,
            content_len = message.content.len(),
            "adding message"
        );
        session.push(message);

        self.persist()?;
        Ok(id)
    }

    /// Drop every session. Irreversible.
    pub fn clear_all_chats(&mut self) -> Result<()> {
        self.sessions.clear();
        self.current_session_id = None;
        self.persist()
    }

    /// Rename a session; returns `false` if no such session exists
    pub fn update_session_title(&mut self, id: &str, title: impl Into<String>) -> Result<bool> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        session.title = Some(title.into());
        session.updated_at = crate::models::now();
        self.persist()?;
        Ok(true)
    }

    /// The persisted JSON form of the current in-memory state
    pub fn export(&self) -> Result<String> {
        persisted::encode(&self.sessions, self.current_session_id.as_deref())
    }

    fn insert_new_session(&mut self) -> String {
        let id = self.generate_session_id();
        tracing::debug!(session = %id, total = self.sessions.len() + 1, "creating session");
        self.sessions.insert(0, ChatSession::new(id.clone()));
        self.current_session_id = Some(id.clone());
        id
    }

    fn generate_session_id(&self) -> String {
        loop {
            let suffix: String = Uuid::new_v4()
                .simple()
                .to_string()
                .chars()
                .take(SESSION_SUFFIX_LEN)
                .collect();
            let id = format!("session_{}_{}", Utc::now().timestamp_millis(), suffix);
            if self.session(&id).is_none() {
                return id;
            }
        }
    }

    /// Point a dangling current id at the first session, or nothing
    fn repair_current(&mut self) {
        let resolves = self
            .current_session_id
            .as_deref()
            .is_some_and(|id| self.session(id).is_some());
        if !resolves && self.current_session_id.is_some() {
            tracing::warn!(
                current = ?self.current_session_id,
                "current session missing from store, re-pointing"
            );
            self.current_session_id = self.sessions.first().map(|s| s.id.clone());
        }
    }

    fn persist(&self) -> Result<()> {
        self.export()
            .and_then(|contents| self.storage.save(&contents))
            .map_err(|e| match e {
                NexoraError::PersistenceError(_) => e,
                other => NexoraError::PersistenceError(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store() -> (ChatStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (ChatStore::empty(storage.clone()), storage)
    }

    #[test]
    fn test_session_ids_have_time_and_suffix() {
        let (mut store, _) = new_store();
        let id = store.create_new_session().unwrap();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SESSION_SUFFIX_LEN);
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let (mut store, storage) = new_store();
        assert!(storage.contents().is_none());
        store.add_message(Message::user("hi")).unwrap();
        let blob = storage.contents().unwrap();
        assert!(blob.contains("\"hi\""));
    }

    #[test]
    fn test_recent_messages_without_session_is_empty() {
        let (store, _) = new_store();
        assert!(store.recent_messages(16).is_empty());
    }

    #[test]
    fn test_repair_current_on_open() {
        let blob = r#"{"chatSessions":[{"id":"a","messages":[],"createdAt":"2025-08-12T10:00:00.000Z","updatedAt":"2025-08-12T10:00:00.000Z"}],"currentSessionId":"gone"}"#;
        let storage = Arc::new(MemoryStorage::with_contents(blob));
        let store = ChatStore::open(storage).unwrap();
        assert_eq!(store.current_session_id(), Some("a"));
    }
}
