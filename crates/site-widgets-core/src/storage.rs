//! Tab-scoped storage
//!
//! Mirrors the browser's per-tab session storage: it survives reloads of the same tab and
//! nothing else. Durable origin storage uses the same trait (see `page::Browser`), but only
//! the chat widget ever writes, and only to the tab-scoped instance.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::StorageError;
use crate::state::ChatMessage;

pub const CHAT_HISTORY_KEY: &str = "chat-history";
pub const CHAT_SESSION_KEY: &str = "chat-session-id";

/// String key/value storage with the session storage API shape
pub trait TabStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-memory storage. Clones share the same items, so one instance per tab is handed to
/// every page load of that tab.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_items<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T, StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;
        Ok(f(&mut items))
    }
}

impl TabStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_items(|items| items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_items(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.with_items(|items| {
            items.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.with_items(|items| items.keys().cloned().collect())
    }
}

/// Storage that refuses every operation, like session storage in a locked-down browser.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStorage;

impl TabStorage for UnavailableStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }
}

/// Chat history and session id persisted under fixed keys.
///
/// Once any operation fails the store detaches itself and every later call is a no-op, so
/// the widget keeps working from memory for the rest of the page's life.
pub struct HistoryStore {
    storage: Option<Arc<dyn TabStorage>>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn TabStorage>) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub fn detached() -> Self {
        Self { storage: None }
    }

    pub fn is_attached(&self) -> bool {
        self.storage.is_some()
    }

    /// Restore history written by an earlier load of the same tab.
    pub fn load(&mut self) -> (Vec<ChatMessage>, Option<String>) {
        let Some(storage) = self.storage.clone() else {
            return (Vec::new(), None);
        };

        let messages = match storage.get_item(CHAT_HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
                Ok(messages) => messages,
                Err(e) => {
                    // A corrupt entry is dropped rather than failing initialization
                    warn!("discarding unreadable chat history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                self.detach(&e);
                return (Vec::new(), None);
            }
        };

        let session_id = match storage.get_item(CHAT_SESSION_KEY) {
            Ok(id) => id,
            Err(e) => {
                self.detach(&e);
                None
            }
        };

        (messages, session_id)
    }

    pub fn save_messages(&mut self, messages: &[ChatMessage]) {
        let Some(storage) = self.storage.clone() else {
            return;
        };

        let result = serde_json::to_string(messages)
            .map_err(StorageError::from)
            .and_then(|raw| storage.set_item(CHAT_HISTORY_KEY, &raw));

        if let Err(e) = result {
            self.detach(&e);
        }
    }

    pub fn save_session_id(&mut self, session_id: &str) {
        let Some(storage) = self.storage.clone() else {
            return;
        };

        if let Err(e) = storage.set_item(CHAT_SESSION_KEY, session_id) {
            self.detach(&e);
        }
    }

    fn detach(&mut self, error: &StorageError) {
        warn!(
            kind = ?error.kind(),
            "tab storage failed, keeping chat history in memory only: {}",
            error
        );
        self.storage = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_items() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("a", "1").unwrap();
        assert_eq!(other.get_item("a").unwrap(), Some("1".to_string()));

        other.remove_item("a").unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn test_history_round_trip_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = HistoryStore::new(storage.clone());
        store.save_messages(&[ChatMessage::user("hi"), ChatMessage::assistant("hello")]);
        store.save_session_id("abc123");

        let mut restored = HistoryStore::new(storage);
        let (messages, session_id) = restored.load();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "hello");
        assert_eq!(session_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_unavailable_storage_detaches() {
        let mut store = HistoryStore::new(Arc::new(UnavailableStorage));
        let (messages, session_id) = store.load();
        assert!(messages.is_empty());
        assert!(session_id.is_none());
        assert!(!store.is_attached());

        // Detached stores swallow writes
        store.save_messages(&[ChatMessage::user("still works")]);
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(CHAT_HISTORY_KEY, "{not json").unwrap();

        let mut store = HistoryStore::new(storage);
        let (messages, _) = store.load();
        assert!(messages.is_empty());
        assert!(store.is_attached());
    }
}
