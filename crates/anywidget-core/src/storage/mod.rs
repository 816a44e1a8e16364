//! Persistence of the widget list.
//!
//! The whole list is one serialized blob. Every writer reads the entire list,
//! modifies it, and writes the entire list back; there is no per-record or
//! per-field storage.

mod file;
mod memory;

pub use file::{DEFAULT_STORE_FILE, FileStore, default_store_path};
pub use memory::MemoryStore;

use crate::config::{WidgetConfig, decode_list, encode_list};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Watch error: {0}")]
    Watch(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Callback run after the stored list changed.
pub type ChangeListener = Rc<dyn Fn()>;

/// Handle returned by [`ConfigStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared handle to a store. Single-threaded by construction.
pub type SharedStore = Rc<dyn ConfigStore>;

/// Trait for widget list storage backends.
///
/// Listeners fire after every successful write, whoever made it. Telling
/// self-caused writes apart is the caller's business (see
/// [`ChangeGate`](crate::widget::ChangeGate)), not the store's.
pub trait ConfigStore {
    /// Read the raw serialized list.
    fn read_blob(&self) -> StorageResult<String>;

    /// Replace the raw serialized list and notify listeners.
    fn write_blob(&self, blob: &str) -> StorageResult<()>;

    /// Register a change listener.
    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId;

    /// Remove a change listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    /// Pick up writes made by other processes. Returns true when listeners
    /// were notified.
    fn poll_external(&self) -> StorageResult<bool> {
        Ok(false)
    }

    /// The stored list. Unreadable or malformed data reads as an empty list.
    fn get_list(&self) -> Vec<WidgetConfig> {
        let blob = match self.read_blob() {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("Failed to read widget list: {}", e);
                return Vec::new();
            }
        };
        match decode_list(&blob) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Malformed widget list, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Serialize and persist the whole list.
    fn set_list(&self, list: &[WidgetConfig]) -> StorageResult<()> {
        let blob = encode_list(list).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_blob(&blob)
    }
}

/// Listener bookkeeping shared by the store backends.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, ChangeListener)>>,
}

impl Listeners {
    pub(crate) fn subscribe(&self, listener: ChangeListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) {
        self.entries.borrow_mut().retain(|(entry, _)| *entry != id);
    }

    /// Listeners may subscribe or unsubscribe from inside a callback.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<ChangeListener> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
