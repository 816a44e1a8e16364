//! In-memory storage implementation.

use super::{ChangeListener, ConfigStore, Listeners, StorageError, StorageResult, SubscriptionId};
use std::cell::{Cell, RefCell};

/// In-memory store for testing and embedding.
#[derive(Default)]
pub struct MemoryStore {
    blob: RefCell<String>,
    listeners: Listeners,
    writes: Cell<usize>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `blob` verbatim.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        let store = Self::default();
        *store.blob.borrow_mut() = blob.into();
        store
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Make every following write fail.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ConfigStore for MemoryStore {
    fn read_blob(&self) -> StorageResult<String> {
        Ok(self.blob.borrow().clone())
    }

    fn write_blob(&self, blob: &str) -> StorageResult<()> {
        if self.read_only.get() {
            return Err(StorageError::Other("store is read-only".to_string()));
        }
        *self.blob.borrow_mut() = blob.to_string();
        self.writes.set(self.writes.get() + 1);
        self.listeners.notify();
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use std::rc::Rc;

    #[test]
    fn test_set_and_get_list() {
        let store = MemoryStore::new();
        let list = vec![WidgetConfig::new("a"), WidgetConfig::new("b")];

        store.set_list(&list).unwrap();
        let loaded = store.get_list();

        assert_eq!(loaded, list);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_malformed_blob_reads_empty() {
        let store = MemoryStore::with_blob("{ definitely not a list");
        assert!(store.get_list().is_empty());
    }

    #[test]
    fn test_round_trip_is_stable() {
        let store = MemoryStore::with_blob(r#"[{"id":"a","extra_field":1},{"id":"b"}]"#);
        store.set_list(&store.get_list()).unwrap();
        let first = store.read_blob().unwrap();
        store.set_list(&store.get_list()).unwrap();
        assert_eq!(store.read_blob().unwrap(), first);
        assert_eq!(store.get_list().len(), 2);
    }

    #[test]
    fn test_write_notifies() {
        let store = MemoryStore::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        store.subscribe(Rc::new(move || counter.set(counter.get() + 1)));

        store.set_list(&[WidgetConfig::new("a")]).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_read_only_write_fails_without_notifying() {
        let store = MemoryStore::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        store.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        store.set_read_only(true);

        assert!(store.set_list(&[WidgetConfig::new("a")]).is_err());
        assert_eq!(hits.get(), 0);
        assert_eq!(store.write_count(), 0);
    }
}
