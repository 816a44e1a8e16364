//! File-based storage implementation.

use super::{ChangeListener, ConfigStore, Listeners, StorageError, StorageResult, SubscriptionId};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// File name used by [`default_store_path`].
pub const DEFAULT_STORE_FILE: &str = "widgets.json";

/// Stores the widget list as a single JSON file.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// readers never observe a half-written list. Edits made by other processes
/// are picked up by [`FileStore::watch`] + [`ConfigStore::poll_external`].
pub struct FileStore {
    path: PathBuf,
    listeners: Listeners,
    /// Content last written or announced by this process. Reads never set it.
    last_seen: RefCell<Option<String>>,
    watcher: Option<RecommendedWatcher>,
    rx: Option<mpsc::Receiver<notify::Result<notify::Event>>>,
}

impl FileStore {
    /// Create a store backed by `path`. Creates the parent directory if needed;
    /// the file itself is created on first write.
    pub fn new(path: PathBuf) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Io(format!("Failed to create storage directory: {}", e))
                })?;
            }
        }
        Ok(Self {
            path,
            listeners: Listeners::default(),
            last_seen: RefCell::new(None),
            watcher: None,
            rx: None,
        })
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching the backing file for writes made by other processes.
    pub fn watch(&mut self) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|e| StorageError::Watch(e.to_string()))?;

        // The directory, not the file: atomic writes replace the inode.
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| StorageError::Watch(e.to_string()))?;

        log::debug!("Watching {} for external changes", self.path.display());
        self.watcher = Some(watcher);
        self.rx = Some(rx);
        Ok(())
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_file(&self) -> StorageResult<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&self.path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })
    }

    fn touches_store(&self, event: &notify::Event) -> bool {
        if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
            return false;
        }
        let target = self.path.file_name();
        event.paths.iter().any(|p| p.file_name() == target)
    }
}

/// Default path of the store file.
///
/// On Linux: `~/.config/anywidget/widgets.json`
pub fn default_store_path() -> StorageResult<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| StorageError::Io("Could not determine config directory".to_string()))?;
    Ok(base.join("anywidget").join(DEFAULT_STORE_FILE))
}

impl ConfigStore for FileStore {
    fn read_blob(&self) -> StorageResult<String> {
        self.read_file()
    }

    fn write_blob(&self, blob: &str) -> StorageResult<()> {
        let tmp = self.temp_path();
        fs::write(&tmp, blob).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            StorageError::Io(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;
        *self.last_seen.borrow_mut() = Some(blob.to_string());
        self.listeners.notify();
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }

    fn poll_external(&self) -> StorageResult<bool> {
        let Some(rx) = &self.rx else {
            return Ok(false);
        };

        let mut touched = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                Ok(event) => touched |= self.touches_store(&event),
                Err(e) => log::warn!("File watcher error: {}", e),
            }
        }
        if !touched {
            return Ok(false);
        }

        let current = self.read_file()?;
        // Our own writes come back through the watcher too.
        if self.last_seen.borrow().as_deref() == Some(current.as_str()) {
            return Ok(false);
        }
        *self.last_seen.borrow_mut() = Some(current);
        log::debug!("External change to {}", self.path.display());
        self.listeners.notify();
        Ok(true)
    }
}
