//! The fixed capability set handed to content loaders.

use super::{ContentError, ContentResult};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a content loader may touch: the wall clock, file reads under
/// whitelisted roots, and a log sink tagged with the widget id.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    read_roots: Vec<PathBuf>,
    widget_id: String,
}

impl Capabilities {
    /// Allow reads under each of `read_roots`. An empty list denies all reads.
    pub fn new(read_roots: Vec<PathBuf>) -> Self {
        Self {
            read_roots,
            widget_id: String::new(),
        }
    }

    /// Same whitelist, tagged for one widget.
    pub fn for_widget(&self, widget_id: &str) -> Self {
        Self {
            read_roots: self.read_roots.clone(),
            widget_id: widget_id.to_string(),
        }
    }

    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    pub fn read_roots(&self) -> &[PathBuf] {
        &self.read_roots
    }

    /// Local wall-clock time.
    pub fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    /// Read a UTF-8 file that resolves inside one of the whitelisted roots.
    pub fn read_file(&self, path: &Path) -> ContentResult<String> {
        let resolved = path
            .canonicalize()
            .map_err(|e| ContentError::Io(format!("{}: {}", path.display(), e)))?;

        let allowed = self.read_roots.iter().any(|root| {
            root.canonicalize()
                .map(|root| resolved.starts_with(root))
                .unwrap_or(false)
        });
        if !allowed {
            return Err(ContentError::Denied(path.display().to_string()));
        }

        fs::read_to_string(&resolved)
            .map_err(|e| ContentError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Log on behalf of widget content.
    pub fn log(&self, message: &str) {
        log::info!(target: "anywidget::content", "[{}] {}", self.widget_id, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_inside_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("quote.txt");
        fs::write(&file, "carpe diem").unwrap();

        let caps = Capabilities::new(vec![dir.path().to_path_buf()]);
        assert_eq!(caps.read_file(&file).unwrap(), "carpe diem");
    }

    #[test]
    fn test_read_outside_root_is_denied() {
        let allowed = tempdir().unwrap();
        let other = tempdir().unwrap();
        let file = other.path().join("secret.txt");
        fs::write(&file, "nope").unwrap();

        let caps = Capabilities::new(vec![allowed.path().to_path_buf()]);
        assert!(matches!(caps.read_file(&file), Err(ContentError::Denied(_))));
    }

    #[test]
    fn test_parent_traversal_is_denied() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.txt"), "nope").unwrap();

        let caps = Capabilities::new(vec![root.clone()]);
        let sneaky = root.join("..").join("secret.txt");
        assert!(matches!(caps.read_file(&sneaky), Err(ContentError::Denied(_))));
    }

    #[test]
    fn test_no_roots_denies_everything() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        assert!(Capabilities::default().read_file(&file).is_err());
    }

    #[test]
    fn test_for_widget_keeps_roots() {
        let caps = Capabilities::new(vec![PathBuf::from("/tmp")]).for_widget("clock");
        assert_eq!(caps.widget_id(), "clock");
        assert_eq!(caps.read_roots().len(), 1);
    }
}
