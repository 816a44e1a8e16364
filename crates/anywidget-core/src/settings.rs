//! Host tunables, loadable from a TOML file.

use crate::interaction::{DRAG_THRESHOLD, SAFETY_TIMEOUT};
use crate::widget::{Corner, HANDLE_SIZE, REFRESH_DEBOUNCE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Host configuration errors.
#[derive(Debug, Error)]
pub enum HostConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Interaction and storage settings for a [`crate::WidgetHost`].
///
/// ```toml
/// drag_threshold = 8.0
/// safety_timeout_ms = 2000
/// refresh_debounce_ms = 200
/// handle_size = 24.0
/// handle_corner = "bottom_right"
/// read_roots = ["/home/me/notes"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Pointer travel in pixels before a press becomes a drag.
    pub drag_threshold: f64,
    pub safety_timeout_ms: u64,
    pub refresh_debounce_ms: u64,
    pub handle_size: f64,
    pub handle_corner: Corner,
    /// Directories content loaders may read from.
    pub read_roots: Vec<PathBuf>,
    /// Store file. Falls back to the user config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DRAG_THRESHOLD,
            safety_timeout_ms: SAFETY_TIMEOUT.as_millis() as u64,
            refresh_debounce_ms: REFRESH_DEBOUNCE.as_millis() as u64,
            handle_size: HANDLE_SIZE,
            handle_corner: Corner::default(),
            read_roots: Vec::new(),
            store_path: None,
        }
    }
}

impl HostConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, HostConfigError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, HostConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Like [`HostConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, HostConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No host config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn safety_timeout(&self) -> Duration {
        Duration::from_millis(self.safety_timeout_ms)
    }

    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }
}
