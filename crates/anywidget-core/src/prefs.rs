//! Store operations of the preferences editor.
//!
//! These are the "external" writers: nothing here raises the suppression
//! flag, so a running host picks every change up through its debounced
//! refresh.

use crate::config::{LoaderKind, WidgetConfig};
use crate::storage::{SharedStore, StorageResult};

/// Source given to freshly created widgets.
pub const EXAMPLE_SOURCE: &str = r#"{ "role": "label", "text": "Your anyWidget", "style": "any-widget-label" }"#;

/// Editor-side access to the widget list.
#[derive(Clone)]
pub struct Preferences {
    store: SharedStore,
}

impl Preferences {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn widgets(&self) -> Vec<WidgetConfig> {
        self.store.get_list()
    }

    pub fn widget(&self, id: &str) -> Option<WidgetConfig> {
        self.widgets().into_iter().find(|w| w.id == id)
    }

    /// The "new widget" record: 200×100 at (100, 100) with example content.
    pub fn template(name: &str) -> WidgetConfig {
        let mut config = WidgetConfig::generate();
        config.name = name.to_string();
        config.width = 200;
        config.height = 100;
        config.shadow_color = "rgba(0,0,0,1)".to_string();
        config.loader_type = LoaderKind::Code;
        config.loader_source = EXAMPLE_SOURCE.to_string();
        config
    }

    /// Append a new widget built from the template.
    pub fn create_widget(&self, name: &str) -> StorageResult<WidgetConfig> {
        let config = Self::template(name);
        let mut list = self.widgets();
        list.push(config.clone());
        self.store.set_list(&list)?;
        log::info!("Created widget {} ({})", config.name, config.id);
        Ok(config)
    }

    /// Replace the record with the same id, or append it.
    pub fn save_widget(&self, config: &WidgetConfig) -> StorageResult<()> {
        let mut list = self.widgets();
        match list.iter_mut().find(|w| w.id == config.id) {
            Some(existing) => *existing = config.clone(),
            None => list.push(config.clone()),
        }
        self.store.set_list(&list)
    }

    /// Returns false when no record had that id.
    pub fn delete_widget(&self, id: &str) -> StorageResult<bool> {
        let mut list = self.widgets();
        let before = list.len();
        list.retain(|w| w.id != id);
        if list.len() == before {
            return Ok(false);
        }
        self.store.set_list(&list)?;
        log::info!("Deleted widget {}", id);
        Ok(true)
    }

    /// Returns false when no record had that id.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> StorageResult<bool> {
        let mut list = self.widgets();
        let Some(config) = list.iter_mut().find(|w| w.id == id) else {
            return Ok(false);
        };
        config.enabled = enabled;
        self.store.set_list(&list)?;
        Ok(true)
    }
}
