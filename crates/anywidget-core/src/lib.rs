//! anywidget core library
//!
//! Free-floating desktop widgets driven by a persisted list of records:
//! drag and resize coordination, configuration sync with the store, and the
//! content loading contract. Rendering is left to the embedding shell.

pub mod clock;
pub mod config;
pub mod content;
pub mod host;
pub mod input;
pub mod interaction;
pub mod prefs;
pub mod settings;
pub mod storage;
pub mod widget;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LoaderKind, MIN_WIDGET_SIZE, WidgetConfig};
pub use content::{Capabilities, ContentError, ContentLoader, ContentNode, MarkupLoader, NodeRole};
pub use host::{TickReport, WidgetHost};
pub use input::{MouseButton, NodePath, PointerEvent, Propagation};
pub use interaction::{CoordinatorHandle, InteractionCoordinator, SessionMode};
pub use prefs::Preferences;
pub use settings::{HostConfig, HostConfigError};
pub use storage::{ConfigStore, FileStore, MemoryStore, SharedStore, StorageError};
pub use widget::{Corner, Layer, ReconcileReport, Widget, WidgetManager};
