//! Widgets and their manager.
//!
//! A [`Widget`] is the live counterpart of one enabled store record. The
//! [`WidgetManager`] keeps the set of widgets in line with the store, and the
//! [`ChangeGate`] decides which store notifications reach it.

mod gate;
mod handle;
mod manager;
mod style;
#[allow(clippy::module_inception)]
mod widget;

pub use gate::{ChangeGate, REFRESH_DEBOUNCE, SuppressionGuard};
pub use handle::{Corner, HANDLE_SIZE, ResizeHandle};
pub use manager::{ReconcileReport, WidgetManager};
pub use style::{HOVER_SCALE, Layer, WidgetStyle};
pub use widget::{HitPart, Widget, WidgetContext};
