//! Widget manager: the live set of widgets mirrored from the store.

use super::gate::ChangeGate;
use super::style::Layer;
use super::widget::{HitPart, Widget, WidgetContext};
use crate::config::WidgetConfig;
use crate::interaction::Routed;
use crate::storage::StorageResult;
use kurbo::Point;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Instant;

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    /// Live widgets the config was re-applied to.
    pub retained: Vec<String>,
    /// Subset of `retained` whose config actually changed.
    pub updated: Vec<String>,
    pub destroyed: Vec<String>,
}

impl ReconcileReport {
    /// True when nothing was created, changed or destroyed.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.destroyed.is_empty()
    }
}

/// Keeps one live [`Widget`] per enabled record in the store.
///
/// Also owns the stacking order (bottom to top within each layer) and the
/// hovered widget.
pub struct WidgetManager {
    widgets: HashMap<String, Widget>,
    /// Bottom to top.
    order: Vec<String>,
    hovered: Option<String>,
    ctx: WidgetContext,
}

impl WidgetManager {
    pub fn new(ctx: WidgetContext) -> Self {
        Self {
            widgets: HashMap::new(),
            order: Vec::new(),
            hovered: None,
            ctx,
        }
    }

    pub fn gate(&self) -> &Rc<ChangeGate> {
        &self.ctx.gate
    }

    pub fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn widget_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    /// Widgets bottom to top: background layer first, then chrome.
    pub fn stacked(&self) -> Vec<&Widget> {
        let mut stacked: Vec<&Widget> = self.order.iter().filter_map(|id| self.widgets.get(id)).collect();
        // Stable: keeps raise order inside each layer.
        stacked.sort_by_key(|w| w.layer() == Layer::Chrome);
        stacked
    }

    /// Bring the set of live widgets in line with `configs`.
    ///
    /// Disabled records and repeated ids are skipped. Running it twice with
    /// the same input changes nothing the second time.
    pub fn reconcile(&mut self, configs: &[WidgetConfig]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut wanted: Vec<&WidgetConfig> = Vec::new();
        let mut seen = HashSet::new();
        for config in configs.iter().filter(|c| c.enabled) {
            if seen.insert(config.id.as_str()) {
                wanted.push(config);
            } else {
                log::warn!("Duplicate widget id {} in store, ignoring repeat", config.id);
            }
        }

        let stale: Vec<String> = self
            .order
            .iter()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            self.destroy(&id);
            report.destroyed.push(id);
        }

        for config in wanted {
            match self.widgets.get_mut(&config.id) {
                Some(widget) => {
                    report.retained.push(config.id.clone());
                    if widget.update_config(config.clone()) {
                        report.updated.push(config.id.clone());
                    }
                }
                None => {
                    let widget = Widget::new(config.clone(), self.ctx.clone());
                    self.order.push(config.id.clone());
                    self.widgets.insert(config.id.clone(), widget);
                    report.created.push(config.id.clone());
                }
            }
        }

        if !report.is_empty() {
            log::debug!(
                "Reconciled widgets: {} created, {} updated, {} destroyed",
                report.created.len(),
                report.updated.len(),
                report.destroyed.len()
            );
        }
        report
    }

    /// Reconcile against the store's current list.
    pub fn refresh(&mut self) -> ReconcileReport {
        let list = self.ctx.store.get_list();
        self.reconcile(&list)
    }

    /// Run the debounced refresh if its window has elapsed.
    pub fn poll_refresh(&mut self, now: Instant) -> Option<ReconcileReport> {
        if self.ctx.gate.take_due(now) {
            Some(self.refresh())
        } else {
            None
        }
    }

    /// Write `list` to the store without triggering our own refresh.
    pub fn save_configs(&self, list: &[WidgetConfig]) -> StorageResult<()> {
        let _guard = self.ctx.gate.suppress();
        self.ctx.store.set_list(list)
    }

    fn destroy(&mut self, id: &str) {
        self.order.retain(|other| other != id);
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        if let Some(mut widget) = self.widgets.remove(id) {
            widget.teardown();
            log::debug!("Destroyed widget {}", id);
        }
    }

    /// Move a widget to the top of its layer.
    pub fn raise(&mut self, id: &str) {
        if let Some(pos) = self.order.iter().position(|other| other == id) {
            let id = self.order.remove(pos);
            self.order.push(id);
        }
    }

    /// Topmost widget part under `point`: chrome layer first, then
    /// background, each from the top down.
    pub fn hit_test(&self, point: Point) -> Option<(String, HitPart)> {
        self.stacked()
            .into_iter()
            .rev()
            .find_map(|w| w.hit_test(point).map(|part| (w.id().to_string(), part)))
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn set_hovered(&mut self, id: Option<&str>) {
        if self.hovered.as_deref() == id {
            return;
        }
        if let Some(old) = self.hovered.take() {
            if let Some(widget) = self.widgets.get_mut(&old) {
                widget.set_hovered(false);
            }
        }
        if let Some(id) = id {
            if let Some(widget) = self.widgets.get_mut(id) {
                widget.set_hovered(true);
                self.hovered = Some(id.to_string());
            }
        }
    }

    /// Hand a routed session action to its owner. Returns false when the
    /// owner no longer exists.
    pub fn apply(&mut self, routed: &Routed) -> bool {
        let id = routed.owner.widget.as_str();
        let Some(widget) = self.widgets.get_mut(id) else {
            log::debug!("Session action for missing widget {}", id);
            return false;
        };
        if widget.apply_session(routed) {
            self.raise(id);
        }
        true
    }

    /// Reload one widget's content.
    pub fn reload(&mut self, id: &str) -> bool {
        match self.widgets.get_mut(id) {
            Some(widget) => {
                widget.reload_content();
                true
            }
            None => false,
        }
    }

    /// Drive pending content loads. Returns how many completed.
    pub fn poll_content(&mut self) -> usize {
        self.widgets
            .values_mut()
            .map(|w| w.poll_content())
            .filter(|done| *done)
            .count()
    }

    /// Destroy every widget. Returns their ids, bottom to top.
    pub fn clear(&mut self) -> Vec<String> {
        let ids = self.order.clone();
        for id in &ids {
            self.destroy(id);
        }
        ids
    }
}

impl std::fmt::Debug for WidgetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetManager")
            .field("order", &self.order)
            .field("hovered", &self.hovered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::content::MarkupLoader;
    use crate::input::{MouseButton, NodePath, PointerEvent};
    use crate::interaction::{InteractionCoordinator, SessionAction, SessionOwner};
    use crate::storage::{ConfigStore, MemoryStore};
    use crate::widget::gate::REFRESH_DEBOUNCE;
    use std::time::Duration;

    fn setup() -> (WidgetManager, Rc<MemoryStore>, Rc<ManualClock>) {
        let store = Rc::new(MemoryStore::new());
        let clock = Rc::new(ManualClock::new());
        let gate = Rc::new(ChangeGate::new(REFRESH_DEBOUNCE, clock.clone()));
        let listener_gate = Rc::clone(&gate);
        store.subscribe(Rc::new(move || {
            listener_gate.on_store_changed();
        }));
        let ctx = WidgetContext::new(
            InteractionCoordinator::default().into_handle(),
            store.clone(),
            gate,
            Rc::new(MarkupLoader),
        );
        (WidgetManager::new(ctx), store, clock)
    }

    fn config(id: &str) -> WidgetConfig {
        let mut config = WidgetConfig::new(id);
        config.loader_source = id.to_uppercase();
        config
    }

    fn disabled(id: &str) -> WidgetConfig {
        let mut config = config(id);
        config.enabled = false;
        config
    }

    fn sorted(mut ids: Vec<String>) -> Vec<String> {
        ids.sort();
        ids
    }

    #[test]
    fn test_reconcile_set_difference() {
        let (mut manager, _, _) = setup();
        let report = manager.reconcile(&[config("a"), config("b"), disabled("c")]);
        assert_eq!(sorted(report.created), vec!["a", "b"]);
        assert!(!manager.contains("c"));

        let mut moved = config("b");
        moved.x = 400;
        let report = manager.reconcile(&[config("a"), moved, config("d")]);
        assert_eq!(report.created, vec!["d"]);
        assert_eq!(report.updated, vec!["b"]);
        assert!(report.destroyed.is_empty());
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.widget("b").unwrap().rect().x0, 400.0);
    }

    #[test]
    fn test_reconcile_with_disabled_and_stale_ids() {
        let (mut manager, _, _) = setup();
        manager.reconcile(&[config("a"), config("b"), config("d")]);

        let report = manager.reconcile(&[config("a"), config("b"), disabled("c")]);
        assert!(report.created.is_empty());
        assert_eq!(report.retained, vec!["a", "b"]);
        assert_eq!(report.destroyed, vec!["d"]);
        assert!(!manager.contains("c"));
        assert!(!manager.contains("d"));
    }

    #[test]
    fn test_reconcile_destroys_disabled_and_removed() {
        let (mut manager, _, _) = setup();
        manager.reconcile(&[config("a"), config("b"), config("c")]);
        let report = manager.reconcile(&[config("a"), disabled("b")]);
        assert_eq!(sorted(report.destroyed), vec!["b", "c"]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (mut manager, _, _) = setup();
        let list = [config("a"), config("b")];
        manager.reconcile(&list);
        let generation = manager.widget("a").unwrap().content_generation();

        let report = manager.reconcile(&list);
        assert!(report.is_empty());
        assert_eq!(manager.widget("a").unwrap().content_generation(), generation);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let (mut manager, _, _) = setup();
        let mut second = config("a");
        second.x = 999;
        manager.reconcile(&[config("a"), second]);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.widget("a").unwrap().rect().x0, 100.0);
    }

    #[test]
    fn test_external_write_refreshes_once_after_debounce() {
        let (mut manager, store, clock) = setup();
        store.set_list(&[config("a")]).unwrap();
        clock.advance(Duration::from_millis(100));
        store.set_list(&[config("a"), config("b")]).unwrap();

        clock.advance(Duration::from_millis(150));
        assert!(manager.poll_refresh(clock.now()).is_none());

        clock.advance(Duration::from_millis(50));
        let report = manager.poll_refresh(clock.now()).unwrap();
        assert_eq!(sorted(report.created), vec!["a", "b"]);
        assert!(manager.poll_refresh(clock.now() + REFRESH_DEBOUNCE).is_none());
    }

    #[test]
    fn test_own_write_does_not_refresh() {
        let (mut manager, _, clock) = setup();
        manager.save_configs(&[config("a")]).unwrap();
        clock.advance(Duration::from_secs(1));
        assert!(manager.poll_refresh(clock.now()).is_none());
        assert!(manager.is_empty());
        assert_eq!(manager.gate().ignored_count(), 1);
    }

    #[test]
    fn test_hit_test_chrome_above_background() {
        let (mut manager, _, _) = setup();
        let mut top = config("top");
        top.always_on_top = true;
        // "top" comes first in the list but lives in the chrome layer.
        manager.reconcile(&[top, config("bottom")]);

        let (id, part) = manager.hit_test(Point::new(150.0, 150.0)).unwrap();
        assert_eq!(id, "top");
        assert_eq!(part, HitPart::Body);

        let stacked: Vec<&str> = manager.stacked().iter().map(|w| w.id()).collect();
        assert_eq!(stacked, vec!["bottom", "top"]);
        assert!(manager.hit_test(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_raise_within_layer() {
        let (mut manager, _, _) = setup();
        manager.reconcile(&[config("a"), config("b")]);
        assert_eq!(manager.hit_test(Point::new(150.0, 150.0)).unwrap().0, "b");

        manager.raise("a");
        assert_eq!(manager.hit_test(Point::new(150.0, 150.0)).unwrap().0, "a");
    }

    #[test]
    fn test_begin_drag_raises_owner() {
        let (mut manager, _, _) = setup();
        manager.reconcile(&[config("a"), config("b")]);
        let initial = manager.widget("a").unwrap().rect();
        assert!(manager.apply(&Routed {
            owner: SessionOwner::body("a"),
            initial,
            action: SessionAction::BeginDrag { origin: Point::new(120.0, 100.0) },
        }));
        assert_eq!(manager.stacked().last().unwrap().id(), "a");

        assert!(!manager.apply(&Routed {
            owner: SessionOwner::body("gone"),
            initial,
            action: SessionAction::Finish { persist: true },
        }));
    }

    #[test]
    fn test_hover_moves_between_widgets() {
        let (mut manager, _, _) = setup();
        manager.reconcile(&[config("a"), config("b")]);
        manager.set_hovered(Some("a"));
        assert!(manager.widget("a").unwrap().is_hovered());

        manager.set_hovered(Some("b"));
        assert!(!manager.widget("a").unwrap().is_hovered());
        assert!(manager.widget("b").unwrap().is_hovered());

        manager.reconcile(&[config("a")]);
        assert_eq!(manager.hovered(), None);
    }

    #[test]
    fn test_destroying_owner_releases_session() {
        let (mut manager, _, _) = setup();
        manager.reconcile(&[config("a")]);
        let down = PointerEvent::Down {
            position: Point::new(150.0, 150.0),
            button: MouseButton::Left,
        };
        manager
            .widget_mut("a")
            .unwrap()
            .on_pointer_down(&down, &NodePath::root(), Instant::now());
        assert!(manager.context().coordinator.borrow().is_active());

        assert_eq!(manager.clear(), vec!["a"]);
        assert!(!manager.context().coordinator.borrow().is_active());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_reload_bumps_generation() {
        let (mut manager, _, _) = setup();
        manager.reconcile(&[config("a")]);
        assert!(manager.reload("a"));
        assert_eq!(manager.widget("a").unwrap().content_generation(), 2);
        assert!(!manager.reload("missing"));
    }
}
