//! The event-loop host.
//!
//! `WidgetHost` wires one store, one coordinator and one manager together.
//! The embedding shell feeds it pointer events through [`WidgetHost::dispatch`]
//! and calls [`WidgetHost::tick`] from its frame or timer callback.

use crate::clock::Clock;
use crate::config::WidgetConfig;
use crate::content::{Capabilities, ContentLoader};
use crate::input::{NodePath, PointerEvent, Propagation};
use crate::interaction::{CoordinatorHandle, InteractionCoordinator};
use crate::settings::HostConfig;
use crate::storage::{SharedStore, StorageResult, SubscriptionId};
use crate::widget::{ChangeGate, HitPart, ReconcileReport, WidgetContext, WidgetManager};
use std::rc::Rc;

/// What one [`WidgetHost::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The store saw a write from another process.
    pub external_change: bool,
    /// A session was force-released by its deadline.
    pub timed_out: bool,
    /// The debounced refresh ran.
    pub refreshed: Option<ReconcileReport>,
    /// Content loads that completed.
    pub content_loaded: usize,
}

/// Owns the live widgets for one store.
pub struct WidgetHost {
    store: SharedStore,
    clock: Rc<dyn Clock>,
    coordinator: CoordinatorHandle,
    manager: WidgetManager,
    subscription: Option<SubscriptionId>,
}

impl WidgetHost {
    pub fn new(store: SharedStore, loader: Rc<dyn ContentLoader>, clock: Rc<dyn Clock>, config: &HostConfig) -> Self {
        let coordinator = InteractionCoordinator::new(config.drag_threshold, config.safety_timeout()).into_handle();
        let gate = Rc::new(ChangeGate::new(config.refresh_debounce(), Rc::clone(&clock)));
        let ctx = WidgetContext::new(Rc::clone(&coordinator), Rc::clone(&store), gate, loader)
            .with_capabilities(Capabilities::new(config.read_roots.clone()))
            .with_handle(config.handle_corner, config.handle_size);

        Self {
            store,
            clock,
            coordinator,
            manager: WidgetManager::new(ctx),
            subscription: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn manager(&self) -> &WidgetManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut WidgetManager {
        &mut self.manager
    }

    pub fn coordinator(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Subscribe to the store and build the initial widget set.
    pub fn enable(&mut self) -> ReconcileReport {
        if self.is_enabled() {
            return ReconcileReport::default();
        }
        let gate = Rc::clone(self.manager.gate());
        self.subscription = Some(self.store.subscribe(Rc::new(move || {
            gate.on_store_changed();
        })));
        log::info!("Widget host enabled");
        self.manager.refresh()
    }

    /// Release any session, drop pending work and destroy every widget.
    /// Safe to call repeatedly.
    pub fn disable(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        self.coordinator.borrow_mut().release();
        self.manager.gate().cancel();
        self.store.unsubscribe(subscription);
        let destroyed = self.manager.clear();
        log::info!("Widget host disabled, {} widgets destroyed", destroyed.len());
    }

    /// Route one pointer event.
    ///
    /// `target` locates the concrete node under the pointer inside the
    /// hit widget's content, as reported by the renderer.
    pub fn dispatch(&mut self, event: &PointerEvent, target: &NodePath) -> Propagation {
        if !self.is_enabled() {
            return Propagation::Propagate;
        }
        let now = self.clock.now();

        // Capture phase.
        let captured = self.coordinator.borrow_mut().on_captured_event(event, now);
        if let Some(outcome) = captured {
            if let Some(routed) = outcome.routed {
                self.manager.apply(&routed);
            }
            if outcome.propagation == Propagation::Stop {
                return Propagation::Stop;
            }
        }

        match *event {
            PointerEvent::Move { position } => {
                let hovered = self.manager.hit_test(position).map(|(id, _)| id);
                self.manager.set_hovered(hovered.as_deref());
                Propagation::Propagate
            }
            PointerEvent::Down { position, .. } => {
                let Some((id, part)) = self.manager.hit_test(position) else {
                    return Propagation::Propagate;
                };
                let Some(widget) = self.manager.widget_mut(&id) else {
                    return Propagation::Propagate;
                };
                match part {
                    HitPart::Handle => widget.on_handle_press(event, now),
                    HitPart::Body => widget.on_pointer_down(event, target, now),
                }
            }
            PointerEvent::Up { .. } => Propagation::Propagate,
        }
    }

    /// Timer work: external store changes, the session deadline, the
    /// debounced refresh and pending content loads.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_enabled() {
            return report;
        }
        let now = self.clock.now();

        match self.store.poll_external() {
            Ok(changed) => report.external_change = changed,
            Err(e) => log::warn!("Failed to poll store: {}", e),
        }

        let expired = self.coordinator.borrow_mut().poll_deadline(now);
        if let Some(routed) = expired {
            self.manager.apply(&routed);
            report.timed_out = true;
        }

        report.refreshed = self.manager.poll_refresh(now);
        report.content_loaded = self.manager.poll_content();
        report
    }

    /// Current records, enabled or not.
    pub fn widget_configs(&self) -> Vec<WidgetConfig> {
        self.store.get_list()
    }

    /// Show or hide a widget. Returns false when no record had that id.
    pub fn toggle_widget(&mut self, id: &str, enabled: bool) -> StorageResult<bool> {
        let mut list = self.store.get_list();
        let Some(config) = list.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        config.enabled = enabled;
        self.manager.save_configs(&list)?;
        if self.is_enabled() {
            self.manager.reconcile(&list);
        }
        Ok(true)
    }

    /// Replace (or add) a record and apply it immediately.
    pub fn update_widget_config(&mut self, config: WidgetConfig) -> StorageResult<()> {
        let mut list = self.store.get_list();
        match list.iter_mut().find(|c| c.id == config.id) {
            Some(existing) => *existing = config,
            None => list.push(config),
        }
        self.manager.save_configs(&list)?;
        if self.is_enabled() {
            self.manager.reconcile(&list);
        }
        Ok(())
    }

    /// Reload one widget's content from its current source.
    pub fn reload_widget(&mut self, id: &str) -> bool {
        self.manager.reload(id)
    }
}

impl Drop for WidgetHost {
    fn drop(&mut self) {
        self.disable();
    }
}
