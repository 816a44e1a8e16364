//! A single on-screen widget.

use super::gate::ChangeGate;
use super::handle::{Corner, HANDLE_SIZE, ResizeHandle};
use super::style::{HOVER_SCALE, Layer, WidgetStyle};
use crate::config::{LoaderKind, WidgetConfig};
use crate::content::{BoxFuture, Capabilities, ContentLoader, ContentNode, ContentResult};
use crate::input::{NodePath, PointerEvent, Propagation};
use crate::interaction::{CoordinatorHandle, OwnerPart, Routed, SessionAction, SessionMode, SessionOwner};
use crate::storage::{SharedStore, StorageResult};
use kurbo::{Point, Rect};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Instant;

/// Shared collaborators every widget is built with.
#[derive(Clone)]
pub struct WidgetContext {
    pub coordinator: CoordinatorHandle,
    pub store: SharedStore,
    pub gate: Rc<ChangeGate>,
    pub loader: Rc<dyn ContentLoader>,
    pub capabilities: Capabilities,
    pub handle_corner: Corner,
    pub handle_size: f64,
}

impl WidgetContext {
    pub fn new(
        coordinator: CoordinatorHandle,
        store: SharedStore,
        gate: Rc<ChangeGate>,
        loader: Rc<dyn ContentLoader>,
    ) -> Self {
        Self {
            coordinator,
            store,
            gate,
            loader,
            capabilities: Capabilities::default(),
            handle_corner: Corner::default(),
            handle_size: HANDLE_SIZE,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_handle(mut self, corner: Corner, size: f64) -> Self {
        self.handle_corner = corner;
        self.handle_size = size;
        self
    }
}

/// Which part of a widget a point hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle,
}

/// One configured overlay element.
///
/// Owns its live geometry, computed style and content tree. Pointer presses
/// become session requests to the shared coordinator; session actions come
/// back through [`Widget::apply_session`].
pub struct Widget {
    id: String,
    config: WidgetConfig,
    rect: Rect,
    style: WidgetStyle,
    layer: Layer,
    reactive: bool,
    hovered: bool,
    handle: ResizeHandle,
    content: Option<ContentNode>,
    content_error: Option<String>,
    /// Bumped on every reload.
    generation: u64,
    pending: Option<BoxFuture<'static, ContentResult<ContentNode>>>,
    ctx: WidgetContext,
}

impl Widget {
    pub fn new(config: WidgetConfig, ctx: WidgetContext) -> Self {
        let handle = ResizeHandle::new(ctx.handle_corner, ctx.handle_size, Rc::clone(&ctx.coordinator));
        let mut widget = Self {
            id: config.id.clone(),
            rect: config.rect(),
            style: WidgetStyle::default(),
            layer: Layer::default(),
            reactive: true,
            hovered: false,
            handle,
            content: None,
            content_error: None,
            generation: 0,
            pending: None,
            config: config.clone(),
            ctx,
        };
        widget.apply_config(config, true);
        widget
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Live geometry.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn style(&self) -> &WidgetStyle {
        &self.style
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// False in click-through mode.
    pub fn is_reactive(&self) -> bool {
        self.reactive
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn handle(&self) -> &ResizeHandle {
        &self.handle
    }

    /// Render scale.
    pub fn scale(&self) -> f64 {
        if self.hovered && self.config.hover_scale {
            HOVER_SCALE
        } else {
            1.0
        }
    }

    /// Current content tree (or placeholder). `None` while loading.
    pub fn content(&self) -> Option<&ContentNode> {
        self.content.as_ref()
    }

    /// Last content failure, if the visible content is an error placeholder.
    pub fn content_error(&self) -> Option<&str> {
        self.content_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of content reloads so far.
    pub fn content_generation(&self) -> u64 {
        self.generation
    }

    /// Apply a config. Redundant calls are no-ops; content reloads only when
    /// the content descriptor changed. Returns true when anything changed.
    pub fn update_config(&mut self, config: WidgetConfig) -> bool {
        if config == self.config {
            return false;
        }
        let reload = config.content_descriptor() != self.config.content_descriptor();
        self.apply_config(config, reload);
        true
    }

    fn apply_config(&mut self, config: WidgetConfig, reload: bool) {
        self.rect = config.rect();
        self.style = WidgetStyle::from_config(&config);
        self.layer = Layer::from_config(&config);
        self.reactive = !config.click_through;
        self.handle.set_reactive(self.reactive);
        self.handle.set_visible(self.hovered && self.reactive);
        self.config = config;
        if reload {
            self.reload_content();
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
        self.handle.set_visible(hovered && self.reactive);
    }

    /// Which part of the widget, if any, is under `point`.
    pub fn hit_test(&self, point: Point) -> Option<HitPart> {
        if !self.reactive {
            return None;
        }
        if self.handle.hit_test(self.rect, point) {
            Some(HitPart::Handle)
        } else if self.rect.contains(point) {
            Some(HitPart::Body)
        } else {
            None
        }
    }

    /// Whether `target` is, or sits inside, an interactive content node.
    ///
    /// `target` indexes from the widget's content box: `[]` is the background,
    /// `[0]` the loaded content root. Walks from the target up to the content
    /// root; the first interactive node wins.
    pub fn is_interactive_target(&self, target: &NodePath) -> bool {
        let Some((&first, rest)) = target.indices().split_first() else {
            return false;
        };
        let Some(root) = self.content.as_ref() else {
            return false;
        };
        if first != 0 {
            return false;
        }
        root.path_nodes(rest).iter().rev().any(|node| node.is_interactive())
    }

    /// Pointer-down on the widget body. Requests a pending drag unless the
    /// press landed on an interactive child. Always propagates: until the
    /// threshold is crossed the press may still be a click.
    pub fn on_pointer_down(&mut self, event: &PointerEvent, target: &NodePath, now: Instant) -> Propagation {
        if !self.reactive || !event.is_primary_down() {
            return Propagation::Propagate;
        }
        if self.is_interactive_target(target) {
            return Propagation::Propagate;
        }
        self.ctx.coordinator.borrow_mut().try_acquire(
            SessionOwner::body(&self.id),
            SessionMode::DragPending,
            event.position(),
            self.rect,
            now,
        );
        Propagation::Propagate
    }

    /// Pointer-down on the resize handle.
    pub fn on_handle_press(&mut self, event: &PointerEvent, now: Instant) -> Propagation {
        if !event.is_primary_down() {
            return Propagation::Propagate;
        }
        if self.handle.press(&self.id, self.rect, event.position(), now) {
            Propagation::Stop
        } else {
            Propagation::Propagate
        }
    }

    /// Apply a session action routed by the coordinator. Returns true when
    /// the widget should be raised to the top of the stack.
    pub fn apply_session(&mut self, routed: &Routed) -> bool {
        match routed.action {
            SessionAction::Pending => false,
            SessionAction::BeginDrag { origin } => {
                self.move_to(origin);
                true
            }
            SessionAction::Move { origin } => {
                self.move_to(origin);
                false
            }
            SessionAction::Resize { delta } => {
                if let OwnerPart::Handle(_) = routed.owner.part {
                    self.rect = self.handle.resized(routed.initial, delta);
                }
                false
            }
            SessionAction::Finish { persist } => {
                self.handle.set_active(false);
                if persist {
                    self.rect = Rect::from_origin_size(self.rect.origin().round(), self.rect.size().round());
                    if let Err(e) = self.save_state() {
                        log::warn!("Failed to save state of widget {}: {}", self.id, e);
                    }
                }
                false
            }
        }
    }

    fn move_to(&mut self, origin: Point) {
        self.rect = Rect::from_origin_size(origin, self.rect.size());
    }

    /// Persist live geometry into this widget's record.
    ///
    /// Reads the full list, changes only the geometry fields of the matching
    /// record and writes the whole list back under suppression. Returns
    /// false when the record no longer exists.
    pub fn save_state(&mut self) -> StorageResult<bool> {
        let mut list = self.ctx.store.get_list();
        let Some(record) = list.iter_mut().find(|c| c.id == self.id) else {
            log::debug!("Widget {} has no stored record, not saving", self.id);
            return Ok(false);
        };
        record.set_geometry(self.rect);

        {
            let _guard = self.ctx.gate.suppress();
            self.ctx.store.set_list(&list)?;
        }
        self.config.set_geometry(self.rect);
        log::debug!("Saved geometry of widget {}: {:?}", self.id, self.rect);
        Ok(true)
    }

    /// Replace the content entirely from the current descriptor.
    pub fn reload_content(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.content = None;
        self.content_error = None;

        let source = match self.config.loader_type {
            LoaderKind::Code => Ok(self.config.loader_source.clone()),
            LoaderKind::File if self.config.loader_source.trim().is_empty() => Ok(String::new()),
            LoaderKind::File => std::fs::read_to_string(self.config.loader_source.trim())
                .map_err(|e| format!("{}: {}", self.config.loader_source, e)),
        };
        let source = match source {
            Ok(source) => source,
            Err(message) => {
                self.fail(message);
                return;
            }
        };

        if source.trim().is_empty() {
            self.content = Some(ContentNode::placeholder("No code"));
            return;
        }

        let capabilities = self.ctx.capabilities.for_widget(&self.id);
        let loader = Rc::clone(&self.ctx.loader);
        match catch_unwind(AssertUnwindSafe(|| loader.load(source, capabilities))) {
            Ok(future) => {
                self.pending = Some(future);
                self.poll_content();
            }
            Err(_) => self.fail("content loader panicked".to_string()),
        }
    }

    /// Drive a pending content load. Returns true when it completed now.
    pub fn poll_content(&mut self) -> bool {
        let Some(future) = self.pending.as_mut() else {
            return false;
        };
        let mut cx = Context::from_waker(Waker::noop());
        let polled = catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(&mut cx)));

        match polled {
            Ok(Poll::Pending) => false,
            Ok(Poll::Ready(result)) => {
                self.pending = None;
                match result {
                    Ok(node) => self.content = Some(node),
                    Err(e) => self.fail(e.to_string()),
                }
                true
            }
            Err(_) => {
                self.pending = None;
                self.fail("content loader panicked".to_string());
                true
            }
        }
    }

    fn fail(&mut self, message: String) {
        log::error!("Widget {} content failed: {}", self.id, message);
        self.content = Some(ContentNode::placeholder(format!("Err: {}", message)));
        self.content_error = Some(message);
    }

    /// Release anything this widget holds. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.pending = None;
        self.handle.set_active(false);
        // Skipped if the coordinator is mid-borrow; the session then ends on
        // its own release path.
        if let Ok(mut coordinator) = self.ctx.coordinator.try_borrow_mut() {
            coordinator.release_owner(&self.id);
        }
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("rect", &self.rect)
            .field("layer", &self.layer)
            .field("reactive", &self.reactive)
            .field("hovered", &self.hovered)
            .field("generation", &self.generation)
            .finish()
    }
}
