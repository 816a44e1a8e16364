//! Resize handle anchored to a widget corner.

use crate::config::MIN_WIDGET_SIZE;
use crate::interaction::{CoordinatorHandle, SessionMode, SessionOwner};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Handle edge length in pixels.
pub const HANDLE_SIZE: f64 = 24.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Corner {
    /// The corner's point on `rect`.
    pub fn point_on(&self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    fn grows_left(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn grows_up(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }
}

/// A fixed-size affordance in one corner of its widget. Visible only while
/// the widget is hovered; pressing it starts a resize session.
#[derive(Debug)]
pub struct ResizeHandle {
    corner: Corner,
    size: f64,
    visible: bool,
    reactive: bool,
    active: bool,
    coordinator: CoordinatorHandle,
}

impl ResizeHandle {
    pub fn new(corner: Corner, size: f64, coordinator: CoordinatorHandle) -> Self {
        Self {
            corner,
            size,
            visible: false,
            reactive: true,
            active: false,
            coordinator,
        }
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_reactive(&self) -> bool {
        self.reactive
    }

    pub fn set_reactive(&mut self, reactive: bool) {
        self.reactive = reactive;
    }

    /// True while this handle owns a resize session.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Handle bounds for a widget occupying `widget`.
    pub fn rect(&self, widget: Rect) -> Rect {
        let size = self.size.min(widget.width()).min(widget.height());
        let x0 = if self.corner.grows_left() { widget.x0 } else { widget.x1 - size };
        let y0 = if self.corner.grows_up() { widget.y0 } else { widget.y1 - size };
        Rect::new(x0, y0, x0 + size, y0 + size)
    }

    /// Whether a press at `point` lands on the handle.
    pub fn hit_test(&self, widget: Rect, point: Point) -> bool {
        self.visible && self.reactive && self.rect(widget).contains(point)
    }

    /// Request a resize session. No-op returning false when another session
    /// is active.
    pub fn press(&mut self, widget_id: &str, widget: Rect, position: Point, now: Instant) -> bool {
        if !self.reactive {
            return false;
        }
        let acquired = self.coordinator.borrow_mut().try_acquire(
            SessionOwner::handle(widget_id, self.corner),
            SessionMode::Resize,
            position,
            widget,
            now,
        );
        if acquired {
            self.active = true;
        }
        acquired
    }

    /// Geometry after dragging the handle by `delta` from where `initial` was
    /// pressed. The opposite corner stays put; both axes clamp to the minimum.
    pub fn resized(&self, initial: Rect, delta: Vec2) -> Rect {
        let dx = if self.corner.grows_left() { -delta.x } else { delta.x };
        let dy = if self.corner.grows_up() { -delta.y } else { delta.y };
        let width = (initial.width() + dx).max(MIN_WIDGET_SIZE);
        let height = (initial.height() + dy).max(MIN_WIDGET_SIZE);

        let x0 = if self.corner.grows_left() { initial.x1 - width } else { initial.x0 };
        let y0 = if self.corner.grows_up() { initial.y1 - height } else { initial.y0 };
        Rect::new(x0, y0, x0 + width, y0 + height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionCoordinator;

    fn handle(corner: Corner) -> ResizeHandle {
        ResizeHandle::new(corner, HANDLE_SIZE, InteractionCoordinator::default().into_handle())
    }

    #[test]
    fn test_bottom_right_grows() {
        let initial = Rect::new(10.0, 20.0, 210.0, 220.0);
        let rect = handle(Corner::BottomRight).resized(initial, Vec2::new(40.0, 10.0));
        assert_eq!(rect, Rect::new(10.0, 20.0, 250.0, 230.0));
        assert_eq!((rect.width(), rect.height()), (240.0, 210.0));
    }

    #[test]
    fn test_clamped_to_minimum() {
        let initial = Rect::new(0.0, 0.0, 200.0, 200.0);
        let rect = handle(Corner::BottomRight).resized(initial, Vec2::new(-500.0, -180.0));
        assert_eq!((rect.width(), rect.height()), (MIN_WIDGET_SIZE, MIN_WIDGET_SIZE));
        assert_eq!(rect.origin(), Point::ZERO);
    }

    #[test]
    fn test_top_left_keeps_bottom_right_anchored() {
        let initial = Rect::new(100.0, 100.0, 300.0, 300.0);
        let rect = handle(Corner::TopLeft).resized(initial, Vec2::new(-20.0, 30.0));
        assert_eq!(rect, Rect::new(80.0, 130.0, 300.0, 300.0));

        let clamped = handle(Corner::TopLeft).resized(initial, Vec2::new(400.0, 400.0));
        assert_eq!(clamped, Rect::new(250.0, 250.0, 300.0, 300.0));
    }

    #[test]
    fn test_handle_rect_sits_in_corner() {
        let widget = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(handle(Corner::BottomRight).rect(widget), Rect::new(176.0, 76.0, 200.0, 100.0));
        assert_eq!(handle(Corner::TopLeft).rect(widget), Rect::new(0.0, 0.0, 24.0, 24.0));
        assert_eq!(Corner::TopRight.point_on(widget), Point::new(200.0, 0.0));
    }

    #[test]
    fn test_hidden_handle_is_not_hit() {
        let widget = Rect::new(0.0, 0.0, 200.0, 200.0);
        let mut h = handle(Corner::BottomRight);
        assert!(!h.hit_test(widget, Point::new(190.0, 190.0)));
        h.set_visible(true);
        assert!(h.hit_test(widget, Point::new(190.0, 190.0)));
        h.set_reactive(false);
        assert!(!h.hit_test(widget, Point::new(190.0, 190.0)));
    }

    #[test]
    fn test_press_acquires_resize() {
        let coordinator = InteractionCoordinator::default().into_handle();
        let mut h = ResizeHandle::new(Corner::BottomRight, HANDLE_SIZE, coordinator.clone());
        let widget = Rect::new(0.0, 0.0, 200.0, 200.0);

        assert!(h.press("a", widget, Point::new(195.0, 195.0), Instant::now()));
        assert!(h.is_active());
        assert_eq!(coordinator.borrow().mode(), SessionMode::Resize);

        // Busy: a second handle cannot start.
        let mut other = ResizeHandle::new(Corner::BottomRight, HANDLE_SIZE, coordinator.clone());
        assert!(!other.press("b", widget, Point::ZERO, Instant::now()));
        assert!(!other.is_active());
    }
}
