//! Interaction session definitions.

use crate::input::Propagation;
use crate::widget::Corner;
use kurbo::{Point, Rect, Vec2};
use std::time::Instant;

/// What the active session is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// No session.
    #[default]
    Idle,
    /// Pointer is down on a widget body but has not moved past the threshold.
    DragPending,
    /// Widget follows the pointer.
    Drag,
    /// Widget is being resized from a handle.
    Resize,
}

impl SessionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Which part of a widget holds the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerPart {
    /// The widget body (drag).
    Body,
    /// A resize handle on the given corner.
    Handle(Corner),
}

/// Non-owning reference to the component holding the session. The widget's
/// lifetime belongs to the [`WidgetManager`](crate::widget::WidgetManager).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionOwner {
    pub widget: String,
    pub part: OwnerPart,
}

impl SessionOwner {
    pub fn body(widget: impl Into<String>) -> Self {
        Self {
            widget: widget.into(),
            part: OwnerPart::Body,
        }
    }

    pub fn handle(widget: impl Into<String>, corner: Corner) -> Self {
        Self {
            widget: widget.into(),
            part: OwnerPart::Handle(corner),
        }
    }
}

/// Registration of the single capture handler on the input root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureId(u64);

/// The one root-level capture slot. Only the coordinator holds it.
#[derive(Debug, Default)]
pub struct CaptureSlot {
    active: Option<CaptureId>,
    next_id: u64,
}

impl CaptureSlot {
    /// Claim the slot. `None` when already registered.
    pub fn register(&mut self) -> Option<CaptureId> {
        if self.active.is_some() {
            return None;
        }
        let id = CaptureId(self.next_id);
        self.next_id += 1;
        self.active = Some(id);
        Some(id)
    }

    /// Release the slot if `id` holds it. Returns false for stale ids.
    pub fn unregister(&mut self, id: CaptureId) -> bool {
        if self.active == Some(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn is_registered(&self) -> bool {
        self.active.is_some()
    }

    /// Total registrations handed out so far.
    pub fn registrations(&self) -> u64 {
        self.next_id
    }
}

/// The active session. Exists only while not idle.
#[derive(Debug, Clone)]
pub struct Session {
    pub mode: SessionMode,
    pub owner: SessionOwner,
    /// Pointer position of the initiating press.
    pub origin: Point,
    /// Owner geometry when the session started.
    pub initial: Rect,
    /// Auto-release time, pushed forward by every motion event.
    pub deadline: Instant,
    pub(crate) capture: CaptureId,
}

/// Instruction for the session owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionAction {
    /// Drag still pending; nothing to apply.
    Pending,
    /// The threshold was crossed on this event: raise and move.
    BeginDrag { origin: Point },
    /// Move the widget to `origin`.
    Move { origin: Point },
    /// Pointer displacement from the press point while resizing.
    Resize { delta: Vec2 },
    /// The session ended. Persist geometry when `persist` is set.
    Finish { persist: bool },
}

/// An action addressed to the session owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub owner: SessionOwner,
    pub initial: Rect,
    pub action: SessionAction,
}

/// Result of the capture phase for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub routed: Option<Routed>,
    pub propagation: Propagation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_slot_single_registration() {
        let mut slot = CaptureSlot::default();
        let id = slot.register().unwrap();
        assert!(slot.register().is_none());
        assert!(slot.is_registered());

        assert!(slot.unregister(id));
        assert!(!slot.unregister(id));
        assert!(!slot.is_registered());
    }

    #[test]
    fn test_stale_capture_id_does_not_release_new_registration() {
        let mut slot = CaptureSlot::default();
        let old = slot.register().unwrap();
        slot.unregister(old);
        let _new = slot.register().unwrap();

        assert!(!slot.unregister(old));
        assert!(slot.is_registered());
        assert_eq!(slot.registrations(), 2);
    }
}
