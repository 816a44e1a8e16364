//! Pointer interaction arbitration.
//!
//! Widgets and resize handles never listen on the input root themselves.
//! They ask the [`InteractionCoordinator`] for the session; while it is held,
//! the coordinator sees every pointer event first and tells the owner what to
//! apply.

mod coordinator;
mod session;

pub use coordinator::{CoordinatorHandle, InteractionCoordinator, DRAG_THRESHOLD, SAFETY_TIMEOUT};
pub use session::{
    CaptureId, CaptureOutcome, CaptureSlot, OwnerPart, Routed, Session, SessionAction, SessionMode,
    SessionOwner,
};
