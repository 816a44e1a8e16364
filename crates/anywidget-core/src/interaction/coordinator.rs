//! The interaction coordinator: one drag/resize session at a time.

use super::session::{
    CaptureOutcome, CaptureSlot, Routed, Session, SessionAction, SessionMode, SessionOwner,
};
use crate::input::{PointerEvent, Propagation};
use kurbo::{Point, Rect};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Pointer travel (pixels) that turns a pending press into a drag.
pub const DRAG_THRESHOLD: f64 = 8.0;
/// Inactivity window after which a session is force-released.
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared handle to the coordinator, given to widgets and resize handles.
pub type CoordinatorHandle = Rc<RefCell<InteractionCoordinator>>;

/// Serializes drag and resize across every widget sharing one input stream.
///
/// The session is `Some` exactly while the capture slot is registered, so
/// `mode != Idle`, "capture registered" and "owner set" always agree. Only
/// the methods below touch it.
#[derive(Debug)]
pub struct InteractionCoordinator {
    session: Option<Session>,
    capture: CaptureSlot,
    drag_threshold: f64,
    timeout: Duration,
}

impl Default for InteractionCoordinator {
    fn default() -> Self {
        Self::new(DRAG_THRESHOLD, SAFETY_TIMEOUT)
    }
}

impl InteractionCoordinator {
    pub fn new(drag_threshold: f64, timeout: Duration) -> Self {
        Self {
            session: None,
            capture: CaptureSlot::default(),
            drag_threshold,
            timeout,
        }
    }

    /// Wrap in a shareable handle.
    pub fn into_handle(self) -> CoordinatorHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn mode(&self) -> SessionMode {
        self.session
            .as_ref()
            .map(|s| s.mode)
            .unwrap_or(SessionMode::Idle)
    }

    pub fn owner(&self) -> Option<&SessionOwner> {
        self.session.as_ref().map(|s| &s.owner)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_registered()
    }

    pub fn capture_registrations(&self) -> u64 {
        self.capture.registrations()
    }

    pub fn drag_threshold(&self) -> f64 {
        self.drag_threshold
    }

    /// Start a session. Fails without side effects while another session is
    /// active or when asked for `Idle`.
    pub fn try_acquire(
        &mut self,
        owner: SessionOwner,
        mode: SessionMode,
        origin: Point,
        initial: Rect,
        now: Instant,
    ) -> bool {
        if mode.is_idle() || self.session.is_some() {
            return false;
        }
        let Some(capture) = self.capture.register() else {
            return false;
        };

        log::debug!("Session {:?} acquired by {:?}", mode, owner);
        self.session = Some(Session {
            mode,
            owner,
            origin,
            initial,
            deadline: now + self.timeout,
            capture,
        });
        true
    }

    /// Capture phase: every pointer event reaching the root goes here first.
    /// Returns `None` when idle (nothing captured).
    pub fn on_captured_event(&mut self, event: &PointerEvent, now: Instant) -> Option<CaptureOutcome> {
        let session = self.session.as_mut()?;
        let mode = session.mode;

        match *event {
            PointerEvent::Move { position } => {
                session.deadline = now + self.timeout;
                let delta = position - session.origin;
                let action = match mode {
                    SessionMode::DragPending => {
                        if delta.hypot() > self.drag_threshold {
                            session.mode = SessionMode::Drag;
                            log::debug!("Drag started for {:?}", session.owner);
                            SessionAction::BeginDrag {
                                origin: session.initial.origin() + delta,
                            }
                        } else {
                            SessionAction::Pending
                        }
                    }
                    SessionMode::Drag => SessionAction::Move {
                        origin: session.initial.origin() + delta,
                    },
                    SessionMode::Resize => SessionAction::Resize { delta },
                    SessionMode::Idle => SessionAction::Pending,
                };
                let propagation = if action == SessionAction::Pending {
                    Propagation::Propagate
                } else {
                    Propagation::Stop
                };
                Some(CaptureOutcome {
                    routed: Some(Routed {
                        owner: session.owner.clone(),
                        initial: session.initial,
                        action,
                    }),
                    propagation,
                })
            }
            PointerEvent::Up { .. } => {
                let owner = session.owner.clone();
                let initial = session.initial;
                // A release before the threshold is a click, not a drag.
                let persist = mode != SessionMode::DragPending;
                self.release();
                Some(CaptureOutcome {
                    routed: Some(Routed {
                        owner,
                        initial,
                        action: SessionAction::Finish { persist },
                    }),
                    propagation: if persist {
                        Propagation::Stop
                    } else {
                        Propagation::Propagate
                    },
                })
            }
            PointerEvent::Down { .. } => Some(CaptureOutcome {
                routed: None,
                propagation: if mode == SessionMode::DragPending {
                    Propagation::Propagate
                } else {
                    Propagation::Stop
                },
            }),
        }
    }

    /// Push the auto-release deadline a full window past `now`.
    pub fn reset_deadline(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.deadline = now + self.timeout;
        }
    }

    /// Timer tick. When the deadline passed, ends the session and asks the
    /// owner to persist, exactly as a normal release would.
    pub fn poll_deadline(&mut self, now: Instant) -> Option<Routed> {
        let session = self.session.as_ref()?;
        if now < session.deadline {
            return None;
        }
        let routed = Routed {
            owner: session.owner.clone(),
            initial: session.initial,
            action: SessionAction::Finish { persist: true },
        };
        log::warn!(
            "No pointer activity for {:?}, force-releasing {:?}",
            self.timeout,
            routed.owner
        );
        self.release();
        Some(routed)
    }

    /// End the session. Idempotent: unregisters the capture slot at most once
    /// and drops the deadline with the session.
    pub fn release(&mut self) {
        if let Some(session) = self.session.take() {
            self.capture.unregister(session.capture);
            log::debug!("Session released by {:?}", session.owner);
        }
    }

    /// Release only when `widget` holds the session. For owner teardown.
    pub fn release_owner(&mut self, widget: &str) -> bool {
        let owned = self
            .session
            .as_ref()
            .is_some_and(|s| s.owner.widget == widget);
        if owned {
            self.release();
        }
        owned
    }
}
