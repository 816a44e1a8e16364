//! Suppression flag and refresh debounce for store change notifications.

use crate::clock::Clock;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Default debounce window for external changes.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Decides which store notifications lead to a reconcile, and when.
///
/// Writes made by the manager or a widget raise the suppression flag for
/// their duration; notifications seen while it is raised are dropped. Other
/// notifications (re)start the debounce window, and the refresh becomes due
/// once the window elapses without another notification.
///
/// The flag is a plain `Cell`: only valid on a single-threaded event loop.
pub struct ChangeGate {
    suppressed: Cell<bool>,
    due: Cell<Option<Instant>>,
    window: Duration,
    clock: Rc<dyn Clock>,
    ignored: Cell<u64>,
}

impl ChangeGate {
    pub fn new(window: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            suppressed: Cell::new(false),
            due: Cell::new(None),
            window,
            clock,
            ignored: Cell::new(0),
        }
    }

    /// Raise the suppression flag until the guard drops, including on early
    /// return or unwinding.
    pub fn suppress(&self) -> SuppressionGuard<'_> {
        let previous = self.suppressed.replace(true);
        SuppressionGuard {
            gate: self,
            previous,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    /// Store change listener. Returns true when a refresh was scheduled.
    pub fn on_store_changed(&self) -> bool {
        if self.suppressed.get() {
            self.ignored.set(self.ignored.get() + 1);
            return false;
        }
        self.due.set(Some(self.clock.now() + self.window));
        true
    }

    /// Consume a due refresh.
    pub fn take_due(&self, now: Instant) -> bool {
        match self.due.get() {
            Some(due) if now >= due => {
                self.due.set(None);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due.get().is_some()
    }

    /// Drop any scheduled refresh.
    pub fn cancel(&self) {
        self.due.set(None);
    }

    /// Notifications dropped because of suppression.
    pub fn ignored_count(&self) -> u64 {
        self.ignored.get()
    }
}

/// Restores the previous suppression state on drop.
pub struct SuppressionGuard<'a> {
    gate: &'a ChangeGate,
    previous: bool,
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.gate.suppressed.set(self.previous);
    }
}
