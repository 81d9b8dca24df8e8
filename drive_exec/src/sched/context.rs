//! Task context, owner of the mode clock and armed timers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::Event;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Scheduling context shared by every timer of a mode.
///
/// Time is the control loop's own elapsed-time clock, advanced by
/// [`TaskContext::tick`], so timers are deterministic under simulated or
/// paused time. Clones are handles onto the same context.
#[derive(Clone, Default)]
pub struct TaskContext {
    inner: Rc<RefCell<ContextInner>>,
}

#[derive(Default)]
struct ContextInner {
    /// Seconds since the mode started
    elapsed_s: f64,

    /// Timers waiting to expire
    armed: Vec<ArmedTimer>,

    /// Identifier given to the next armed timer
    next_id: u64,
}

/// Bookkeeping for one armed timer.
struct ArmedTimer {
    id: u64,
    expiry_s: f64,
    event: Event,
    expired: Rc<Cell<bool>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the start of the mode.
    pub fn elapsed_s(&self) -> f64 {
        self.inner.borrow().elapsed_s
    }

    /// Restart the clock and drop all armed timers. Called on mode start.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();

        for t in inner.armed.drain(..) {
            t.event.cancel();
        }
        inner.elapsed_s = 0.0;

        debug!("Task context reset");
    }

    /// Advance the clock to `elapsed_s` and signal every timer that is due.
    ///
    /// Returns the number of timers which expired this tick.
    pub fn tick(&self, elapsed_s: f64) -> usize {
        let due = {
            let mut inner = self.inner.borrow_mut();
            inner.elapsed_s = elapsed_s;

            let (due, pending): (Vec<_>, Vec<_>) = inner
                .armed
                .drain(..)
                .partition(|t| t.expiry_s <= elapsed_s);
            inner.armed = pending;
            due
        };

        // Events are signaled with the context released so that callbacks
        // may arm new timers
        for t in due.iter() {
            trace!("Timer {} expired at {:.3} s", t.id, elapsed_s);
            t.expired.set(true);
            t.event.signal();
        }

        due.len()
    }

    /// Number of timers currently armed.
    pub fn num_armed(&self) -> usize {
        self.inner.borrow().armed.len()
    }

    /// Arm a timer which expires `duration_s` after the current time.
    pub(crate) fn arm(&self, duration_s: f64, event: Event, expired: Rc<Cell<bool>>) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;

        let expiry_s = inner.elapsed_s + duration_s.max(0.0);
        inner.armed.push(ArmedTimer {
            id,
            expiry_s,
            event,
            expired,
        });

        id
    }

    /// Disarm a timer, returning its event if it was still armed.
    pub(crate) fn disarm(&self, id: u64) -> Option<Event> {
        let mut inner = self.inner.borrow_mut();
        let idx = inner.armed.iter().position(|t| t.id == id)?;
        Some(inner.armed.remove(idx).event)
    }

    pub(crate) fn is_armed(&self, id: u64) -> bool {
        self.inner.borrow().armed.iter().any(|t| t.id == id)
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TaskContext")
            .field("elapsed_s", &inner.elapsed_s)
            .field("num_armed", &inner.armed.len())
            .finish()
    }
}
