//! Deadline timers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::cell::Cell;
use std::rc::Rc;

use super::{Event, TaskContext};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A timer which signals an event once a duration of mode time has elapsed.
#[derive(Debug)]
pub struct Timer {
    name: String,
    ctx: TaskContext,
    armed_id: Option<u64>,
    expired: Rc<Cell<bool>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Timer {
    pub fn new(name: &str, ctx: &TaskContext) -> Self {
        Self {
            name: name.to_string(),
            ctx: ctx.clone(),
            armed_id: None,
            expired: Rc::new(Cell::new(false)),
        }
    }

    /// Arm the timer to signal `event` after `duration_s` seconds.
    ///
    /// The event is cleared when the timer is armed. Re-arming a timer that
    /// is still running replaces the previous deadline without cancelling the
    /// previous event.
    pub fn set(&mut self, duration_s: f64, event: &Event) {
        if let Some(id) = self.armed_id.take() {
            self.ctx.disarm(id);
        }

        event.clear();
        self.expired = Rc::new(Cell::new(false));
        self.armed_id = Some(self.ctx.arm(duration_s, event.clone(), self.expired.clone()));

        trace!(
            "Timer \"{}\" set for {:.3} s at {:.3} s",
            self.name,
            duration_s,
            self.ctx.elapsed_s()
        );
    }

    /// Stop the timer and cancel its event.
    pub fn cancel(&mut self) {
        if let Some(id) = self.armed_id.take() {
            if let Some(event) = self.ctx.disarm(id) {
                event.cancel();
                trace!("Timer \"{}\" canceled", self.name);
            }
        }
    }

    /// True once the timer has expired and signaled its event.
    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }

    /// True while the timer is armed and has not yet expired.
    pub fn is_active(&self) -> bool {
        match self.armed_id {
            Some(id) => self.ctx.is_armed(id),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_timer_uses_loop_clock() {
        let ctx = TaskContext::new();
        let event = Event::new("delay");
        let mut timer = Timer::new("delay", &ctx);

        ctx.tick(1.0);
        timer.set(0.5, &event);
        assert!(timer.is_active());

        ctx.tick(1.2);
        assert!(!event.is_signaled());
        assert!(!timer.is_expired());

        // Wall-clock time has no influence, only ticks
        assert_eq!(ctx.tick(1.5), 1);
        assert!(event.is_signaled());
        assert!(timer.is_expired());
        assert!(!timer.is_active());
        assert_eq!(ctx.num_armed(), 0);
    }

    #[test]
    fn test_timer_cancel() {
        let ctx = TaskContext::new();
        let event = Event::new("delay");
        let mut timer = Timer::new("delay", &ctx);

        timer.set(0.1, &event);
        timer.cancel();
        ctx.tick(1.0);

        assert!(event.is_canceled());
        assert!(!timer.is_expired());
        assert!(!timer.is_active());
    }

    #[test]
    fn test_context_reset_drops_timers() {
        let ctx = TaskContext::new();
        let event = Event::new("delay");
        let mut timer = Timer::new("delay", &ctx);

        ctx.tick(3.0);
        timer.set(1.0, &event);
        ctx.reset();

        assert_eq!(ctx.elapsed_s(), 0.0);
        assert_eq!(ctx.num_armed(), 0);
        ctx.tick(10.0);
        assert!(!event.is_signaled());
    }
}
