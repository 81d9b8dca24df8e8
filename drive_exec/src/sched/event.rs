//! One-shot events

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A one-shot signal.
///
/// `Event` is a handle: clones refer to the same underlying event, so the
/// requester (e.g. the PID drive) and the waiter (a state machine) can each
/// hold one.
#[derive(Clone)]
pub struct Event {
    inner: Rc<RefCell<EventInner>>,
}

struct EventInner {
    name: String,
    state: EventState,
    callbacks: Vec<Box<dyn FnOnce()>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Clear,
    Signaled,
    Canceled,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Event {
    /// Create a new, clear, event.
    pub fn new(name: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EventInner {
                name: name.to_string(),
                state: EventState::Clear,
                callbacks: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn state(&self) -> EventState {
        self.inner.borrow().state
    }

    /// Signal the event.
    ///
    /// Registered callbacks are run once, in registration order, after the
    /// event has been marked as signaled. Signaling an already signaled event
    /// does nothing.
    pub fn signal(&self) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();

            if inner.state == EventState::Signaled {
                return;
            }

            trace!("Event \"{}\" signaled", inner.name);
            inner.state = EventState::Signaled;
            std::mem::take(&mut inner.callbacks)
        };

        // The borrow must be released here, callbacks may query this event
        for cb in callbacks {
            cb();
        }
    }

    /// Reset the event so that it can be signaled again.
    pub fn clear(&self) {
        self.inner.borrow_mut().state = EventState::Clear;
    }

    /// Cancel the event. A canceled event will never satisfy a wait.
    pub fn cancel(&self) {
        let mut inner = self.inner.borrow_mut();
        trace!("Event \"{}\" canceled", inner.name);
        inner.state = EventState::Canceled;
        inner.callbacks.clear();
    }

    pub fn is_signaled(&self) -> bool {
        self.state() == EventState::Signaled
    }

    pub fn is_canceled(&self) -> bool {
        self.state() == EventState::Canceled
    }

    /// Register a callback to be run the next time the event is signaled.
    pub fn add_callback<F: FnOnce() + 'static>(&self, callback: F) {
        self.inner.borrow_mut().callbacks.push(Box::new(callback));
    }

    /// Returns true if both handles refer to the same event.
    pub fn ptr_eq(&self, other: &Event) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Event")
            .field("name", &inner.name)
            .field("state", &inner.state)
            .field("callbacks", &inner.callbacks.len())
            .finish()
    }
}
