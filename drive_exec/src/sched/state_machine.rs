//! Explicit-transition state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::fmt::Debug;

use super::Event;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A state machine over a caller-defined set of states.
///
/// Transitions are either immediate ([`StateMachine::set_state`]) or deferred
/// until one or more events are signaled ([`StateMachine::wait_for_event`]).
/// The owner polls [`StateMachine::check_ready_and_get_state`] once per tick
/// and runs the returned state, if any.
#[derive(Debug)]
pub struct StateMachine<S> {
    name: String,
    state: Option<S>,
    enabled: bool,
    pending: Option<PendingTransition<S>>,
}

/// A transition armed by a wait.
#[derive(Debug)]
struct PendingTransition<S> {
    events: Vec<Event>,
    next: S,
    wait_for_all: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S> StateMachine<S>
where
    S: Copy + Eq + Debug,
{
    /// Create a new, disabled, state machine.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: None,
            enabled: false,
            pending: None,
        }
    }

    /// Enable the machine in the given state.
    pub fn start(&mut self, initial: S) {
        debug!("[{}] Started in {:?}", self.name, initial);
        self.state = Some(initial);
        self.enabled = true;
        self.pending = None;
    }

    /// Disable the machine. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.enabled {
            debug!("[{}] Stopped in {:?}", self.name, self.state);
        }
        self.enabled = false;
        self.pending = None;
        self.state = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The current state, `None` if the machine is disabled.
    pub fn get_state(&self) -> Option<S> {
        if self.enabled {
            self.state
        } else {
            None
        }
    }

    /// Transition to `next` unconditionally, dropping any armed wait.
    pub fn set_state(&mut self, next: S) {
        debug!("[{}] {:?} -> {:?}", self.name, self.state, next);
        self.state = Some(next);
        self.pending = None;
    }

    /// Arm a transition to `next` which fires once `event` is signaled.
    pub fn wait_for_event(&mut self, event: &Event, next: S) {
        self.wait_for_events(&[event.clone()], next, false);
    }

    /// Arm a transition to `next` which fires once any (or, when
    /// `wait_for_all` is set, every) event is signaled.
    ///
    /// The events are not cleared here, the request that owns each event is
    /// responsible for clearing it when it is accepted.
    pub fn wait_for_events(&mut self, events: &[Event], next: S, wait_for_all: bool) {
        self.pending = Some(PendingTransition {
            events: events.to_vec(),
            next,
            wait_for_all,
        });
    }

    /// Returns true if the machine should run its current state this tick.
    ///
    /// If a wait is armed and has been satisfied the machine advances to the
    /// armed state and the events are cleared.
    pub fn is_ready(&mut self) -> bool {
        if !self.enabled {
            return false;
        }

        let satisfied = match self.pending {
            None => return true,
            Some(ref p) => {
                if p.wait_for_all {
                    p.events.iter().all(Event::is_signaled)
                } else {
                    p.events.iter().any(Event::is_signaled)
                }
            }
        };

        if !satisfied {
            return false;
        }

        if let Some(p) = self.pending.take() {
            for e in p.events.iter() {
                e.clear();
            }
            debug!("[{}] {:?} -> {:?} (on event)", self.name, self.state, p.next);
            self.state = Some(p.next);
        }

        true
    }

    /// Returns the state to run this tick, or `None` if the machine is
    /// disabled or waiting.
    pub fn check_ready_and_get_state(&mut self) -> Option<S> {
        if self.is_ready() {
            self.state
        } else {
            None
        }
    }

    /// True if a wait is armed and unsatisfied.
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }
}
