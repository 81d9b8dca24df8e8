//! # Mechanism interfaces
//!
//! Subsystems other than the drive base which autonomous routines command:
//! an elevator holding the game object at height and a grabber acquiring
//! and releasing it. Each request takes an optional [`Event`] which is
//! signaled when the request completes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::sched::Event;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A positional lift.
pub trait Elevator {
    /// Move to `height`, signalling `event` on arrival.
    ///
    /// If `timeout_s` is positive the event is signaled after that long even
    /// if the elevator has not arrived.
    fn set_position(&mut self, height: f64, event: Option<&Event>, timeout_s: f64);

    fn get_position(&self) -> f64;

    /// Run the elevator for one tick.
    fn update(&mut self, dt: f64);

    /// Stop moving, dropping any pending request without signalling.
    fn stop(&mut self);
}

/// An object grabber.
pub trait Grabber {
    /// Acquire an object, signalling `event` once it is held.
    fn pick_up(&mut self, event: Option<&Event>);

    /// Run the grabber rollers at `power` for one action, signalling `event`
    /// when done. Negative power ejects the held object.
    fn grab(&mut self, power: f64, event: Option<&Event>);

    fn has_object(&self) -> bool;

    /// Run the grabber for one tick.
    fn update(&mut self, dt: f64);

    /// Stop, dropping any pending request without signalling.
    fn stop(&mut self);
}
