//! Simulated mechanisms

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::mechanism::{Elevator, Grabber};
use crate::sched::Event;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated mechanisms.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimMechParams {
    /// Elevator travel speed, in height units per second
    pub elevator_rate: f64,

    /// Time taken to acquire an object
    pub pick_up_time_s: f64,

    /// Time taken by one grab action
    pub grab_time_s: f64,
}

/// An elevator moving at a constant rate toward its target.
#[derive(Debug, Clone)]
pub struct SimElevator {
    state: Rc<RefCell<ElevatorState>>,
}

#[derive(Debug)]
struct ElevatorState {
    rate: f64,
    position: f64,
    target: Option<f64>,
    event: Option<Event>,
    timeout_remaining_s: Option<f64>,
}

/// A grabber whose actions take a fixed time.
#[derive(Debug, Clone)]
pub struct SimGrabber {
    state: Rc<RefCell<GrabberState>>,
}

#[derive(Debug)]
struct GrabberState {
    pick_up_time_s: f64,
    grab_time_s: f64,
    has_object: bool,
    action: Option<GrabAction>,
}

#[derive(Debug)]
struct GrabAction {
    power: f64,
    remaining_s: f64,
    event: Option<Event>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimMechParams {
    fn default() -> Self {
        Self {
            elevator_rate: 40.0,
            pick_up_time_s: 0.5,
            grab_time_s: 0.5,
        }
    }
}

impl SimElevator {
    pub fn new(params: &SimMechParams) -> Self {
        Self {
            state: Rc::new(RefCell::new(ElevatorState {
                rate: params.elevator_rate,
                position: 0.0,
                target: None,
                event: None,
                timeout_remaining_s: None,
            })),
        }
    }

    pub fn is_moving(&self) -> bool {
        self.state.borrow().target.is_some()
    }
}

impl Elevator for SimElevator {
    fn set_position(&mut self, height: f64, event: Option<&Event>, timeout_s: f64) {
        if let Some(e) = event {
            e.clear();
        }

        let mut s = self.state.borrow_mut();
        s.target = Some(height);
        s.event = event.cloned();
        s.timeout_remaining_s = if timeout_s > 0.0 {
            Some(timeout_s)
        } else {
            None
        };
    }

    fn get_position(&self) -> f64 {
        self.state.borrow().position
    }

    fn update(&mut self, dt: f64) {
        let event = {
            let mut s = self.state.borrow_mut();

            let target = match s.target {
                Some(t) => t,
                None => return,
            };

            let step = s.rate * dt;
            let remaining = target - s.position;
            let arrived = remaining.abs() <= step;
            s.position = if arrived {
                target
            } else {
                s.position + step.copysign(remaining)
            };

            let timed_out = match s.timeout_remaining_s {
                Some(ref mut t) => {
                    *t -= dt;
                    *t <= 0.0
                }
                None => false,
            };

            if arrived || timed_out {
                debug!("Elevator done at {:.2} (timed out: {})", s.position, timed_out);
                s.target = None;
                s.timeout_remaining_s = None;
                s.event.take()
            } else {
                None
            }
        };

        if let Some(e) = event {
            e.signal();
        }
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.target = None;
        s.event = None;
        s.timeout_remaining_s = None;
    }
}

impl SimGrabber {
    pub fn new(params: &SimMechParams) -> Self {
        Self {
            state: Rc::new(RefCell::new(GrabberState {
                pick_up_time_s: params.pick_up_time_s,
                grab_time_s: params.grab_time_s,
                has_object: false,
                action: None,
            })),
        }
    }

    /// Power of the running action, zero when idle.
    pub fn power(&self) -> f64 {
        self.state.borrow().action.as_ref().map(|a| a.power).unwrap_or(0.0)
    }
}

impl Grabber for SimGrabber {
    fn pick_up(&mut self, event: Option<&Event>) {
        if let Some(e) = event {
            e.clear();
        }

        let mut s = self.state.borrow_mut();
        s.action = Some(GrabAction {
            power: 1.0,
            remaining_s: s.pick_up_time_s,
            event: event.cloned(),
        });
    }

    fn grab(&mut self, power: f64, event: Option<&Event>) {
        if let Some(e) = event {
            e.clear();
        }

        let mut s = self.state.borrow_mut();
        s.action = Some(GrabAction {
            power,
            remaining_s: s.grab_time_s,
            event: event.cloned(),
        });
    }

    fn has_object(&self) -> bool {
        self.state.borrow().has_object
    }

    fn update(&mut self, dt: f64) {
        let event = {
            let mut s = self.state.borrow_mut();

            let finished = match s.action {
                Some(ref mut a) => {
                    a.remaining_s -= dt;
                    a.remaining_s <= 0.0
                }
                None => false,
            };

            if !finished {
                return;
            }

            match s.action.take() {
                Some(a) => {
                    s.has_object = a.power > 0.0;
                    debug!("Grabber action done, holding object: {}", s.has_object);
                    a.event
                }
                None => None,
            }
        };

        if let Some(e) = event {
            e.signal();
        }
    }

    fn stop(&mut self) {
        self.state.borrow_mut().action = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_elevator_reaches_target() {
        let mut elevator = SimElevator::new(&SimMechParams {
            elevator_rate: 10.0,
            ..Default::default()
        });
        let event = Event::new("elevator");

        elevator.set_position(5.0, Some(&event), 0.0);
        for _ in 0..4 {
            elevator.update(0.1);
        }
        assert!(!event.is_signaled());
        assert!((elevator.get_position() - 4.0).abs() < 1e-9);

        for _ in 0..2 {
            elevator.update(0.1);
        }
        assert!(event.is_signaled());
        assert_eq!(elevator.get_position(), 5.0);
        assert!(!elevator.is_moving());
    }

    #[test]
    fn test_elevator_timeout() {
        let mut elevator = SimElevator::new(&SimMechParams {
            elevator_rate: 1.0,
            ..Default::default()
        });
        let event = Event::new("elevator");

        elevator.set_position(100.0, Some(&event), 0.25);
        elevator.update(0.1);
        elevator.update(0.1);
        assert!(!event.is_signaled());
        elevator.update(0.1);
        assert!(event.is_signaled());
    }

    #[test]
    fn test_grabber_pick_up_and_eject() {
        let mut grabber = SimGrabber::new(&SimMechParams::default());
        let event = Event::new("grabber");

        grabber.pick_up(Some(&event));
        grabber.update(0.3);
        assert!(!event.is_signaled());
        grabber.update(0.3);
        assert!(event.is_signaled());
        assert!(grabber.has_object());

        grabber.grab(-0.5, Some(&event));
        assert!(!event.is_signaled());
        grabber.update(0.6);
        assert!(event.is_signaled());
        assert!(!grabber.has_object());
    }
}
