//! Simulated sensors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::sensor::{HeadingSensor, TargetDetector, TargetInfo};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A gyro whose heading and rate are set by the test or simulation.
#[derive(Debug, Clone, Default)]
pub struct SimGyro {
    heading: Rc<Cell<f64>>,
    rate: Rc<Cell<f64>>,
}

/// A target detector returning whatever target it was last given.
#[derive(Debug, Clone, Default)]
pub struct SimTargetDetector {
    target: Rc<RefCell<Option<TargetInfo>>>,
    num_reads: Rc<Cell<usize>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimGyro {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_heading(&self, heading_deg: f64) {
        self.heading.set(heading_deg);
    }

    pub fn set_turn_rate(&self, rate_degs: f64) {
        self.rate.set(rate_degs);
    }

    /// Integrate the turn rate over `dt` seconds.
    pub fn step(&self, dt: f64) {
        self.heading.set(self.heading.get() + self.rate.get() * dt);
    }
}

impl HeadingSensor for SimGyro {
    fn get_heading(&self) -> f64 {
        self.heading.get()
    }

    fn get_turn_rate(&self) -> f64 {
        self.rate.get()
    }
}

impl SimTargetDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&self, target: Option<TargetInfo>) {
        *self.target.borrow_mut() = target;
    }

    /// Number of times the detector has been sampled.
    pub fn num_reads(&self) -> usize {
        self.num_reads.get()
    }
}

impl TargetDetector for SimTargetDetector {
    fn get_target_info(&mut self) -> Option<TargetInfo> {
        self.num_reads.set(self.num_reads.get() + 1);
        *self.target.borrow()
    }
}
