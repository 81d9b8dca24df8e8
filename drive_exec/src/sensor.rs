//! # Sensor interfaces
//!
//! Read-only inputs consumed by the drive code: a heading sensor and a vision
//! target detector.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A detected target, relative to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetInfo {
    /// Bearing of the target, positive to the right.
    ///
    /// Units: degrees
    pub angle_deg: f64,

    /// Lateral offset of the target, positive to the right.
    pub lateral_offset: f64,

    /// Forward distance to the target.
    pub forward_offset: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A heading sensor such as a gyroscope.
pub trait HeadingSensor {
    /// Continuous (not wrapped) heading, positive clockwise.
    ///
    /// Units: degrees
    fn get_heading(&self) -> f64;

    /// Rate of change of heading.
    ///
    /// Units: degrees/second
    fn get_turn_rate(&self) -> f64;
}

/// A vision target detector.
pub trait TargetDetector {
    /// Sample the detector, `None` if no target is visible.
    ///
    /// Consumers call this at most once per tick.
    fn get_target_info(&mut self) -> Option<TargetInfo>;
}
