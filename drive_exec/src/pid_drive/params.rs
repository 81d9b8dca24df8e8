//! Parameters for PidDrive

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::pid::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the PID drive coordinator.
///
/// An axis with no parameters is not controlled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PidDriveParams {
    /// Lateral position loop
    #[serde(default)]
    pub x: Option<PidParams>,

    /// Longitudinal position loop
    #[serde(default)]
    pub y: Option<PidParams>,

    /// Heading loop
    #[serde(default)]
    pub turn: Option<PidParams>,

    /// Time the combined output may stay below the threshold without
    /// reaching the target before the move is considered stalled. Zero
    /// disables stall detection.
    ///
    /// Units: seconds
    #[serde(default)]
    pub stall_timeout_s: f64,

    /// Output magnitude below which the robot is considered to be stalling.
    #[serde(default)]
    pub stall_threshold: f64,
}
