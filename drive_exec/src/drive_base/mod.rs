//! # Drive base
//!
//! Owns the four wheels of the robot, turns commanded `(x, y, rotation)`
//! vectors into per-wheel outputs and integrates odometry once per tick.
//!
//! The kinematic model (tank, mecanum or swerve) is chosen at construction
//! and kept in [`DriveKinematics`], whose wheel output and odometry functions
//! are pure.
//!
//! # Conventions
//!
//! - `x` is positive to the right, `y` positive forward.
//! - Heading and rotation are in degrees, positive clockwise.
//! - Wheels are ordered left front, right front, left rear, right rear.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_mecanum;
mod calc_swerve;
mod calc_tank;
mod kinematics;
mod odometry;
mod params;
mod power_mapper;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use kinematics::*;
pub use odometry::*;
pub use params::*;
pub use power_mapper::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of wheels on the drive base.
pub const NUM_WHEELS: usize = 4;

/// Index of the left front wheel.
pub const LF: usize = 0;

/// Index of the right front wheel.
pub const RF: usize = 1;

/// Index of the left rear wheel.
pub const LR: usize = 2;

/// Index of the right rear wheel.
pub const RR: usize = 3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveBase operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveBaseError {
    #[error("Holonomic drive is not supported by a tank drive base")]
    NotHolonomic,

    #[error("Steering commands are only supported by a swerve drive base")]
    NotSwerve,

    #[error("The wheel set does not match the kinematics, expected {expected} wheels")]
    WheelSetMismatch { expected: &'static str },

    #[error("Invalid swerve geometry: width = {width}, length = {length}")]
    InvalidGeometry { width: f64, length: f64 },
}
