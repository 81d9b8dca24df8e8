//! # Drive control library
//!
//! Motion control and autonomous sequencing for a four wheeled ground
//! vehicle. The library is driven from a single fixed-period control loop,
//! nothing in here blocks, spawns threads or performs I/O on the control path.
//!
//! Per-tick ordering, managed by [`robot::Robot`]:
//!
//! 1. Task context clock and timers
//! 2. Drive base odometry
//! 3. Swerve steering loops
//! 4. Active autonomous command
//! 5. PID drive coordinator
//! 6. Mechanisms

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod actuator;
pub mod auto;
pub mod drive_base;
pub mod mechanism;
pub mod params;
pub mod pid;
pub mod pid_drive;
pub mod robot;
pub mod sched;
pub mod sensor;
pub mod sim;
pub mod swerve_module;
pub mod trace;
