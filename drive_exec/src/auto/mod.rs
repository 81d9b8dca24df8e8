//! # Autonomous commands
//!
//! An autonomous routine is a [`RobotCommand`], usually a single
//! [`StateMachine`](crate::sched::StateMachine) whose states each issue one
//! asynchronous request (a PID drive move, a mechanism action, a timer) and
//! arm a wait on that request's event. The [`AutoMode`] runs the command once
//! per tick between the two halves of the robot tick.
//!
//! Available commands:
//!
//! - [`CmdScoringAuto`] - picks up an object, drives to a scoring target and
//!   deposits it.
//! - [`CmdStrafeUntilTarget`] - strafes sideways until the target detector
//!   sees a target straight ahead.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd_scoring_auto;
mod cmd_strafe_until_target;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{error, info, warn};

use crate::drive_base::DriveBaseError;
use crate::pid_drive::PidDriveError;
use crate::robot::Robot;

pub use cmd_scoring_auto::*;
pub use cmd_strafe_until_target::*;
pub use params::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An autonomous command run once per control tick.
pub trait RobotCommand {
    /// Name used in logs and traces.
    fn name(&self) -> &str;

    /// Run one tick of the command. Returns `true` once the command is done.
    fn cmd_periodic(&mut self, robot: &mut Robot, elapsed_s: f64) -> Result<bool, AutoError>;

    /// True until the command has finished or been cancelled.
    fn is_running(&self) -> bool;

    /// Stop the command and whatever it has requested of the robot.
    fn cancel(&mut self, robot: &mut Robot);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs one autonomous command for the duration of a mode.
pub struct AutoMode {
    command: Option<Box<dyn RobotCommand>>,

    done: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors from autonomous commands.
#[derive(Debug, thiserror::Error)]
pub enum AutoError {
    #[error("Invalid game data \"{0}\", expected at least two of 'L' or 'R'")]
    InvalidGameData(String),

    #[error("PID drive error: {0}")]
    PidDrive(#[from] PidDriveError),

    #[error("Drive base error: {0}")]
    DriveBase(#[from] DriveBaseError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutoMode {
    /// Start a new mode running `command`.
    ///
    /// Restarts the robot's clock and odometry, and refuses manual drive
    /// until the mode is stopped.
    pub fn start(robot: &mut Robot, command: Box<dyn RobotCommand>) -> Self {
        robot.start_mode();
        robot.set_autonomous_active(true);

        info!("Autonomous mode started with {}", command.name());

        Self {
            command: Some(command),
            done: false,
        }
    }

    /// Run one full control tick at mode time `elapsed_s`.
    ///
    /// Errors never end the mode. A failing command is logged and cancelled,
    /// a failing PID drive update cancels the move.
    pub fn periodic(&mut self, robot: &mut Robot, elapsed_s: f64) -> bool {
        robot.pre_periodic(elapsed_s);

        if let Some(mut cmd) = self.command.take() {
            match cmd.cmd_periodic(robot, elapsed_s) {
                Ok(true) => {
                    if !self.done {
                        info!("{} done at {:.3} s", cmd.name(), elapsed_s);
                    }
                    self.done = true;
                    self.command = Some(cmd);
                }
                Ok(false) => self.command = Some(cmd),
                Err(e) => {
                    error!("{} failed: {}", cmd.name(), e);
                    cmd.cancel(robot);
                    self.done = true;
                }
            }
        }

        if let Err(e) = robot.post_periodic() {
            warn!("Tick error at {:.3} s: {}", elapsed_s, e);
            robot.pid_drive.cancel(&mut robot.drive_base);
        }

        self.done
    }

    /// True once the command has finished, failed or been removed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Name of the running command.
    pub fn command_name(&self) -> Option<&str> {
        self.command.as_ref().map(|c| c.name())
    }

    /// End the mode, cancelling the command if it is still running.
    pub fn stop(mut self, robot: &mut Robot) {
        if let Some(mut cmd) = self.command.take() {
            if cmd.is_running() {
                cmd.cancel(robot);
            }
        }

        robot.stop_mode();
        info!("Autonomous mode stopped");
    }
}
