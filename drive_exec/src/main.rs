//! Drive executable entry point.
//!
//! Runs one autonomous routine on a simulated rig in a fixed-period control
//! loop and saves a summary of the run into the session directory.
//!
//! # Architecture
//!
//! - Initialise the session, logging and parameters
//! - Build the simulated rig and the robot on top of it
//! - Main loop, once per cycle:
//!     - Advance the simulated devices
//!     - Run the robot tick and the routine through the autonomous mode
//! - Stop the mode and save the summary

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use drive_lib::{
    auto::{AutoMode, AutoParams, CmdScoringAuto, CmdStrafeUntilTarget, RobotCommand},
    drive_base::{DriveBaseParams, Pose},
    params::DriveExecParams,
    pid::PidParams,
    pid_drive::PidDriveParams,
    sensor::TargetInfo,
    sim::SimRig,
    trace::{ArchiveTraceSink, LogTraceSink, TraceSink},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "drive_exec", about = "Run an autonomous routine on the simulated rig")]
struct Opt {
    /// Override the game data from the parameters, for example "LRL".
    #[structopt(long)]
    game_data: Option<String>,

    /// Hold each cycle to the configured period instead of running as fast
    /// as possible.
    #[structopt(long)]
    realtime: bool,

    /// Log at trace level.
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    routine: Routine,
}

#[derive(Debug, StructOpt)]
enum Routine {
    /// Pick up an object and score it on the switch or the scale.
    #[structopt(name = "score")]
    Score,

    /// Strafe until a target is straight ahead.
    #[structopt(name = "strafe")]
    Strafe {
        /// Strafe left rather than right.
        #[structopt(long)]
        left: bool,

        /// Give up after moving this far sideways.
        #[structopt(long, default_value = "120")]
        max_distance: f64,

        /// Lateral distance at which the simulated target comes into view.
        #[structopt(long)]
        target_at: Option<f64>,
    },
}

/// Summary of a run, saved as `summary.json`.
#[derive(Debug, Serialize)]
struct RunSummary {
    routine: String,
    completed: bool,
    elapsed_s: f64,
    num_cycles: u64,
    final_pose: Pose,
    elevator_height: f64,
    holding_object: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    let level = if opt.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Drive Executable\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().wrap_err("Failed to get the software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: DriveExecParams =
        util::params::load("drive_exec.toml").wrap_err("Could not load exec params")?;
    let drive_params: DriveBaseParams =
        util::params::load("drive_base.toml").wrap_err("Could not load drive base params")?;
    let steer_params: PidParams =
        util::params::load("swerve.toml").wrap_err("Could not load swerve params")?;
    let pid_drive_params: PidDriveParams =
        util::params::load("pid_drive.toml").wrap_err("Could not load PID drive params")?;
    let mut auto_params: AutoParams =
        util::params::load("auto.toml").wrap_err("Could not load auto params")?;

    if let Some(game_data) = opt.game_data {
        auto_params.game_data = game_data;
    }

    info!("Parameters loaded");

    // ---- INITIALISE ROBOT ----

    let rig = SimRig::new(&exec_params.sim);

    let trace: Box<dyn TraceSink> = if exec_params.archive_trace {
        Box::new(ArchiveTraceSink::new(&session).wrap_err("Failed to create the trace archive")?)
    } else {
        Box::new(LogTraceSink)
    };

    let mut robot = rig
        .robot(&drive_params, &steer_params, &pid_drive_params, trace)
        .wrap_err("Failed to build the robot")?;

    info!("Robot initialised: {:?}", robot.drive_base);

    let (command, target_at): (Box<dyn RobotCommand>, Option<f64>) = match opt.routine {
        Routine::Score => (
            Box::new(
                CmdScoringAuto::new(&robot, &auto_params)
                    .wrap_err("Failed to create the scoring routine")?,
            ),
            None,
        ),
        Routine::Strafe {
            left,
            max_distance,
            target_at,
        } => {
            let mut cmd = CmdStrafeUntilTarget::new(&auto_params.strafe);
            cmd.start_with_trigger(
                &robot,
                !left,
                Box::new(move |_t, dx, _dy| dx.abs() >= max_distance),
            );
            (Box::new(cmd), target_at)
        }
    };
    let routine = command.name().to_string();

    // ---- MAIN LOOP ----

    let period = exec_params.cycle_period_s;
    let mut mode = AutoMode::start(&mut robot, command);
    let mut elapsed_s = 0.0;
    let mut num_cycles = 0u64;

    info!("Beginning main loop with {}\n", routine);

    while elapsed_s < exec_params.mode_duration_s {
        let cycle_start = Instant::now();

        rig.step(period);
        elapsed_s += period;
        num_cycles += 1;

        if let Some(x) = target_at {
            if robot.drive_base.get_x_position().abs() >= x {
                rig.detector.set_target(Some(TargetInfo {
                    angle_deg: 0.0,
                    lateral_offset: 0.0,
                    forward_offset: 24.0,
                }));
            }
        }

        if mode.periodic(&mut robot, elapsed_s) {
            break;
        }

        if opt.realtime {
            let cycle_dur = Instant::now() - cycle_start;
            match Duration::from_secs_f64(period).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.6} s",
                    cycle_dur.as_secs_f64() - period
                ),
            }
        }
    }

    let completed = mode.is_done();
    if !completed {
        warn!("{} did not complete within {:.1} s", routine, exec_params.mode_duration_s);
    }
    mode.stop(&mut robot);

    // ---- SUMMARY ----

    let summary = RunSummary {
        routine,
        completed,
        elapsed_s,
        num_cycles,
        final_pose: robot.drive_base.get_pose(),
        elevator_height: robot.elevator.get_position(),
        holding_object: robot.grabber.has_object(),
    };
    info!("Run summary: {:#?}", summary);

    session
        .save_json("summary.json", &summary)
        .wrap_err("Failed to save the run summary")?;

    info!("End of execution");

    Ok(())
}
