//! # Drive executable parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::sim::SimRigParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DriveExecParams {
    /// Period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Length of the autonomous mode, the routine is stopped if it is still
    /// running at the end.
    ///
    /// Units: seconds
    pub mode_duration_s: f64,

    /// Write sequencer and PID traces to CSV files in the session archive
    /// rather than to the log.
    #[serde(default)]
    pub archive_trace: bool,

    /// The simulated rig the executable drives.
    #[serde(default)]
    pub sim: SimRigParams,
}

impl Default for DriveExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            mode_duration_s: 15.0,
            archive_trace: false,
            sim: SimRigParams::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_with_defaults() {
        let params: DriveExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.01
            mode_duration_s = 20.0

            [sim]
            wheel_full_speed = 120.0
            "#,
        )
        .unwrap();

        assert_eq!(params.cycle_period_s, 0.01);
        assert!(!params.archive_trace);
        assert_eq!(params.sim.wheel_full_speed, 120.0);
        assert_eq!(params.sim.steer_full_speed, 360.0);
        assert_eq!(params.sim.mech.pick_up_time_s, 0.5);
    }

    #[test]
    fn test_load_shipped_params() {
        let params: DriveExecParams =
            util::params::from_str(include_str!("../../params/drive_exec.toml")).unwrap();

        assert_eq!(params.cycle_period_s, 0.02);
        assert!(params.archive_trace);
    }
}
