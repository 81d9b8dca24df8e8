//! Mecanum calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::normalize_in_place;

use super::{DriveKinematics, PoseDelta, LF, LR, NUM_WHEELS, RF, RR};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveKinematics {
    /// Mecanum wheel powers for a robot-frame command.
    pub(crate) fn mecanum_wheel_powers(x: f64, y: f64, rot: f64) -> [f64; NUM_WHEELS] {
        let mut powers = [0.0; NUM_WHEELS];
        powers[LF] = x + y + rot;
        powers[RF] = -x + y - rot;
        powers[LR] = -x + y + rot;
        powers[RR] = x + y - rot;

        normalize_in_place(&mut powers);
        powers
    }

    /// Mecanum odometry.
    ///
    /// Sideways motion only shows up through the cross coupling of the
    /// rollers, so X is the difference of the two diagonals.
    pub(crate) fn mecanum_odometry(d: &[f64; NUM_WHEELS]) -> PoseDelta {
        PoseDelta {
            x: ((d[LF] + d[RR]) - (d[RF] + d[LR])) / 4.0,
            y: (d[LF] + d[RF] + d[LR] + d[RR]) / 4.0,
            rot: ((d[LF] + d[LR]) - (d[RF] + d[RR])) / 4.0,
        }
    }
}
