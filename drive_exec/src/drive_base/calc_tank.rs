//! Tank (differential) calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::normalize_in_place;

use super::{DriveKinematics, PoseDelta, LF, LR, NUM_WHEELS, RF, RR};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveKinematics {
    /// Arcade mix of a drive and turn command into left/right powers.
    pub(crate) fn tank_wheel_powers(drive: f64, turn: f64) -> [f64; NUM_WHEELS] {
        let mut lr = [drive + turn, drive - turn];
        normalize_in_place(&mut lr);

        let mut powers = [0.0; NUM_WHEELS];
        powers[LF] = lr[0];
        powers[LR] = lr[0];
        powers[RF] = lr[1];
        powers[RR] = lr[1];

        powers
    }

    /// Forward motion is the mean of both sides, rotation their half
    /// difference. A tank base cannot move sideways.
    pub(crate) fn tank_odometry(d: &[f64; NUM_WHEELS]) -> PoseDelta {
        let left = (d[LF] + d[LR]) / 2.0;
        let right = (d[RF] + d[RR]) / 2.0;

        PoseDelta {
            x: 0.0,
            y: (left + right) / 2.0,
            rot: (left - right) / 2.0,
        }
    }
}
