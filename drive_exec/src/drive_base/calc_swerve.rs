//! Swerve calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use util::maths::{modulo_360, normalize_in_place};

use super::{DriveKinematics, PoseDelta, SwerveGeometry, WheelCommands, LF, LR, NUM_WHEELS, RF, RR};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveGeometry {
    /// Position of each module relative to the centre of the base.
    pub fn module_positions(&self) -> [Vector2<f64>; NUM_WHEELS] {
        let hw = self.width / 2.0;
        let hl = self.length / 2.0;

        let mut pos = [Vector2::zeros(); NUM_WHEELS];
        pos[LF] = Vector2::new(-hw, hl);
        pos[RF] = Vector2::new(hw, hl);
        pos[LR] = Vector2::new(-hw, -hl);
        pos[RR] = Vector2::new(hw, -hl);

        pos
    }

    /// Unit direction each module travels in during a clockwise turn in place.
    pub fn turn_tangents(&self) -> [Vector2<f64>; NUM_WHEELS] {
        let mut tangents = [Vector2::zeros(); NUM_WHEELS];

        for (t, p) in tangents.iter_mut().zip(self.module_positions().iter()) {
            *t = Vector2::new(p.y, -p.x).normalize();
        }

        tangents
    }
}

impl DriveKinematics {
    /// Swerve wheel outputs for a robot-frame command.
    ///
    /// Angles are measured from forward, positive clockwise.
    pub(crate) fn swerve_wheel_outputs(g: &SwerveGeometry, x: f64, y: f64, rot: f64) -> WheelCommands {
        if x == 0.0 && y == 0.0 && rot == 0.0 {
            return WheelCommands {
                powers: [0.0; NUM_WHEELS],
                steer_angles_deg: None,
            };
        }

        let a = x - rot * (g.length / g.diagonal);
        let b = x + rot * (g.length / g.diagonal);
        let c = y - rot * (g.width / g.diagonal);
        let d = y + rot * (g.width / g.diagonal);

        let mut pairs = [(0.0, 0.0); NUM_WHEELS];
        pairs[LF] = (b, d);
        pairs[RF] = (b, c);
        pairs[LR] = (a, d);
        pairs[RR] = (a, c);

        let mut powers = [0.0; NUM_WHEELS];
        let mut angles = [0.0; NUM_WHEELS];
        for (i, (sx, sy)) in pairs.iter().enumerate() {
            powers[i] = sx.hypot(*sy);
            angles[i] = modulo_360(sx.atan2(*sy).to_degrees());
        }
        normalize_in_place(&mut powers);

        WheelCommands {
            powers,
            steer_angles_deg: Some(angles),
        }
    }

    /// Swerve odometry.
    ///
    /// Each module's displacement is a vector along its steering angle.
    /// Translation is the mean of these vectors, rotation the mean of their
    /// projections onto the turn-in-place tangents. Both are exact for any
    /// rigid body motion of the base over the tick.
    pub(crate) fn swerve_odometry(
        g: &SwerveGeometry,
        distances: &[f64; NUM_WHEELS],
        angles_deg: &[f64; NUM_WHEELS],
    ) -> PoseDelta {
        let tangents = g.turn_tangents();

        let mut translation = Vector2::zeros();
        let mut rot = 0.0;

        for i in 0..NUM_WHEELS {
            let theta = angles_deg[i].to_radians();
            let disp = Vector2::new(theta.sin(), theta.cos()) * distances[i];

            translation += disp;
            rot += disp.dot(&tangents[i]);
        }

        let n = NUM_WHEELS as f64;
        PoseDelta {
            x: translation.x / n,
            y: translation.y / n,
            rot: rot / n,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn square() -> SwerveGeometry {
        SwerveGeometry {
            width: 2.0,
            length: 2.0,
            diagonal: 8f64.sqrt(),
        }
    }

    fn rect() -> SwerveGeometry {
        SwerveGeometry {
            width: 3.0,
            length: 4.0,
            diagonal: 5.0,
        }
    }

    #[test]
    fn test_translation_gives_equal_angles() {
        for g in [square(), rect()].iter() {
            let cmd = DriveKinematics::swerve_wheel_outputs(g, 0.3, -0.5, 0.0);
            let angles = cmd.steer_angles_deg.unwrap();

            for a in angles.iter() {
                assert!((a - angles[0]).abs() < 1e-9);
            }
            for p in cmd.powers.iter() {
                assert!((p - cmd.powers[0]).abs() < 1e-12);
            }

            let expected = modulo_360(0.3f64.atan2(-0.5).to_degrees());
            assert!((angles[0] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_turn_in_place_diamond() {
        let cmd = DriveKinematics::swerve_wheel_outputs(&square(), 0.0, 0.0, 0.7);
        let angles = cmd.steer_angles_deg.unwrap();

        let expected = [45.0, 135.0, 315.0, 225.0];
        for (a, e) in angles.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-9, "{:?}", angles);
        }
        for p in cmd.powers.iter() {
            assert!((p - cmd.powers[0]).abs() < 1e-12);
            assert!((p - 0.7).abs() < 1e-12);
        }

        // Counter-clockwise mirrors the diamond and keeps the magnitudes equal
        let cmd = DriveKinematics::swerve_wheel_outputs(&rect(), 0.0, 0.0, -1.0);
        let angles = cmd.steer_angles_deg.unwrap();
        let tangents = rect().turn_tangents();
        for i in 0..NUM_WHEELS {
            let expected = modulo_360((-tangents[i].x).atan2(-tangents[i].y).to_degrees());
            assert!((angles[i] - expected).abs() < 1e-9);
            assert!((cmd.powers[i] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_command_keeps_angles() {
        let cmd = DriveKinematics::swerve_wheel_outputs(&square(), 0.0, 0.0, 0.0);
        assert_eq!(cmd.steer_angles_deg, None);
        assert_eq!(cmd.powers, [0.0; NUM_WHEELS]);
    }

    #[test]
    fn test_odometry_translation_and_rotation() {
        let g = rect();

        // All modules at 30 degrees travelling 2 units
        let d = DriveKinematics::swerve_odometry(&g, &[2.0; 4], &[30.0; 4]);
        assert!((d.x - 1.0).abs() < 1e-9);
        assert!((d.y - 3f64.sqrt()).abs() < 1e-9);
        assert!(d.rot.abs() < 1e-9);

        // Modules on the turn tangents travelling 1 unit each
        let cmd = DriveKinematics::swerve_wheel_outputs(&g, 0.0, 0.0, 1.0);
        let d = DriveKinematics::swerve_odometry(&g, &[1.0; 4], &cmd.steer_angles_deg.unwrap());
        assert!(d.x.abs() < 1e-9);
        assert!(d.y.abs() < 1e-9);
        assert!((d.rot - 1.0).abs() < 1e-9);
    }
}
