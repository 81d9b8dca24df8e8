//! Drive base state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use util::maths::{clip_unit, normalize_in_place};

use super::{
    DriveBaseError, DriveBaseParams, DriveKinematics, GyroAssistParams, GyroReading,
    MotorPowerMapper, Odometry, OdometryScales, Pose, TorqueCurveMapper, WheelSample, NUM_WHEELS,
};
use crate::actuator::Actuator;
use crate::sensor::HeadingSensor;
use crate::swerve_module::SwerveModule;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A four wheeled drive base.
pub struct DriveBase {
    kinematics: DriveKinematics,

    wheels: WheelSet,

    gyro: Option<Box<dyn HeadingSensor>>,

    power_mapper: Option<Box<dyn MotorPowerMapper>>,

    gyro_assist: Option<GyroAssistParams>,

    odometry: Odometry,

    /// Powers last sent to the wheels, after mapping
    wheel_powers: [f64; NUM_WHEELS],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The wheels of a drive base, in LF, RF, LR, RR order.
pub enum WheelSet {
    /// Fixed wheels, used by tank and mecanum bases
    Fixed([Box<dyn Actuator>; NUM_WHEELS]),

    /// Steered modules, used by swerve bases
    Swerve([SwerveModule; NUM_WHEELS]),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelSet {
    fn wheel(&self, idx: usize) -> &dyn Actuator {
        match self {
            Self::Fixed(w) => w[idx].as_ref(),
            Self::Swerve(m) => &m[idx],
        }
    }

    fn wheel_mut(&mut self, idx: usize) -> &mut dyn Actuator {
        match self {
            Self::Fixed(w) => w[idx].as_mut(),
            Self::Swerve(m) => &mut m[idx],
        }
    }
}

impl DriveBase {
    /// Create a new drive base.
    ///
    /// Swerve kinematics require a [`WheelSet::Swerve`], the other models a
    /// [`WheelSet::Fixed`].
    pub fn new(
        params: &DriveBaseParams,
        wheels: WheelSet,
        gyro: Option<Box<dyn HeadingSensor>>,
    ) -> Result<Self, DriveBaseError> {
        let kinematics = DriveKinematics::from_params(&params.kinematics)?;

        match (&kinematics, &wheels) {
            (DriveKinematics::Swerve(_), WheelSet::Fixed(_)) => {
                return Err(DriveBaseError::WheelSetMismatch { expected: "swerve" })
            }
            (DriveKinematics::Tank, WheelSet::Swerve(_))
            | (DriveKinematics::Mecanum, WheelSet::Swerve(_)) => {
                return Err(DriveBaseError::WheelSetMismatch { expected: "fixed" })
            }
            _ => (),
        }

        let scales = OdometryScales {
            x: params.x_scale,
            y: params.y_scale,
            rot: params
                .rot_scale
                .unwrap_or_else(|| kinematics.default_rot_scale(params.y_scale)),
            enc_inverted: params.enc_inverted,
        };

        debug!("DriveBase created: {:?}, scales: {:?}", kinematics, scales);

        let mut drive_base = Self {
            kinematics,
            wheels,
            gyro,
            power_mapper: params
                .torque_curve
                .map(|p| Box::new(TorqueCurveMapper::new(p)) as Box<dyn MotorPowerMapper>),
            gyro_assist: params.gyro_assist,
            odometry: Odometry::new(scales),
            wheel_powers: [0.0; NUM_WHEELS],
        };

        // Take the reference samples
        drive_base.update_odometry(0.0);

        Ok(drive_base)
    }

    // ---- ODOMETRY ----

    /// Sample all wheels at `timestamp_s` and integrate the pose.
    pub fn update_odometry(&mut self, timestamp_s: f64) {
        let mut samples = [WheelSample::default(); NUM_WHEELS];
        for (i, s) in samples.iter_mut().enumerate() {
            let wheel = self.wheels.wheel(i);
            *s = WheelSample {
                position: wheel.get_position(),
                speed: wheel.get_speed(),
                timestamp_s,
            };
        }

        let steer_angles = match self.wheels {
            WheelSet::Swerve(ref m) => {
                let mut a = [0.0; NUM_WHEELS];
                for (angle, module) in a.iter_mut().zip(m.iter()) {
                    *angle = module.get_steer_angle();
                }
                Some(a)
            }
            WheelSet::Fixed(_) => None,
        };

        let gyro = self.gyro.as_ref().map(|g| GyroReading {
            heading_deg: g.get_heading(),
            turn_rate_degs: g.get_turn_rate(),
        });

        self.odometry
            .update(&self.kinematics, samples, steer_angles, gyro);
    }

    /// Zero the pose, keeping the wheel encoders untouched.
    pub fn reset_odometry(&mut self) {
        let heading = self.gyro.as_ref().map(|g| g.get_heading());
        self.odometry.reset(heading);
        debug!("Odometry reset");
    }

    pub fn get_pose(&self) -> Pose {
        self.odometry.pose()
    }

    pub fn get_x_position(&self) -> f64 {
        self.odometry.pose().x
    }

    pub fn get_y_position(&self) -> f64 {
        self.odometry.pose().y
    }

    pub fn get_heading(&self) -> f64 {
        self.odometry.pose().heading_deg
    }

    pub fn get_x_speed(&self) -> f64 {
        self.odometry.x_speed()
    }

    pub fn get_y_speed(&self) -> f64 {
        self.odometry.y_speed()
    }

    pub fn get_turn_rate(&self) -> f64 {
        self.odometry.turn_rate()
    }

    // ---- STEERING ----

    /// Run the swerve steering loops, does nothing for fixed wheels.
    pub fn update_steering(&mut self, dt: f64) {
        if let WheelSet::Swerve(ref mut modules) = self.wheels {
            for m in modules.iter_mut() {
                m.update_steering(dt);
            }
        }
    }

    /// Steer all swerve modules to `angle_deg`.
    pub fn set_steer_angle(&mut self, angle_deg: f64, hold: bool) -> Result<(), DriveBaseError> {
        match self.wheels {
            WheelSet::Swerve(ref mut modules) => {
                for m in modules.iter_mut() {
                    m.set_steer_angle(angle_deg, hold);
                }
                Ok(())
            }
            WheelSet::Fixed(_) => Err(DriveBaseError::NotSwerve),
        }
    }

    /// The swerve modules, if this is a swerve base.
    pub fn modules(&self) -> Option<&[SwerveModule; NUM_WHEELS]> {
        match self.wheels {
            WheelSet::Swerve(ref m) => Some(m),
            WheelSet::Fixed(_) => None,
        }
    }

    // ---- DRIVING ----

    pub fn kinematics(&self) -> &DriveKinematics {
        &self.kinematics
    }

    pub fn supports_holonomic(&self) -> bool {
        self.kinematics.is_holonomic()
    }

    /// Drive the left and right sides independently.
    ///
    /// `inverted` drives the robot as if its back were its front. Swerve
    /// modules are steered straight ahead first, the steering is released
    /// once on target.
    pub fn tank_drive(&mut self, left: f64, right: f64, inverted: bool) {
        let (mut left, mut right) = (clip_unit(left), clip_unit(right));

        if inverted {
            let tmp = left;
            left = -right;
            right = -tmp;
        }

        if let WheelSet::Swerve(ref mut modules) = self.wheels {
            for m in modules.iter_mut() {
                m.set_steer_angle(0.0, false);
            }
        }

        self.set_wheel_powers([left, right, left, right]);
    }

    /// Drive with a forward power and a turn power.
    pub fn arcade_drive(&mut self, drive: f64, turn: f64, inverted: bool) {
        let mut drive = clip_unit(drive);
        let turn = self.apply_gyro_assist(clip_unit(turn));

        if inverted {
            drive = -drive;
        }

        let mut lr = [drive + turn, drive - turn];
        normalize_in_place(&mut lr);

        self.tank_drive(lr[0], lr[1], false);
    }

    /// Drive holonomically.
    ///
    /// `inverted` negates the translation. If `field_heading_deg` is given
    /// `(x, y)` is a field-frame command, rotated into the robot frame.
    pub fn holonomic_drive(
        &mut self,
        x: f64,
        y: f64,
        rot: f64,
        inverted: bool,
        field_heading_deg: Option<f64>,
    ) -> Result<(), DriveBaseError> {
        if !self.supports_holonomic() {
            return Err(DriveBaseError::NotHolonomic);
        }

        let (mut x, mut y) = (clip_unit(x), clip_unit(y));
        let rot = self.apply_gyro_assist(clip_unit(rot));

        if inverted {
            if field_heading_deg.is_some() {
                warn!("Inverted drive combined with a field-frame command, both are applied");
            }
            x = -x;
            y = -y;
        }

        let cmd = self
            .kinematics
            .compute_wheel_outputs(x, y, rot, field_heading_deg.unwrap_or(0.0));

        // Steering is commanded before the drive channels
        if let (Some(angles), WheelSet::Swerve(modules)) =
            (cmd.steer_angles_deg, &mut self.wheels)
        {
            for (m, a) in modules.iter_mut().zip(angles.iter()) {
                m.set_steer_angle(*a, true);
            }
        }

        self.set_wheel_powers(cmd.powers);

        Ok(())
    }

    /// Set all wheel powers to zero.
    pub fn stop(&mut self) {
        self.set_wheel_powers([0.0; NUM_WHEELS]);
    }

    /// Stop, and for swerve bases also stop or straighten the steering.
    pub fn stop_with_reset(&mut self, reset_steer: bool) {
        match self.wheels {
            WheelSet::Swerve(ref mut modules) => {
                for m in modules.iter_mut() {
                    if reset_steer {
                        m.set_steer_angle(0.0, false);
                        m.set(0.0);
                    } else {
                        m.stop();
                    }
                }
                self.wheel_powers = [0.0; NUM_WHEELS];
            }
            WheelSet::Fixed(_) => self.stop(),
        }
    }

    /// Powers last sent to the wheels.
    pub fn wheel_powers(&self) -> [f64; NUM_WHEELS] {
        self.wheel_powers
    }

    // ---- OPTIONAL FEATURES ----

    /// Add a heading-rate correction to every rotation command.
    pub fn enable_gyro_assist(&mut self, max_rotation_rate_degs: f64, k_p: f64) {
        self.gyro_assist = Some(GyroAssistParams {
            max_rotation_rate_degs,
            k_p,
        });
        debug!(
            "Gyro assist enabled, max rate {:.1} deg/s, kp {:.4}",
            max_rotation_rate_degs, k_p
        );
    }

    pub fn disable_gyro_assist(&mut self) {
        self.gyro_assist = None;
    }

    pub fn is_gyro_assist_enabled(&self) -> bool {
        self.gyro_assist.is_some()
    }

    /// Replace the motor power mapper, `None` sends powers unchanged.
    pub fn set_power_mapper(&mut self, mapper: Option<Box<dyn MotorPowerMapper>>) {
        self.power_mapper = mapper;
    }

    fn apply_gyro_assist(&self, rot: f64) -> f64 {
        match self.gyro_assist {
            Some(ref g) => {
                let error = rot * g.max_rotation_rate_degs - self.get_turn_rate();
                rot + clip_unit(g.k_p * error)
            }
            None => rot,
        }
    }

    fn set_wheel_powers(&mut self, powers: [f64; NUM_WHEELS]) {
        for (i, power) in powers.iter().enumerate() {
            let wheel = self.wheels.wheel_mut(i);

            let output = match self.power_mapper {
                Some(ref m) => m.translate_motor_power(*power, wheel.get_speed()),
                None => *power,
            };

            wheel.set(output);
            self.wheel_powers[i] = output;
        }
    }
}

impl std::fmt::Debug for DriveBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveBase")
            .field("kinematics", &self.kinematics)
            .field("pose", &self.odometry.pose())
            .field("wheel_powers", &self.wheel_powers)
            .field("gyro_assist", &self.gyro_assist)
            .finish()
    }
}
