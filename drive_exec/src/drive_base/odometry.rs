//! Odometry integration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{DriveKinematics, PoseDelta, WheelDeltas, NUM_WHEELS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dead-reckoned pose of the robot.
///
/// Positions accumulate robot-frame displacement in distance units. The
/// heading accumulates without wrapping so multi-turn moves can be tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

/// Reading of one wheel, taken once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelSample {
    pub position: f64,
    pub speed: f64,
    pub timestamp_s: f64,
}

/// Scale factors converting encoder units into pose units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometryScales {
    pub x: f64,
    pub y: f64,
    pub rot: f64,
    pub enc_inverted: [bool; NUM_WHEELS],
}

/// Heading measurement from a gyro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroReading {
    pub heading_deg: f64,
    pub turn_rate_degs: f64,
}

/// Odometry state of a drive base.
#[derive(Debug, Clone)]
pub struct Odometry {
    scales: OdometryScales,

    /// Samples used in the previous update
    prev: Option<[WheelSample; NUM_WHEELS]>,

    pose: Pose,

    /// Rotation integrated from the wheels, used when there is no gyro
    wheel_rot_deg: f64,

    /// Gyro heading at the last reset
    gyro_offset_deg: f64,

    x_speed: f64,
    y_speed: f64,
    turn_rate_degs: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Odometry {
    pub fn new(scales: OdometryScales) -> Self {
        Self {
            scales,
            prev: None,
            pose: Pose::default(),
            wheel_rot_deg: 0.0,
            gyro_offset_deg: 0.0,
            x_speed: 0.0,
            y_speed: 0.0,
            turn_rate_degs: 0.0,
        }
    }

    pub fn scales(&self) -> &OdometryScales {
        &self.scales
    }

    /// Integrate one tick of wheel samples.
    ///
    /// All samples must share the same timestamp. The first call only stores
    /// the samples as a reference. If a gyro reading is given it provides the
    /// heading and turn rate, otherwise both come from the wheels.
    pub fn update(
        &mut self,
        kinematics: &DriveKinematics,
        samples: [WheelSample; NUM_WHEELS],
        steer_angles_deg: Option<[f64; NUM_WHEELS]>,
        gyro: Option<GyroReading>,
    ) -> PoseDelta {
        let prev = match self.prev.replace(samples) {
            Some(p) => p,
            None => {
                if let Some(g) = gyro {
                    self.pose.heading_deg = g.heading_deg - self.gyro_offset_deg;
                }
                return PoseDelta::default();
            }
        };

        let mut distances = [0.0; NUM_WHEELS];
        for i in 0..NUM_WHEELS {
            let d = samples[i].position - prev[i].position;
            distances[i] = if self.scales.enc_inverted[i] { -d } else { d };
        }

        let raw = kinematics.odometry_delta(&WheelDeltas {
            distances,
            steer_angles_deg,
        });
        let delta = PoseDelta {
            x: raw.x * self.scales.x,
            y: raw.y * self.scales.y,
            rot: raw.rot * self.scales.rot,
        };

        let dt = samples[0].timestamp_s - prev[0].timestamp_s;
        let rate = |v: f64| if dt > 0.0 { v / dt } else { 0.0 };

        self.pose.x += delta.x;
        self.pose.y += delta.y;
        self.wheel_rot_deg += delta.rot;
        self.x_speed = rate(delta.x);
        self.y_speed = rate(delta.y);

        match gyro {
            Some(g) => {
                self.pose.heading_deg = g.heading_deg - self.gyro_offset_deg;
                self.turn_rate_degs = g.turn_rate_degs;
            }
            None => {
                self.pose.heading_deg = self.wheel_rot_deg;
                self.turn_rate_degs = rate(delta.rot);
            }
        }

        delta
    }

    /// Zero the pose. The gyro heading at the time of the reset becomes the
    /// new zero heading.
    pub fn reset(&mut self, gyro_heading_deg: Option<f64>) {
        self.pose = Pose::default();
        self.wheel_rot_deg = 0.0;
        self.gyro_offset_deg = gyro_heading_deg.unwrap_or(0.0);
        self.x_speed = 0.0;
        self.y_speed = 0.0;
        self.turn_rate_degs = 0.0;
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn x_speed(&self) -> f64 {
        self.x_speed
    }

    pub fn y_speed(&self) -> f64 {
        self.y_speed
    }

    pub fn turn_rate(&self) -> f64 {
        self.turn_rate_degs
    }
}
