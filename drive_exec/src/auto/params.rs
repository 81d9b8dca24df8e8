//! Parameters for the autonomous commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of an autonomous match routine.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoParams {
    pub alliance: Alliance,

    /// Side of each field element owned by the alliance, nearest first. For
    /// example `"LRL"` means the switch is on the left and the scale on the
    /// right.
    pub game_data: String,

    /// Lateral start position of the robot on the field.
    pub start_position: f64,

    pub target_type: TargetType,

    /// Distance driven straight ahead before moving sideways.
    pub forward_distance: f64,

    /// Approach the scale from the side rather than the front.
    #[serde(default)]
    pub side_approach: bool,

    /// Delay before driving off.
    ///
    /// Units: seconds
    #[serde(default)]
    pub delay_s: f64,

    #[serde(default)]
    pub field: FieldParams,

    #[serde(default)]
    pub mech: MechSetPoints,

    #[serde(default)]
    pub strafe: StrafeParams,
}

/// Field geometry, in the drive base's distance units.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub distance_to_switch: f64,
    pub distance_to_scale: f64,

    pub scale_side_approach: f64,
    pub scale_front_approach: f64,
    pub final_scale_approach: f64,

    /// Lateral position of each side of the field elements
    pub right_switch_location: f64,
    pub left_switch_location: f64,
    pub right_scale_location: f64,
    pub left_scale_location: f64,

    /// Final strafe into the platform zone
    pub platform_strafe: f64,
}

/// Mechanism set points.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MechSetPoints {
    pub switch_height: f64,
    pub scale_height: f64,

    /// Grabber power used to eject the object, negative
    pub deposit_power: f64,

    /// Zero for no timeout
    pub elevator_timeout_s: f64,
}

/// Parameters of the target search strafe.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct StrafeParams {
    /// Magnitude of the strafe power
    pub power: f64,

    /// A target within this angle of straight ahead ends the search.
    ///
    /// Units: degrees
    pub angle_tolerance_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Alliance {
    Red,
    Blue,
}

/// The field element an autonomous routine scores on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TargetType {
    Switch,
    Scale,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutoParams {
    /// Parameters with default field geometry and set points.
    pub fn new(game_data: &str, target_type: TargetType, start_position: f64) -> Self {
        Self {
            alliance: Alliance::Red,
            game_data: game_data.to_string(),
            start_position,
            target_type,
            forward_distance: 85.0,
            side_approach: false,
            delay_s: 0.0,
            field: FieldParams::default(),
            mech: MechSetPoints::default(),
            strafe: StrafeParams::default(),
        }
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            distance_to_switch: 168.0,
            distance_to_scale: 299.65,
            scale_side_approach: 21.0,
            scale_front_approach: 21.0,
            final_scale_approach: 21.0,
            right_switch_location: 54.0,
            left_switch_location: -54.0,
            right_scale_location: 72.0,
            left_scale_location: -72.0,
            platform_strafe: 30.0,
        }
    }
}

impl Default for MechSetPoints {
    fn default() -> Self {
        Self {
            switch_height: 27.0,
            scale_height: 60.0,
            deposit_power: -0.5,
            elevator_timeout_s: 0.0,
        }
    }
}

impl Default for StrafeParams {
    fn default() -> Self {
        Self {
            power: 0.5,
            angle_tolerance_deg: 5.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_shipped_params() {
        let params: AutoParams =
            util::params::from_str(include_str!("../../../params/auto.toml")).unwrap();

        assert_eq!(params.alliance, Alliance::Red);
        assert_eq!(params.target_type, TargetType::Scale);
        assert_eq!(params.field.distance_to_scale, 299.65);
        assert_eq!(params.mech.deposit_power, -0.5);
    }

    #[test]
    fn test_minimal_params() {
        let params: AutoParams = util::params::from_str(
            r#"
            alliance = "Blue"
            game_data = "RRL"
            start_position = -40.0
            target_type = "Switch"
            forward_distance = 60.0
            "#,
        )
        .unwrap();

        assert!(!params.side_approach);
        assert_eq!(params.delay_s, 0.0);
        assert_eq!(params.field.distance_to_switch, 168.0);
        assert_eq!(params.strafe.angle_tolerance_deg, 5.0);
    }
}
