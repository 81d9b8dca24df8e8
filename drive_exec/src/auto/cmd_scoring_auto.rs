//! # Scoring autonomous routine
//!
//! Picks up an object, raises the elevator, drives to the alliance's side of
//! the switch or scale, deposits the object and finally strafes into the
//! platform zone.
//!
//! Which side of the field element is ours comes from the game data and is
//! resolved when the command is built, the states only use the resulting
//! distances and signs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;

use super::{AutoError, AutoParams, FieldParams, MechSetPoints, RobotCommand, TargetType};
use crate::robot::Robot;
use crate::sched::{Event, StateMachine, Timer};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NAME: &str = "CmdScoringAuto";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct CmdScoringAuto {
    sm: StateMachine<ScoringState>,
    event: Event,
    timer: Timer,

    target_type: TargetType,
    delay_s: f64,
    forward_distance: f64,
    side_approach: bool,

    /// Lateral move from the start position to the target
    sideways_distance: f64,

    /// True if our side of the scale is on the right
    right_scale: bool,

    field: FieldParams,
    mech: MechSetPoints,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringState {
    PickUpObject,
    RaiseElevator,
    DoDelay,
    DriveForwardDistance,
    MoveSideways,
    DriveToTarget,
    ApproachScaleSide,
    ApproachScaleFront,
    TurnRobot,
    ApproachTarget,
    DepositObject,
    StrafeToPlatformZone,
    Done,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdScoringAuto {
    pub fn new(robot: &Robot, params: &AutoParams) -> Result<Self, AutoError> {
        let (right_switch, right_scale) = parse_game_data(&params.game_data)?;

        let target_location = match (params.target_type, right_switch, right_scale) {
            (TargetType::Scale, _, true) => params.field.right_scale_location,
            (TargetType::Scale, _, false) => params.field.left_scale_location,
            (TargetType::Switch, true, _) => params.field.right_switch_location,
            (TargetType::Switch, false, _) => params.field.left_switch_location,
        };

        let mut sm = StateMachine::new(NAME);
        sm.start(ScoringState::PickUpObject);

        info!(
            "{}: alliance = {:?}, game data = {}, start = {:.1}, target = {:?} at {:.1}, \
            forward = {:.1}, delay = {:.1} s, side approach = {}",
            NAME,
            params.alliance,
            params.game_data,
            params.start_position,
            params.target_type,
            target_location,
            params.forward_distance,
            params.delay_s,
            params.side_approach
        );

        Ok(Self {
            sm,
            event: Event::new(NAME),
            timer: Timer::new(NAME, &robot.ctx),
            target_type: params.target_type,
            delay_s: params.delay_s,
            forward_distance: params.forward_distance,
            side_approach: params.side_approach,
            sideways_distance: target_location - params.start_position,
            right_scale,
            field: params.field,
            mech: params.mech,
        })
    }

    /// Current state, `None` once done.
    pub fn get_state(&self) -> Option<ScoringState> {
        self.sm.get_state()
    }

    /// Lateral move from the start position to the target.
    pub fn sideways_distance(&self) -> f64 {
        self.sideways_distance
    }

    /// Start a relative move holding the robot's target heading, advancing to
    /// `next` when it completes.
    fn drive_to(
        &mut self,
        robot: &mut Robot,
        x: f64,
        y: f64,
        next: ScoringState,
    ) -> Result<(), AutoError> {
        robot.pid_drive.set_target(
            &robot.drive_base,
            x,
            y,
            robot.target_heading,
            false,
            Some(&self.event),
        )?;
        self.sm.wait_for_event(&self.event, next);
        Ok(())
    }
}

impl RobotCommand for CmdScoringAuto {
    fn name(&self) -> &str {
        NAME
    }

    fn cmd_periodic(&mut self, robot: &mut Robot, _elapsed_s: f64) -> Result<bool, AutoError> {
        let mut done = !self.sm.is_enabled();

        let state = match self.sm.check_ready_and_get_state() {
            Some(s) => s,
            None => return Ok(done),
        };

        match state {
            ScoringState::PickUpObject => {
                if robot.grabber.has_object() {
                    self.sm.set_state(ScoringState::RaiseElevator);
                } else {
                    robot.grabber.pick_up(Some(&self.event));
                    self.sm.wait_for_event(&self.event, ScoringState::RaiseElevator);
                }
            }
            ScoringState::RaiseElevator => {
                let height = match self.target_type {
                    TargetType::Scale => self.mech.scale_height,
                    TargetType::Switch => self.mech.switch_height,
                };
                robot
                    .elevator
                    .set_position(height, Some(&self.event), self.mech.elevator_timeout_s);
                self.sm.wait_for_event(&self.event, ScoringState::DoDelay);
            }
            ScoringState::DoDelay => {
                if self.delay_s == 0.0 {
                    self.sm.set_state(ScoringState::DriveForwardDistance);
                } else {
                    self.timer.set(self.delay_s, &self.event);
                    self.sm.wait_for_event(&self.event, ScoringState::DriveForwardDistance);
                }
            }
            ScoringState::DriveForwardDistance => {
                if let Some(p) = robot.pid_drive.y_pid_mut() {
                    p.set_output_range(-1.0, 1.0);
                }
                self.drive_to(robot, 0.0, self.forward_distance, ScoringState::MoveSideways)?;
            }
            ScoringState::MoveSideways => {
                self.drive_to(robot, self.sideways_distance, 0.0, ScoringState::DriveToTarget)?;
            }
            ScoringState::DriveToTarget => match self.target_type {
                TargetType::Switch => {
                    let y = self.field.distance_to_switch - self.forward_distance;
                    self.drive_to(robot, 0.0, y, ScoringState::DepositObject)?;
                }
                TargetType::Scale => {
                    let y = self.field.distance_to_scale - self.forward_distance;
                    let next = if self.side_approach {
                        ScoringState::ApproachScaleSide
                    } else {
                        ScoringState::ApproachScaleFront
                    };
                    self.drive_to(robot, 0.0, y, next)?;
                }
            },
            ScoringState::ApproachScaleSide => {
                self.drive_to(robot, 0.0, self.field.scale_side_approach, ScoringState::TurnRobot)?;
            }
            ScoringState::ApproachScaleFront => {
                let x = if self.right_scale {
                    self.field.scale_front_approach
                } else {
                    -self.field.scale_front_approach
                };
                self.drive_to(robot, x, 0.0, ScoringState::ApproachTarget)?;
            }
            ScoringState::TurnRobot => {
                // Turn toward the middle of the field
                if self.right_scale {
                    robot.target_heading -= 90.0;
                } else {
                    robot.target_heading += 90.0;
                }
                self.drive_to(robot, 0.0, 0.0, ScoringState::ApproachTarget)?;
            }
            ScoringState::ApproachTarget => {
                self.drive_to(robot, 0.0, self.field.final_scale_approach, ScoringState::DepositObject)?;
            }
            ScoringState::DepositObject => {
                robot.grabber.grab(self.mech.deposit_power, Some(&self.event));
                self.sm.wait_for_event(&self.event, ScoringState::StrafeToPlatformZone);
            }
            ScoringState::StrafeToPlatformZone => {
                if let Some(p) = robot.pid_drive.y_pid_mut() {
                    p.set_output_range(-1.0, 1.0);
                }
                self.drive_to(robot, self.field.platform_strafe, 0.0, ScoringState::Done)?;
            }
            ScoringState::Done => {
                done = true;
                self.sm.stop();
            }
        }

        robot.trace_state_info(NAME, &format!("{:?}", state));

        Ok(done)
    }

    fn is_running(&self) -> bool {
        self.sm.is_enabled()
    }

    fn cancel(&mut self, robot: &mut Robot) {
        self.timer.cancel();
        self.sm.stop();
        robot.pid_drive.cancel(&mut robot.drive_base);
        robot.elevator.stop();
        robot.grabber.stop();
        info!("{} cancelled", NAME);
    }
}

/// Returns which side of the switch and of the scale is ours, `true` for
/// right.
fn parse_game_data(game_data: &str) -> Result<(bool, bool), AutoError> {
    let mut sides = game_data.chars().map(|c| match c {
        'L' | 'l' => Some(false),
        'R' | 'r' => Some(true),
        _ => None,
    });

    match (sides.next().flatten(), sides.next().flatten()) {
        (Some(switch), Some(scale)) => Ok((switch, scale)),
        _ => Err(AutoError::InvalidGameData(game_data.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::AutoMode;
    use crate::drive_base::{DriveBaseParams, KinematicsParams};
    use crate::pid::PidParams;
    use crate::pid_drive::PidDriveParams;
    use crate::sim::{SimRig, SimRigParams};
    use crate::trace::RecordingTraceSink;

    const DT: f64 = 0.02;

    fn rig() -> (SimRig, Robot, RecordingTraceSink) {
        let rig = SimRig::new(&SimRigParams::default());
        let rec = RecordingTraceSink::new();
        let robot = rig
            .robot(
                &DriveBaseParams::new(KinematicsParams::Mecanum),
                &PidParams::p_only(0.02, 0.5),
                &PidDriveParams {
                    x: Some(PidParams::p_only(0.05, 0.5)),
                    y: Some(PidParams::p_only(0.05, 0.5)),
                    turn: Some(PidParams::heading(0.02, 1.0)),
                    stall_timeout_s: 0.5,
                    stall_threshold: 0.05,
                },
                Box::new(rec.clone()),
            )
            .unwrap();
        (rig, robot, rec)
    }

    /// Run the mode until the command is done, returns the elapsed time.
    fn run(rig: &SimRig, robot: &mut Robot, mode: &mut AutoMode, max_s: f64) -> f64 {
        let mut elapsed = 0.0;
        while elapsed < max_s {
            rig.step(DT);
            elapsed += DT;
            if mode.periodic(robot, elapsed) {
                break;
            }
        }
        elapsed
    }

    #[test]
    fn test_side_resolution() {
        let (_, robot, _) = rig();
        let field = FieldParams::default();

        let cmd = CmdScoringAuto::new(&robot, &AutoParams::new("LRL", TargetType::Switch, 10.0))
            .unwrap();
        assert_eq!(cmd.sideways_distance(), field.left_switch_location - 10.0);

        let cmd = CmdScoringAuto::new(&robot, &AutoParams::new("LRL", TargetType::Scale, 10.0))
            .unwrap();
        assert_eq!(cmd.sideways_distance(), field.right_scale_location - 10.0);
        assert!(cmd.right_scale);

        assert!(matches!(
            CmdScoringAuto::new(&robot, &AutoParams::new("L", TargetType::Scale, 0.0)),
            Err(AutoError::InvalidGameData(_))
        ));
        assert!(matches!(
            CmdScoringAuto::new(&robot, &AutoParams::new("XR", TargetType::Scale, 0.0)),
            Err(AutoError::InvalidGameData(_))
        ));
    }

    #[test]
    fn test_switch_routine() {
        let (rig, mut robot, rec) = rig();
        let params = AutoParams::new("RLR", TargetType::Switch, 0.0);
        let cmd = CmdScoringAuto::new(&robot, &params).unwrap();

        let mut mode = AutoMode::start(&mut robot, Box::new(cmd));
        let elapsed = run(&rig, &mut robot, &mut mode, 60.0);

        assert!(mode.is_done(), "not done after {:.1} s", elapsed);
        assert_eq!(
            rec.state_sequence(NAME),
            vec![
                "PickUpObject",
                "RaiseElevator",
                "DoDelay",
                "DriveForwardDistance",
                "MoveSideways",
                "DriveToTarget",
                "DepositObject",
                "StrafeToPlatformZone",
                "Done"
            ]
        );

        // Forward to the switch, then sideways to our plate and the platform
        let pose = robot.drive_base.get_pose();
        assert!((pose.y - params.field.distance_to_switch).abs() < 2.0);
        assert!(
            (pose.x - (params.field.right_switch_location + params.field.platform_strafe)).abs()
                < 2.0
        );
        assert!(pose.heading_deg.abs() < 1.5);

        assert!((robot.elevator.get_position() - params.mech.switch_height).abs() < 1e-9);
        assert!(!robot.grabber.has_object());
        assert!(!robot.pid_drive.is_active());
    }

    #[test]
    fn test_scale_side_approach_turns() {
        let (rig, mut robot, rec) = rig();
        let mut params = AutoParams::new("LLL", TargetType::Scale, 0.0);
        params.side_approach = true;
        params.delay_s = 0.5;
        let cmd = CmdScoringAuto::new(&robot, &params).unwrap();

        let mut mode = AutoMode::start(&mut robot, Box::new(cmd));
        let elapsed = run(&rig, &mut robot, &mut mode, 60.0);

        assert!(mode.is_done(), "not done after {:.1} s", elapsed);
        assert_eq!(
            rec.state_sequence(NAME),
            vec![
                "PickUpObject",
                "RaiseElevator",
                "DoDelay",
                "DriveForwardDistance",
                "MoveSideways",
                "DriveToTarget",
                "ApproachScaleSide",
                "TurnRobot",
                "ApproachTarget",
                "DepositObject",
                "StrafeToPlatformZone",
                "Done"
            ]
        );

        // Left scale, the robot turns right toward the middle
        assert_eq!(robot.target_heading, 90.0);
        assert!((robot.drive_base.get_heading() - 90.0).abs() < 1.5);
        assert!((robot.elevator.get_position() - params.mech.scale_height).abs() < 1e-9);
    }

    #[test]
    fn test_cancel_stops_everything() {
        let (rig, mut robot, _) = rig();
        let params = AutoParams::new("RRR", TargetType::Scale, 0.0);
        let mut cmd = CmdScoringAuto::new(&robot, &params).unwrap();

        robot.start_mode();
        let mut elapsed = 0.0;
        while cmd.get_state() != Some(ScoringState::DriveToTarget) && elapsed < 30.0 {
            rig.step(DT);
            elapsed += DT;
            robot.pre_periodic(elapsed);
            cmd.cmd_periodic(&mut robot, elapsed).unwrap();
            robot.post_periodic().unwrap();
        }
        assert!(robot.pid_drive.is_active());

        cmd.cancel(&mut robot);
        assert!(!cmd.is_running());
        assert!(!robot.pid_drive.is_active());
        assert_eq!(robot.drive_base.wheel_powers(), [0.0; 4]);
        assert!(cmd.cmd_periodic(&mut robot, elapsed + DT).unwrap());
    }
}
