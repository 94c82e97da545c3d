use std::time::Duration;

use tandem_kinematics::{KinematicsError, WheelGeometry, WheelSpeeds, clamp_turn_rate, whole_degrees};
use tandem_motor::{Motor, Movement, StopBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::PilotConfig;
use crate::error::{PilotError, PilotResult, Side};

/// Whether a bounded move blocks the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    /// Block until both motors report the move finished.
    #[default]
    Wait,
    /// Block on each motor for at most this long.
    WaitFor(Duration),
    /// Return as soon as the move is issued.
    NoWait,
}

/// How a motion call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Both wheels reached their targets.
    Finished,
    /// A wait gave up before a wheel got there. The wheels are still moving.
    TimedOut,
    /// A bounded move was issued and not waited on.
    InProgress,
    /// A velocity command was issued; it runs until stopped.
    Continuous,
}

/// Acceleration limits of the two motors (deg/s²).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acceleration {
    pub left: u32,
    pub right: u32,
}

/// Motion controller for a two-wheeled differential-drive robot.
///
/// Turns travel distances, in-place turns and steered arcs into wheel
/// commands, and estimates heading from the wheels' accumulated rotation.
/// The controller is open-loop: it trusts the motors' own speed and
/// position regulation and never corrects heading from sensing.
///
/// Positive rotation angles and headings are clockwise. Positive turn
/// rates steer left.
///
/// Motors can be handed over by value or lent as `&mut M`.
pub struct Pilot<M: Motor> {
    left: M,
    right: M,
    geometry: WheelGeometry,
    reverse: bool,
    speed: f64,
    angle_offset: i64,
}

impl<M: Motor> Pilot<M> {
    /// Builds a pilot over two motors.
    ///
    /// Blocks until both motors are ready, then takes their current
    /// readings as the zero heading.
    ///
    /// # Errors
    ///
    /// Fails with [`PilotError::Kinematics`] if the wheel diameter or axle
    /// width is not positive, with [`PilotError::InvalidArgument`] if the
    /// speed is not finite, and with [`PilotError::Motor`] if a motor fails
    /// to start.
    pub fn new(left: M, right: M, config: PilotConfig) -> PilotResult<Self, M::Error> {
        let geometry = WheelGeometry::new(config.wheel_diameter_mm, config.axle_width_mm)?;
        Self::check_finite(config.speed, "speed must be finite")?;

        let mut pilot = Pilot {
            left,
            right,
            geometry,
            reverse: config.reverse,
            speed: config.speed,
            angle_offset: 0,
        };

        pilot.left.wait_until_ready().map_err(Side::Left.wrap())?;
        pilot.right.wait_until_ready().map_err(Side::Right.wrap())?;
        pilot.angle_offset = pilot.wheel_difference()?;

        info!(%geometry, reverse = pilot.reverse, speed = pilot.speed, "pilot ready");
        Ok(pilot)
    }

    /// Drive forward at the base speed until [`Pilot::stop`].
    pub fn forward(&mut self) -> PilotResult<(), M::Error> {
        let v = self.direction() * self.speed;
        self.run_at_speeds(WheelSpeeds::new(v, v))
    }

    /// Drive backward at the base speed until [`Pilot::stop`].
    pub fn backward(&mut self) -> PilotResult<(), M::Error> {
        let v = -self.direction() * self.speed;
        self.run_at_speeds(WheelSpeeds::new(v, v))
    }

    /// Drive `distance_mm` in a straight line; negative distances reverse.
    pub fn travel(&mut self, distance_mm: f64, completion: Completion) -> PilotResult<Motion, M::Error> {
        Self::check_finite(distance_mm, "travel distance must be finite")?;

        let mut degrees = self.geometry.mm_to_deg(distance_mm)?;
        if self.reverse {
            degrees = -degrees;
        }
        trace!(distance_mm, degrees, "travel");

        let speed = command_speed(self.speed)?;
        self.rotate_wheels((degrees, speed), (degrees, speed))?;
        self.complete(completion)
    }

    /// Turn in place by `angle_deg`, clockwise positive.
    ///
    /// Each wheel traces an arc of radius `axle_width / 2` in opposite
    /// directions.
    pub fn rotate(&mut self, angle_deg: f64, completion: Completion) -> PilotResult<Motion, M::Error> {
        Self::check_finite(angle_deg, "rotation angle must be finite")?;

        let sign = if self.reverse { -1 } else { 1 };
        let degrees = sign * self.geometry.rotation_to_wheel_deg(angle_deg)?;
        let speed = sign * command_speed(self.speed)?;
        trace!(angle_deg, degrees, "rotate");

        self.rotate_wheels((degrees, speed), (-degrees, -speed))?;
        self.complete(completion)
    }

    /// Drive along a curve.
    ///
    /// `turn_rate` is clamped to `[-200, 200]`: `0` is straight, `±100`
    /// stops the inner wheel, `±200` turns in place. Positive rates steer
    /// left. The outer wheel always runs at the base speed.
    ///
    /// With `angle_deg` of `None` the wheels run until [`Pilot::stop`] and
    /// the call returns [`Motion::Continuous`] whatever `completion` says.
    /// With `Some(angle)` the robot stops after its heading has changed by
    /// `angle` degrees.
    ///
    /// # Errors
    ///
    /// A zero turn rate with an angle fails with
    /// [`PilotError::InvalidArgument`] without moving: a straight line
    /// never changes heading.
    pub fn steer(
        &mut self,
        turn_rate: f64,
        angle_deg: Option<f64>,
        completion: Completion,
    ) -> PilotResult<Motion, M::Error> {
        Self::check_finite(turn_rate, "turn rate must be finite")?;
        let turn_rate = clamp_turn_rate(turn_rate);

        if turn_rate == 0.0 {
            if angle_deg.is_some() {
                return Err(PilotError::InvalidArgument(
                    "steering straight cannot be bounded by a heading change",
                ));
            }
            self.forward()?;
            return Ok(Motion::Continuous);
        }

        let mut speeds = WheelSpeeds::steer(self.speed, turn_rate);
        if self.reverse {
            speeds = speeds.negated();
        }
        trace!(turn_rate, %speeds, "steer");

        let Some(angle_deg) = angle_deg else {
            self.run_at_speeds(speeds)?;
            return Ok(Motion::Continuous);
        };

        let arc = self.geometry.arc_travel(speeds, angle_deg)?;
        debug!(
            angle_deg,
            left_deg = arc.left_deg,
            right_deg = arc.right_deg,
            duration_s = arc.duration_s,
            "arc planned"
        );

        self.rotate_wheels(
            (arc.left_deg, command_speed(speeds.left.abs())?),
            (arc.right_deg, command_speed(speeds.right.abs())?),
        )?;
        self.complete(completion)
    }

    /// Brake both motors. Safe to call in any state.
    pub fn stop(&mut self) -> PilotResult<(), M::Error> {
        debug!("brake");
        self.left.brake().map_err(Side::Left.wrap())?;
        self.right.brake().map_err(Side::Right.wrap())
    }

    /// Stop both motors and hold their positions.
    pub fn hold(&mut self) -> PilotResult<(), M::Error> {
        debug!("hold");
        self.left.hold().map_err(Side::Left.wrap())?;
        self.right.hold().map_err(Side::Right.wrap())
    }

    /// Wait for the current bounded move, left wheel first, then right.
    ///
    /// `timeout` applies to each wheel separately, so the worst case is
    /// twice `timeout`. Timing out never stops the motors.
    pub fn wait(&mut self, timeout: Option<Duration>) -> PilotResult<Motion, M::Error> {
        let left = self.left.wait_for_movement(timeout).map_err(Side::Left.wrap())?;
        let right = self.right.wait_for_movement(timeout).map_err(Side::Right.wrap())?;

        if left == Movement::Finished && right == Movement::Finished {
            Ok(Motion::Finished)
        } else {
            warn!(?left, ?right, ?timeout, "wait for movement timed out");
            Ok(Motion::TimedOut)
        }
    }

    /// Heading since construction or the last [`Pilot::reset_angle`], in
    /// degrees, clockwise positive.
    ///
    /// Odometric only: wheel slip accumulates as drift.
    pub fn angle(&self) -> PilotResult<f64, M::Error> {
        let difference = self.wheel_difference()? - self.angle_offset;
        let heading = self.geometry.heading_deg(difference as f64);
        Ok(if self.reverse { -heading } else { heading })
    }

    /// Make the current heading the new zero.
    pub fn reset_angle(&mut self) -> PilotResult<(), M::Error> {
        self.angle_offset = self.wheel_difference()?;
        info!(offset = self.angle_offset, "heading reset");
        Ok(())
    }

    /// True while either wheel is turning.
    pub fn is_moving(&self) -> PilotResult<bool, M::Error> {
        let left = self.left.current_speed().map_err(Side::Left.wrap())?;
        let right = self.right.current_speed().map_err(Side::Right.wrap())?;
        Ok(left != 0 || right != 0)
    }

    pub fn acceleration(&self) -> PilotResult<Acceleration, M::Error> {
        Ok(Acceleration {
            left: self.left.acceleration().map_err(Side::Left.wrap())?,
            right: self.right.acceleration().map_err(Side::Right.wrap())?,
        })
    }

    /// Set the same acceleration limit (deg/s²) on both motors.
    pub fn set_acceleration(&mut self, acceleration: u32) -> PilotResult<(), M::Error> {
        debug!(acceleration, "set acceleration");
        self.left.set_acceleration(acceleration).map_err(Side::Left.wrap())?;
        self.right.set_acceleration(acceleration).map_err(Side::Right.wrap())
    }

    /// Set the base speed (deg/s) for later commands. Motion already under
    /// way keeps its speed.
    pub fn set_speed(&mut self, speed: f64) -> PilotResult<(), M::Error> {
        Self::check_finite(speed, "speed must be finite")?;
        self.speed = speed;
        Ok(())
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn geometry(&self) -> WheelGeometry {
        self.geometry
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    pub fn left_motor(&self) -> &M {
        &self.left
    }

    pub fn right_motor(&self) -> &M {
        &self.right
    }

    /// Give the motors back, left then right.
    pub fn into_motors(self) -> (M, M) {
        (self.left, self.right)
    }

    fn check_finite(value: f64, msg: &'static str) -> PilotResult<(), M::Error> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(PilotError::InvalidArgument(msg))
        }
    }

    fn direction(&self) -> f64 {
        if self.reverse { -1.0 } else { 1.0 }
    }

    fn wheel_difference(&self) -> PilotResult<i64, M::Error> {
        let left = self.left.current_angle().map_err(Side::Left.wrap())?;
        let right = self.right.current_angle().map_err(Side::Right.wrap())?;
        Ok(i64::from(left) - i64::from(right))
    }

    fn run_at_speeds(&mut self, speeds: WheelSpeeds) -> PilotResult<(), M::Error> {
        let left = command_speed(speeds.left)?;
        let right = command_speed(speeds.right)?;
        debug!(left, right, "run at speed");
        self.left.run_at_speed(left).map_err(Side::Left.wrap())?;
        self.right.run_at_speed(right).map_err(Side::Right.wrap())
    }

    /// Issues a relative move to each wheel as `(degrees, speed)`.
    ///
    /// A wheel with a target but a speed that rounded to zero would never
    /// arrive, so it is given the slowest nonzero speed instead.
    fn rotate_wheels(&mut self, left: (i32, i32), right: (i32, i32)) -> PilotResult<(), M::Error> {
        let left = (left.0, reaching_speed(left.0, left.1));
        let right = (right.0, reaching_speed(right.0, right.1));
        debug!(
            left_deg = left.0,
            left_speed = left.1,
            right_deg = right.0,
            right_speed = right.1,
            "rotate by angle"
        );
        self.left
            .rotate_by_angle(left.0, left.1, StopBehavior::Coast)
            .map_err(Side::Left.wrap())?;
        self.right
            .rotate_by_angle(right.0, right.1, StopBehavior::Coast)
            .map_err(Side::Right.wrap())
    }

    fn complete(&mut self, completion: Completion) -> PilotResult<Motion, M::Error> {
        match completion {
            Completion::Wait => self.wait(None),
            Completion::WaitFor(timeout) => self.wait(Some(timeout)),
            Completion::NoWait => Ok(Motion::InProgress),
        }
    }
}

/// Rounds a speed to the whole deg/s motors accept.
fn command_speed(speed: f64) -> Result<i32, KinematicsError> {
    whole_degrees(speed)
}

fn reaching_speed(degrees: i32, speed: i32) -> i32 {
    if degrees != 0 && speed == 0 { 1 } else { speed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_motor::{Command, MockMotor};

    fn pilot() -> Pilot<MockMotor> {
        Pilot::new(MockMotor::new(), MockMotor::new(), PilotConfig::default()).unwrap()
    }

    #[test]
    fn test_command_speed_rounds() {
        assert_eq!(command_speed(399.5), Ok(400));
        assert_eq!(command_speed(-199.6), Ok(-200));
        assert_eq!(command_speed(-0.0), Ok(0));
        assert!(command_speed(1e12).is_err());
    }

    #[test]
    fn test_reaching_speed() {
        assert_eq!(reaching_speed(13, 0), 1);
        assert_eq!(reaching_speed(0, 0), 0);
        assert_eq!(reaching_speed(-13, 250), 250);
    }

    #[test]
    fn test_huge_rotation_rejected_before_moving() {
        let mut pilot = pilot();
        for angle in [-1e12, 1e12] {
            let result = pilot.rotate(angle, Completion::NoWait);
            assert!(matches!(result, Err(PilotError::Kinematics(KinematicsError::OutOfRange(_)))));
        }
        assert!(matches!(
            pilot.travel(1e12, Completion::NoWait),
            Err(PilotError::Kinematics(KinematicsError::OutOfRange(_)))
        ));
        assert!(pilot.left_motor().motion_commands().is_empty());
        assert!(pilot.right_motor().motion_commands().is_empty());
    }

    #[test]
    fn test_huge_speed_rejected_before_moving() {
        let mut pilot = pilot();
        pilot.set_speed(1e12).unwrap();
        assert!(matches!(pilot.forward(), Err(PilotError::Kinematics(KinematicsError::OutOfRange(_)))));
        assert!(matches!(
            pilot.rotate(90.0, Completion::NoWait),
            Err(PilotError::Kinematics(KinematicsError::OutOfRange(_)))
        ));
        assert!(pilot.left_motor().motion_commands().is_empty());
    }

    #[test]
    fn test_construction_waits_for_both_motors() {
        let pilot = pilot();
        assert_eq!(pilot.left_motor().commands(), &[Command::WaitUntilReady]);
        assert_eq!(pilot.right_motor().commands(), &[Command::WaitUntilReady]);
    }

    #[test]
    fn test_construction_captures_offset() {
        let pilot = Pilot::new(MockMotor::at_angle(500), MockMotor::at_angle(-120), PilotConfig::default()).unwrap();
        assert_eq!(pilot.angle().unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let config = PilotConfig { axle_width_mm: -1.0, ..PilotConfig::default() };
        let result = Pilot::new(MockMotor::new(), MockMotor::new(), config);
        assert!(matches!(result, Err(PilotError::Kinematics(_))));
    }

    #[test]
    fn test_backward_is_negated_forward() {
        let mut pilot = pilot();
        pilot.backward().unwrap();
        assert_eq!(pilot.left_motor().motion_commands(), vec![Command::RunAtSpeed(-400)]);
        assert_eq!(pilot.right_motor().motion_commands(), vec![Command::RunAtSpeed(-400)]);
    }

    #[test]
    fn test_no_wait_leaves_move_in_progress() {
        let mut pilot = pilot();
        let motion = pilot.travel(100.0, Completion::NoWait).unwrap();
        assert_eq!(motion, Motion::InProgress);
        assert!(pilot.is_moving().unwrap());
        assert_eq!(pilot.wait(None).unwrap(), Motion::Finished);
        assert!(!pilot.is_moving().unwrap());
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        let mut pilot = pilot();
        assert!(matches!(pilot.travel(f64::NAN, Completion::Wait), Err(PilotError::InvalidArgument(_))));
        assert!(matches!(pilot.rotate(f64::INFINITY, Completion::Wait), Err(PilotError::InvalidArgument(_))));
        assert!(matches!(pilot.steer(f64::NAN, None, Completion::Wait), Err(PilotError::InvalidArgument(_))));
        assert!(matches!(pilot.set_speed(f64::NAN), Err(PilotError::InvalidArgument(_))));
        assert!(pilot.left_motor().motion_commands().is_empty());
    }
}
