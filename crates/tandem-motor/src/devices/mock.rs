//! Recording motor for tests.
//!
//! Position moves complete instantly when waited on. Every call is logged so
//! tests can assert on the exact command sequence a controller produced.

use std::time::Duration;

use crate::traits::motor::{DEFAULT_ACCELERATION, Motor, Movement, StopBehavior};

/// A call received by a [`MockMotor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    WaitUntilReady,
    RunAtSpeed(i32),
    RotateByAngle { delta: i32, speed: i32, stop: StopBehavior },
    Brake,
    Hold,
    WaitForMovement(Option<Duration>),
    SetAcceleration(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum MockMotorError {
    #[error("motor disconnected")]
    Disconnected,
}

#[derive(Debug)]
pub struct MockMotor {
    commands: Vec<Command>,
    angle: i32,
    speed: i32,
    target: Option<i32>,
    acceleration: u32,
    stalled: bool,
    disconnected: bool,
}

impl Default for MockMotor {
    fn default() -> Self {
        MockMotor {
            commands: Vec::new(),
            angle: 0,
            speed: 0,
            target: None,
            acceleration: DEFAULT_ACCELERATION,
            stalled: false,
            disconnected: false,
        }
    }
}

impl MockMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A motor whose encoder already reads `angle`.
    pub fn at_angle(angle: i32) -> Self {
        MockMotor { angle, ..Self::default() }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Commands that move or stop the motor, without waits and setup calls.
    pub fn motion_commands(&self) -> Vec<Command> {
        self.commands
            .iter()
            .copied()
            .filter(|c| {
                matches!(
                    c,
                    Command::RunAtSpeed(_) | Command::RotateByAngle { .. } | Command::Brake | Command::Hold
                )
            })
            .collect()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Moves the encoder without a command, like a wheel pushed by hand.
    pub fn set_angle(&mut self, angle: i32) {
        self.angle = angle;
    }

    /// A stalled motor never reaches its position target.
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// Every following call fails with [`MockMotorError::Disconnected`].
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    fn check(&self) -> Result<(), MockMotorError> {
        if self.disconnected {
            Err(MockMotorError::Disconnected)
        } else {
            Ok(())
        }
    }

    fn record(&mut self, command: Command) -> Result<(), MockMotorError> {
        self.check()?;
        self.commands.push(command);
        Ok(())
    }
}

impl Motor for MockMotor {
    type Error = MockMotorError;

    fn wait_until_ready(&mut self) -> Result<(), Self::Error> {
        self.record(Command::WaitUntilReady)
    }

    fn current_angle(&self) -> Result<i32, Self::Error> {
        self.check()?;
        Ok(self.angle)
    }

    fn current_speed(&self) -> Result<i32, Self::Error> {
        self.check()?;
        Ok(self.speed)
    }

    fn run_at_speed(&mut self, speed: i32) -> Result<(), Self::Error> {
        self.record(Command::RunAtSpeed(speed))?;
        self.target = None;
        self.speed = speed;
        Ok(())
    }

    fn rotate_by_angle(&mut self, delta: i32, speed: i32, stop: StopBehavior) -> Result<(), Self::Error> {
        self.record(Command::RotateByAngle { delta, speed, stop })?;
        self.target = Some(self.angle + delta);
        self.speed = delta.signum() * speed.abs();
        Ok(())
    }

    fn brake(&mut self) -> Result<(), Self::Error> {
        self.record(Command::Brake)?;
        self.target = None;
        self.speed = 0;
        Ok(())
    }

    fn hold(&mut self) -> Result<(), Self::Error> {
        self.record(Command::Hold)?;
        self.target = None;
        self.speed = 0;
        Ok(())
    }

    fn wait_for_movement(&mut self, timeout: Option<Duration>) -> Result<Movement, Self::Error> {
        self.record(Command::WaitForMovement(timeout))?;
        match self.target {
            Some(_) if self.stalled => Ok(Movement::TimedOut),
            Some(target) => {
                self.angle = target;
                self.target = None;
                self.speed = 0;
                Ok(Movement::Finished)
            }
            None => Ok(Movement::Finished),
        }
    }

    fn acceleration(&self) -> Result<u32, Self::Error> {
        self.check()?;
        Ok(self.acceleration)
    }

    fn set_acceleration(&mut self, acceleration: u32) -> Result<(), Self::Error> {
        self.record(Command::SetAcceleration(acceleration))?;
        self.acceleration = acceleration;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_move_completes_on_wait() {
        let mut motor = MockMotor::at_angle(10);
        motor.rotate_by_angle(-30, 400, StopBehavior::Coast).unwrap();
        assert_eq!(motor.current_speed().unwrap(), -400);
        assert_eq!(motor.current_angle().unwrap(), 10);
        assert_eq!(motor.wait_for_movement(None).unwrap(), Movement::Finished);
        assert_eq!(motor.current_angle().unwrap(), -20);
        assert_eq!(motor.current_speed().unwrap(), 0);
    }

    #[test]
    fn test_stalled_motor_times_out() {
        let mut motor = MockMotor::new();
        motor.set_stalled(true);
        motor.rotate_by_angle(90, 200, StopBehavior::Coast).unwrap();
        let outcome = motor.wait_for_movement(Some(Duration::from_millis(50))).unwrap();
        assert_eq!(outcome, Movement::TimedOut);
        assert_eq!(motor.current_angle().unwrap(), 0);
    }

    #[test]
    fn test_lent_motor_records_on_owner() {
        fn drive<M: Motor>(mut motor: M) {
            motor.run_at_speed(100).unwrap();
            motor.wait_for_movement(None).unwrap();
            motor.hold().unwrap();
        }

        let mut motor = MockMotor::new();
        drive(&mut motor);
        assert_eq!(motor.commands().len(), 3);
        assert_eq!(motor.motion_commands(), vec![Command::RunAtSpeed(100), Command::Hold]);
    }

    #[test]
    fn test_disconnected_motor_fails() {
        let mut motor = MockMotor::new();
        motor.disconnect();
        assert!(matches!(motor.brake(), Err(MockMotorError::Disconnected)));
        assert!(matches!(motor.current_angle(), Err(MockMotorError::Disconnected)));
        assert!(motor.commands().is_empty());
    }
}
