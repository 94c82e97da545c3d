//! Time-based simulated motor.
//!
//! Motion is modeled at constant speed from the moment a command is issued.
//! The acceleration limit is stored and reported but does not shape the
//! profile. `time_scale` speeds up simulated time relative to the wall clock.

use std::time::{Duration, Instant};

use serde::Deserialize;
use spin_sleep::SpinSleeper;
use tracing::{debug, trace};

use crate::traits::motor::{DEFAULT_ACCELERATION, Motor, Movement, StopBehavior};

#[derive(Debug, thiserror::Error)]
pub enum SimMotorError {
    #[error("{0} motor is still starting up")]
    NotReady(String),

    #[error("{0} motor is running at constant speed; waiting on it needs a timeout")]
    Unbounded(String),

    #[error("acceleration limit must be positive")]
    InvalidAcceleration,

    #[error("time scale must be positive and finite, got {0}")]
    InvalidTimeScale(f64),
}

/// Parameters of a simulated motor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimMotorConfig {
    /// Time from construction until the motor accepts commands (ms).
    pub startup_ms: u64,
    /// Initial acceleration limit (deg/s²).
    pub acceleration: u32,
    /// Simulated seconds per wall-clock second.
    pub time_scale: f64,
}

impl Default for SimMotorConfig {
    fn default() -> Self {
        SimMotorConfig {
            startup_ms: 100,
            acceleration: DEFAULT_ACCELERATION,
            time_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    Velocity { speed: f64 },
    Position { target: f64, speed: f64 },
}

pub struct SimMotor {
    name: String,
    config: SimMotorConfig,
    created: Instant,
    mode: Mode,
    origin_angle: f64,
    command_start: Instant,
    acceleration: u32,
    sleeper: SpinSleeper,
}

impl SimMotor {
    pub fn new(name: impl Into<String>, config: SimMotorConfig) -> Result<Self, SimMotorError> {
        if !(config.time_scale > 0.0 && config.time_scale.is_finite()) {
            return Err(SimMotorError::InvalidTimeScale(config.time_scale));
        }
        if config.acceleration == 0 {
            return Err(SimMotorError::InvalidAcceleration);
        }
        let now = Instant::now();
        let acceleration = config.acceleration;
        Ok(Self {
            name: name.into(),
            config,
            created: now,
            mode: Mode::Idle,
            origin_angle: 0.0,
            command_start: now,
            acceleration,
            sleeper: SpinSleeper::new(10_000),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn startup(&self) -> Duration {
        Duration::from_millis(self.config.startup_ms)
    }

    fn is_ready(&self) -> bool {
        self.created.elapsed() >= self.startup()
    }

    fn ensure_ready(&self) -> Result<(), SimMotorError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(SimMotorError::NotReady(self.name.clone()))
        }
    }

    /// Simulated seconds since the current command was issued.
    fn elapsed_s(&self) -> f64 {
        self.command_start.elapsed().as_secs_f64() * self.config.time_scale
    }

    fn angle_now(&self) -> f64 {
        match self.mode {
            Mode::Idle => self.origin_angle,
            Mode::Velocity { speed } => self.origin_angle + speed * self.elapsed_s(),
            Mode::Position { target, speed } => {
                let distance = target - self.origin_angle;
                let travelled = speed.abs() * self.elapsed_s();
                if travelled >= distance.abs() {
                    target
                } else {
                    self.origin_angle + distance.signum() * travelled
                }
            }
        }
    }

    fn speed_now(&self) -> f64 {
        match self.mode {
            Mode::Idle => 0.0,
            Mode::Velocity { speed } => speed,
            Mode::Position { target, speed } => {
                let remaining = target - self.angle_now();
                if remaining.abs() < 0.5 { 0.0 } else { remaining.signum() * speed.abs() }
            }
        }
    }

    /// Wall-clock time left until the current position move completes, or
    /// `None` if the motor will never finish on its own.
    fn remaining(&self) -> Option<Duration> {
        match self.mode {
            Mode::Idle => Some(Duration::ZERO),
            Mode::Velocity { speed } if speed == 0.0 => Some(Duration::ZERO),
            Mode::Velocity { .. } => None,
            Mode::Position { target, speed } => {
                let left = (target - self.angle_now()).abs();
                if left == 0.0 {
                    Some(Duration::ZERO)
                } else if speed == 0.0 {
                    None
                } else {
                    let wall_s = left / speed.abs() / self.config.time_scale;
                    // Moves longer than `Duration::MAX` saturate.
                    Some(Duration::try_from_secs_f64(wall_s).unwrap_or(Duration::MAX))
                }
            }
        }
    }

    /// Freezes the current position as the origin of a new command.
    fn begin(&mut self, mode: Mode) {
        self.origin_angle = self.angle_now();
        self.command_start = Instant::now();
        self.mode = mode;
    }
}

impl Motor for SimMotor {
    type Error = SimMotorError;

    fn wait_until_ready(&mut self) -> Result<(), Self::Error> {
        let startup = self.startup();
        let elapsed = self.created.elapsed();
        if elapsed < startup {
            self.sleeper.sleep(startup - elapsed);
        }
        debug!(motor = %self.name, "ready");
        Ok(())
    }

    fn current_angle(&self) -> Result<i32, Self::Error> {
        Ok(self.angle_now().round() as i32)
    }

    fn current_speed(&self) -> Result<i32, Self::Error> {
        Ok(self.speed_now().round() as i32)
    }

    fn run_at_speed(&mut self, speed: i32) -> Result<(), Self::Error> {
        self.ensure_ready()?;
        trace!(motor = %self.name, speed, "run at speed");
        self.begin(Mode::Velocity { speed: speed as f64 });
        Ok(())
    }

    fn rotate_by_angle(&mut self, delta: i32, speed: i32, _stop: StopBehavior) -> Result<(), Self::Error> {
        self.ensure_ready()?;
        trace!(motor = %self.name, delta, speed, "rotate by angle");
        let target = self.angle_now().round() + delta as f64;
        self.begin(Mode::Position { target, speed: speed as f64 });
        Ok(())
    }

    fn brake(&mut self) -> Result<(), Self::Error> {
        self.begin(Mode::Idle);
        Ok(())
    }

    fn wait_for_movement(&mut self, timeout: Option<Duration>) -> Result<Movement, Self::Error> {
        match (self.remaining(), timeout) {
            (Some(left), Some(limit)) if limit < left => {
                self.sleeper.sleep(limit);
                Ok(Movement::TimedOut)
            }
            (Some(left), _) => {
                self.sleeper.sleep(left);
                if let Mode::Position { target, .. } = self.mode {
                    self.origin_angle = target;
                    self.command_start = Instant::now();
                    self.mode = Mode::Idle;
                }
                Ok(Movement::Finished)
            }
            (None, Some(limit)) => {
                self.sleeper.sleep(limit);
                Ok(Movement::TimedOut)
            }
            (None, None) => Err(SimMotorError::Unbounded(self.name.clone())),
        }
    }

    fn acceleration(&self) -> Result<u32, Self::Error> {
        Ok(self.acceleration)
    }

    fn set_acceleration(&mut self, acceleration: u32) -> Result<(), Self::Error> {
        if acceleration == 0 {
            return Err(SimMotorError::InvalidAcceleration);
        }
        self.acceleration = acceleration;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> SimMotorConfig {
        SimMotorConfig {
            startup_ms: 0,
            acceleration: DEFAULT_ACCELERATION,
            time_scale: 1000.0,
        }
    }

    #[test]
    fn test_not_ready_rejects_commands() {
        let config = SimMotorConfig { startup_ms: 60_000, ..fast() };
        let mut motor = SimMotor::new("left", config).unwrap();
        assert!(matches!(motor.run_at_speed(100), Err(SimMotorError::NotReady(_))));
    }

    #[test]
    fn test_position_move_reaches_target() {
        let mut motor = SimMotor::new("left", fast()).unwrap();
        motor.wait_until_ready().unwrap();
        motor.rotate_by_angle(-360, 720, StopBehavior::Coast).unwrap();
        assert_eq!(motor.wait_for_movement(None).unwrap(), Movement::Finished);
        assert_eq!(motor.current_angle().unwrap(), -360);
        assert_eq!(motor.current_speed().unwrap(), 0);
    }

    #[test]
    fn test_wait_times_out_without_stopping() {
        let config = SimMotorConfig { time_scale: 1.0, ..fast() };
        let mut motor = SimMotor::new("right", config).unwrap();
        motor.rotate_by_angle(3600, 100, StopBehavior::Coast).unwrap();
        let outcome = motor.wait_for_movement(Some(Duration::from_millis(5))).unwrap();
        assert_eq!(outcome, Movement::TimedOut);
        assert_eq!(motor.current_speed().unwrap(), 100);
    }

    #[test]
    fn test_unbounded_wait_needs_timeout() {
        let mut motor = SimMotor::new("left", fast()).unwrap();
        motor.run_at_speed(400).unwrap();
        assert!(matches!(motor.wait_for_movement(None), Err(SimMotorError::Unbounded(_))));
        let outcome = motor.wait_for_movement(Some(Duration::from_millis(1))).unwrap();
        assert_eq!(outcome, Movement::TimedOut);
        assert!(motor.current_angle().unwrap() > 0);
    }

    #[test]
    fn test_brake_freezes_angle() {
        let mut motor = SimMotor::new("left", fast()).unwrap();
        motor.run_at_speed(-400).unwrap();
        motor.wait_for_movement(Some(Duration::from_millis(2))).unwrap();
        motor.brake().unwrap();
        let angle = motor.current_angle().unwrap();
        assert!(angle < 0);
        motor.wait_for_movement(Some(Duration::from_millis(2))).unwrap();
        assert_eq!(motor.current_angle().unwrap(), angle);
        assert_eq!(motor.current_speed().unwrap(), 0);
    }

    #[test]
    fn test_acceleration_limit() {
        let mut motor = SimMotor::new("left", fast()).unwrap();
        assert_eq!(motor.acceleration().unwrap(), DEFAULT_ACCELERATION);
        motor.set_acceleration(1500).unwrap();
        assert_eq!(motor.state().unwrap().acceleration, 1500);
        assert!(matches!(motor.set_acceleration(0), Err(SimMotorError::InvalidAcceleration)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        for time_scale in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let config = SimMotorConfig { time_scale, ..fast() };
            assert!(matches!(SimMotor::new("left", config), Err(SimMotorError::InvalidTimeScale(_))));
        }
        let config = SimMotorConfig { acceleration: 0, ..fast() };
        assert!(matches!(SimMotor::new("left", config), Err(SimMotorError::InvalidAcceleration)));
    }

    #[test]
    fn test_slow_time_scale_times_out() {
        let config = SimMotorConfig { time_scale: 1e-300, ..fast() };
        let mut motor = SimMotor::new("left", config).unwrap();
        motor.rotate_by_angle(90, 400, StopBehavior::Coast).unwrap();
        let outcome = motor.wait_for_movement(Some(Duration::from_millis(1))).unwrap();
        assert_eq!(outcome, Movement::TimedOut);
    }
}
