use std::time::Duration;

/// Top speed of a large motor (deg/s).
pub const LARGE_MOTOR_MAX_SPEED: i32 = 1050;

/// Top speed of a medium motor (deg/s).
pub const MEDIUM_MOTOR_MAX_SPEED: i32 = 1560;

/// Default angular acceleration limit of a motor (deg/s²).
pub const DEFAULT_ACCELERATION: u32 = 6000;

/// What a motor does once a position move reaches its target.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBehavior {
    /// Cut power and let the wheel roll out.
    #[default]
    Coast = 0,
    /// Short the windings to stop quickly without holding position.
    Brake = 1,
    /// Actively hold the target angle.
    Hold = 2,
}

/// How a wait for a position move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// The motor reached its target (or had nothing to do).
    Finished,
    /// The timeout elapsed first. The motor keeps moving.
    TimedOut,
}

/// A snapshot of a motor's readings.
///
/// Gathered in one call so loggers and estimators can read both encoder
/// values and the configured limit together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorState {
    /// Cumulative signed rotation since the last hardware reset (deg).
    pub angle: i32,
    /// Instantaneous signed angular velocity (deg/s).
    pub speed: i32,
    /// Angular acceleration limit (deg/s²).
    pub acceleration: u32,
}

/// A single closed-loop actuator.
///
/// Implementors already regulate speed and position and enforce the
/// acceleration limit themselves; callers only issue targets.
/// Units are degrees, degrees/second and degrees/second².
pub trait Motor {
    /// Failure reported by the motor driver.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Block until the motor has completed its startup and calibration.
    fn wait_until_ready(&mut self) -> Result<(), Self::Error>;

    /// Cumulative signed rotation since the last hardware reset.
    fn current_angle(&self) -> Result<i32, Self::Error>;

    /// Instantaneous signed angular velocity.
    fn current_speed(&self) -> Result<i32, Self::Error>;

    /// Enter velocity mode and run at `speed` until told otherwise.
    fn run_at_speed(&mut self, speed: i32) -> Result<(), Self::Error>;

    /// Enter position mode and turn by `delta` degrees.
    ///
    /// The direction comes from the sign of `delta`; only the magnitude of
    /// `speed` is used.
    fn rotate_by_angle(&mut self, delta: i32, speed: i32, stop: StopBehavior) -> Result<(), Self::Error>;

    /// Active stop. Position is not held afterwards.
    fn brake(&mut self) -> Result<(), Self::Error>;

    /// Active stop that holds position.
    ///
    /// Drivers without position holding fall back to [`Motor::brake`].
    fn hold(&mut self) -> Result<(), Self::Error> {
        self.brake()
    }

    /// Block until the current position move finishes or `timeout` elapses.
    ///
    /// `None` waits indefinitely. A timeout only stops the waiting, never the motor.
    fn wait_for_movement(&mut self, timeout: Option<Duration>) -> Result<Movement, Self::Error>;

    /// Angular acceleration limit.
    fn acceleration(&self) -> Result<u32, Self::Error>;

    /// Set the angular acceleration limit.
    fn set_acceleration(&mut self, acceleration: u32) -> Result<(), Self::Error>;

    /// Read angle, speed and acceleration limit together.
    fn state(&self) -> Result<MotorState, Self::Error> {
        Ok(MotorState {
            angle: self.current_angle()?,
            speed: self.current_speed()?,
            acceleration: self.acceleration()?,
        })
    }
}

/// Lets a caller keep ownership of its motors and lend them out.
impl<M: Motor + ?Sized> Motor for &mut M {
    type Error = M::Error;

    fn wait_until_ready(&mut self) -> Result<(), Self::Error> {
        (**self).wait_until_ready()
    }

    fn current_angle(&self) -> Result<i32, Self::Error> {
        (**self).current_angle()
    }

    fn current_speed(&self) -> Result<i32, Self::Error> {
        (**self).current_speed()
    }

    fn run_at_speed(&mut self, speed: i32) -> Result<(), Self::Error> {
        (**self).run_at_speed(speed)
    }

    fn rotate_by_angle(&mut self, delta: i32, speed: i32, stop: StopBehavior) -> Result<(), Self::Error> {
        (**self).rotate_by_angle(delta, speed, stop)
    }

    fn brake(&mut self) -> Result<(), Self::Error> {
        (**self).brake()
    }

    fn hold(&mut self) -> Result<(), Self::Error> {
        (**self).hold()
    }

    fn wait_for_movement(&mut self, timeout: Option<Duration>) -> Result<Movement, Self::Error> {
        (**self).wait_for_movement(timeout)
    }

    fn acceleration(&self) -> Result<u32, Self::Error> {
        (**self).acceleration()
    }

    fn set_acceleration(&mut self, acceleration: u32) -> Result<(), Self::Error> {
        (**self).set_acceleration(acceleration)
    }
}
