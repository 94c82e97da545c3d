//! Motor capability for two-wheeled robots.
//!
//! [`Motor`] is the contract a drive controller relies on: encoder angle and
//! speed readings, velocity and relative-position commands, active stops,
//! blocking waits and an acceleration limit. Concrete drivers implement it;
//! [`SimMotor`] and [`MockMotor`] are provided for simulation and tests.

pub mod devices;
pub mod traits;

pub use devices::mock::{Command, MockMotor, MockMotorError};
pub use devices::sim::{SimMotor, SimMotorConfig, SimMotorError};
pub use traits::motor::{
    DEFAULT_ACCELERATION, LARGE_MOTOR_MAX_SPEED, MEDIUM_MOTOR_MAX_SPEED, Motor, MotorState, Movement,
    StopBehavior,
};
