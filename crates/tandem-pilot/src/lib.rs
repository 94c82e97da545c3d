//! Open-loop motion control for a two-wheeled differential-drive robot.
//!
//! A [`Pilot`] owns (or borrows) a left and a right [`tandem_motor::Motor`]
//! and turns motion intents into per-wheel commands:
//!
//! * [`Pilot::forward`] / [`Pilot::backward`]: run until stopped.
//! * [`Pilot::travel`]: a bounded straight line.
//! * [`Pilot::rotate`]: an in-place turn.
//! * [`Pilot::steer`]: a curved path, bounded by a heading change or not.
//!
//! Heading is estimated from the difference of the wheels' accumulated
//! rotation ([`Pilot::angle`]). All calls are synchronous; the only blocking
//! points are the optional waits for a bounded move to finish.

mod config;
mod error;
mod pilot;

pub use config::{DEFAULT_SPEED, PilotConfig};
pub use error::{PilotError, PilotResult, Side};
pub use pilot::{Acceleration, Completion, Motion, Pilot};
