use core::fmt;

use tandem_kinematics::KinematicsError;

/// Which wheel a motor drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Tags a motor error with this side.
    pub(crate) fn wrap<E>(self) -> impl FnOnce(E) -> PilotError<E> {
        move |source| PilotError::Motor { side: self, source }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Errors returned by [`crate::Pilot`].
///
/// `E` is the error type of the motor driver. Motor failures are passed
/// through untouched apart from the side they came from.
#[derive(Debug, thiserror::Error)]
pub enum PilotError<E> {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("kinematics: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("{side} motor: {source}")]
    Motor {
        side: Side,
        #[source]
        source: E,
    },
}

pub type PilotResult<T, E> = Result<T, PilotError<E>>;
