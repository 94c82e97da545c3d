#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur during geometric
//! conversions, steering calculations and pose updates.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid wheel diameter.
    /// This variant is returned when a wheel diameter is provided that is not positive.
    InvalidWheelDiameter(&'static str),
    /// Error for invalid axle width.
    /// This variant is returned when an axle width is provided that is not positive.
    InvalidAxleWidth(&'static str),
    /// Error for negative time delta.
    /// This variant is returned when a negative time delta is used for pose updates.
    NegativeTimeDelta(&'static str),
    /// Error for an arc whose heading never changes.
    /// Returned when both wheels turn at the same speed, so no traversal time
    /// can reach the requested heading change.
    DegenerateArc(&'static str),
    /// Error for a NaN or infinite input value.
    NonFinite(&'static str),
    /// Error for a wheel rotation too large for a whole-degree motor command.
    OutOfRange(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidWheelDiameter(msg) => write!(f, "Invalid wheel diameter: {}", msg),
            KinematicsError::InvalidAxleWidth(msg) => write!(f, "Invalid axle width: {}", msg),
            KinematicsError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
            KinematicsError::DegenerateArc(msg) => write!(f, "Degenerate arc: {}", msg),
            KinematicsError::NonFinite(msg) => write!(f, "Non-finite value: {}", msg),
            KinematicsError::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
