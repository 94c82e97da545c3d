#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for two-wheeled differential-drive geometry."]
#![doc = ""]
#![doc = "This crate converts between linear travel and wheel rotation, plans in-place"]
#![doc = "rotations and steered arcs, reconstructs heading from encoder readings, and"]
#![doc = "integrates an odometric pose from wheel motion."]

use core::f64::consts::PI;
use core::fmt;
use libm::{cos, fabs, round, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod steering;

pub use error::KinematicsError;
pub use steering::{ArcTravel, MAX_TURN_RATE, clamp_turn_rate, speed_ratio};

/// Rounds a wheel rotation or speed to the nearest whole degree.
///
/// # Errors
///
/// Returns `Err(KinematicsError::NonFinite)` for NaN or infinite input and
/// `Err(KinematicsError::OutOfRange)` if the rounded magnitude exceeds
/// `i32::MAX`. The accepted range is symmetric, so the result can always be
/// negated.
pub fn whole_degrees(value: f64) -> Result<i32, KinematicsError> {
    if !value.is_finite() {
        return Err(KinematicsError::NonFinite("wheel degrees"));
    }
    let rounded = round(value);
    if fabs(rounded) > i32::MAX as f64 {
        return Err(KinematicsError::OutOfRange("wheel degrees exceed the motor command range"));
    }
    Ok(rounded as i32)
}

/// A 2‑D pose `(x, y, θ)` in millimeters and radians (θ measured counter‑clockwise
/// from the x‑axis in the world frame).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position (mm).
    pub x: f64,
    /// World‑frame y position (mm).
    pub y: f64,
    /// Heading (rad), normalized to `[-PI, PI)`.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in millimeters.
    /// * `y`: World-frame y position in millimeters.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.1} mm, y: {:.1} mm, θ: {:.3} rad)", self.x, self.y, self.theta)
    }
}

/// Left and right wheel angular velocities.
///
/// Signed; positive values drive the robot forward.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Left wheel angular velocity (deg/s).
    pub left: f64,
    /// Right wheel angular velocity (deg/s).
    pub right: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds.
    ///
    /// # Arguments
    ///
    /// * `left`: Left wheel angular velocity (deg/s).
    /// * `right`: Right wheel angular velocity (deg/s).
    pub const fn new(left: f64, right: f64) -> Self {
        WheelSpeeds { left, right }
    }

    /// Both wheel speeds with their signs flipped.
    pub fn negated(self) -> Self {
        WheelSpeeds::new(-self.left, -self.right)
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(L: {:.1} deg/s, R: {:.1} deg/s)", self.left, self.right)
    }
}

/// Linear and angular chassis velocities.
/// These represent the overall motion of the robot's chassis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Linear speed of the chassis center (mm/s).
    pub v: f64,
    /// Angular speed of the chassis (rad/s), counter-clockwise positive.
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    ///
    /// # Arguments
    ///
    /// * `v`: Linear speed of the chassis center (mm/s).
    /// * `omega`: Angular speed of the chassis (rad/s).
    pub const fn new(v: f64, omega: f64) -> Self {
        ChassisSpeeds { v, omega }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.1} mm/s, ω: {:.3} rad/s)", self.v, self.omega)
    }
}

/// Physical dimensions of a two-wheeled differential-drive body.
///
/// Both values are fixed for the life of a robot body and are validated on
/// construction, so every conversion below can divide by them freely.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    /// Wheel diameter (mm).
    wheel_diameter_mm: f64,
    /// Distance between the two wheel contact points (mm).
    axle_width_mm: f64,
}

impl WheelGeometry {
    /// Construct a new wheel geometry.
    ///
    /// # Arguments
    ///
    /// * `wheel_diameter_mm`: The diameter of the drive wheels in millimeters.
    /// * `axle_width_mm`: The distance between the two drive wheels in millimeters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidWheelDiameter)` if `wheel_diameter_mm` is not a positive finite number.
    /// Returns `Err(KinematicsError::InvalidAxleWidth)` if `axle_width_mm` is not a positive finite number.
    pub fn new(wheel_diameter_mm: f64, axle_width_mm: f64) -> Result<Self, KinematicsError> {
        if !(wheel_diameter_mm > 0.0 && wheel_diameter_mm.is_finite()) {
            return Err(KinematicsError::InvalidWheelDiameter(
                "must be positive and finite",
            ));
        }
        if !(axle_width_mm > 0.0 && axle_width_mm.is_finite()) {
            return Err(KinematicsError::InvalidAxleWidth(
                "must be positive and finite",
            ));
        }
        Ok(WheelGeometry {
            wheel_diameter_mm,
            axle_width_mm,
        })
    }

    /// Returns the wheel diameter.
    pub fn wheel_diameter_mm(&self) -> f64 {
        self.wheel_diameter_mm
    }

    /// Returns the axle width.
    pub fn axle_width_mm(&self) -> f64 {
        self.axle_width_mm
    }

    /// Linear distance covered by one degree of wheel rotation (mm/deg).
    pub fn mm_per_deg(&self) -> f64 {
        PI * self.wheel_diameter_mm / 360.0
    }

    /// Converts a linear distance to a wheel rotation command.
    ///
    /// The result is rounded to the nearest whole degree, which is the
    /// granularity motors accept for position commands.
    ///
    /// # Arguments
    ///
    /// * `mm`: Signed linear distance in millimeters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::OutOfRange)` if the rotation does not fit
    /// an `i32`, and `Err(KinematicsError::NonFinite)` for NaN or infinite input.
    pub fn mm_to_deg(&self, mm: f64) -> Result<i32, KinematicsError> {
        whole_degrees(mm * 360.0 / (PI * self.wheel_diameter_mm))
    }

    /// Converts a wheel rotation to the linear distance it covers.
    ///
    /// Exact inverse of [`WheelGeometry::mm_to_deg`] without the rounding.
    pub fn deg_to_mm(&self, deg: f64) -> f64 {
        deg * PI * self.wheel_diameter_mm / 360.0
    }

    /// Arc length each wheel traces when the body turns `angle_deg` in place.
    ///
    /// Each wheel rides a circle of radius `axle_width / 2` around the
    /// center of the axle.
    pub fn rotation_arc_mm(&self, angle_deg: f64) -> f64 {
        (angle_deg / 360.0) * PI * self.axle_width_mm
    }

    /// Wheel rotation, in whole degrees, needed to turn the body `angle_deg` in place.
    pub fn rotation_to_wheel_deg(&self, angle_deg: f64) -> Result<i32, KinematicsError> {
        self.mm_to_deg(self.rotation_arc_mm(angle_deg))
    }

    /// Body heading change for a given difference between the left and right
    /// wheels' accumulated rotation.
    ///
    /// This inverts [`WheelGeometry::rotation_to_wheel_deg`]: an in-place turn
    /// of `θ` moves the wheels `+d` and `-d`, so the difference is `2d` and
    /// `θ = 2d · wheel_diameter / (2 · axle_width)`.
    ///
    /// # Arguments
    ///
    /// * `wheel_difference_deg`: Left minus right accumulated wheel rotation (deg).
    ///
    /// # Returns
    ///
    /// The body heading change in degrees, clockwise positive.
    pub fn heading_deg(&self, wheel_difference_deg: f64) -> f64 {
        wheel_difference_deg * self.wheel_diameter_mm / (2.0 * self.axle_width_mm)
    }

    /// Calculates the robot's chassis speeds (linear and angular velocity)
    /// from the wheel speeds. This is the forward kinematics problem.
    ///
    /// # Arguments
    ///
    /// * `wheel_speeds`: The measured or commanded angular velocities of the left and right wheels.
    ///
    /// # Returns
    ///
    /// The resulting linear (mm/s) and angular (rad/s, counter-clockwise positive) velocities.
    pub fn forward_kinematics(&self, wheel_speeds: WheelSpeeds) -> ChassisSpeeds {
        let v_l = self.deg_to_mm(wheel_speeds.left);
        let v_r = self.deg_to_mm(wheel_speeds.right);

        let v = (v_r + v_l) / 2.0;
        let omega = (v_r - v_l) / self.axle_width_mm;

        ChassisSpeeds::new(v, omega)
    }

    /// Updates the robot's pose given its current pose, chassis speeds, and time delta.
    ///
    /// Integrates the chassis speeds over `dt` using the heading at the middle
    /// of the interval, which keeps large steps along an arc close to the true
    /// path. The final heading is normalized to `[-PI, PI)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative.
    pub fn update_pose(
        &self,
        current_pose: Pose,
        chassis_speeds: ChassisSpeeds,
        dt: f64,
    ) -> Result<Pose, KinematicsError> {
        if dt < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta(
                "must be non-negative",
            ));
        }

        let delta_theta = chassis_speeds.omega * dt;
        let mid_theta = current_pose.theta + delta_theta / 2.0;
        let delta_x = chassis_speeds.v * cos(mid_theta) * dt;
        let delta_y = chassis_speeds.v * sin(mid_theta) * dt;

        Ok(Pose {
            x: current_pose.x + delta_x,
            y: current_pose.y + delta_y,
            theta: Pose::normalize_angle(current_pose.theta + delta_theta),
        })
    }

    /// Convenience function to update pose directly from wheel speeds and dt.
    ///
    /// Passing encoder deltas (deg) with `dt = 1.0` integrates a displacement.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative (propagated from `update_pose`).
    pub fn update_pose_from_wheel_speeds(
        &self,
        current_pose: Pose,
        wheel_speeds: WheelSpeeds,
        dt: f64,
    ) -> Result<Pose, KinematicsError> {
        let chassis_speeds = self.forward_kinematics(wheel_speeds);
        self.update_pose(current_pose, chassis_speeds, dt)
    }
}

impl fmt::Display for WheelGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WheelGeometry (d: {:.1} mm, axle: {:.1} mm)",
            self.wheel_diameter_mm, self.axle_width_mm
        )
    }
}
