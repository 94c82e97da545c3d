//! Arc steering.
//!
//! A turn rate in `[-200, 200]` selects how much the inner wheel slows down
//! relative to the outer one: `0` drives straight, `±100` stops the inner
//! wheel, `±200` runs it in full reverse for a point turn. Positive rates
//! steer left.

use libm::fabs;

use crate::{KinematicsError, WheelGeometry, WheelSpeeds};

/// Largest accepted turn-rate magnitude; anything beyond is clamped.
pub const MAX_TURN_RATE: f64 = 200.0;

/// Clamp a turn rate into `[-MAX_TURN_RATE, MAX_TURN_RATE]`.
pub fn clamp_turn_rate(turn_rate: f64) -> f64 {
    turn_rate.clamp(-MAX_TURN_RATE, MAX_TURN_RATE)
}

/// Inner-to-outer wheel speed ratio for a turn rate.
///
/// Falls linearly from `1` at rate `0` to `0` at rate `100`, then on to `-1`
/// at rate `200`. The sign of `turn_rate` is ignored.
pub fn speed_ratio(turn_rate: f64) -> f64 {
    let magnitude = fabs(clamp_turn_rate(turn_rate));
    if magnitude <= 100.0 {
        1.0 - magnitude / 100.0
    } else {
        -(magnitude - 100.0) / 100.0
    }
}

impl WheelSpeeds {
    /// Wheel speeds for steering at `turn_rate` with the outer wheel at `base_speed`.
    ///
    /// The inner wheel (left for positive rates, right for negative ones)
    /// runs at `base_speed * speed_ratio(turn_rate)`.
    pub fn steer(base_speed: f64, turn_rate: f64) -> WheelSpeeds {
        let turn_rate = clamp_turn_rate(turn_rate);
        let inner = base_speed * speed_ratio(turn_rate);
        if turn_rate > 0.0 {
            WheelSpeeds::new(inner, base_speed)
        } else {
            WheelSpeeds::new(base_speed, inner)
        }
    }
}

/// Per-wheel rotation targets for a bounded arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcTravel {
    /// Left wheel rotation (whole degrees, signed).
    pub left_deg: i32,
    /// Right wheel rotation (whole degrees, signed).
    pub right_deg: i32,
    /// Time the arc takes at the given wheel speeds (s).
    pub duration_s: f64,
}

impl WheelGeometry {
    /// Plans the wheel rotations that turn the body by `angle_deg` while the
    /// wheels keep the ratio of `speeds`.
    ///
    /// The body's angular velocity is `ω = (v_r - v_l) / axle_width`; the arc
    /// takes `t = radians(angle_deg) / |ω|`, and each wheel covers its own
    /// linear speed times `t`. A negative `angle_deg` runs the same arc backwards.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NonFinite)` if `angle_deg` is NaN or infinite.
    /// Returns `Err(KinematicsError::DegenerateArc)` if both wheel speeds are equal.
    /// Returns `Err(KinematicsError::OutOfRange)` if a wheel target does not fit a motor command.
    pub fn arc_travel(&self, speeds: WheelSpeeds, angle_deg: f64) -> Result<ArcTravel, KinematicsError> {
        if !angle_deg.is_finite() {
            return Err(KinematicsError::NonFinite("arc heading change"));
        }

        let mm_per_deg = self.mm_per_deg();
        let v_l = speeds.left * mm_per_deg;
        let v_r = speeds.right * mm_per_deg;

        let omega = (v_r - v_l) / self.axle_width_mm();
        if omega == 0.0 {
            return Err(KinematicsError::DegenerateArc("wheel speeds are equal"));
        }

        let t = angle_deg.to_radians() / fabs(omega);

        Ok(ArcTravel {
            left_deg: self.mm_to_deg(v_l * t)?,
            right_deg: self.mm_to_deg(v_r * t)?,
            duration_s: fabs(t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    fn brick() -> WheelGeometry {
        WheelGeometry::new(56.0, 100.0).unwrap()
    }

    #[test]
    fn test_clamp_turn_rate() {
        assert_eq!(clamp_turn_rate(350.0), 200.0);
        assert_eq!(clamp_turn_rate(-1000.0), -200.0);
        assert_eq!(clamp_turn_rate(42.0), 42.0);
    }

    #[test]
    fn test_speed_ratio_breakpoints() {
        assert!((speed_ratio(0.0) - 1.0).abs() < EPSILON);
        assert!((speed_ratio(50.0) - 0.5).abs() < EPSILON);
        assert!((speed_ratio(-50.0) - 0.5).abs() < EPSILON);
        assert_eq!(speed_ratio(100.0), 0.0);
        assert!((speed_ratio(150.0) - -0.5).abs() < EPSILON);
        assert!((speed_ratio(200.0) - -1.0).abs() < EPSILON);
        assert!((speed_ratio(900.0) - -1.0).abs() < EPSILON);
    }

    #[test]
    fn test_steer_straight() {
        assert_eq!(WheelSpeeds::steer(400.0, 0.0), WheelSpeeds::new(400.0, 400.0));
    }

    #[test]
    fn test_steer_left_slows_left_wheel() {
        assert_eq!(WheelSpeeds::steer(400.0, 50.0), WheelSpeeds::new(200.0, 400.0));
        assert_eq!(WheelSpeeds::steer(400.0, 100.0), WheelSpeeds::new(0.0, 400.0));
    }

    #[test]
    fn test_steer_right_slows_right_wheel() {
        assert_eq!(WheelSpeeds::steer(400.0, -50.0), WheelSpeeds::new(400.0, 200.0));
        assert_eq!(WheelSpeeds::steer(400.0, -100.0), WheelSpeeds::new(400.0, 0.0));
    }

    #[test]
    fn test_steer_point_turn() {
        let speeds = WheelSpeeds::steer(400.0, 200.0);
        assert_eq!(speeds.left, -speeds.right);
        let speeds = WheelSpeeds::steer(400.0, -250.0);
        assert_eq!(speeds, WheelSpeeds::new(400.0, -400.0));
    }

    #[test]
    fn test_arc_travel_gentle_left() {
        // v_l = 200 deg/s, v_r = 400 deg/s. Left covers 90deg of heading on a
        // radius of 50 mm, right on 100 mm.
        let arc = brick().arc_travel(WheelSpeeds::new(200.0, 400.0), 90.0).unwrap();
        assert_eq!(arc.left_deg, 321);
        assert_eq!(arc.right_deg, 643);
        assert!(arc.duration_s > 1.6 && arc.duration_s < 1.61);
    }

    #[test]
    fn test_arc_travel_point_turn_matches_rotation() {
        let geometry = brick();
        let arc = geometry.arc_travel(WheelSpeeds::new(-400.0, 400.0), 90.0).unwrap();
        assert_eq!(arc.left_deg, -geometry.rotation_to_wheel_deg(90.0).unwrap());
        assert_eq!(arc.right_deg, geometry.rotation_to_wheel_deg(90.0).unwrap());
    }

    #[test]
    fn test_arc_travel_negative_angle_runs_backwards() {
        let arc = brick().arc_travel(WheelSpeeds::new(200.0, 400.0), -90.0).unwrap();
        assert_eq!(arc.left_deg, -321);
        assert_eq!(arc.right_deg, -643);
    }

    #[test]
    fn test_arc_travel_pivot_on_stationary_wheel() {
        let arc = brick().arc_travel(WheelSpeeds::new(0.0, 400.0), 45.0).unwrap();
        assert_eq!(arc.left_deg, 0);
        assert!(arc.right_deg > 0);
    }

    #[test]
    fn test_arc_travel_degenerate() {
        let result = brick().arc_travel(WheelSpeeds::new(400.0, 400.0), 90.0);
        assert!(matches!(result, Err(KinematicsError::DegenerateArc(_))));
    }

    #[test]
    fn test_arc_travel_non_finite_angle() {
        let result = brick().arc_travel(WheelSpeeds::new(200.0, 400.0), f64::NAN);
        assert!(matches!(result, Err(KinematicsError::NonFinite(_))));
    }
}
