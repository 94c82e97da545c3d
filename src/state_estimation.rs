use tandem_kinematics::{KinematicsError, Pose, WheelGeometry, WheelSpeeds};

/// Dead-reckons a world pose from successive encoder readings.
///
/// Display only; the estimate is never fed back into control.
pub struct OdometryEstimator {
    geometry: WheelGeometry,
    pose: Pose,
    last: Option<(i32, i32)>,
}

impl OdometryEstimator {
    pub fn new(geometry: WheelGeometry) -> Self {
        Self { geometry, pose: Pose::default(), last: None }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Folds in new encoder angles (deg). The first reading only sets the baseline.
    pub fn update(&mut self, left_deg: i32, right_deg: i32) -> Result<Pose, KinematicsError> {
        if let Some((last_left, last_right)) = self.last {
            let delta = WheelSpeeds::new(
                f64::from(left_deg - last_left),
                f64::from(right_deg - last_right),
            );
            // Encoder deltas over one unit step are a displacement.
            self.pose = self.geometry.update_pose_from_wheel_speeds(self.pose, delta, 1.0)?;
        }
        self.last = Some((left_deg, right_deg));
        Ok(self.pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_straight_line() {
        let geometry = WheelGeometry::new(56.0, 100.0).unwrap();
        let mut estimator = OdometryEstimator::new(geometry);
        estimator.update(100, -50).unwrap();
        let pose = estimator.update(460, 310).unwrap();
        assert!((pose.x - PI * 56.0).abs() < 1e-9);
        assert!(pose.y.abs() < 1e-9);
        assert_eq!(pose.theta, 0.0);
    }

    #[test]
    fn test_clockwise_point_turn() {
        let geometry = WheelGeometry::new(56.0, 100.0).unwrap();
        let mut estimator = OdometryEstimator::new(geometry);
        estimator.update(0, 0).unwrap();
        let wheel = geometry.rotation_to_wheel_deg(90.0).unwrap();
        let pose = estimator.update(wheel, -wheel).unwrap();
        assert!(pose.x.abs() < 1e-9);
        // Clockwise is negative in the world frame.
        assert!((pose.theta + PI / 2.0).abs() < 0.01);
    }
}
