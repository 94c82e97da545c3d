#[cfg(feature = "serde")]
use serde::Deserialize;

/// Base wheel speed used when none is configured (deg/s).
pub const DEFAULT_SPEED: f64 = 400.0;

/// Physical description of a robot body and its starting base speed.
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PilotConfig {
    /// Drive wheel diameter (mm).
    pub wheel_diameter_mm: f64,
    /// Distance between the drive wheels (mm).
    pub axle_width_mm: f64,
    /// The robot is mounted backwards; flips what "forward" means everywhere.
    pub reverse: bool,
    /// Base wheel speed (deg/s).
    pub speed: f64,
}

impl Default for PilotConfig {
    fn default() -> Self {
        PilotConfig {
            wheel_diameter_mm: 56.0,
            axle_width_mm: 100.0,
            reverse: false,
            speed: DEFAULT_SPEED,
        }
    }
}
