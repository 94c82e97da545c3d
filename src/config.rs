use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tandem_motor::SimMotorConfig;
use tandem_pilot::PilotConfig;
use tracing::{error, info};

use crate::routine::Maneuver;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub pilot: PilotConfig,
    #[serde(default)]
    pub motor: SimMotorConfig,
    #[serde(default)]
    pub routine: Vec<Maneuver>,
}

/// Loads settings from `path` (TOML), overridden by `TANDEM_*` environment
/// variables, e.g. `TANDEM_PILOT__SPEED=300`.
pub fn load_config(path: &str) -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix("TANDEM").separator("__"))
        .build()
        .and_then(|config| config.try_deserialize::<Settings>());

    match settings {
        Ok(settings) => {
            info!(
                pilot = ?settings.pilot,
                maneuvers = settings.routine.len(),
                "Successfully loaded configuration"
            );
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_toml() {
        let text = r#"
            [pilot]
            wheel_diameter_mm = 43.2
            reverse = true

            [motor]
            time_scale = 4.0

            [[routine]]
            action = "travel"
            distance_mm = 250

            [[routine]]
            action = "steer"
            turn_rate = -60.0
            angle_deg = 45.0
        "#;
        let settings: Settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.pilot.wheel_diameter_mm, 43.2);
        assert_eq!(settings.pilot.axle_width_mm, 100.0);
        assert!(settings.pilot.reverse);
        assert_eq!(settings.motor.time_scale, 4.0);
        assert_eq!(settings.routine.len(), 2);
        assert!(matches!(settings.routine[0], Maneuver::Travel { distance_mm, .. } if distance_mm == 250.0));
        assert!(matches!(
            settings.routine[1],
            Maneuver::Steer { turn_rate, angle_deg: Some(_), .. } if turn_rate == -60.0
        ));
    }
}
