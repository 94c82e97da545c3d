use std::time::Duration;

use serde::Deserialize;
use spin_sleep::SpinSleeper;
use tandem_motor::Motor;
use tandem_pilot::{Completion, Motion, Pilot, PilotError};
use tracing::info;

/// One step of a scripted drive.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Maneuver {
    Travel {
        distance_mm: f64,
        timeout_ms: Option<u64>,
    },
    Rotate {
        angle_deg: f64,
        timeout_ms: Option<u64>,
    },
    /// A bounded arc when `angle_deg` is set, otherwise runs for `duration_ms`
    /// and then brakes.
    Steer {
        turn_rate: f64,
        angle_deg: Option<f64>,
        duration_ms: Option<u64>,
        timeout_ms: Option<u64>,
    },
    Forward {
        duration_ms: u64,
    },
    Backward {
        duration_ms: u64,
    },
    Stop,
    Hold,
    ResetAngle,
    SetSpeed {
        speed: f64,
    },
    SetAcceleration {
        acceleration: u32,
    },
    /// Pause without commanding anything.
    Wait {
        duration_ms: u64,
    },
}

fn completion(timeout_ms: Option<u64>) -> Completion {
    match timeout_ms {
        Some(ms) => Completion::WaitFor(Duration::from_millis(ms)),
        None => Completion::Wait,
    }
}

/// Runs scripted maneuvers against a pilot.
///
/// Continuous drives are timed with `sleeper` and then braked, so every
/// maneuver leaves the robot stationary unless a bounded wait timed out.
pub struct RoutineRunner {
    sleeper: SpinSleeper,
}

impl Default for RoutineRunner {
    fn default() -> Self {
        Self { sleeper: SpinSleeper::new(10_000) }
    }
}

impl RoutineRunner {
    pub fn run_one<M: Motor>(
        &self,
        pilot: &mut Pilot<M>,
        maneuver: &Maneuver,
    ) -> Result<Option<Motion>, PilotError<M::Error>> {
        info!(?maneuver, "executing");
        let motion = match *maneuver {
            Maneuver::Travel { distance_mm, timeout_ms } => {
                Some(pilot.travel(distance_mm, completion(timeout_ms))?)
            }
            Maneuver::Rotate { angle_deg, timeout_ms } => {
                Some(pilot.rotate(angle_deg, completion(timeout_ms))?)
            }
            Maneuver::Steer { turn_rate, angle_deg, duration_ms, timeout_ms } => {
                let motion = pilot.steer(turn_rate, angle_deg, completion(timeout_ms))?;
                if motion == Motion::Continuous {
                    self.drive_for(pilot, duration_ms.unwrap_or(0))?;
                }
                Some(motion)
            }
            Maneuver::Forward { duration_ms } => {
                pilot.forward()?;
                self.drive_for(pilot, duration_ms)?;
                Some(Motion::Continuous)
            }
            Maneuver::Backward { duration_ms } => {
                pilot.backward()?;
                self.drive_for(pilot, duration_ms)?;
                Some(Motion::Continuous)
            }
            Maneuver::Stop => {
                pilot.stop()?;
                None
            }
            Maneuver::Hold => {
                pilot.hold()?;
                None
            }
            Maneuver::ResetAngle => {
                pilot.reset_angle()?;
                None
            }
            Maneuver::SetSpeed { speed } => {
                pilot.set_speed(speed)?;
                None
            }
            Maneuver::SetAcceleration { acceleration } => {
                pilot.set_acceleration(acceleration)?;
                None
            }
            Maneuver::Wait { duration_ms } => {
                self.sleeper.sleep(Duration::from_millis(duration_ms));
                None
            }
        };
        Ok(motion)
    }

    fn drive_for<M: Motor>(&self, pilot: &mut Pilot<M>, duration_ms: u64) -> Result<(), PilotError<M::Error>> {
        self.sleeper.sleep(Duration::from_millis(duration_ms));
        pilot.stop()
    }
}
