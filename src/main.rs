mod config;
mod routine;
mod state_estimation;

use anyhow::Context;
use tandem_motor::{Motor, SimMotor};
use tandem_pilot::Pilot;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

use crate::config::{DEFAULT_CONFIG_PATH, load_config};
use crate::routine::RoutineRunner;
use crate::state_estimation::OdometryEstimator;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let settings = load_config(&path).with_context(|| format!("loading {path}"))?;

    let left = SimMotor::new("left", settings.motor.clone()).context("left motor")?;
    let right = SimMotor::new("right", settings.motor.clone()).context("right motor")?;
    let mut pilot = Pilot::new(left, right, settings.pilot).context("starting pilot")?;

    let mut estimator = OdometryEstimator::new(pilot.geometry());
    estimator.update(
        pilot.left_motor().current_angle()?,
        pilot.right_motor().current_angle()?,
    )?;

    let runner = RoutineRunner::default();
    for (step, maneuver) in settings.routine.iter().enumerate() {
        let motion = runner
            .run_one(&mut pilot, maneuver)
            .with_context(|| format!("step {step}: {maneuver:?}"))?;

        let left = pilot.left_motor().state()?;
        let right = pilot.right_motor().state()?;
        let pose = estimator.update(left.angle, right.angle)?;
        info!(
            step,
            ?motion,
            heading_deg = pilot.angle()?,
            left_deg = left.angle,
            right_deg = right.angle,
            %pose,
            "step done"
        );
    }

    if pilot.is_moving()? {
        warn!("routine ended with wheels still turning; braking");
        pilot.stop()?;
    }

    let acceleration = pilot.acceleration()?;
    info!(
        final_pose = %estimator.pose(),
        heading_deg = pilot.angle()?,
        left_acceleration = acceleration.left,
        right_acceleration = acceleration.right,
        "routine complete"
    );
    Ok(())
}
