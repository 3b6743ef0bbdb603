//! Run generation: drive the robot through the world and record observations

use log::{debug, info};
use rand::Rng;
use std::f64::consts::PI;

use crate::common::{Motion, Point2D, SlamError, SlamResult, TimeStep};
use crate::simulation::{Robot, SimulationConfig, World};

/// Headings tried before a single move is given up on
const MAX_HEADING_RETRIES: usize = 1000;

/// One simulated run: the observation records plus the ground truth behind them
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub world: World,
    /// True robot position at each timestep
    pub true_poses: Vec<Point2D>,
    /// `steps[t]` holds what was sensed at `true_poses[t]` and the motion commanded next
    pub steps: Vec<TimeStep>,
}

impl SimulationRun {
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn true_landmarks(&self) -> &[Point2D] {
        &self.world.landmarks
    }

    /// Whether every landmark appears in at least one measurement
    pub fn all_landmarks_seen(&self) -> bool {
        let mut seen = vec![false; self.world.landmarks.len()];
        for m in self.steps.iter().flat_map(|s| s.measurements.iter()) {
            if let Some(s) = seen.get_mut(m.landmark_index) {
                *s = true;
            }
        }
        seen.into_iter().all(|s| s)
    }
}

/// Generate a run in which every landmark is sensed at least once.
///
/// The robot drives straight lines of `step_distance` and turns to a new
/// random heading whenever a move would leave the world. The final record's
/// motion is zero since no pose follows it.
pub fn make_data<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> SlamResult<SimulationRun> {
    config.validate()?;

    for attempt in 1..=config.max_attempts {
        let run = simulate_once(config, rng)?;
        if run.all_landmarks_seen() {
            info!(
                "generated {} timesteps with {} landmarks after {} attempt(s)",
                run.num_steps(),
                run.world.landmarks.len(),
                attempt
            );
            return Ok(run);
        }
        debug!("attempt {}: not every landmark was sensed, retrying", attempt);
    }

    Err(SlamError::SimulationError(format!(
        "no run sensed all {} landmarks in {} attempts",
        config.num_landmarks, config.max_attempts
    )))
}

fn simulate_once<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> SlamResult<SimulationRun> {
    let world = World::random(config.world_size, config.num_landmarks, rng);
    let mut robot = Robot::new(config);
    let mut command = random_heading(config.step_distance, rng);

    let mut true_poses = Vec::with_capacity(config.num_steps);
    let mut steps = Vec::with_capacity(config.num_steps);

    for t in 0..config.num_steps {
        true_poses.push(robot.position());
        let measurements = robot.sense(&world, rng);

        let motion = if t + 1 < config.num_steps {
            let mut retries = 0;
            while !robot.try_move(&world, command.dx, command.dy, rng) {
                retries += 1;
                if retries > MAX_HEADING_RETRIES {
                    return Err(SlamError::SimulationError(format!(
                        "robot stuck at ({:.2}, {:.2})", robot.position().x, robot.position().y
                    )));
                }
                command = random_heading(config.step_distance, rng);
            }
            command
        } else {
            Motion::new(0.0, 0.0)
        };

        steps.push(TimeStep::new(measurements, motion));
    }

    Ok(SimulationRun { world, true_poses, steps })
}

fn random_heading<R: Rng + ?Sized>(distance: f64, rng: &mut R) -> Motion {
    let orientation = rng.gen::<f64>() * 2.0 * PI;
    Motion::new(orientation.cos() * distance, orientation.sin() * distance)
}
