//! Offline (batch) graph SLAM
//!
//! Every pose of the trajectory is kept. The whole run is accumulated into a
//! single information system over `N + K` variables per axis, pose 0 is
//! anchored, and the system is solved once at the end.

use log::info;

use crate::common::{GraphSlamConfig, LinearSolver, SlamError, SlamResult, TimeStep, TrajectoryEstimator};
use crate::slam::constraint::{ConstraintAccumulator, VariableLayout};
use crate::slam::estimate::Estimate;
use crate::slam::information::InformationSystem;
use crate::slam::solver::{solve_system, solver_for};

/// Batch graph SLAM estimator
pub struct OfflineGraphSlam {
    config: GraphSlamConfig,
    accumulator: ConstraintAccumulator,
    solver: Box<dyn LinearSolver>,
}

impl OfflineGraphSlam {
    pub fn new(config: GraphSlamConfig) -> SlamResult<Self> {
        let accumulator = ConstraintAccumulator::new(&config)?;
        let solver = solver_for(config.solver);
        Ok(Self { config, accumulator, solver })
    }

    /// Replace the solver picked from the configuration
    pub fn with_solver(mut self, solver: Box<dyn LinearSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn config(&self) -> &GraphSlamConfig {
        &self.config
    }

    /// Accumulate every constraint of the run without solving
    pub fn build_system(&self, steps: &[TimeStep]) -> SlamResult<(InformationSystem, VariableLayout)> {
        if steps.is_empty() {
            return Err(SlamError::InvalidParameter("at least one timestep is required".to_string()));
        }

        let n = steps.len();
        let layout = VariableLayout::new(n, self.config.num_landmarks);
        let mut system = InformationSystem::new(layout.dimension());

        self.accumulator.add_anchor(&mut system, &layout, 0)?;
        for (t, step) in steps.iter().enumerate() {
            self.accumulator.add_measurements(&mut system, &layout, t, &step.measurements)?;
            if t + 1 < n {
                self.accumulator.add_motion(&mut system, &layout, t, t + 1, &step.motion)?;
            }
        }

        Ok((system, layout))
    }

    /// Accumulate the whole run and solve it once
    pub fn solve(&self, steps: &[TimeStep]) -> SlamResult<Estimate> {
        let (system, layout) = self.build_system(steps)?;
        let estimate = solve_system(&system, &layout, 0, self.solver.as_ref(), self.config.solve_policy)?;

        info!(
            "offline graph SLAM solved {} poses and {} landmarks ({} variables per axis)",
            layout.num_poses(),
            estimate.landmarks.iter().filter(|l| l.is_some()).count(),
            layout.dimension()
        );
        Ok(estimate)
    }
}

impl TrajectoryEstimator for OfflineGraphSlam {
    fn estimate(&self, steps: &[TimeStep]) -> SlamResult<Estimate> {
        self.solve(steps)
    }
}
