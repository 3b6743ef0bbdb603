//! Online graph SLAM
//!
//! The live system always holds exactly the current pose (variable 0) and
//! every landmark (variables `1..=K`). Each motion grows it to
//! `{old pose, new pose, landmarks}`, links the two poses, and marginalizes
//! the old pose out again, so memory and solve cost do not depend on how
//! many timesteps have elapsed.
//!
//! The reduction steps are pure functions from one [`InformationSystem`] value
//! to the next; [`OnlineSession`] threads that value through a run.

use log::{debug, info};

use crate::common::{
    GraphSlamConfig, LinearSolver, Measurement, Motion, Point2D, SlamError, SlamResult, SolvePolicy,
    TimeStep, TrajectoryEstimator,
};
use crate::slam::constraint::{ConstraintAccumulator, VariableLayout};
use crate::slam::estimate::Estimate;
use crate::slam::information::InformationSystem;
use crate::slam::marginalization::marginalize_variable;
use crate::slam::solver::{solve_system, solver_for};

/// Layout of the live system: one pose followed by the landmarks
pub fn live_layout(num_landmarks: usize) -> VariableLayout {
    VariableLayout::new(1, num_landmarks)
}

/// Live system at startup: pose 0 anchored, landmarks unconnected
pub fn initial_system(accumulator: &ConstraintAccumulator, num_landmarks: usize) -> SlamResult<InformationSystem> {
    let layout = live_layout(num_landmarks);
    let mut system = InformationSystem::new(layout.dimension());
    accumulator.add_anchor(&mut system, &layout, 0)?;
    Ok(system)
}

/// Constrain the current pose against the sensed landmarks
pub fn incorporate_measurements(
    system: &InformationSystem,
    accumulator: &ConstraintAccumulator,
    num_landmarks: usize,
    measurements: &[Measurement],
) -> SlamResult<InformationSystem> {
    let mut next = system.clone();
    accumulator.add_measurements(&mut next, &live_layout(num_landmarks), 0, measurements)?;
    Ok(next)
}

/// Move to a new pose and eliminate the old one
pub fn advance(
    system: &InformationSystem,
    accumulator: &ConstraintAccumulator,
    num_landmarks: usize,
    motion: &Motion,
) -> SlamResult<InformationSystem> {
    let live = live_layout(num_landmarks);
    if system.dimension() != live.dimension() {
        return Err(SlamError::DimensionMismatch {
            expected: live.dimension(),
            found: system.dimension(),
        });
    }

    // {old pose, new pose, landmarks}
    let grown_layout = VariableLayout::new(2, num_landmarks);
    let mut grown = system.insert_variable(1)?;
    accumulator.add_motion(&mut grown, &grown_layout, 0, 1, motion)?;

    marginalize_variable(&grown, 0)
}

/// Online graph SLAM estimator; every run starts a fresh [`OnlineSession`]
pub struct OnlineGraphSlam {
    config: GraphSlamConfig,
}

impl OnlineGraphSlam {
    pub fn new(config: GraphSlamConfig) -> SlamResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GraphSlamConfig {
        &self.config
    }

    pub fn start(&self) -> SlamResult<OnlineSession> {
        OnlineSession::new(self.config.clone())
    }

    /// Run the whole trajectory through a fresh session, returning it for inspection
    pub fn run(&self, steps: &[TimeStep]) -> SlamResult<OnlineSession> {
        let mut session = self.start()?;
        for (t, step) in steps.iter().enumerate() {
            let motion = if t + 1 < steps.len() { Some(&step.motion) } else { None };
            session.step(&step.measurements, motion)?;
        }
        Ok(session)
    }
}

impl TrajectoryEstimator for OnlineGraphSlam {
    /// Final estimate of the last pose and every landmark
    fn estimate(&self, steps: &[TimeStep]) -> SlamResult<Estimate> {
        if steps.is_empty() {
            return Err(SlamError::InvalidParameter("at least one timestep is required".to_string()));
        }
        let session = self.run(steps)?;
        let estimate = session.estimate()?;
        info!(
            "online graph SLAM finished at timestep {} with {} variables per axis",
            session.timestep(),
            session.system().dimension()
        );
        Ok(estimate)
    }
}

/// State of one online run
pub struct OnlineSession {
    config: GraphSlamConfig,
    accumulator: ConstraintAccumulator,
    solver: Box<dyn LinearSolver>,
    system: InformationSystem,
    timestep: usize,
    observed: Vec<bool>,
    trajectory: Vec<(usize, Point2D)>,
}

impl OnlineSession {
    pub fn new(config: GraphSlamConfig) -> SlamResult<Self> {
        let accumulator = ConstraintAccumulator::new(&config)?;
        let system = initial_system(&accumulator, config.num_landmarks)?;
        Ok(Self {
            solver: solver_for(config.solver),
            observed: vec![false; config.num_landmarks],
            accumulator,
            system,
            timestep: 0,
            trajectory: Vec::new(),
            config,
        })
    }

    pub fn with_solver(mut self, solver: Box<dyn LinearSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn system(&self) -> &InformationSystem {
        &self.system
    }

    /// Timestep of the current pose
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    pub fn is_fully_observed(&self) -> bool {
        self.observed.iter().all(|seen| *seen)
    }

    /// Current-pose estimates produced so far, tagged with their timestep
    pub fn trajectory(&self) -> &[(usize, Point2D)] {
        &self.trajectory
    }

    pub fn observe(&mut self, measurements: &[Measurement]) -> SlamResult<()> {
        self.system = incorporate_measurements(
            &self.system,
            &self.accumulator,
            self.config.num_landmarks,
            measurements,
        )?;
        for m in measurements {
            self.observed[m.landmark_index] = true;
        }
        Ok(())
    }

    pub fn advance(&mut self, motion: &Motion) -> SlamResult<()> {
        self.system = advance(&self.system, &self.accumulator, self.config.num_landmarks, motion)?;
        self.timestep += 1;
        Ok(())
    }

    /// Solve the live system for the current pose and every landmark
    pub fn estimate(&self) -> SlamResult<Estimate> {
        solve_system(
            &self.system,
            &live_layout(self.config.num_landmarks),
            self.timestep,
            self.solver.as_ref(),
            self.config.solve_policy,
        )
    }

    /// Apply one timestep: sense, optionally move, then re-estimate.
    ///
    /// Under [`SolvePolicy::Strict`] the solve is deferred (`Ok(None)`) until
    /// every landmark has been measured at least once.
    pub fn step(&mut self, measurements: &[Measurement], motion: Option<&Motion>) -> SlamResult<Option<Estimate>> {
        self.observe(measurements)?;
        if let Some(motion) = motion {
            self.advance(motion)?;
        }

        if self.config.solve_policy == SolvePolicy::Strict && !self.is_fully_observed() {
            debug!(
                "timestep {}: {} of {} landmarks observed, solve deferred",
                self.timestep,
                self.observed.iter().filter(|s| **s).count(),
                self.observed.len()
            );
            return Ok(None);
        }

        let estimate = self.estimate()?;
        if let Some(pose) = estimate.current_pose() {
            debug!("timestep {}: pose estimate ({:.3}, {:.3})", self.timestep, pose.x, pose.y);
            self.trajectory.push((self.timestep, pose));
        }
        Ok(Some(estimate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> GraphSlamConfig {
        GraphSlamConfig::new(10.0, 2, 1.0, 1.0)
    }

    #[test]
    fn test_live_system_stays_bounded() {
        let mut session = OnlineSession::new(config()).unwrap();
        for _ in 0..25 {
            session.observe(&[Measurement::new(0, 1.0, 1.0)]).unwrap();
            session.advance(&Motion::new(0.1, 0.0)).unwrap();
            assert_eq!(session.system().dimension(), 3);
        }
        assert_eq!(session.timestep(), 25);
    }

    #[test]
    fn test_advance_is_pure() {
        let acc = ConstraintAccumulator::new(&config()).unwrap();
        let start = initial_system(&acc, 2).unwrap();
        let snapshot = start.clone();

        let next = advance(&start, &acc, 2, &Motion::new(1.0, 2.0)).unwrap();

        assert_eq!(start, snapshot);
        assert_eq!(next.dimension(), start.dimension());
        assert!(next.is_symmetric(1e-12));
    }

    #[test]
    fn test_advance_moves_anchor_belief() {
        let acc = ConstraintAccumulator::new(&config()).unwrap();
        let start = initial_system(&acc, 0).unwrap();
        let next = advance(&start, &acc, 0, &Motion::new(1.0, 2.0)).unwrap();

        // anchor (w = 1) in series with motion (w = 1)
        assert_relative_eq!(next.information(0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(next.xi_x()[0] / next.information(0), 6.0, epsilon = 1e-12);
        assert_relative_eq!(next.xi_y()[0] / next.information(0), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_independence_through_marginalization() {
        let acc = ConstraintAccumulator::new(&config()).unwrap();
        let system = initial_system(&acc, 2)
            .and_then(|s| incorporate_measurements(&s, &acc, 2, &[Measurement::new(0, 2.0, 0.0)]))
            .and_then(|s| advance(&s, &acc, 2, &Motion::new(1.5, 0.0)))
            .and_then(|s| incorporate_measurements(&s, &acc, 2, &[Measurement::new(1, 3.0, 0.0)]))
            .unwrap();

        // every y observation is zero, so the y problem only sees the anchor
        let y = solver_for(Default::default()).solve(system.omega(), system.xi_y()).unwrap();
        for v in y.iter() {
            assert_relative_eq!(*v, 5.0, epsilon = 1e-9);
        }
        let x = solver_for(Default::default()).solve(system.omega(), system.xi_x()).unwrap();
        assert_relative_eq!(x[0], 6.5, epsilon = 1e-9);
        assert_relative_eq!(x[1], 7.0, epsilon = 1e-9);
        assert_relative_eq!(x[2], 9.5, epsilon = 1e-9);
    }

    #[test]
    fn test_strict_policy_defers_solve() {
        let mut session = OnlineSession::new(config()).unwrap();
        let first = session.step(&[Measurement::new(0, 1.0, 1.0)], Some(&Motion::new(1.0, 0.0))).unwrap();
        assert!(first.is_none());
        assert!(matches!(session.estimate(), Err(SlamError::InsufficientConstraints(_))));

        let second = session.step(&[Measurement::new(1, -1.0, 0.0)], None).unwrap();
        let estimate = second.unwrap();
        assert_eq!(estimate.first_timestep, 1);
        assert_eq!(session.trajectory().len(), 1);
        assert_relative_eq!(estimate.landmark(1).unwrap().x, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_observed_only_policy_solves_every_step() {
        let config = config().with_solve_policy(SolvePolicy::ObservedOnly);
        let mut session = OnlineSession::new(config).unwrap();
        let estimate = session.step(&[], Some(&Motion::new(1.0, 1.0))).unwrap().unwrap();
        assert!(estimate.landmarks.iter().all(|l| l.is_none()));
        assert_relative_eq!(estimate.current_pose().unwrap().x, 6.0, epsilon = 1e-9);
        assert_eq!(session.trajectory(), &[(1, estimate.current_pose().unwrap())]);
    }

    #[test]
    fn test_invalid_landmark_leaves_session_untouched() {
        let mut session = OnlineSession::new(config()).unwrap();
        let before = session.system().clone();
        let err = session.observe(&[Measurement::new(9, 0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, SlamError::InvalidLandmarkIndex { index: 9, num_landmarks: 2 }));
        assert_eq!(session.system(), &before);
        assert!(!session.is_fully_observed());
    }
}
