//! Run-wide configuration for the graph SLAM estimators

use crate::common::error::{SlamError, SlamResult};
use crate::common::types::Point2D;

/// What to do when some retained variable has never been constrained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvePolicy {
    /// Any variable without information makes the solve fail with `InsufficientConstraints`
    Strict,
    /// Solve only the variables that carry information; unseen landmarks come back as `None`
    ObservedOnly,
}

impl Default for SolvePolicy {
    fn default() -> Self {
        SolvePolicy::Strict
    }
}

/// Factorization used to solve `Omega * mu = Xi`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    Cholesky,
    Lu,
}

impl Default for SolverKind {
    fn default() -> Self {
        SolverKind::Cholesky
    }
}

/// Configuration for offline and online graph SLAM
#[derive(Debug, Clone)]
pub struct GraphSlamConfig {
    /// Side length of the square world [m]
    pub world_size: f64,
    /// Number of landmarks, fixed for the whole run
    pub num_landmarks: usize,
    /// Noise magnitude of the motion commands; motion weight is `1 / motion_noise`
    pub motion_noise: f64,
    /// Noise magnitude of the landmark measurements; measurement weight is `1 / measurement_noise`
    pub measurement_noise: f64,
    /// Weight of the constraint pinning pose 0
    pub anchor_weight: f64,
    /// Where pose 0 is pinned; `None` means the centre of the world
    pub initial_position: Option<Point2D>,
    pub solve_policy: SolvePolicy,
    pub solver: SolverKind,
}

impl Default for GraphSlamConfig {
    fn default() -> Self {
        Self {
            world_size: 100.0,
            num_landmarks: 5,
            motion_noise: 2.0,
            measurement_noise: 2.0,
            anchor_weight: 1.0,
            initial_position: None,
            solve_policy: SolvePolicy::default(),
            solver: SolverKind::default(),
        }
    }
}

impl GraphSlamConfig {
    pub fn new(world_size: f64, num_landmarks: usize, motion_noise: f64, measurement_noise: f64) -> Self {
        Self {
            world_size,
            num_landmarks,
            motion_noise,
            measurement_noise,
            ..Self::default()
        }
    }

    pub fn with_anchor(mut self, position: Point2D, weight: f64) -> Self {
        self.initial_position = Some(position);
        self.anchor_weight = weight;
        self
    }

    pub fn with_solve_policy(mut self, policy: SolvePolicy) -> Self {
        self.solve_policy = policy;
        self
    }

    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Position pose 0 is anchored to
    pub fn anchor_position(&self) -> Point2D {
        self.initial_position
            .unwrap_or_else(|| Point2D::new(self.world_size / 2.0, self.world_size / 2.0))
    }

    pub fn validate(&self) -> SlamResult<()> {
        if !(self.world_size > 0.0) {
            return Err(SlamError::InvalidParameter(format!(
                "world_size must be positive, got {}", self.world_size
            )));
        }
        if !(self.motion_noise > 0.0) || !self.motion_noise.is_finite() {
            return Err(SlamError::InvalidParameter(format!(
                "motion_noise must be positive and finite, got {}", self.motion_noise
            )));
        }
        if !(self.measurement_noise > 0.0) || !self.measurement_noise.is_finite() {
            return Err(SlamError::InvalidParameter(format!(
                "measurement_noise must be positive and finite, got {}", self.measurement_noise
            )));
        }
        if !(self.anchor_weight > 0.0) || !self.anchor_weight.is_finite() {
            return Err(SlamError::InvalidParameter(format!(
                "anchor_weight must be positive and finite, got {}", self.anchor_weight
            )));
        }
        if !self.anchor_position().is_finite() {
            return Err(SlamError::InvalidParameter("initial_position must be finite".to_string()));
        }
        Ok(())
    }
}
