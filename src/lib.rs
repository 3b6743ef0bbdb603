//! graph_slam - landmark Graph SLAM in information form
//!
//! Builds an information matrix and vectors from relative motion and
//! landmark measurements of a 2-D point robot, then recovers the robot
//! trajectory and the landmark map by solving the linear system. An
//! offline estimator solves the whole trajectory at once; an online one
//! keeps only the current pose by marginalizing the previous one each step.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod slam;
pub mod simulation;

// Re-export common types for convenience
pub use common::{Point2D, Measurement, Motion, TimeStep};
pub use common::{GraphSlamConfig, SolvePolicy, SolverKind};
pub use common::{LinearSolver, TrajectoryEstimator};
pub use common::{SlamError, SlamResult};
pub use slam::{Estimate, InformationSystem, OfflineGraphSlam, OnlineGraphSlam, OnlineSession};
