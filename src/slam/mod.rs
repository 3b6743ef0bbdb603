// Graph SLAM in information form

pub mod constraint;
pub mod estimate;
pub mod information;
pub mod marginalization;
pub mod offline;
pub mod online;
pub mod solver;

// Re-exports
pub use constraint::{Constraint, ConstraintAccumulator, ConstraintKind, VariableLayout};
pub use estimate::Estimate;
pub use information::{Axis, InformationSystem};
pub use marginalization::{marginalize, marginalize_variable};
pub use offline::OfflineGraphSlam;
pub use online::{OnlineGraphSlam, OnlineSession};
pub use solver::{solve_system, solver_for, CholeskySolver, LuSolver};
