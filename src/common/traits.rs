//! Common traits defining the seams of the estimation engine

use nalgebra::{DMatrix, DVector};

use crate::common::error::SlamResult;
use crate::common::types::TimeStep;
use crate::slam::Estimate;

/// Trait for solvers of the canonical-form system `Omega * mu = Xi`
pub trait LinearSolver {
    /// Solve for the mean `mu`, failing on singular or near-singular systems
    fn solve(&self, omega: &DMatrix<f64>, xi: &DVector<f64>) -> SlamResult<DVector<f64>>;

    /// Short human-readable name, used in logs
    fn name(&self) -> &'static str;
}

/// Trait for graph SLAM front ends that turn a full run of observations into an estimate
pub trait TrajectoryEstimator {
    /// Consume every timestep in order and return the final estimate
    fn estimate(&self, steps: &[TimeStep]) -> SlamResult<Estimate>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SlamError;

    // Test that traits compile correctly
    struct DiagonalSolver;

    impl LinearSolver for DiagonalSolver {
        fn solve(&self, omega: &DMatrix<f64>, xi: &DVector<f64>) -> SlamResult<DVector<f64>> {
            if omega.nrows() != xi.len() {
                return Err(SlamError::DimensionMismatch { expected: omega.nrows(), found: xi.len() });
            }
            Ok(DVector::from_fn(xi.len(), |i, _| xi[i] / omega[(i, i)]))
        }

        fn name(&self) -> &'static str {
            "diagonal"
        }
    }

    #[test]
    fn test_linear_solver_trait() {
        let solver = DiagonalSolver;
        let omega = DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 4.0]));
        let xi = DVector::from_vec(vec![2.0, 2.0]);
        let mu = solver.solve(&omega, &xi).unwrap();
        assert_eq!(mu[0], 1.0);
        assert_eq!(mu[1], 0.5);
    }
}
