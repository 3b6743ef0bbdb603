//! Schur complement marginalization
//!
//! Eliminating variables from a canonical-form Gaussian keeps the belief over
//! the remaining ones intact. Partitioning the system into the block `A` to
//! remove and the block `B` to keep:
//!
//! ```text
//! Omega' = Omega_BB - Omega_BA * Omega_AA^-1 * Omega_AB
//! Xi'    = Xi_B     - Omega_BA * Omega_AA^-1 * Xi_A
//! ```
//!
//! Because the x and y axes share one information matrix, the same gain
//! `Omega_BA * Omega_AA^-1` is applied to both information vectors.

use log::trace;
use nalgebra::DMatrix;

use crate::common::{SlamError, SlamResult};
use crate::slam::information::InformationSystem;

/// Smallest accumulated information a variable must hold to be eliminated
pub const MIN_PIVOT: f64 = 1e-12;

/// Return a new system with the variables in `eliminate` marginalized out.
/// The remaining variables keep their relative order.
pub fn marginalize(system: &InformationSystem, eliminate: &[usize]) -> SlamResult<InformationSystem> {
    let n = system.dimension();
    let mut remove = vec![false; n];
    for &i in eliminate {
        if i >= n {
            return Err(SlamError::IndexOutOfRange { index: i, dimension: n });
        }
        if remove[i] {
            return Err(SlamError::InvalidParameter(format!(
                "variable {} listed twice for marginalization", i
            )));
        }
        remove[i] = true;
    }
    let keep: Vec<usize> = (0..n).filter(|&i| !remove[i]).collect();

    if eliminate.is_empty() {
        return Ok(system.clone());
    }

    let a = system.select(eliminate)?;
    let b = system.select(&keep)?;
    let omega = system.omega();
    let omega_ba = DMatrix::from_fn(keep.len(), eliminate.len(), |i, j| omega[(keep[i], eliminate[j])]);

    let omega_aa_inv = invert_block(a.omega())?;
    let gain = &omega_ba * omega_aa_inv;

    let omega_reduced = b.omega() - &gain * omega_ba.transpose();
    let xi_x = b.xi_x() - &gain * a.xi_x();
    let xi_y = b.xi_y() - &gain * a.xi_y();

    trace!("marginalized {:?}, {} variables remain", eliminate, keep.len());

    let mut reduced = InformationSystem::from_parts(omega_reduced, xi_x, xi_y)?;
    reduced.symmetrize();
    Ok(reduced)
}

/// Marginalize out a single variable
pub fn marginalize_variable(system: &InformationSystem, index: usize) -> SlamResult<InformationSystem> {
    marginalize(system, &[index])
}

fn invert_block(omega_aa: &DMatrix<f64>) -> SlamResult<DMatrix<f64>> {
    if omega_aa.nrows() == 1 {
        let pivot = omega_aa[(0, 0)];
        if !(pivot > MIN_PIVOT) {
            return Err(SlamError::NumericalError(format!(
                "cannot marginalize a variable holding no information (pivot {:e})", pivot
            )));
        }
        return Ok(DMatrix::from_element(1, 1, 1.0 / pivot));
    }
    omega_aa
        .clone()
        .cholesky()
        .map(|chol| chol.inverse())
        .ok_or_else(|| {
            SlamError::NumericalError("marginalized block is not positive definite".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point2D;
    use crate::slam::constraint::{Constraint, ConstraintKind};
    use crate::slam::solver::CholeskySolver;
    use crate::common::LinearSolver;
    use approx::assert_relative_eq;

    fn link(from: usize, to: usize, dx: f64, dy: f64, weight: f64) -> Constraint {
        Constraint::new(ConstraintKind::Motion, from, to, Point2D::new(dx, dy), weight)
    }

    /// pose 0 anchored, landmark 1 seen from pose 0
    fn base_system() -> InformationSystem {
        let mut system = InformationSystem::new(2);
        system.add_prior(0, Point2D::new(5.0, 5.0), 1.0).unwrap();
        system.apply(&link(0, 1, 2.0, -1.0, 0.5)).unwrap();
        system
    }

    #[test]
    fn test_transient_pose_contributes_nothing() {
        let system = base_system();

        // append a pose linked only by one motion constraint, then eliminate it
        let mut grown = system.insert_variable(2).unwrap();
        grown.apply(&link(0, 2, 1.0, 3.0, 2.0)).unwrap();
        let reduced = marginalize_variable(&grown, 2).unwrap();

        assert_relative_eq!(reduced.omega(), system.omega(), epsilon = 1e-12);
        assert_relative_eq!(reduced.xi_x(), system.xi_x(), epsilon = 1e-12);
        assert_relative_eq!(reduced.xi_y(), system.xi_y(), epsilon = 1e-12);
    }

    #[test]
    fn test_marginal_mean_is_preserved() {
        let mut system = InformationSystem::new(4);
        system.add_prior(0, Point2D::new(1.0, 2.0), 1.0).unwrap();
        system.apply(&link(0, 1, 1.0, 1.0, 1.0)).unwrap();
        system.apply(&link(1, 2, 2.0, -1.0, 0.5)).unwrap();
        system.apply(&link(0, 3, 4.0, 0.0, 0.25)).unwrap();
        system.apply(&link(1, 3, 3.2, -0.9, 0.25)).unwrap();

        let solver = CholeskySolver::default();
        let full_x = solver.solve(system.omega(), system.xi_x()).unwrap();
        let full_y = solver.solve(system.omega(), system.xi_y()).unwrap();

        let reduced = marginalize(&system, &[0, 1]).unwrap();
        let red_x = solver.solve(reduced.omega(), reduced.xi_x()).unwrap();
        let red_y = solver.solve(reduced.omega(), reduced.xi_y()).unwrap();

        for (k, i) in [2usize, 3].iter().enumerate() {
            assert_relative_eq!(red_x[k], full_x[*i], epsilon = 1e-9);
            assert_relative_eq!(red_y[k], full_y[*i], epsilon = 1e-9);
        }
        assert!(reduced.is_symmetric(0.0));
    }

    #[test]
    fn test_marginalization_keeps_axes_apart() {
        let mut system = InformationSystem::new(3);
        system.add_prior(0, Point2D::new(0.0, 0.0), 1.0).unwrap();
        system.apply(&link(0, 1, 4.0, 0.0, 1.0)).unwrap();
        system.apply(&link(1, 2, 3.0, 0.0, 1.0)).unwrap();

        let reduced = marginalize_variable(&system, 0).unwrap();

        assert!(reduced.xi_y().iter().all(|v| *v == 0.0));
        assert!(reduced.xi_x().iter().any(|v| *v != 0.0));
    }

    #[test]
    fn test_cannot_eliminate_empty_variable() {
        let system = InformationSystem::new(2);
        let err = marginalize_variable(&system, 0).unwrap_err();
        assert!(matches!(err, SlamError::NumericalError(_)));
    }

    #[test]
    fn test_invalid_indices() {
        let system = base_system();
        assert!(matches!(marginalize(&system, &[2]), Err(SlamError::IndexOutOfRange { .. })));
        assert!(matches!(marginalize(&system, &[0, 0]), Err(SlamError::InvalidParameter(_))));
        assert_eq!(marginalize(&system, &[]).unwrap(), system);
    }
}
