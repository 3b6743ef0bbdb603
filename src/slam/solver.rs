//! Linear solvers for `Omega * mu = Xi`
//!
//! Both solvers refuse to produce an estimate for a singular system. A
//! variable whose diagonal entry carries no information is reported by index
//! before any factorization is attempted; a factorization that breaks down or
//! whose pivots span more than `1 / min_rcond` is reported the same way.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::common::{LinearSolver, Point2D, SlamError, SlamResult, SolvePolicy, SolverKind};
use crate::slam::constraint::VariableLayout;
use crate::slam::estimate::Estimate;
use crate::slam::information::InformationSystem;

const MIN_INFORMATION: f64 = 1e-12;
const MIN_RCOND: f64 = 1e-14;

/// Solver based on the Cholesky factorization; the information matrix of an
/// anchored, fully connected graph is positive definite
#[derive(Debug, Clone)]
pub struct CholeskySolver {
    pub min_information: f64,
    pub min_rcond: f64,
}

impl Default for CholeskySolver {
    fn default() -> Self {
        Self { min_information: MIN_INFORMATION, min_rcond: MIN_RCOND }
    }
}

impl LinearSolver for CholeskySolver {
    fn solve(&self, omega: &DMatrix<f64>, xi: &DVector<f64>) -> SlamResult<DVector<f64>> {
        check_system(omega, xi, self.min_information)?;

        let chol = omega.clone().cholesky().ok_or_else(|| {
            SlamError::InsufficientConstraints("information matrix is not positive definite".to_string())
        })?;

        // squared ratio of the Cholesky pivots approximates the reciprocal condition number
        let l_diag = chol.l_dirty().diagonal();
        check_pivots(l_diag.iter().map(|v| v * v), self.min_rcond)?;

        let mu = chol.solve(xi);
        check_finite(&mu)?;
        Ok(mu)
    }

    fn name(&self) -> &'static str {
        "cholesky"
    }
}

/// Solver based on LU decomposition with partial pivoting
#[derive(Debug, Clone)]
pub struct LuSolver {
    pub min_information: f64,
    pub min_rcond: f64,
}

impl Default for LuSolver {
    fn default() -> Self {
        Self { min_information: MIN_INFORMATION, min_rcond: MIN_RCOND }
    }
}

impl LinearSolver for LuSolver {
    fn solve(&self, omega: &DMatrix<f64>, xi: &DVector<f64>) -> SlamResult<DVector<f64>> {
        check_system(omega, xi, self.min_information)?;

        let lu = omega.clone().lu();
        check_pivots(lu.u().diagonal().iter().map(|v| v.abs()), self.min_rcond)?;

        let mu = lu.solve(xi).ok_or_else(|| {
            SlamError::InsufficientConstraints("information matrix is singular".to_string())
        })?;
        check_finite(&mu)?;
        Ok(mu)
    }

    fn name(&self) -> &'static str {
        "lu"
    }
}

/// Build the solver selected in the configuration
pub fn solver_for(kind: SolverKind) -> Box<dyn LinearSolver> {
    match kind {
        SolverKind::Cholesky => Box::new(CholeskySolver::default()),
        SolverKind::Lu => Box::new(LuSolver::default()),
    }
}

fn check_system(omega: &DMatrix<f64>, xi: &DVector<f64>, min_information: f64) -> SlamResult<()> {
    let n = omega.nrows();
    if omega.ncols() != n {
        return Err(SlamError::DimensionMismatch { expected: n, found: omega.ncols() });
    }
    if xi.len() != n {
        return Err(SlamError::DimensionMismatch { expected: n, found: xi.len() });
    }
    if n == 0 {
        return Err(SlamError::InsufficientConstraints("system has no variables".to_string()));
    }
    if let Some(i) = (0..n).find(|&i| !(omega[(i, i)] > min_information)) {
        return Err(SlamError::InsufficientConstraints(format!(
            "variable {} carries no information", i
        )));
    }
    Ok(())
}

fn check_pivots<I: Iterator<Item = f64>>(pivots: I, min_rcond: f64) -> SlamResult<()> {
    let (min, max) = pivots.fold((f64::INFINITY, 0.0_f64), |(lo, hi), p| (lo.min(p), hi.max(p)));
    if !(max > 0.0) || !(min / max > min_rcond) {
        return Err(SlamError::InsufficientConstraints(format!(
            "information matrix is near-singular (pivot ratio {:e})", min / max
        )));
    }
    Ok(())
}

fn check_finite(mu: &DVector<f64>) -> SlamResult<()> {
    if mu.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SlamError::NumericalError("solution contains non-finite values".to_string()))
    }
}

/// Solve both axes of `system` and read the result back through `layout`.
///
/// With [`SolvePolicy::Strict`] every variable must carry information. With
/// [`SolvePolicy::ObservedOnly`] landmarks without information are left out of
/// the solve and reported as `None`; poses must still be constrained.
pub fn solve_system(
    system: &InformationSystem,
    layout: &VariableLayout,
    first_timestep: usize,
    solver: &dyn LinearSolver,
    policy: SolvePolicy,
) -> SlamResult<Estimate> {
    if system.dimension() != layout.dimension() {
        return Err(SlamError::DimensionMismatch {
            expected: layout.dimension(),
            found: system.dimension(),
        });
    }

    let n = system.dimension();
    let missing: Vec<usize> = (0..n).filter(|&i| !(system.information(i) > MIN_INFORMATION)).collect();

    let keep: Vec<usize> = match policy {
        SolvePolicy::Strict => {
            if let Some(&i) = missing.first() {
                return Err(SlamError::InsufficientConstraints(format!(
                    "{} carries no information", layout.describe(i)
                )));
            }
            (0..n).collect()
        }
        SolvePolicy::ObservedOnly => {
            if let Some(&i) = missing.iter().find(|&&i| layout.landmark_at(i).is_none()) {
                return Err(SlamError::InsufficientConstraints(format!(
                    "{} carries no information", layout.describe(i)
                )));
            }
            if !missing.is_empty() {
                warn!("{} landmark(s) never observed, left out of the solve", missing.len());
            }
            (0..n).filter(|i| !missing.contains(i)).collect()
        }
    };

    let reduced = if keep.len() == n { system.clone() } else { system.select(&keep)? };
    let mu_x = solver.solve(reduced.omega(), reduced.xi_x())?;
    let mu_y = solver.solve(reduced.omega(), reduced.xi_y())?;

    debug!(
        "solved {} of {} variables with {} solver",
        keep.len(), n, solver.name()
    );

    let mut positions = vec![None; n];
    for (k, &i) in keep.iter().enumerate() {
        positions[i] = Some(Point2D::new(mu_x[k], mu_y[k]));
    }
    Estimate::from_positions(layout, first_timestep, positions)
}
