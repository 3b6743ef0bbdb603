//! Canonical-form Gaussian belief over 2D variables
//!
//! Noise weights and constraint topology do not depend on the axis, so the x
//! and y problems share one information matrix and keep separate information
//! vectors.

use nalgebra::{DMatrix, DVector};

use crate::common::{Point2D, SlamError, SlamResult};
use crate::slam::constraint::Constraint;

/// Coordinate axis of an information vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Information matrix plus one information vector per axis
#[derive(Debug, Clone, PartialEq)]
pub struct InformationSystem {
    omega: DMatrix<f64>,
    xi_x: DVector<f64>,
    xi_y: DVector<f64>,
}

impl InformationSystem {
    /// System over `dimension` variables holding no information
    pub fn new(dimension: usize) -> Self {
        Self {
            omega: DMatrix::zeros(dimension, dimension),
            xi_x: DVector::zeros(dimension),
            xi_y: DVector::zeros(dimension),
        }
    }

    pub fn from_parts(omega: DMatrix<f64>, xi_x: DVector<f64>, xi_y: DVector<f64>) -> SlamResult<Self> {
        let n = omega.nrows();
        if omega.ncols() != n {
            return Err(SlamError::DimensionMismatch { expected: n, found: omega.ncols() });
        }
        for xi in &[&xi_x, &xi_y] {
            if xi.len() != n {
                return Err(SlamError::DimensionMismatch { expected: n, found: xi.len() });
            }
        }
        Ok(Self { omega, xi_x, xi_y })
    }

    pub fn dimension(&self) -> usize {
        self.omega.nrows()
    }

    pub fn omega(&self) -> &DMatrix<f64> {
        &self.omega
    }

    pub fn xi_x(&self) -> &DVector<f64> {
        &self.xi_x
    }

    pub fn xi_y(&self) -> &DVector<f64> {
        &self.xi_y
    }

    pub fn xi(&self, axis: Axis) -> &DVector<f64> {
        match axis {
            Axis::X => &self.xi_x,
            Axis::Y => &self.xi_y,
        }
    }

    /// Accumulated information (diagonal entry) of a variable
    pub fn information(&self, index: usize) -> f64 {
        self.omega[(index, index)]
    }

    fn check_index(&self, index: usize) -> SlamResult<()> {
        if index >= self.dimension() {
            return Err(SlamError::IndexOutOfRange { index, dimension: self.dimension() });
        }
        Ok(())
    }

    /// Add a relative constraint `x_to - x_from = displacement` with the given weight
    pub fn apply(&mut self, constraint: &Constraint) -> SlamResult<()> {
        let (a, b) = (constraint.from, constraint.to);
        self.check_index(a)?;
        self.check_index(b)?;
        if a == b {
            return Err(SlamError::InvalidParameter(format!(
                "constraint links variable {} to itself", a
            )));
        }

        let w = constraint.weight;
        let d = constraint.displacement;

        self.omega[(a, a)] += w;
        self.omega[(b, b)] += w;
        self.omega[(a, b)] -= w;
        self.omega[(b, a)] -= w;

        self.xi_x[a] -= w * d.x;
        self.xi_x[b] += w * d.x;
        self.xi_y[a] -= w * d.y;
        self.xi_y[b] += w * d.y;

        Ok(())
    }

    /// Add an absolute constraint `x_index = position` with the given weight
    pub fn add_prior(&mut self, index: usize, position: Point2D, weight: f64) -> SlamResult<()> {
        self.check_index(index)?;
        self.omega[(index, index)] += weight;
        self.xi_x[index] += weight * position.x;
        self.xi_y[index] += weight * position.y;
        Ok(())
    }

    /// New system with an information-free variable inserted at `at`; later variables shift up by one
    pub fn insert_variable(&self, at: usize) -> SlamResult<Self> {
        if at > self.dimension() {
            return Err(SlamError::IndexOutOfRange { index: at, dimension: self.dimension() + 1 });
        }
        Ok(Self {
            omega: self.omega.clone().insert_row(at, 0.0).insert_column(at, 0.0),
            xi_x: self.xi_x.clone().insert_row(at, 0.0),
            xi_y: self.xi_y.clone().insert_row(at, 0.0),
        })
    }

    /// New system restricted to `indices`, in the given order. Information
    /// linking kept variables to dropped ones is discarded, not marginalized.
    pub fn select(&self, indices: &[usize]) -> SlamResult<Self> {
        for &i in indices {
            self.check_index(i)?;
        }
        let n = indices.len();
        Ok(Self {
            omega: DMatrix::from_fn(n, n, |i, j| self.omega[(indices[i], indices[j])]),
            xi_x: DVector::from_fn(n, |i, _| self.xi_x[indices[i]]),
            xi_y: DVector::from_fn(n, |i, _| self.xi_y[indices[i]]),
        })
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.dimension();
        (0..n).all(|i| (i + 1..n).all(|j| (self.omega[(i, j)] - self.omega[(j, i)]).abs() <= tolerance))
    }

    /// Average the matrix with its transpose to remove rounding asymmetry
    pub(crate) fn symmetrize(&mut self) {
        self.omega = (&self.omega + self.omega.transpose()) * 0.5;
    }
}
