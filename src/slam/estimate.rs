//! Solved positions of poses and landmarks
//!
//! The flat mean vector `mu` is ordered poses first, in timestep order, then
//! landmarks by id, with x before y for every variable:
//!
//! ```text
//! [x_p0, y_p0, x_p1, y_p1, ..., x_l0, y_l0, x_l1, y_l1, ...]
//! ```

use itertools::Itertools;
use nalgebra::DVector;

use crate::common::{Point2D, SlamError, SlamResult};
use crate::slam::constraint::VariableLayout;

/// Position estimates for the retained poses and all landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Timestep of `poses[0]`; offline runs start at 0, online runs keep only the latest pose
    pub first_timestep: usize,
    pub poses: Vec<Point2D>,
    /// `None` for a landmark that was never constrained
    pub landmarks: Vec<Option<Point2D>>,
}

impl Estimate {
    /// Split per-variable positions laid out by `layout` into poses and landmarks
    pub fn from_positions(
        layout: &VariableLayout,
        first_timestep: usize,
        positions: Vec<Option<Point2D>>,
    ) -> SlamResult<Self> {
        if positions.len() != layout.dimension() {
            return Err(SlamError::DimensionMismatch {
                expected: layout.dimension(),
                found: positions.len(),
            });
        }
        let mut positions = positions;
        let landmarks = positions.split_off(layout.num_poses());
        let poses = positions
            .into_iter()
            .enumerate()
            .map(|(t, p)| {
                p.ok_or_else(|| {
                    SlamError::InsufficientConstraints(format!("pose {} was not solved", first_timestep + t))
                })
            })
            .collect::<SlamResult<Vec<_>>>()?;

        Ok(Self { first_timestep, poses, landmarks })
    }

    /// Estimate of the most recent retained pose
    pub fn current_pose(&self) -> Option<Point2D> {
        self.poses.last().copied()
    }

    /// Estimate of the pose at timestep `t`, if it is retained
    pub fn pose_at(&self, t: usize) -> Option<Point2D> {
        t.checked_sub(self.first_timestep)
            .and_then(|i| self.poses.get(i))
            .copied()
    }

    pub fn landmark(&self, id: usize) -> Option<Point2D> {
        self.landmarks.get(id).copied().flatten()
    }

    /// Displacements between consecutive retained poses
    pub fn pose_displacements(&self) -> Vec<Point2D> {
        self.poses
            .iter()
            .tuple_windows()
            .map(|(a, b)| *b - *a)
            .collect()
    }

    /// Flat mean vector; unsolved landmarks are written as NaN
    pub fn mu(&self) -> DVector<f64> {
        let values: Vec<f64> = self
            .poses
            .iter()
            .map(|p| Some(*p))
            .chain(self.landmarks.iter().copied())
            .flat_map(|p| match p {
                Some(p) => vec![p.x, p.y],
                None => vec![f64::NAN, f64::NAN],
            })
            .collect();
        DVector::from_vec(values)
    }

    /// Mean distance between the retained poses and the matching true poses
    pub fn mean_pose_error(&self, true_poses: &[Point2D]) -> f64 {
        let errors: Vec<f64> = self
            .poses
            .iter()
            .enumerate()
            .filter_map(|(i, p)| true_poses.get(self.first_timestep + i).map(|t| p.distance(t)))
            .collect();
        mean(&errors)
    }

    /// Mean distance between solved landmarks and their true positions
    pub fn mean_landmark_error(&self, true_landmarks: &[Point2D]) -> f64 {
        let errors: Vec<f64> = self
            .landmarks
            .iter()
            .zip(true_landmarks)
            .filter_map(|(est, truth)| est.map(|p| p.distance(truth)))
            .collect();
        mean(&errors)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
