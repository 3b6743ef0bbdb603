//! Constraint accumulation
//!
//! A constraint is a weighted linear relation `x_b - x_a = d` between two
//! state variables, applied independently on the x and y axes with the same
//! weight. Adding one to an information system touches four matrix entries
//! and two vector entries per axis:
//!
//! ```text
//! Omega[a,a] += w    Omega[a,b] -= w    Xi[a] -= w * d
//! Omega[b,b] += w    Omega[b,a] -= w    Xi[b] += w * d
//! ```
//!
//! Variables are addressed through a [`VariableLayout`]: poses first, in
//! timestep order, followed by all landmarks ordered by id.

use crate::common::{GraphSlamConfig, Measurement, Motion, Point2D, SlamError, SlamResult};
use crate::slam::information::InformationSystem;

/// Maps poses and landmark ids to variable indices of an information system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    num_poses: usize,
    num_landmarks: usize,
}

impl VariableLayout {
    pub fn new(num_poses: usize, num_landmarks: usize) -> Self {
        Self { num_poses, num_landmarks }
    }

    pub fn num_poses(&self) -> usize {
        self.num_poses
    }

    pub fn num_landmarks(&self) -> usize {
        self.num_landmarks
    }

    /// Number of variables per axis
    pub fn dimension(&self) -> usize {
        self.num_poses + self.num_landmarks
    }

    pub fn pose_index(&self, pose: usize) -> SlamResult<usize> {
        if pose >= self.num_poses {
            return Err(SlamError::IndexOutOfRange { index: pose, dimension: self.num_poses });
        }
        Ok(pose)
    }

    pub fn landmark_index(&self, landmark: usize) -> SlamResult<usize> {
        if landmark >= self.num_landmarks {
            return Err(SlamError::InvalidLandmarkIndex {
                index: landmark,
                num_landmarks: self.num_landmarks,
            });
        }
        Ok(self.num_poses + landmark)
    }

    /// Landmark id stored at a variable index, if that variable is a landmark
    pub fn landmark_at(&self, index: usize) -> Option<usize> {
        if index >= self.num_poses && index < self.dimension() {
            Some(index - self.num_poses)
        } else {
            None
        }
    }

    /// Human-readable name of a variable, used in error messages
    pub fn describe(&self, index: usize) -> String {
        match self.landmark_at(index) {
            Some(id) => format!("landmark {}", id),
            None if index < self.num_poses => format!("pose {}", index),
            None => format!("variable {}", index),
        }
    }
}

/// Which observation produced a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Links pose `t` to pose `t + 1` through the commanded motion
    Motion,
    /// Links a pose to a landmark through a sensed displacement
    Measurement,
}

/// A weighted relation `x_to - x_from = displacement` on both axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub from: usize,
    pub to: usize,
    pub displacement: Point2D,
    pub weight: f64,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, from: usize, to: usize, displacement: Point2D, weight: f64) -> Self {
        Self { kind, from, to, displacement, weight }
    }

    /// Motion constraint between two consecutive poses of `layout`
    pub fn motion(
        layout: &VariableLayout,
        from_pose: usize,
        to_pose: usize,
        motion: &Motion,
        noise: f64,
    ) -> SlamResult<Self> {
        Ok(Self::new(
            ConstraintKind::Motion,
            layout.pose_index(from_pose)?,
            layout.pose_index(to_pose)?,
            motion.displacement(),
            weight_from_noise(noise)?,
        ))
    }

    /// Measurement constraint between a pose and the sensed landmark
    pub fn measurement(
        layout: &VariableLayout,
        pose: usize,
        measurement: &Measurement,
        noise: f64,
    ) -> SlamResult<Self> {
        Ok(Self::new(
            ConstraintKind::Measurement,
            layout.pose_index(pose)?,
            layout.landmark_index(measurement.landmark_index)?,
            measurement.displacement(),
            weight_from_noise(noise)?,
        ))
    }

    /// The exact algebraic inverse: same variables and displacement, negated weight
    pub fn inverse(&self) -> Self {
        Self { weight: -self.weight, ..*self }
    }
}

/// Constraint weight for an observation generated with the given noise magnitude
pub fn weight_from_noise(noise: f64) -> SlamResult<f64> {
    if !(noise > 0.0) || !noise.is_finite() {
        return Err(SlamError::InvalidParameter(format!(
            "noise must be positive and finite, got {}", noise
        )));
    }
    Ok(1.0 / noise)
}

/// Turns observations into constraints and adds them to an information system
#[derive(Debug, Clone)]
pub struct ConstraintAccumulator {
    motion_noise: f64,
    measurement_noise: f64,
    anchor_weight: f64,
    anchor_position: Point2D,
}

impl ConstraintAccumulator {
    pub fn new(config: &GraphSlamConfig) -> SlamResult<Self> {
        config.validate()?;
        Ok(Self {
            motion_noise: config.motion_noise,
            measurement_noise: config.measurement_noise,
            anchor_weight: config.anchor_weight,
            anchor_position: config.anchor_position(),
        })
    }

    /// Pin `pose` to the configured initial position
    pub fn add_anchor(
        &self,
        system: &mut InformationSystem,
        layout: &VariableLayout,
        pose: usize,
    ) -> SlamResult<()> {
        check_layout(system, layout)?;
        system.add_prior(layout.pose_index(pose)?, self.anchor_position, self.anchor_weight)
    }

    pub fn add_motion(
        &self,
        system: &mut InformationSystem,
        layout: &VariableLayout,
        from_pose: usize,
        to_pose: usize,
        motion: &Motion,
    ) -> SlamResult<()> {
        check_layout(system, layout)?;
        let constraint = Constraint::motion(layout, from_pose, to_pose, motion, self.motion_noise)?;
        system.apply(&constraint)
    }

    /// Add one constraint per measurement. Every landmark index is checked
    /// before anything is applied, so a bad measurement leaves `system` untouched.
    pub fn add_measurements(
        &self,
        system: &mut InformationSystem,
        layout: &VariableLayout,
        pose: usize,
        measurements: &[Measurement],
    ) -> SlamResult<()> {
        check_layout(system, layout)?;
        let constraints = measurements
            .iter()
            .map(|m| Constraint::measurement(layout, pose, m, self.measurement_noise))
            .collect::<SlamResult<Vec<_>>>()?;

        for constraint in &constraints {
            system.apply(constraint)?;
        }
        Ok(())
    }
}

fn check_layout(system: &InformationSystem, layout: &VariableLayout) -> SlamResult<()> {
    if system.dimension() != layout.dimension() {
        return Err(SlamError::DimensionMismatch {
            expected: layout.dimension(),
            found: system.dimension(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> GraphSlamConfig {
        GraphSlamConfig::new(10.0, 2, 2.0, 4.0)
    }

    #[test]
    fn test_layout_indices() {
        let layout = VariableLayout::new(3, 2);
        assert_eq!(layout.dimension(), 5);
        assert_eq!(layout.pose_index(2).unwrap(), 2);
        assert_eq!(layout.landmark_index(0).unwrap(), 3);
        assert_eq!(layout.landmark_at(4), Some(1));
        assert_eq!(layout.landmark_at(1), None);
        assert_eq!(layout.describe(4), "landmark 1");
        assert_eq!(layout.describe(0), "pose 0");
    }

    #[test]
    fn test_invalid_landmark_index() {
        let layout = VariableLayout::new(1, 2);
        let m = Measurement::new(2, 1.0, 1.0);
        let err = Constraint::measurement(&layout, 0, &m, 1.0).unwrap_err();
        assert!(matches!(err, SlamError::InvalidLandmarkIndex { index: 2, num_landmarks: 2 }));
    }

    #[test]
    fn test_weight_is_reciprocal_noise() {
        assert_relative_eq!(weight_from_noise(4.0).unwrap(), 0.25);
        assert!(weight_from_noise(0.0).is_err());
        assert!(weight_from_noise(-1.0).is_err());
    }

    #[test]
    fn test_measurement_update_entries() {
        let layout = VariableLayout::new(1, 2);
        let acc = ConstraintAccumulator::new(&config()).unwrap();
        let mut system = InformationSystem::new(layout.dimension());

        acc.add_measurements(&mut system, &layout, 0, &[Measurement::new(1, 4.0, -2.0)]).unwrap();

        let w = 0.25;
        assert_relative_eq!(system.omega()[(0, 0)], w);
        assert_relative_eq!(system.omega()[(2, 2)], w);
        assert_relative_eq!(system.omega()[(0, 2)], -w);
        assert_relative_eq!(system.omega()[(2, 0)], -w);
        assert_relative_eq!(system.xi_x()[0], -w * 4.0);
        assert_relative_eq!(system.xi_x()[2], w * 4.0);
        assert_relative_eq!(system.xi_y()[0], w * 2.0);
        assert_relative_eq!(system.xi_y()[2], -w * 2.0);
        // landmark 0 untouched
        assert_eq!(system.omega()[(1, 1)], 0.0);
    }

    #[test]
    fn test_bad_measurement_leaves_system_untouched() {
        let layout = VariableLayout::new(1, 2);
        let acc = ConstraintAccumulator::new(&config()).unwrap();
        let mut system = InformationSystem::new(layout.dimension());
        let before = system.clone();

        let measurements = [Measurement::new(0, 1.0, 1.0), Measurement::new(5, 1.0, 1.0)];
        let err = acc.add_measurements(&mut system, &layout, 0, &measurements).unwrap_err();

        assert!(matches!(err, SlamError::InvalidLandmarkIndex { index: 5, .. }));
        assert_eq!(system, before);
    }

    #[test]
    fn test_layout_mismatch_fails_fast() {
        let layout = VariableLayout::new(2, 2);
        let acc = ConstraintAccumulator::new(&config()).unwrap();
        let mut system = InformationSystem::new(3);
        let err = acc.add_motion(&mut system, &layout, 0, 1, &Motion::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, SlamError::DimensionMismatch { expected: 4, found: 3 }));
    }

    #[test]
    fn test_anchor_pins_pose() {
        let layout = VariableLayout::new(1, 0);
        let acc = ConstraintAccumulator::new(&config()).unwrap();
        let mut system = InformationSystem::new(1);
        acc.add_anchor(&mut system, &layout, 0).unwrap();
        assert_relative_eq!(system.omega()[(0, 0)], 1.0);
        assert_relative_eq!(system.xi_x()[0], 5.0);
        assert_relative_eq!(system.xi_y()[0], 5.0);
    }
}
