//! Synthetic data generation for graph SLAM
//!
//! All randomness comes from the generator passed in by the caller; nothing
//! here touches a global random source.

pub mod data;
pub mod robot;

pub use data::{make_data, SimulationRun};
pub use robot::{Robot, World};

use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::common::{GraphSlamConfig, SlamError, SlamResult};

/// Shape of the noise added to motions and measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseModel {
    /// Uniform in `[-1, 1) * magnitude`
    Uniform,
    /// Zero-mean normal with standard deviation `magnitude`
    Gaussian,
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::Uniform
    }
}

impl NoiseModel {
    pub fn sample<R: Rng + ?Sized>(&self, magnitude: f64, rng: &mut R) -> f64 {
        let unit: f64 = match self {
            NoiseModel::Uniform => Uniform::new(-1.0_f64, 1.0).sample(rng),
            NoiseModel::Gaussian => StandardNormal.sample(rng),
        };
        unit * magnitude
    }
}

/// Configuration for the simulated robot and its run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Side length of the square world [m]
    pub world_size: f64,
    pub num_landmarks: usize,
    /// Number of timesteps (poses) in a run
    pub num_steps: usize,
    /// Landmarks farther than this on either axis are not sensed; negative means unlimited
    pub measurement_range: f64,
    pub motion_noise: f64,
    pub measurement_noise: f64,
    /// Length of each commanded motion [m]
    pub step_distance: f64,
    pub noise_model: NoiseModel,
    /// Runs to try before giving up on sensing every landmark
    pub max_attempts: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_size: 100.0,
            num_landmarks: 5,
            num_steps: 20,
            measurement_range: 50.0,
            motion_noise: 2.0,
            measurement_noise: 2.0,
            step_distance: 20.0,
            noise_model: NoiseModel::default(),
            max_attempts: 100,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SlamResult<()> {
        if !(self.world_size > 0.0) {
            return Err(SlamError::InvalidParameter(format!(
                "world_size must be positive, got {}", self.world_size
            )));
        }
        if self.num_steps == 0 {
            return Err(SlamError::InvalidParameter("num_steps must be at least 1".to_string()));
        }
        if self.motion_noise < 0.0 || self.measurement_noise < 0.0 {
            return Err(SlamError::InvalidParameter("noise magnitudes must not be negative".to_string()));
        }
        if !(self.step_distance >= 0.0) || self.step_distance > self.world_size {
            return Err(SlamError::InvalidParameter(format!(
                "step_distance must be within [0, world_size], got {}", self.step_distance
            )));
        }
        if self.max_attempts == 0 {
            return Err(SlamError::InvalidParameter("max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Estimator configuration matching this simulation
    pub fn graph_slam_config(&self) -> GraphSlamConfig {
        GraphSlamConfig::new(self.world_size, self.num_landmarks, self.motion_noise, self.measurement_noise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_noise_is_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = NoiseModel::Uniform.sample(0.2, &mut rng);
            assert!(v >= -0.2 && v < 0.2);
        }
    }

    #[test]
    fn test_gaussian_noise_scales() {
        let mut rng = StdRng::seed_from_u64(8);
        let samples: Vec<f64> = (0..5000).map(|_| NoiseModel::Gaussian.sample(2.0, &mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.15);
        assert!((var.sqrt() - 2.0).abs() < 0.15);
    }

    #[test]
    fn test_config_validation() {
        assert!(SimulationConfig::default().validate().is_ok());
        let bad = SimulationConfig { num_steps: 0, ..SimulationConfig::default() };
        assert!(bad.validate().is_err());
        let bad = SimulationConfig { step_distance: 200.0, ..SimulationConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_graph_slam_config_matches() {
        let sim = SimulationConfig::default();
        let config = sim.graph_slam_config();
        assert_eq!(config.num_landmarks, sim.num_landmarks);
        assert_eq!(config.motion_noise, sim.motion_noise);
        assert!(config.validate().is_ok());
    }
}
