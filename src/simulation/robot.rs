//! Point robot and landmark world used to generate synthetic observations
//!
//! The robot lives in a square `[0, world_size]^2` world, moves by noisy
//! displacements, and senses the x/y offset to every landmark within range.

use rand::Rng;

use crate::common::{Measurement, Point2D};
use crate::simulation::{NoiseModel, SimulationConfig};

/// Square world with fixed landmarks
#[derive(Debug, Clone)]
pub struct World {
    pub size: f64,
    pub landmarks: Vec<Point2D>,
}

impl World {
    pub fn new(size: f64, landmarks: Vec<Point2D>) -> Self {
        Self { size, landmarks }
    }

    /// Place landmarks at uniformly random integer coordinates inside the world
    pub fn random<R: Rng + ?Sized>(size: f64, num_landmarks: usize, rng: &mut R) -> Self {
        let landmarks = (0..num_landmarks)
            .map(|_| {
                Point2D::new(
                    (rng.gen::<f64>() * size).round(),
                    (rng.gen::<f64>() * size).round(),
                )
            })
            .collect();
        Self { size, landmarks }
    }

    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= 0.0 && p.x <= self.size && p.y >= 0.0 && p.y <= self.size
    }
}

/// Simulated robot with noisy motion and sensing
#[derive(Debug, Clone)]
pub struct Robot {
    position: Point2D,
    measurement_range: f64,
    motion_noise: f64,
    measurement_noise: f64,
    noise_model: NoiseModel,
}

impl Robot {
    /// Robot at the centre of the world
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            position: Point2D::new(config.world_size / 2.0, config.world_size / 2.0),
            measurement_range: config.measurement_range,
            motion_noise: config.motion_noise,
            measurement_noise: config.measurement_noise,
            noise_model: config.noise_model,
        }
    }

    pub fn with_position(mut self, position: Point2D) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    /// Move by `(dx, dy)` plus motion noise. A move that would leave the
    /// world is rejected: the robot stays put and `false` is returned.
    pub fn try_move<R: Rng + ?Sized>(&mut self, world: &World, dx: f64, dy: f64, rng: &mut R) -> bool {
        let target = Point2D::new(
            self.position.x + dx + self.noise_model.sample(self.motion_noise, rng),
            self.position.y + dy + self.noise_model.sample(self.motion_noise, rng),
        );
        if !world.contains(&target) {
            return false;
        }
        self.position = target;
        true
    }

    /// Noisy `landmark - robot` offsets for every landmark whose offset is
    /// within `measurement_range` on both axes. A negative range sees everything.
    pub fn sense<R: Rng + ?Sized>(&self, world: &World, rng: &mut R) -> Vec<Measurement> {
        world
            .landmarks
            .iter()
            .enumerate()
            .filter_map(|(id, lm)| {
                let dx = lm.x - self.position.x + self.noise_model.sample(self.measurement_noise, rng);
                let dy = lm.y - self.position.y + self.noise_model.sample(self.measurement_noise, rng);
                let visible = self.measurement_range < 0.0
                    || (dx.abs() <= self.measurement_range && dy.abs() <= self.measurement_range);
                if visible {
                    Some(Measurement::new(id, dx, dy))
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn noiseless() -> SimulationConfig {
        SimulationConfig {
            world_size: 10.0,
            measurement_range: 4.5,
            motion_noise: 0.0,
            measurement_noise: 0.0,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_robot_starts_at_centre() {
        let robot = Robot::new(&noiseless());
        assert_eq!(robot.position(), Point2D::new(5.0, 5.0));
    }

    #[test]
    fn test_move_inside_and_outside_world() {
        let mut rng = StdRng::seed_from_u64(1);
        let world = World::new(10.0, Vec::new());
        let mut robot = Robot::new(&noiseless());

        assert!(robot.try_move(&world, 1.0, 2.0, &mut rng));
        assert_eq!(robot.position(), Point2D::new(6.0, 7.0));

        assert!(!robot.try_move(&world, 10.0, 0.0, &mut rng));
        assert_eq!(robot.position(), Point2D::new(6.0, 7.0));

        let mut cornered = Robot::new(&noiseless()).with_position(Point2D::new(9.5, 0.5));
        assert!(!cornered.try_move(&world, 1.0, 0.0, &mut rng));
        assert!(!cornered.try_move(&world, 0.0, -1.0, &mut rng));
        assert!(cornered.try_move(&world, -1.0, 1.0, &mut rng));
    }

    #[test]
    fn test_sense_reports_landmark_minus_robot_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let world = World::new(
            10.0,
            vec![Point2D::new(9.0, 5.7), Point2D::new(0.0, 0.0), Point2D::new(3.0, 8.0)],
        );
        let robot = Robot::new(&noiseless());
        let z = robot.sense(&world, &mut rng);

        assert_eq!(z.len(), 2);
        assert_eq!(z[0].landmark_index, 0);
        assert!((z[0].dx - 4.0).abs() < 1e-12);
        assert!((z[0].dy - 0.7).abs() < 1e-12);
        assert_eq!(z[1].landmark_index, 2);
        assert!((z[1].dx + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_range_sees_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = SimulationConfig { measurement_range: -1.0, ..noiseless() };
        let world = World::new(10.0, vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)]);
        assert_eq!(Robot::new(&config).sense(&world, &mut rng).len(), 2);
    }

    #[test]
    fn test_random_world_landmarks_are_rounded_and_inside() {
        let mut rng = StdRng::seed_from_u64(4);
        let world = World::random(10.0, 20, &mut rng);
        assert_eq!(world.landmarks.len(), 20);
        for lm in &world.landmarks {
            assert!(world.contains(lm));
            assert_eq!(lm.x, lm.x.round());
            assert_eq!(lm.y, lm.y.round());
        }
    }
}
