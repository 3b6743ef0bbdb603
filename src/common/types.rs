//! Common types used throughout graph_slam

use nalgebra::Vector2;
use std::ops::{Add, Sub};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Relative position of a landmark as sensed from the current pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub landmark_index: usize,
    pub dx: f64,
    pub dy: f64,
}

impl Measurement {
    pub fn new(landmark_index: usize, dx: f64, dy: f64) -> Self {
        Self { landmark_index, dx, dy }
    }

    pub fn displacement(&self) -> Point2D {
        Point2D::new(self.dx, self.dy)
    }
}

impl From<(usize, f64, f64)> for Measurement {
    fn from(tuple: (usize, f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }
}

/// Commanded displacement from one pose to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub dx: f64,
    pub dy: f64,
}

impl Motion {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn displacement(&self) -> Point2D {
        Point2D::new(self.dx, self.dy)
    }
}

impl From<(f64, f64)> for Motion {
    fn from(tuple: (f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

/// One observation record: what was sensed at pose `t`, then the motion to pose `t + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeStep {
    pub measurements: Vec<Measurement>,
    pub motion: Motion,
}

impl TimeStep {
    pub fn new(measurements: Vec<Measurement>, motion: Motion) -> Self {
        Self { measurements, motion }
    }
}
