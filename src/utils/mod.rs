//! Utility modules for graph_slam

pub mod visualization;

pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
