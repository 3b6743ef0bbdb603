//! Error types for graph_slam

use thiserror::Error;

/// Main error type for the estimation engine and its collaborators
#[derive(Error, Debug)]
pub enum SlamError {
    /// Measurement refers to a landmark id outside `[0, num_landmarks)`
    #[error("Invalid landmark index: {index} (num_landmarks = {num_landmarks})")]
    InvalidLandmarkIndex { index: usize, num_landmarks: usize },
    /// Information matrix is singular or under-determined at solve time
    #[error("Insufficient constraints: {0}")]
    InsufficientConstraints(String),
    /// Matrix/vector sizes disagree between producer and consumer
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// Variable index beyond the retained variables of a system
    #[error("Index out of range: {index} (dimension = {dimension})")]
    IndexOutOfRange { index: usize, dimension: usize },
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Numerical computation failed (degenerate pivot, non-finite result)
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// Synthetic data generation failed
    #[error("Simulation error: {0}")]
    SimulationError(String),
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

/// Result type alias for graph SLAM operations
pub type SlamResult<T> = Result<T, SlamError>;
