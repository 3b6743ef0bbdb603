//! Common types, traits, configuration, and error definitions for graph_slam
//!
//! This module provides the foundational building blocks shared by the
//! estimation engine and its collaborators.

pub mod types;
pub mod traits;
pub mod error;
pub mod config;

pub use types::*;
pub use traits::*;
pub use error::*;
pub use config::*;
