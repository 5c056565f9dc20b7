//! Error types for the delaunay3d library.
//!
//! The triangulation core itself never fails: numerical trouble is absorbed
//! and reported through [`crate::triangulation::diagnostics`]. These errors
//! cover configuration and input handling around it.

use std::path::PathBuf;

/// Main error type for delaunay3d operations.
#[derive(Debug, thiserror::Error)]
pub enum DelaunayError {
    /// Invalid configuration parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A point file could not be read
    #[error("Failed to read point file {}: {source}", .path.display())]
    PointFile {
        /// Path of the file that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No points were available for triangulation
    #[error("No input points to triangulate")]
    EmptyInput,
}

/// Result type for delaunay3d operations.
pub type DelaunayResult<T> = Result<T, DelaunayError>;
