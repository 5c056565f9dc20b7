//! Configuration management for delaunay3d.
//!
//! This module provides:
//! - [`TriangulationConfig`], the engine parameters (super-tetrahedron radius,
//!   tolerances, parallelism)
//! - [`Config`], the command-line options of the `delaunay3d` binary
//! - [`TestConfig`], presets for tests and benchmarks

use crate::errors::{DelaunayError, DelaunayResult};
use crate::geometry::circumsphere::DEGENERACY_THRESHOLD;
use crate::geometry::point::EPSILON;
use clap::Parser;
use std::path::PathBuf;

/// Parameters of a [`crate::Delaunay3D`] engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangulationConfig {
    /// Super-tetrahedron radius; must enclose all input
    pub radius: f64,
    /// Containment tolerance and deduplication grid cell size
    pub tolerance: f64,
    /// Minimum `|2 · ab·(ac×ad)|` for a finite circumsphere
    pub degeneracy_threshold: f64,
    /// Scan the circumsphere cache with rayon workers
    pub parallel: bool,
}

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            tolerance: EPSILON,
            degeneracy_threshold: DEGENERACY_THRESHOLD,
            parallel: true,
        }
    }
}

impl TriangulationConfig {
    /// Default parameters with the given super-tetrahedron radius.
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// Same configuration with parallel discovery switched on or off.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DelaunayError::InvalidParameters`] if the radius, tolerance or
    /// degeneracy threshold is not finite and positive.
    pub fn validate(&self) -> DelaunayResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(DelaunayError::InvalidParameters(format!(
                "radius must be finite and positive, got {}",
                self.radius
            )));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(DelaunayError::InvalidParameters(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            )));
        }

        if !(self.degeneracy_threshold.is_finite() && self.degeneracy_threshold > 0.0) {
            return Err(DelaunayError::InvalidParameters(format!(
                "degeneracy threshold must be finite and positive, got {}",
                self.degeneracy_threshold
            )));
        }

        Ok(())
    }
}

/// Command-line options for the `delaunay3d` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Point files (three numbers per line), each inserted as one batch
    #[arg(short, long = "input", value_name = "FILE", required_unless_present = "random")]
    pub inputs: Vec<PathBuf>,

    /// Number of random points in [-1, 1]^3 to triangulate instead of files
    #[arg(short = 'n', long, conflicts_with = "inputs", value_parser = clap::value_parser!(u32).range(1..))]
    pub random: Option<u32>,

    /// Seed for random point generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Super-tetrahedron radius
    #[arg(short, long, default_value = "2.0")]
    pub radius: f64,

    /// Points per insertion batch; 1 gives an exact Delaunay result, larger
    /// batches are discovered in parallel against one shared snapshot
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub batch_size: u32,

    /// Keep file coordinates as-is instead of normalizing each file to [-1, 1]
    #[arg(long, default_value = "false")]
    pub raw: bool,

    /// Find bad tetrahedra on a single thread, in input order
    #[arg(long, default_value = "false")]
    pub sequential: bool,
}

impl Config {
    /// Builds a new instance of `Config` from command line arguments.
    #[must_use]
    pub fn build() -> Self {
        Self::parse()
    }

    /// Creates a configuration generating `count` random points.
    #[must_use]
    pub const fn random(count: u32) -> Self {
        Self {
            inputs: Vec::new(),
            random: Some(count),
            seed: None,
            radius: 2.0,
            batch_size: 1,
            raw: false,
            sequential: false,
        }
    }

    /// Creates a `TriangulationConfig` from this configuration.
    #[must_use]
    pub fn to_triangulation_config(&self) -> TriangulationConfig {
        TriangulationConfig::new(self.radius).with_parallel(!self.sequential)
    }

    /// Validates the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DelaunayError::InvalidParameters`] if neither input files nor
    /// a random point count is given, or if the engine parameters are invalid.
    pub fn validate(&self) -> DelaunayResult<()> {
        if self.inputs.is_empty() && self.random.is_none() {
            return Err(DelaunayError::InvalidParameters(
                "either input files or a random point count is required".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(DelaunayError::InvalidParameters(
                "batch size must be at least 1".to_string(),
            ));
        }

        self.to_triangulation_config().validate()
    }
}

/// Configuration presets for quick testing.
#[derive(Debug, Clone)]
pub struct TestConfig;

impl TestConfig {
    /// Single-threaded engine with the default radius, for reproducible tests.
    #[must_use]
    pub fn deterministic() -> TriangulationConfig {
        TriangulationConfig::default().with_parallel(false)
    }

    /// Small random run for CLI-level tests.
    #[must_use]
    pub fn small() -> Config {
        Config {
            seed: Some(42),
            ..Config::random(16)
        }
    }

    /// Larger random run for integration tests and benchmarks.
    #[must_use]
    pub fn medium() -> Config {
        Config {
            seed: Some(42),
            batch_size: 8,
            ..Config::random(128)
        }
    }
}
