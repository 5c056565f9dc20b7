//! delaunay3d binary executable.
//!
//! Reads point files (or generates random points), triangulates them batch by
//! batch and logs a summary. Set `RUST_LOG=info` to see progress.

use delaunay3d::{Config, run};

fn main() {
    // Initialize logging
    env_logger::init();

    let config = Config::build();
    match run(&config) {
        Ok(summary) => {
            log::info!(
                "delaunay3d completed in {:?}: {} inserted, {} duplicates, {} unplaced",
                summary.elapsed,
                summary.report.inserted,
                summary.report.duplicates_dropped,
                summary.report.unplaced_points
            );
        }
        Err(e) => {
            log::error!("delaunay3d failed: {e}");
            std::process::exit(1);
        }
    }
}
