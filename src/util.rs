use crate::errors::{DelaunayError, DelaunayResult};
use crate::geometry::point::Point;
use rand::{RngExt, SeedableRng};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

fn sample_points<R: RngExt>(rng: &mut R, count: usize, range: (f64, f64)) -> Vec<Point> {
    (0..count)
        .map(|_| {
            Point::new(
                rng.random_range(range.0..range.1),
                rng.random_range(range.0..range.1),
                rng.random_range(range.0..range.1),
            )
        })
        .collect()
}

fn check_range(count: usize, range: (f64, f64)) -> DelaunayResult<()> {
    if count == 0 {
        return Err(DelaunayError::InvalidParameters(
            "point count must be at least 1".to_string(),
        ));
    }
    if !(range.0.is_finite() && range.1.is_finite() && range.0 < range.1) {
        return Err(DelaunayError::InvalidParameters(format!(
            "invalid coordinate range [{}, {}]",
            range.0, range.1
        )));
    }
    Ok(())
}

/// Generates `count` points uniformly distributed in `range`³.
///
/// # Errors
///
/// Returns [`DelaunayError::InvalidParameters`] if `count` is zero or the range
/// is empty or not finite.
pub fn generate_random_points(count: usize, range: (f64, f64)) -> DelaunayResult<Vec<Point>> {
    check_range(count, range)?;
    Ok(sample_points(&mut rand::rng(), count, range))
}

/// Generates `count` points in `range`³ from a fixed seed, for deterministic
/// runs and tests.
///
/// # Errors
///
/// Returns [`DelaunayError::InvalidParameters`] if `count` is zero or the range
/// is empty or not finite.
pub fn generate_seeded_points(
    count: usize,
    range: (f64, f64),
    seed: u64,
) -> DelaunayResult<Vec<Point>> {
    check_range(count, range)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    Ok(sample_points(&mut rng, count, range))
}

/// Reads points from a text source, three coordinates per line.
///
/// Coordinates may be separated by whitespace or commas; anything after the
/// third number is ignored. Blank lines, `#` comments and lines without three
/// finite numbers are skipped.
///
/// # Errors
///
/// Returns the underlying I/O error if reading fails.
pub fn parse_points<R: BufRead>(reader: R) -> io::Result<Vec<Point>> {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut coords = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::parse::<f64>);

        match (coords.next(), coords.next(), coords.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z))) if x.is_finite() && y.is_finite() && z.is_finite() => {
                points.push(Point::new(x, y, z));
            }
            _ => {
                log::trace!("Skipping line {}: {trimmed:?}", number + 1);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed lines");
    }
    Ok(points)
}

/// Reads a point file from disk.
///
/// # Errors
///
/// Returns [`DelaunayError::PointFile`] if the file cannot be opened or read.
pub fn load_points(path: &Path) -> DelaunayResult<Vec<Point>> {
    let to_error = |source| DelaunayError::PointFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(to_error)?;
    let points = parse_points(BufReader::new(file)).map_err(to_error)?;
    log::debug!("Read {} points from {}", points.len(), path.display());
    Ok(points)
}

/// Rescales every axis independently onto [-1, 1].
///
/// An axis along which all points agree maps to 0.
pub fn normalize_points(points: &mut [Point]) {
    if points.is_empty() {
        return;
    }

    for axis in 0..3 {
        let (min, max) = points.iter().map(|p| p.coord(axis)).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        );
        let extent = max - min;

        for point in points.iter_mut() {
            let value = if extent > 0.0 {
                2.0 * (point.coord(axis) - min) / extent - 1.0
            } else {
                0.0
            };
            match axis {
                0 => point.x = value,
                1 => point.y = value,
                _ => point.z = value,
            }
        }
    }
}
