//! Random point sampling inside drawn polygons.
//!
//! The default [`SamplingMode::BoundingBox`] draws uniformly from the
//! polygon's bounding box and never checks the polygon boundary, so for
//! concave or thin polygons points can land outside the drawn area.
//! [`SamplingMode::Polygon`] rejection-samples against a real
//! point-in-polygon test instead.

use carbon_sense_anomaly_models::LngLat;
use geo::{Contains, LineString, Point, Polygon};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{BoundingBox, GeometryError, bounding_box};

/// How anomaly locations are placed inside a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SamplingMode {
    /// Uniform over the bounding box.
    #[default]
    BoundingBox,
    /// Uniform over the polygon interior, by rejection sampling.
    Polygon {
        /// Draws before giving up and returning a bounding-box sample.
        max_attempts: u32,
    },
}

/// Uniformly random point inside `bbox` (edges included).
pub fn sample_point_in_bounding_box<R: Rng + ?Sized>(bbox: &BoundingBox, rng: &mut R) -> LngLat {
    [
        rng.gen_range(bbox.min_lon..=bbox.max_lon),
        rng.gen_range(bbox.min_lat..=bbox.max_lat),
    ]
}

/// Uniformly random point strictly inside `polygon`.
///
/// Draws from the bounding box until a point falls inside the polygon.
/// After `max_attempts` misses (e.g. for a zero-area polygon) the last
/// bounding-box draw is returned.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] if `polygon` is empty or has
/// a non-finite coordinate.
pub fn sample_point_in_polygon<R: Rng + ?Sized>(
    polygon: &[LngLat],
    rng: &mut R,
    max_attempts: u32,
) -> Result<LngLat, GeometryError> {
    let bbox = bounding_box(polygon)?;
    let shape = Polygon::new(LineString::from(polygon.to_vec()), vec![]);

    let mut candidate = sample_point_in_bounding_box(&bbox, rng);
    for _ in 1..max_attempts {
        if shape.contains(&Point::new(candidate[0], candidate[1])) {
            return Ok(candidate);
        }
        candidate = sample_point_in_bounding_box(&bbox, rng);
    }

    if !shape.contains(&Point::new(candidate[0], candidate[1])) {
        log::warn!(
            "No point inside polygon after {max_attempts} attempts, using bounding-box sample"
        );
    }
    Ok(candidate)
}

/// Samples a point for `polygon` using `mode`.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] if `polygon` is empty or has
/// a non-finite coordinate.
pub fn sample_point<R: Rng + ?Sized>(
    polygon: &[LngLat],
    mode: SamplingMode,
    rng: &mut R,
) -> Result<LngLat, GeometryError> {
    match mode {
        SamplingMode::BoundingBox => {
            let bbox = bounding_box(polygon)?;
            Ok(sample_point_in_bounding_box(&bbox, rng))
        }
        SamplingMode::Polygon { max_attempts } => {
            sample_point_in_polygon(polygon, rng, max_attempts)
        }
    }
}
