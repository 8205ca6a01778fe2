#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry helpers for drawn project polygons.
//!
//! Polygons arrive as open rings of `(lng, lat)` vertices. The helpers here
//! compute the unweighted vertex centroid, the axis-aligned bounding box,
//! and closed square buffers, and parse polygons out of `GeoJSON`. Random
//! point sampling lives in [`sampling`].
//!
//! Degenerate input (no vertices, non-finite or out-of-range coordinates)
//! fails with [`GeometryError::InvalidGeometry`] rather than producing
//! `NaN` or infinite sentinels.

pub mod sampling;

use carbon_sense_anomaly_models::LngLat;
use geo::{BoundingRect, LineString};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sampling::{
    SamplingMode, sample_point, sample_point_in_bounding_box, sample_point_in_polygon,
};

/// Errors produced by the geometry helpers.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The polygon cannot be used for the requested operation.
    #[error("Invalid geometry: {message}")]
    InvalidGeometry {
        /// Description of what was wrong with the input.
        message: String,
    },

    /// The input was not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),
}

impl GeometryError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }
}

impl From<geojson::Error> for GeometryError {
    fn from(e: geojson::Error) -> Self {
        Self::GeoJson(Box::new(e))
    }
}

/// Minimal axis-aligned rectangle covering a set of vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Westernmost longitude.
    pub min_lon: f64,
    /// Easternmost longitude.
    pub max_lon: f64,
    /// Southernmost latitude.
    pub min_lat: f64,
    /// Northernmost latitude.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Whether `point` lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, point: LngLat) -> bool {
        let [lng, lat] = point;
        (self.min_lon..=self.max_lon).contains(&lng) && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

/// Largest valid absolute longitude, in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Largest valid absolute latitude, in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Rejects empty input, non-finite coordinates, and coordinates outside
/// the WGS84 longitude/latitude range.
fn validate(polygon: &[LngLat]) -> Result<(), GeometryError> {
    if polygon.is_empty() {
        return Err(GeometryError::invalid("polygon has no vertices"));
    }
    if let Some(idx) = polygon
        .iter()
        .position(|[lng, lat]| !lng.is_finite() || !lat.is_finite())
    {
        return Err(GeometryError::invalid(format!(
            "vertex {idx} has a non-finite coordinate"
        )));
    }
    if let Some(idx) = polygon
        .iter()
        .position(|[lng, lat]| lng.abs() > MAX_LONGITUDE || lat.abs() > MAX_LATITUDE)
    {
        let [lng, lat] = polygon[idx];
        return Err(GeometryError::invalid(format!(
            "vertex {idx} ({lng}, {lat}) is outside the valid longitude/latitude range"
        )));
    }
    Ok(())
}

/// Plain average of all vertex longitudes and latitudes.
///
/// Not area-weighted: densely sampled edges pull the result toward them.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] if `polygon` is empty or has
/// a non-finite or out-of-range coordinate.
#[allow(clippy::cast_precision_loss)]
pub fn centroid(polygon: &[LngLat]) -> Result<LngLat, GeometryError> {
    validate(polygon)?;

    let n = polygon.len() as f64;
    let (sum_lng, sum_lat) = polygon
        .iter()
        .fold((0.0, 0.0), |(lng, lat), p| (lng + p[0], lat + p[1]));

    Ok([sum_lng / n, sum_lat / n])
}

/// Minimal axis-aligned box covering every vertex.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeometry`] if `polygon` is empty or has
/// a non-finite or out-of-range coordinate.
pub fn bounding_box(polygon: &[LngLat]) -> Result<BoundingBox, GeometryError> {
    validate(polygon)?;

    let line = LineString::from(polygon.to_vec());
    let rect = line
        .bounding_rect()
        .ok_or_else(|| GeometryError::invalid("polygon has no bounding rectangle"))?;

    Ok(BoundingBox {
        min_lon: rect.min().x,
        max_lon: rect.max().x,
        min_lat: rect.min().y,
        max_lat: rect.max().y,
    })
}

/// Closed square ring of half-width `half_width` degrees centred on
/// `center`. The first vertex is repeated as the last.
#[must_use]
pub fn square_buffer(center: LngLat, half_width: f64) -> Vec<LngLat> {
    let [lng, lat] = center;
    vec![
        [lng - half_width, lat - half_width],
        [lng + half_width, lat - half_width],
        [lng + half_width, lat + half_width],
        [lng - half_width, lat + half_width],
        [lng - half_width, lat - half_width],
    ]
}

/// Parses a `GeoJSON` document into an open polygon ring.
///
/// Accepts a bare `Polygon`/`MultiPolygon` geometry, a `Feature`, or a
/// `FeatureCollection` (first feature with a geometry wins). For
/// multipolygons only the first polygon's exterior ring is used. The
/// closing vertex is dropped so the result matches drawn-area input.
///
/// # Errors
///
/// Returns [`GeometryError::GeoJson`] if the text is not valid `GeoJSON`,
/// or [`GeometryError::InvalidGeometry`] if it holds no polygon with at
/// least 3 distinct vertices.
pub fn parse_polygon(geojson_str: &str) -> Result<Vec<LngLat>, GeometryError> {
    let geojson: GeoJson = geojson_str.parse()?;

    let geometry = match geojson {
        GeoJson::Geometry(geom) => Some(geom),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .find_map(|feature| feature.geometry),
    }
    .ok_or_else(|| GeometryError::invalid("GeoJSON contains no geometry"))?;

    let geo_geom: geo::Geometry<f64> = geometry.try_into()?;
    let polygon = match geo_geom {
        geo::Geometry::Polygon(p) => p,
        geo::Geometry::MultiPolygon(mp) => mp
            .0
            .into_iter()
            .next()
            .ok_or_else(|| GeometryError::invalid("MultiPolygon is empty"))?,
        other => {
            return Err(GeometryError::invalid(format!(
                "expected a Polygon, found {}",
                geometry_type_name(&other)
            )));
        }
    };

    let mut ring: Vec<LngLat> = polygon
        .exterior()
        .coords()
        .map(|c| [c.x, c.y])
        .collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(GeometryError::invalid(format!(
            "polygon needs at least 3 vertices, found {}",
            ring.len()
        )));
    }
    validate(&ring)?;

    log::debug!("Parsed polygon with {} vertices", ring.len());
    Ok(ring)
}

const fn geometry_type_name(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}
