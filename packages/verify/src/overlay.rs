//! `GeoJSON` overlays built from detected anomalies.
//!
//! Each detection run produces two parallel feature collections from the
//! same anomaly set: one point feature per anomaly, and one closed square
//! polygon per anomaly buffering its location. Severity drives the colors
//! a renderer should use for each.

use carbon_sense_anomaly_models::{AnomalyInfo, Rgba, Severity};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value, feature::Id};
use serde::Serialize;

/// Layer id for the point overlay.
pub const POINTS_LAYER_ID: &str = "anomaly-points";

/// Layer id for the area overlay.
pub const AREAS_LAYER_ID: &str = "anomaly-areas";

/// Alpha for point marker fills.
pub const POINT_FILL_ALPHA: u8 = 200;

/// Alpha for area polygon fills.
pub const AREA_FILL_ALPHA: u8 = 80;

/// Point and area feature collections for one detection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    /// One `Point` feature per anomaly with `{id, severity, type, description}`.
    pub points: FeatureCollection,
    /// One closed `Polygon` feature per anomaly with `{id, severity}`.
    pub areas: FeatureCollection,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            points: empty_collection(),
            areas: empty_collection(),
        }
    }
}

const fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

/// Point marker fill color.
#[must_use]
pub const fn point_fill_color(severity: Severity) -> Rgba {
    severity.color_with_alpha(POINT_FILL_ALPHA)
}

/// Area polygon fill color.
#[must_use]
pub const fn area_fill_color(severity: Severity) -> Rgba {
    severity.color_with_alpha(AREA_FILL_ALPHA)
}

/// Area polygon outline color.
#[must_use]
pub const fn area_line_color(severity: Severity) -> Rgba {
    severity.color_with_alpha(u8::MAX)
}

/// Builds both overlays for `anomalies`, buffering each location by
/// `half_width` degrees.
#[must_use]
pub fn build_overlay(anomalies: &[AnomalyInfo], half_width: f64) -> Overlay {
    Overlay {
        points: FeatureCollection {
            bbox: None,
            features: anomalies.iter().map(point_feature).collect(),
            foreign_members: None,
        },
        areas: FeatureCollection {
            bbox: None,
            features: anomalies
                .iter()
                .map(|a| area_feature(a, half_width))
                .collect(),
            foreign_members: None,
        },
    }
}

fn point_feature(anomaly: &AnomalyInfo) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), anomaly.id.into());
    properties.insert("severity".to_string(), anomaly.severity.as_ref().into());
    properties.insert("type".to_string(), anomaly.kind.as_ref().into());
    properties.insert(
        "description".to_string(),
        anomaly.description.clone().into(),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(anomaly.location.to_vec()))),
        id: Some(Id::Number(anomaly.id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn area_feature(anomaly: &AnomalyInfo, half_width: f64) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), anomaly.id.into());
    properties.insert("severity".to_string(), anomaly.severity.as_ref().into());

    let ring = carbon_sense_geometry::square_buffer(anomaly.location, half_width)
        .into_iter()
        .map(|p| p.to_vec())
        .collect();

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: Some(Id::Number(anomaly.id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}
