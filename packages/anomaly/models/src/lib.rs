#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Anomaly record types, severity definitions, and carbon metric inputs.
//!
//! This crate defines the shared vocabulary of the carbon sensing
//! workflow: the severity scale, the catalog of synthetic anomaly kinds,
//! the fixed rule-based detection kinds, and the records both anomaly
//! synthesizers produce. Everything here is plain data; randomness and
//! geometry live in the downstream crates.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A `(longitude, latitude)` pair in decimal degrees.
pub type LngLat = [f64; 2];

/// An opaque RGB color.
pub type Rgb = [u8; 3];

/// An RGB color with alpha.
pub type Rgba = [u8; 4];

/// Severity of an anomaly, driving color, radius, and priority.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Needs immediate review.
    High,
    /// Worth a look.
    Medium,
    /// Informational.
    Low,
}

/// Slot table for the weighted severity draw: 2 high, 5 medium, 3 low.
///
/// Drawing a uniform index into this table yields the nominal
/// 20% / 50% / 30% split.
pub const SEVERITY_SLOTS: [Severity; 10] = [
    Severity::High,
    Severity::High,
    Severity::Medium,
    Severity::Medium,
    Severity::Medium,
    Severity::Medium,
    Severity::Medium,
    Severity::Low,
    Severity::Low,
    Severity::Low,
];

impl Severity {
    /// Rendering radius for synthetic anomaly markers, in map units.
    #[must_use]
    pub const fn radius(self) -> u32 {
        match self {
            Self::High => 300,
            Self::Medium => 200,
            Self::Low => 150,
        }
    }

    /// Base display color: red, orange, or yellow.
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            Self::High => [255, 0, 0],
            Self::Medium => [255, 165, 0],
            Self::Low => [255, 255, 0],
        }
    }

    /// Base display color with the given alpha channel.
    #[must_use]
    pub const fn color_with_alpha(self, alpha: u8) -> Rgba {
        let [r, g, b] = self.color();
        [r, g, b, alpha]
    }

    /// Returns all variants of this enum, most severe first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// The fixed catalog of synthetic anomaly kinds scattered by the
/// standalone generator. Each kind carries exactly one description.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SyntheticAnomalyKind {
    #[serde(rename = "Deforestation")]
    #[strum(serialize = "Deforestation")]
    Deforestation,
    #[serde(rename = "Illegal Logging")]
    #[strum(serialize = "Illegal Logging")]
    IllegalLogging,
    #[serde(rename = "Fire Hotspot")]
    #[strum(serialize = "Fire Hotspot")]
    FireHotspot,
    #[serde(rename = "Land Use Change")]
    #[strum(serialize = "Land Use Change")]
    LandUseChange,
    #[serde(rename = "Boundary Encroachment")]
    #[strum(serialize = "Boundary Encroachment")]
    BoundaryEncroachment,
    #[serde(rename = "Biomass Discrepancy")]
    #[strum(serialize = "Biomass Discrepancy")]
    BiomassDiscrepancy,
    #[serde(rename = "Data Gap")]
    #[strum(serialize = "Data Gap")]
    DataGap,
}

impl SyntheticAnomalyKind {
    /// Human-readable explanation shown in the details view.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Deforestation => "Sudden loss of canopy cover detected in recent imagery",
            Self::IllegalLogging => "Selective logging pattern outside permitted harvest zones",
            Self::FireHotspot => "Thermal anomaly consistent with active or recent burning",
            Self::LandUseChange => "Land cover class differs from the project baseline",
            Self::BoundaryEncroachment => {
                "Activity detected across the registered project boundary"
            }
            Self::BiomassDiscrepancy => "Estimated biomass deviates from reported carbon stocks",
            Self::DataGap => "Cloud cover or sensor gap prevents reliable measurement",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Deforestation,
            Self::IllegalLogging,
            Self::FireHotspot,
            Self::LandUseChange,
            Self::BoundaryEncroachment,
            Self::BiomassDiscrepancy,
            Self::DataGap,
        ]
    }
}

/// The rule-based anomaly kinds raised during verification.
///
/// Each rule owns a fixed id, so ids in a detection batch identify which
/// rule fired rather than the record's position.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DetectedAnomalyKind {
    /// Forest growth far above the expected rate for the area.
    #[serde(rename = "Unusual Carbon Growth")]
    #[strum(serialize = "Unusual Carbon Growth")]
    UnusualCarbonGrowth,
    /// Drawn area does not line up with the registered boundary.
    #[serde(rename = "Boundary Inconsistency")]
    #[strum(serialize = "Boundary Inconsistency")]
    BoundaryInconsistency,
    /// Land use / land cover classification change.
    #[serde(rename = "LULC Change")]
    #[strum(serialize = "LULC Change")]
    LulcChange,
    /// Tree cover loss inside the project area.
    #[serde(rename = "Deforestation Alert")]
    #[strum(serialize = "Deforestation Alert")]
    DeforestationAlert,
}

impl DetectedAnomalyKind {
    /// The fixed record id for this rule.
    #[must_use]
    pub const fn id(self) -> u32 {
        match self {
            Self::UnusualCarbonGrowth => 1,
            Self::BoundaryInconsistency => 2,
            Self::LulcChange => 3,
            Self::DeforestationAlert => 4,
        }
    }

    /// The fixed severity for this rule.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnusualCarbonGrowth | Self::DeforestationAlert => Severity::High,
            Self::BoundaryInconsistency | Self::LulcChange => Severity::Medium,
        }
    }

    /// The demonstration anomalies emitted whenever an area measurement
    /// is available, in emission order.
    #[must_use]
    pub const fn area_rules() -> &'static [Self] {
        &[
            Self::BoundaryInconsistency,
            Self::LulcChange,
            Self::DeforestationAlert,
        ]
    }

    /// Fixed description for the area rules.
    ///
    /// Returns `None` for [`Self::UnusualCarbonGrowth`], whose description
    /// is composed from the measured growth rate.
    #[must_use]
    pub const fn fixed_description(self) -> Option<&'static str> {
        match self {
            Self::UnusualCarbonGrowth => None,
            Self::BoundaryInconsistency => Some(
                "Drawn project boundary overlaps neighbouring parcels in the land registry",
            ),
            Self::LulcChange => Some(
                "Land use classification changed from forest to agriculture since the baseline year",
            ),
            Self::DeforestationAlert => {
                Some("Recent tree cover loss detected inside the project area")
            }
        }
    }
}

/// A synthetic anomaly scattered around a reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyPoint {
    /// 1-based, sequential within one generation batch.
    pub id: u32,
    /// Marker position.
    pub position: LngLat,
    /// Severity level.
    pub severity: Severity,
    /// Catalog kind.
    #[serde(rename = "type")]
    pub kind: SyntheticAnomalyKind,
    /// Human-readable explanation (fixed per kind).
    pub description: String,
    /// Rendering radius derived from [`Severity::radius`].
    pub radius: u32,
}

/// A rule-derived anomaly raised during verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyInfo {
    /// Fixed per rule, see [`DetectedAnomalyKind::id`].
    pub id: u32,
    /// Anomaly location.
    pub location: LngLat,
    /// Severity level.
    pub severity: Severity,
    /// Rule kind.
    #[serde(rename = "type")]
    pub kind: DetectedAnomalyKind,
    /// Human-readable explanation.
    pub description: String,
}

/// Carbon measurements for a drawn area, supplied by the measurement step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonMetrics {
    /// Total carbon stocks.
    pub carbon_stocks: f64,
    /// Carbon attributed to forest growth.
    pub forest_growth: f64,
    /// Measured area, if the measurement step produced one.
    #[serde(default)]
    pub area: Option<f64>,
}

impl CarbonMetrics {
    /// Whether a usable area measurement is present (set, finite, non-zero).
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.area.is_some_and(|a| a.is_finite() && a != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_slots_match_nominal_weights() {
        let count = |s: Severity| SEVERITY_SLOTS.iter().filter(|x| **x == s).count();
        assert_eq!(count(Severity::High), 2);
        assert_eq!(count(Severity::Medium), 5);
        assert_eq!(count(Severity::Low), 3);
    }

    #[test]
    fn radius_lookup() {
        assert_eq!(Severity::High.radius(), 300);
        assert_eq!(Severity::Medium.radius(), 200);
        assert_eq!(Severity::Low.radius(), 150);
    }

    #[test]
    fn severity_string_forms() {
        assert_eq!(Severity::High.to_string(), "high");
        assert_eq!("medium".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn synthetic_catalog_has_seven_distinct_kinds() {
        let kinds = SyntheticAnomalyKind::all();
        assert_eq!(kinds.len(), 7);
        for kind in kinds {
            assert!(!kind.description().is_empty(), "{kind:?} has no description");
        }
    }

    #[test]
    fn detected_kinds_have_fixed_ids_and_severities() {
        let rules = DetectedAnomalyKind::area_rules();
        let ids: Vec<u32> = rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        let severities: Vec<Severity> = rules.iter().map(|r| r.severity()).collect();
        assert_eq!(
            severities,
            vec![Severity::Medium, Severity::Medium, Severity::High]
        );
        assert!(rules.iter().all(|r| r.fixed_description().is_some()));
        assert_eq!(DetectedAnomalyKind::UnusualCarbonGrowth.id(), 1);
        assert!(
            DetectedAnomalyKind::UnusualCarbonGrowth
                .fixed_description()
                .is_none()
        );
    }

    #[test]
    fn anomaly_info_serializes_type_label() {
        let info = AnomalyInfo {
            id: 3,
            location: [1.0, 2.0],
            severity: Severity::Medium,
            kind: DetectedAnomalyKind::LulcChange,
            description: "x".to_string(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "LULC Change");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["location"][1], 2.0);
    }

    #[test]
    fn area_presence_is_truthy() {
        let mut metrics = CarbonMetrics {
            carbon_stocks: 100.0,
            forest_growth: 10.0,
            area: None,
        };
        assert!(!metrics.has_area());
        metrics.area = Some(0.0);
        assert!(!metrics.has_area());
        metrics.area = Some(f64::NAN);
        assert!(!metrics.has_area());
        metrics.area = Some(12.5);
        assert!(metrics.has_area());
    }

    #[test]
    fn carbon_metrics_deserialize_camel_case() {
        let metrics: CarbonMetrics =
            serde_json::from_str(r#"{"carbonStocks":120,"forestGrowth":30}"#).unwrap();
        assert!((metrics.carbon_stocks - 120.0).abs() < f64::EPSILON);
        assert!(metrics.area.is_none());
    }
}
