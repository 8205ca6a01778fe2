#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule-based anomaly detection for the verification step.
//!
//! Given the drawn project polygon and its measured [`CarbonMetrics`],
//! [`detect`] evaluates a fixed set of rules:
//!
//! 1. **Unusual carbon growth**: fires when forest growth exceeds the
//!    configured percentage of the non-growth baseline. Placed at the
//!    polygon centroid.
//! 2. **Area rules**: whenever an area measurement is present, three
//!    demonstration anomalies (boundary, LULC, deforestation) are placed at
//!    sampled points inside the polygon.
//!
//! The result carries the anomaly records plus the two `GeoJSON` overlays
//! built from them (see [`overlay`]). Detection never fails: missing input
//! yields an empty [`Detection`] and degenerate geometry skips the rules
//! that need it.

pub mod overlay;
pub mod registry;
pub mod session;

use carbon_sense_anomaly_models::{AnomalyInfo, CarbonMetrics, DetectedAnomalyKind, LngLat};
use carbon_sense_geometry::SamplingMode;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use overlay::{Overlay, build_overlay};
pub use registry::{
    LayerControls, LayerEntry, LayerPanel, LayerRegistry, available_layers, register_overlays,
};
pub use session::{MeasurementSource, SessionConfig, StaticMeasurements, VerificationSession};

/// Growth percentage above which the growth rule fires.
pub const DEFAULT_GROWTH_THRESHOLD_PCT: f64 = 20.0;

/// Half-width, in degrees, of the square drawn around each anomaly.
pub const DEFAULT_BUFFER_HALF_WIDTH: f64 = 0.005;

/// Tunables for rule evaluation and overlay construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Growth percentage that must be exceeded to raise the growth anomaly.
    pub growth_threshold_pct: f64,
    /// Half-width of area overlay squares, in degrees.
    pub buffer_half_width: f64,
    /// Placement of the area-rule anomalies.
    pub sampling: SamplingMode,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            growth_threshold_pct: DEFAULT_GROWTH_THRESHOLD_PCT,
            buffer_half_width: DEFAULT_BUFFER_HALF_WIDTH,
            sampling: SamplingMode::BoundingBox,
        }
    }
}

/// Output of one detection run. Regenerated in full on every run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Detection {
    /// Anomalies in rule order.
    pub anomalies: Vec<AnomalyInfo>,
    /// Map overlays derived from [`Self::anomalies`].
    pub overlay: Overlay,
}

impl Detection {
    /// Whether no rule fired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Looks up an anomaly by its rule id.
    #[must_use]
    pub fn anomaly(&self, id: u32) -> Option<&AnomalyInfo> {
        self.anomalies.iter().find(|a| a.id == id)
    }
}

/// Forest growth as a percentage of the non-growth baseline:
/// `forest_growth / (carbon_stocks - forest_growth) * 100`.
///
/// A zero (or non-finite) result is reported as `0.0`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn forest_growth_percentage(metrics: &CarbonMetrics) -> f64 {
    let baseline = metrics.carbon_stocks - metrics.forest_growth;
    if baseline == 0.0 {
        return 0.0;
    }

    let pct = metrics.forest_growth / baseline * 100.0;
    if pct.is_finite() { pct } else { 0.0 }
}

/// Evaluates every rule against `polygon` and `metrics`.
///
/// Returns an empty detection when either input is missing or the polygon
/// has no vertices.
pub fn detect<R: Rng + ?Sized>(
    polygon: Option<&[LngLat]>,
    metrics: Option<&CarbonMetrics>,
    config: &DetectionConfig,
    rng: &mut R,
) -> Detection {
    let (Some(polygon), Some(metrics)) = (polygon.filter(|p| !p.is_empty()), metrics) else {
        log::debug!("Skipping detection: no drawn area or no carbon metrics");
        return Detection::default();
    };

    let mut anomalies = Vec::with_capacity(4);

    if let Some(growth) = growth_anomaly(polygon, metrics, config) {
        anomalies.push(growth);
    }

    if metrics.has_area() {
        anomalies.extend(area_anomalies(polygon, config, rng));
    }

    log::info!(
        "Detection produced {} anomalies for a {}-vertex area",
        anomalies.len(),
        polygon.len()
    );

    let overlay = build_overlay(&anomalies, config.buffer_half_width);
    Detection { anomalies, overlay }
}

fn growth_anomaly(
    polygon: &[LngLat],
    metrics: &CarbonMetrics,
    config: &DetectionConfig,
) -> Option<AnomalyInfo> {
    let pct = forest_growth_percentage(metrics);
    if pct <= config.growth_threshold_pct {
        return None;
    }

    let location = match carbon_sense_geometry::centroid(polygon) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Skipping growth anomaly: {e}");
            return None;
        }
    };

    let kind = DetectedAnomalyKind::UnusualCarbonGrowth;
    Some(AnomalyInfo {
        id: kind.id(),
        location,
        severity: kind.severity(),
        kind,
        description: format!(
            "Forest growth of {pct:.1}% over the baseline exceeds the expected {}% rate for this area",
            config.growth_threshold_pct
        ),
    })
}

fn area_anomalies<R: Rng + ?Sized>(
    polygon: &[LngLat],
    config: &DetectionConfig,
    rng: &mut R,
) -> Vec<AnomalyInfo> {
    let mut anomalies = Vec::with_capacity(DetectedAnomalyKind::area_rules().len());

    for kind in DetectedAnomalyKind::area_rules() {
        let location = match carbon_sense_geometry::sample_point(polygon, config.sampling, rng) {
            Ok(location) => location,
            Err(e) => {
                log::warn!("Skipping area anomalies: {e}");
                return Vec::new();
            }
        };

        anomalies.push(AnomalyInfo {
            id: kind.id(),
            location,
            severity: kind.severity(),
            kind: *kind,
            description: kind.fixed_description().unwrap_or_default().to_string(),
        });
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use carbon_sense_anomaly_models::Severity;
    use carbon_sense_geometry::bounding_box;
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    const SQUARE: [LngLat; 4] = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];

    fn metrics(carbon_stocks: f64, forest_growth: f64, area: Option<f64>) -> CarbonMetrics {
        CarbonMetrics {
            carbon_stocks,
            forest_growth,
            area,
        }
    }

    fn run(polygon: &[LngLat], m: &CarbonMetrics) -> Detection {
        let mut rng = SmallRng::seed_from_u64(17);
        detect(Some(polygon), Some(m), &DetectionConfig::default(), &mut rng)
    }

    #[test]
    fn growth_percentage_example() {
        let pct = forest_growth_percentage(&metrics(120.0, 30.0, None));
        assert!((pct - 33.333_333).abs() < 1e-4, "{pct}");
    }

    #[test]
    fn growth_percentage_zero_denominator() {
        assert!(forest_growth_percentage(&metrics(50.0, 50.0, None)).abs() < f64::EPSILON);
    }

    #[test]
    fn growth_anomaly_fires_above_threshold() {
        let detection = run(&SQUARE, &metrics(120.0, 30.0, None));
        assert_eq!(detection.anomalies.len(), 1);

        let growth = &detection.anomalies[0];
        assert_eq!(growth.id, 1);
        assert_eq!(growth.kind, DetectedAnomalyKind::UnusualCarbonGrowth);
        assert_eq!(growth.severity, Severity::High);
        assert_eq!(growth.location, [1.0, 1.0]);
        assert!(growth.description.contains("33.3%"), "{}", growth.description);
    }

    #[test]
    fn growth_anomaly_absent_at_or_below_threshold() {
        // 10 / (110 - 10) = 10%
        let detection = run(&SQUARE, &metrics(110.0, 10.0, None));
        assert!(detection.is_empty());

        let detection = run(&SQUARE, &metrics(1000.0, 10.0, None));
        assert!(detection.anomaly(1).is_none());
    }

    #[test]
    fn growth_exactly_at_threshold_does_not_fire() {
        // 20 / (120 - 20) = 20%
        let m = metrics(120.0, 20.0, None);
        assert!((forest_growth_percentage(&m) - DEFAULT_GROWTH_THRESHOLD_PCT).abs() < f64::EPSILON);
        assert!(run(&SQUARE, &m).anomaly(1).is_none());
    }

    #[test]
    fn growth_just_above_threshold_fires() {
        // 20.01 / (120 - 20.01) ~= 20.012%
        let detection = run(&SQUARE, &metrics(120.0, 20.01, None));
        let growth = detection.anomaly(1).unwrap();
        assert!(growth.description.contains("20.0%"), "{}", growth.description);
    }

    #[test]
    fn area_rules_emit_three_fixed_anomalies_inside_bbox() {
        let polygon = [[101.40, 0.49], [101.47, 0.50], [101.45, 0.55]];
        let bbox = bounding_box(&polygon).unwrap();

        for m in [
            metrics(100.0, 1.0, Some(25.0)),
            metrics(0.0, 0.0, Some(1.0)),
            metrics(-5.0, 300.0, Some(0.5)),
        ] {
            let detection = run(&polygon, &m);
            let area: Vec<&AnomalyInfo> = detection.anomalies.iter().filter(|a| a.id >= 2).collect();
            assert_eq!(area.len(), 3);
            assert_eq!(area.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3, 4]);
            assert_eq!(
                area.iter().map(|a| a.severity).collect::<Vec<_>>(),
                vec![Severity::Medium, Severity::Medium, Severity::High]
            );
            for a in area {
                assert!(bbox.contains(a.location), "{a:?} outside {bbox:?}");
            }
        }
    }

    #[test]
    fn ids_skip_one_when_growth_rule_does_not_fire() {
        let detection = run(&SQUARE, &metrics(100.0, 1.0, Some(4.0)));
        let ids: Vec<u32> = detection.anomalies.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn rule_order_puts_growth_first() {
        let detection = run(&SQUARE, &metrics(120.0, 30.0, Some(4.0)));
        let kinds: Vec<DetectedAnomalyKind> = detection.anomalies.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DetectedAnomalyKind::UnusualCarbonGrowth,
                DetectedAnomalyKind::BoundaryInconsistency,
                DetectedAnomalyKind::LulcChange,
                DetectedAnomalyKind::DeforestationAlert,
            ]
        );
    }

    #[test]
    fn missing_inputs_yield_empty_detection() {
        let mut rng = SmallRng::seed_from_u64(0);
        let config = DetectionConfig::default();
        let m = metrics(120.0, 30.0, Some(1.0));

        assert!(detect(None, Some(&m), &config, &mut rng).is_empty());
        assert!(detect(Some(&SQUARE[..]), None, &config, &mut rng).is_empty());
        assert!(detect(Some(&[][..]), Some(&m), &config, &mut rng).is_empty());
    }

    #[test]
    fn degenerate_polygon_skips_rules_instead_of_failing() {
        let bad = [[0.0, 0.0], [f64::NAN, 1.0], [1.0, 1.0]];
        let detection = run(&bad, &metrics(120.0, 30.0, Some(1.0)));
        assert!(detection.is_empty());
    }

    #[test]
    fn out_of_range_polygon_skips_rules_instead_of_failing() {
        let huge = [[-1e308, 0.0], [1e308, 0.0], [0.0, 1.0]];
        let detection = run(&huge, &metrics(120.0, 30.0, Some(1.0)));
        assert!(detection.is_empty());
        assert!(detection.overlay.points.features.is_empty());
    }

    #[test]
    fn overlay_matches_anomalies() {
        let detection = run(&SQUARE, &metrics(120.0, 30.0, Some(4.0)));
        assert_eq!(detection.overlay.points.features.len(), 4);
        assert_eq!(detection.overlay.areas.features.len(), 4);
    }

    #[test]
    fn polygon_sampling_mode_keeps_points_inside() {
        let triangle = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let config = DetectionConfig {
            sampling: SamplingMode::Polygon { max_attempts: 128 },
            ..DetectionConfig::default()
        };
        let m = metrics(100.0, 1.0, Some(1.0));
        let mut rng = SmallRng::seed_from_u64(23);
        for _ in 0..50 {
            let detection = detect(Some(&triangle[..]), Some(&m), &config, &mut rng);
            for a in &detection.anomalies {
                assert!(a.location[0] + a.location[1] < 1.0, "{a:?}");
            }
        }
    }

    #[test]
    fn config_reads_partial_toml() {
        let config: DetectionConfig = toml::from_str(
            "growth_threshold_pct = 35.0\n[sampling]\ntype = \"polygon\"\nmax_attempts = 10\n",
        )
        .unwrap();
        assert!((config.growth_threshold_pct - 35.0).abs() < f64::EPSILON);
        assert!((config.buffer_half_width - DEFAULT_BUFFER_HALF_WIDTH).abs() < f64::EPSILON);
        assert_eq!(config.sampling, SamplingMode::Polygon { max_attempts: 10 });
    }
}
