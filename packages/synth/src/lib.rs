#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Synthetic anomaly generator.
//!
//! Scatters demo anomalies around the centroid of a drawn area so the map
//! has something to show before real analytics exist. Every point gets a
//! random offset, a kind drawn from [`SyntheticAnomalyKind::all`], and a
//! severity from the weighted [`SEVERITY_SLOTS`] table.
//!
//! Randomness is always injected. Pass a seeded `SmallRng` for
//! reproducible batches, or use [`generate_dummy_anomalies`] for a
//! thread-local generator.

use carbon_sense_anomaly_models::{
    AnomalyPoint, LngLat, SEVERITY_SLOTS, Severity, SyntheticAnomalyKind,
};
use rand::{Rng, seq::SliceRandom as _};
use serde::{Deserialize, Serialize};

/// Reference point used when no usable polygon is drawn.
pub const DEFAULT_CENTER: LngLat = [101.4383, 0.5104];

/// Maximum offset, in degrees, from the reference point on each axis.
pub const DEFAULT_SCALE: f64 = 0.02;

/// Largest usable offset, in degrees. Wider offsets leave the globe.
pub const MAX_SCALE: f64 = 180.0;

/// Tunables for the synthetic generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Maximum per-axis offset from the reference point, in degrees.
    pub scale: f64,
    /// Reference point when the polygon is missing or has < 3 vertices.
    pub default_center: LngLat,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            default_center: DEFAULT_CENTER,
        }
    }
}

/// Draws a severity from the 10-slot table (20% high, 50% medium, 30% low).
pub fn draw_severity<R: Rng + ?Sized>(rng: &mut R) -> Severity {
    SEVERITY_SLOTS[rng.gen_range(0..SEVERITY_SLOTS.len())]
}

/// Centroid of `polygon`, or the configured default centre when the
/// polygon is absent, has fewer than 3 vertices, or cannot be averaged.
#[must_use]
pub fn reference_point(polygon: Option<&[LngLat]>, config: &SynthConfig) -> LngLat {
    let Some(polygon) = polygon.filter(|p| p.len() >= 3) else {
        return config.default_center;
    };

    carbon_sense_geometry::centroid(polygon).unwrap_or_else(|e| {
        log::warn!("Falling back to default center: {e}");
        config.default_center
    })
}

/// Generates exactly `count` synthetic anomalies around the polygon's
/// centroid.
///
/// Ids run from 1 to `count` in generation order.
pub fn generate<R: Rng + ?Sized>(
    polygon: Option<&[LngLat]>,
    count: usize,
    config: &SynthConfig,
    rng: &mut R,
) -> Vec<AnomalyPoint> {
    let [center_lng, center_lat] = reference_point(polygon, config);
    let scale = usable_scale(config.scale);

    log::debug!(
        "Generating {count} synthetic anomalies around ({center_lng}, {center_lat}) +/- {scale}"
    );

    (1..=count)
        .map(|idx| {
            let position = [
                center_lng + rng.gen_range(-scale..=scale),
                center_lat + rng.gen_range(-scale..=scale),
            ];
            let kind = SyntheticAnomalyKind::all()
                .choose(&mut *rng)
                .copied()
                .unwrap_or(SyntheticAnomalyKind::DataGap);
            let severity = draw_severity(&mut *rng);

            AnomalyPoint {
                id: u32::try_from(idx).unwrap_or(u32::MAX),
                position,
                severity,
                kind,
                description: kind.description().to_string(),
                radius: severity.radius(),
            }
        })
        .collect()
}

/// `scale` as a finite offset in `0.0..=MAX_SCALE`. Non-finite values
/// collapse to zero so sampling never sees an unbounded range.
fn usable_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.abs().min(MAX_SCALE)
    } else {
        log::warn!("Ignoring non-finite synthetic scale {scale}");
        0.0
    }
}

/// [`generate`] with the default configuration and the thread-local RNG.
#[must_use]
pub fn generate_dummy_anomalies(polygon: Option<&[LngLat]>, count: usize) -> Vec<AnomalyPoint> {
    generate(polygon, count, &SynthConfig::default(), &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    const SQUARE: [LngLat; 4] = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];

    fn within(value: f64, center: f64, scale: f64) -> bool {
        (value - center).abs() <= scale + 1e-12
    }

    #[test]
    fn returns_exactly_count_records() {
        let mut rng = SmallRng::seed_from_u64(1);
        for count in [0, 1, 7, 250] {
            let points = generate(Some(&SQUARE[..]), count, &SynthConfig::default(), &mut rng);
            assert_eq!(points.len(), count);
        }
    }

    #[test]
    fn positions_stay_within_scale_of_centroid() {
        let mut rng = SmallRng::seed_from_u64(2);
        let points = generate(Some(&SQUARE[..]), 500, &SynthConfig::default(), &mut rng);
        for p in &points {
            assert!(within(p.position[0], 1.0, DEFAULT_SCALE), "{p:?}");
            assert!(within(p.position[1], 1.0, DEFAULT_SCALE), "{p:?}");
        }
    }

    #[test]
    fn default_center_example() {
        let points = generate_dummy_anomalies(None, 3);
        assert_eq!(points.len(), 3);
        for p in &points {
            let [lng, lat] = p.position;
            assert!((101.4183 - 1e-9..=101.4583 + 1e-9).contains(&lng), "{lng}");
            assert!((0.4904 - 1e-9..=0.5304 + 1e-9).contains(&lat), "{lat}");
        }
    }

    #[test]
    fn short_polygon_uses_default_center() {
        let config = SynthConfig::default();
        assert_eq!(
            reference_point(Some(&[[5.0, 5.0], [6.0, 6.0]][..]), &config),
            DEFAULT_CENTER
        );
        assert_eq!(reference_point(None, &config), DEFAULT_CENTER);
        assert_eq!(reference_point(Some(&SQUARE[..]), &config), [1.0, 1.0]);
    }

    #[test]
    fn non_finite_polygon_falls_back_instead_of_failing() {
        let bad = [[0.0, 0.0], [f64::NAN, 0.0], [1.0, 1.0]];
        assert_eq!(
            reference_point(Some(&bad[..]), &SynthConfig::default()),
            DEFAULT_CENTER
        );
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut rng = SmallRng::seed_from_u64(3);
        let points = generate(None, 20, &SynthConfig::default(), &mut rng);
        let ids: Vec<u32> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn radius_and_description_follow_severity_and_kind() {
        let mut rng = SmallRng::seed_from_u64(4);
        for p in generate(None, 300, &SynthConfig::default(), &mut rng) {
            assert_eq!(p.radius, p.severity.radius());
            assert_eq!(p.description, p.kind.description());
        }
    }

    #[test]
    fn severity_distribution_converges_to_slot_weights() {
        let mut rng = SmallRng::seed_from_u64(5);
        let n = 10_000;
        let mut counts = [0_u32; 3];
        for _ in 0..n {
            match draw_severity(&mut rng) {
                Severity::High => counts[0] += 1,
                Severity::Medium => counts[1] += 1,
                Severity::Low => counts[2] += 1,
            }
        }
        // Five standard deviations of a binomial at n = 10k is under 0.025.
        for (count, expected) in counts.iter().zip([0.2, 0.5, 0.3]) {
            let share = f64::from(*count) / f64::from(n);
            assert!((share - expected).abs() < 0.025, "{share} vs {expected}");
        }
    }

    #[test]
    fn kinds_cover_catalog() {
        let mut rng = SmallRng::seed_from_u64(6);
        let points = generate(None, 2_000, &SynthConfig::default(), &mut rng);
        for kind in SyntheticAnomalyKind::all() {
            assert!(points.iter().any(|p| p.kind == *kind), "{kind:?} never drawn");
        }
    }

    #[test]
    fn seeded_batches_are_reproducible() {
        let config = SynthConfig::default();
        let a = generate(Some(&SQUARE[..]), 10, &config, &mut SmallRng::seed_from_u64(11));
        let b = generate(Some(&SQUARE[..]), 10, &config, &mut SmallRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn config_reads_partial_toml() {
        let config: SynthConfig = toml::from_str("scale = 0.05").unwrap();
        assert!((config.scale - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.default_center, DEFAULT_CENTER);
    }

    #[test]
    fn unusable_scale_never_escapes_the_globe() {
        let mut rng = SmallRng::seed_from_u64(6);

        let nan = SynthConfig {
            scale: f64::NAN,
            ..SynthConfig::default()
        };
        for p in generate(None, 20, &nan, &mut rng) {
            assert_eq!(p.position, DEFAULT_CENTER);
        }

        let huge = SynthConfig {
            scale: 1e308,
            ..SynthConfig::default()
        };
        for p in generate(Some(&SQUARE[..]), 20, &huge, &mut rng) {
            assert!(within(p.position[0], 1.0, MAX_SCALE), "{p:?}");
            assert!(within(p.position[1], 1.0, MAX_SCALE), "{p:?}");
        }
    }
}
