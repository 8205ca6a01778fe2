//! Verification session state.
//!
//! A [`VerificationSession`] owns the anomalies and overlays of the current
//! verification step. Each [`VerificationSession::run`] pulls the drawn
//! area and carbon metrics from a [`MeasurementSource`], replaces the
//! previous detection wholesale, and starts the cosmetic "verification in
//! progress" window. That window only gates a progress display; detection
//! itself has already finished when `run` returns.

use std::time::{Duration, Instant};

use carbon_sense_anomaly_models::{AnomalyInfo, CarbonMetrics, LngLat};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Detection, DetectionConfig, Overlay, detect,
    registry::{LayerRegistry, register_overlays},
};

/// Default length of the "verification in progress" window.
pub const DEFAULT_VERIFICATION_DELAY_MS: u64 = 2_000;

/// The drawing and measurement step the session reads from.
pub trait MeasurementSource {
    /// The drawn project polygon, if any.
    fn drawn_area(&self) -> Option<Vec<LngLat>>;

    /// Carbon metrics measured for the drawn area, if any.
    fn carbon_metrics(&self) -> Option<CarbonMetrics>;
}

/// Fixed inputs, for callers that already hold the measurement results.
#[derive(Debug, Clone, Default)]
pub struct StaticMeasurements {
    /// Drawn polygon.
    pub area: Option<Vec<LngLat>>,
    /// Measured metrics.
    pub metrics: Option<CarbonMetrics>,
}

impl MeasurementSource for StaticMeasurements {
    fn drawn_area(&self) -> Option<Vec<LngLat>> {
        self.area.clone()
    }

    fn carbon_metrics(&self) -> Option<CarbonMetrics> {
        self.metrics
    }
}

/// Session tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of the cosmetic progress window, in milliseconds.
    pub verification_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verification_delay_ms: DEFAULT_VERIFICATION_DELAY_MS,
        }
    }
}

impl SessionConfig {
    /// [`Self::verification_delay_ms`] as a [`Duration`].
    #[must_use]
    pub const fn verification_delay(&self) -> Duration {
        Duration::from_millis(self.verification_delay_ms)
    }
}

/// State of one verification step.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    config: SessionConfig,
    detection_config: DetectionConfig,
    detection: Detection,
    started_at: Option<Instant>,
    runs: u64,
}

impl VerificationSession {
    /// Creates an idle session with no detection.
    #[must_use]
    pub fn new(config: SessionConfig, detection_config: DetectionConfig) -> Self {
        Self {
            config,
            detection_config,
            detection: Detection::default(),
            started_at: None,
            runs: 0,
        }
    }

    /// Runs detection against the current measurements, replacing any
    /// previous result, and announces the overlays to `registry`.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        source: &dyn MeasurementSource,
        rng: &mut R,
        registry: Option<&mut dyn LayerRegistry>,
        now: Instant,
    ) -> &Detection {
        let area = source.drawn_area();
        let metrics = source.carbon_metrics();

        self.detection = detect(
            area.as_deref(),
            metrics.as_ref(),
            &self.detection_config,
            rng,
        );
        self.started_at = Some(now);
        self.runs += 1;

        if !self.detection.is_empty() {
            register_overlays(registry);
        }

        log::debug!(
            "Verification run {} found {} anomalies",
            self.runs,
            self.detection.anomalies.len()
        );

        &self.detection
    }

    /// Whether the progress window opened by the last run is still open.
    #[must_use]
    pub fn is_verifying(&self, now: Instant) -> bool {
        self.started_at
            .is_some_and(|start| now.saturating_duration_since(start) < self.config.verification_delay())
    }

    /// Fraction of the progress window elapsed, from `0.0` to `1.0`.
    ///
    /// Idle sessions report `0.0`.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f64 {
        let Some(start) = self.started_at else {
            return 0.0;
        };

        let delay = self.config.verification_delay();
        if delay.is_zero() {
            return 1.0;
        }

        (now.saturating_duration_since(start).as_secs_f64() / delay.as_secs_f64()).min(1.0)
    }

    /// Latest detection.
    #[must_use]
    pub const fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Anomalies from the latest run.
    #[must_use]
    pub fn anomalies(&self) -> &[AnomalyInfo] {
        &self.detection.anomalies
    }

    /// Overlays from the latest run.
    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        &self.detection.overlay
    }

    /// Number of completed runs.
    #[must_use]
    pub const fn runs(&self) -> u64 {
        self.runs
    }

    /// Discards the detection and closes the progress window.
    pub fn end(&mut self) {
        self.detection = Detection::default();
        self.started_at = None;
    }
}

impl Default for VerificationSession {
    fn default() -> Self {
        Self::new(SessionConfig::default(), DetectionConfig::default())
    }
}
