//! Subcommand implementations.
//!
//! Each command returns the JSON it would print so that the interactive
//! menu and the tests can drive the same code as the CLI.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use carbon_sense_anomaly_models::{CarbonMetrics, LngLat};
use carbon_sense_cli_utils::{MultiProgress, VerificationProgress};
use carbon_sense_layers::AnomalyLayers;
use carbon_sense_verify::{
    LayerControls as _, LayerPanel, StaticMeasurements, VerificationSession,
};
use clap::Args;
use rand::{SeedableRng, rngs::SmallRng};
use serde_json::json;

use crate::config::AppConfig;

/// How often the verification progress display is refreshed.
const PROGRESS_TICK: Duration = Duration::from_millis(50);

/// Arguments for `generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Number of synthetic anomalies
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// `GeoJSON` file holding the drawn polygon
    #[arg(long)]
    pub polygon: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print marker and label layer descriptors instead of raw records
    #[arg(long)]
    pub layers: bool,

    /// Record id to highlight in the layer output
    #[arg(long, requires = "layers")]
    pub selected: Option<u32>,
}

/// Arguments for `detect` and `verify`.
#[derive(Debug, Clone, Args)]
pub struct DetectArgs {
    /// `GeoJSON` file holding the drawn polygon
    #[arg(long)]
    pub polygon: PathBuf,

    /// Total carbon stocks for the area
    #[arg(long)]
    pub carbon_stocks: f64,

    /// Carbon attributed to forest growth
    #[arg(long)]
    pub forest_growth: f64,

    /// Measured area; enables the area rules
    #[arg(long)]
    pub area: Option<f64>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl DetectArgs {
    const fn metrics(&self) -> CarbonMetrics {
        CarbonMetrics {
            carbon_stocks: self.carbon_stocks,
            forest_growth: self.forest_growth,
            area: self.area,
        }
    }
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    seed.map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64)
}

/// Reads and parses a polygon `GeoJSON` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no usable polygon.
pub fn read_polygon(path: &Path) -> Result<Vec<LngLat>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read polygon {}: {e}", path.display()))?;
    Ok(carbon_sense_geometry::parse_polygon(&text)?)
}

/// Generates synthetic anomalies and renders them as JSON.
///
/// # Errors
///
/// Returns an error if the polygon file cannot be read or parsed, or if
/// serialization fails.
pub fn generate(
    args: &GenerateArgs,
    config: &AppConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let polygon = args.polygon.as_deref().map(read_polygon).transpose()?;
    let mut rng = make_rng(args.seed);

    let points = carbon_sense_synth::generate(
        polygon.as_deref(),
        args.count,
        &config.synth,
        &mut rng,
    );
    log::info!("Generated {} synthetic anomalies", points.len());

    if !args.layers {
        return Ok(serde_json::to_string_pretty(&points)?);
    }

    let mut layers = AnomalyLayers::new(points, config.layers);
    layers.set_selected(args.selected);
    if let Some(id) = args.selected
        && layers.record(id).is_none()
    {
        log::warn!("Selected id {id} is not in the generated batch");
    }

    Ok(serde_json::to_string_pretty(&layers.layers())?)
}

/// Runs rule-based detection and renders anomalies plus overlays as JSON.
///
/// # Errors
///
/// Returns an error if the polygon file cannot be read or parsed, or if
/// serialization fails.
pub fn detect(args: &DetectArgs, config: &AppConfig) -> Result<String, Box<dyn std::error::Error>> {
    let polygon = read_polygon(&args.polygon)?;
    let metrics = args.metrics();
    let mut rng = make_rng(args.seed);

    let detection = carbon_sense_verify::detect(
        Some(polygon.as_slice()),
        Some(&metrics),
        &config.detection,
        &mut rng,
    );

    Ok(serde_json::to_string_pretty(&detection)?)
}

/// Runs a verification session, showing progress for the verification
/// window, and renders the detection plus the registered layers as JSON.
///
/// # Errors
///
/// Returns an error if the polygon file cannot be read or parsed, or if
/// serialization fails.
pub fn verify(
    args: &DetectArgs,
    config: &AppConfig,
    multi: &MultiProgress,
) -> Result<String, Box<dyn std::error::Error>> {
    let measurements = StaticMeasurements {
        area: Some(read_polygon(&args.polygon)?),
        metrics: Some(args.metrics()),
    };
    let mut rng = make_rng(args.seed);
    let mut panel = LayerPanel::new();
    let mut session = VerificationSession::new(config.session, config.detection);

    session.run(&measurements, &mut rng, Some(&mut panel), Instant::now());

    let progress = VerificationProgress::start(multi, "Verifying carbon claims");
    loop {
        let now = Instant::now();
        progress.set_fraction(session.progress(now));
        if !session.is_verifying(now) {
            break;
        }
        std::thread::sleep(PROGRESS_TICK);
    }
    progress.finish(format!(
        "Verification complete: {} anomalies",
        session.anomalies().len()
    ));

    let output = json!({
        "anomalies": session.anomalies(),
        "overlay": session.overlay(),
        "layers": panel.list_layers(),
    });

    Ok(serde_json::to_string_pretty(&output)?)
}
