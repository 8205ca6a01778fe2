//! Toolchain configuration loaded from TOML.
//!
//! The defaults ship embedded from `config/default.toml`. A user file,
//! given with `--config` or the `CARBON_SENSE_CONFIG` environment
//! variable, may set any subset of keys; missing keys keep their defaults.

use std::path::{Path, PathBuf};

use carbon_sense_geometry::{MAX_LATITUDE, MAX_LONGITUDE};
use carbon_sense_layers::LayerTheme;
use carbon_sense_synth::{MAX_SCALE, SynthConfig};
use carbon_sense_verify::{DetectionConfig, SessionConfig};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "CARBON_SENSE_CONFIG";

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`AppConfig`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is outside its usable range.
    #[error("Invalid config value for {key}: {message}")]
    Invalid {
        /// Dotted key of the offending value.
        key: &'static str,
        /// What the value must satisfy.
        message: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// All tunables for one toolchain run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Synthetic anomaly generator.
    pub synth: SynthConfig,
    /// Rule-based detection and overlays.
    pub detection: DetectionConfig,
    /// Verification session.
    pub session: SessionConfig,
    /// Marker and label styling.
    pub layers: LayerTheme,
}

impl AppConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `text` is not valid TOML or has
    /// keys of the wrong type, and [`ConfigError::Invalid`] if a numeric
    /// value is outside its usable range.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the numeric tunables that the generators and overlays feed
    /// straight into random ranges and geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.synth.scale;
        if !(0.0..=MAX_SCALE).contains(&scale) {
            return Err(ConfigError::invalid(
                "synth.scale",
                format!("must be finite and between 0 and {MAX_SCALE}, got {scale}"),
            ));
        }

        let [lng, lat] = self.synth.default_center;
        if !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lng)
            || !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
        {
            return Err(ConfigError::invalid(
                "synth.default_center",
                format!("must be a valid [lng, lat], got [{lng}, {lat}]"),
            ));
        }

        let threshold = self.detection.growth_threshold_pct;
        if !threshold.is_finite() {
            return Err(ConfigError::invalid(
                "detection.growth_threshold_pct",
                format!("must be finite, got {threshold}"),
            ));
        }

        let half_width = self.detection.buffer_half_width;
        if !half_width.is_finite() || half_width <= 0.0 {
            return Err(ConfigError::invalid(
                "detection.buffer_half_width",
                format!("must be finite and greater than 0, got {half_width}"),
            ));
        }

        Ok(())
    }

    /// The embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the embedded file is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG)
    }
}

/// Loads configuration from `path`, then `$CARBON_SENSE_CONFIG`, falling
/// back to the embedded defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the chosen file cannot be read or parsed.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let Some(path) = path else {
        log::debug!("Using embedded default configuration");
        return AppConfig::embedded();
    };

    log::info!("Loading configuration from {}", path.display());
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;

    AppConfig::from_toml(&text)
}

#[cfg(test)]
mod tests {
    use carbon_sense_geometry::SamplingMode;

    use super::*;

    #[test]
    fn embedded_defaults_match_code_defaults() {
        assert_eq!(AppConfig::embedded().unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            "[session]\nverification_delay_ms = 10\n\n[detection.sampling]\ntype = \"polygon\"\nmax_attempts = 50\n",
        )
        .unwrap();

        assert_eq!(config.session.verification_delay_ms, 10);
        assert_eq!(
            config.detection.sampling,
            SamplingMode::Polygon { max_attempts: 50 }
        );
        assert_eq!(config.synth, SynthConfig::default());
        assert_eq!(config.layers, LayerTheme::default());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml("[synth]\nscale = \"wide\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unusable_synth_scale_is_rejected() {
        for text in [
            "[synth]\nscale = nan\n",
            "[synth]\nscale = 1e308\n",
            "[synth]\nscale = -0.5\n",
        ] {
            assert!(
                matches!(
                    AppConfig::from_toml(text),
                    Err(ConfigError::Invalid {
                        key: "synth.scale",
                        ..
                    })
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn default_center_must_be_on_the_globe() {
        assert!(matches!(
            AppConfig::from_toml("[synth]\ndefault_center = [200.0, 0.0]\n"),
            Err(ConfigError::Invalid {
                key: "synth.default_center",
                ..
            })
        ));
        assert!(AppConfig::from_toml("[synth]\ndefault_center = [nan, 0.0]\n").is_err());
    }

    #[test]
    fn non_finite_growth_threshold_is_rejected() {
        assert!(matches!(
            AppConfig::from_toml("[detection]\ngrowth_threshold_pct = nan\n"),
            Err(ConfigError::Invalid {
                key: "detection.growth_threshold_pct",
                ..
            })
        ));
        assert!(AppConfig::from_toml("[detection]\ngrowth_threshold_pct = inf\n").is_err());
    }

    #[test]
    fn buffer_half_width_must_be_positive() {
        for value in ["-0.005", "0.0", "nan"] {
            let text = format!("[detection]\nbuffer_half_width = {value}\n");
            assert!(
                matches!(
                    AppConfig::from_toml(&text),
                    Err(ConfigError::Invalid {
                        key: "detection.buffer_half_width",
                        ..
                    })
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn invalid_value_names_the_key() {
        let err = AppConfig::from_toml("[synth]\nscale = nan\n").unwrap_err();
        assert!(err.to_string().contains("synth.scale"), "{err}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    }
}
