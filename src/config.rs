//! Configuration management for hadley.
//!
//! Settings are layered with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. JSON config file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::climatology::ReduceOptions;
use crate::colormaps::builder::{
    clip_with_samples, combine_with_center, CombineOptions, DEFAULT_SAMPLES,
};
use crate::colormaps::{Colormap, Ramp};
use crate::error::{HadleyError, Result};
use crate::logging::{log_error, log_operation_end, log_operation_start};

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "HADLEY_LOG_LEVEL";

/// Environment variable overriding attribute propagation in reductions
pub const ENV_KEEP_ATTRS: &str = "HADLEY_KEEP_ATTRS";

/// Colormap construction defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColormapConfig {
    /// Samples taken when clipping a ramp
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Samples taken from the lower ramp when combining
    #[serde(default = "default_half")]
    pub n_low: usize,

    /// Samples taken from the upper ramp when combining
    #[serde(default = "default_half")]
    pub n_up: usize,

    /// Width of the neutral band in centered combinations
    #[serde(default = "default_n_white")]
    pub n_white: usize,
}

/// Climatology reduction defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimatologyConfig {
    /// Copy source attributes onto reduced fields
    #[serde(default = "default_keep_attrs")]
    pub keep_attrs: bool,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Colormap configuration
    #[serde(default)]
    pub colormap: ColormapConfig,

    /// Climatology configuration
    #[serde(default)]
    pub climatology: ClimatologyConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let start = Instant::now();
        let source = path.map(|p| p.display().to_string());
        log_operation_start("load_config", source.as_deref());

        let result = Self::load_layers(path);
        if let Err(err) = &result {
            log_error(err, "load_config");
        }
        log_operation_end("load_config", start, result.is_ok());
        result
    }

    fn load_layers(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Config::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Reading configuration file");
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override fields from the environment
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        if let Ok(raw) = std::env::var(ENV_KEEP_ATTRS) {
            self.climatology.keep_attrs = parse_bool(&raw).ok_or_else(|| HadleyError::Config {
                message: format!("{} must be true or false, got {}", ENV_KEEP_ATTRS, raw),
            })?;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(HadleyError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if self.colormap.samples == 0 {
            return Err(HadleyError::Config {
                message: "Colormap sample count cannot be 0".to_string(),
            });
        }

        if self.colormap.n_low + self.colormap.n_up + self.colormap.n_white == 0 {
            return Err(HadleyError::Config {
                message: "Combined colormaps need at least one sample".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            colormap: ColormapConfig::default(),
            climatology: ClimatologyConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ColormapConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            n_low: default_half(),
            n_up: default_half(),
            n_white: default_n_white(),
        }
    }
}

impl ColormapConfig {
    /// Clip a colormap to `[lo, hi]` at the configured sample count
    pub fn clip<C: Colormap + ?Sized>(&self, cmap: &C, lo: f64, hi: f64) -> Result<Ramp> {
        clip_with_samples(cmap, lo, hi, self.samples)
    }

    /// Stack two colormaps around the configured neutral band
    pub fn combine<L, U>(
        &self,
        low: &L,
        up: &U,
        range_low: [f64; 2],
        range_up: [f64; 2],
    ) -> Result<Ramp>
    where
        L: Colormap + ?Sized,
        U: Colormap + ?Sized,
    {
        let options = CombineOptions::from(self).ranges(range_low, range_up);
        combine_with_center(low, up, &options, self.n_white)
    }
}

impl Default for ClimatologyConfig {
    fn default() -> Self {
        Self {
            keep_attrs: default_keep_attrs(),
        }
    }
}

impl From<&ColormapConfig> for CombineOptions {
    fn from(config: &ColormapConfig) -> Self {
        CombineOptions {
            n_low: config.n_low,
            n_up: config.n_up,
            ..CombineOptions::default()
        }
    }
}

impl From<&ClimatologyConfig> for ReduceOptions {
    fn from(config: &ClimatologyConfig) -> Self {
        ReduceOptions {
            keep_attrs: config.keep_attrs,
        }
    }
}

// Default value functions for serde
fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_half() -> usize {
    128
}

fn default_n_white() -> usize {
    3
}

fn default_keep_attrs() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
