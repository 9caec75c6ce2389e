//! Shared configuration for channelor.
//!
//! TOML file + environment overrides, and translation to
//! `channelor_core::PipelineConfig`. The CLI layers its own flag overrides
//! on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use channelor_core::{PipelineConfig, ScanSettle};

/// Prefix for environment overrides, e.g. `CHANNELOR_PIPELINE__SETTLE_DELAY_MS`.
pub const ENV_PREFIX: &str = "CHANNELOR_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Presentation defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Pipeline behaviour.
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// Delay before the scanning flag clears after a request.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Clear the scanning flag on the next scan results instead of after
    /// the delay.
    #[serde(default)]
    pub clear_scanning_on_results: bool,

    /// Ignore networks outside the 2.4 GHz band.
    #[serde(default = "default_only_24ghz")]
    pub only_24ghz: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            clear_scanning_on_results: false,
            only_24ghz: default_only_24ghz(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    1000
}
fn default_only_24ghz() -> bool {
    true
}

impl Config {
    /// Translate into the core's runtime configuration.
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let settings = &self.pipeline;
        let settle = if settings.clear_scanning_on_results {
            ScanSettle::NextResults
        } else if settings.settle_delay_ms == 0 {
            return Err(ConfigError::Validation {
                field: "pipeline.settle_delay_ms".into(),
                reason: "must be greater than zero (or set clear_scanning_on_results)".into(),
            });
        } else {
            ScanSettle::Delay(Duration::from_millis(settings.settle_delay_ms))
        };

        Ok(PipelineConfig {
            settle,
            only_24ghz: settings.only_24ghz,
            ..PipelineConfig::default()
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "sebastiano", "channelor").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("channelor");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
