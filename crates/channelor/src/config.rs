//! CLI configuration: thin wrapper around `channelor_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--config, --output, --color) and the `watch` pipeline flags.

use std::path::PathBuf;

use clap::ValueEnum;

use channelor_core::{PipelineConfig, ScanSettle};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;

pub use channelor_config::{Config, load_config_from, save_config_to};

/// Effective config file path: `--config` / `CHANNELOR_CONFIG`, else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(channelor_config::config_path)
}

/// Load the config file (missing file means defaults) plus env overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_path(global))?)
}

/// Output format: flag > config > table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&cfg.defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "expected table, json, json-compact, yaml or plain, got '{}'",
            cfg.defaults.output
        ),
    })
}

/// Color mode: flag > config > auto.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> Result<ColorMode, CliError> {
    if let Some(mode) = global.color {
        return Ok(mode);
    }
    ColorMode::from_str(&cfg.defaults.color, true).map_err(|_| CliError::Validation {
        field: "defaults.color".into(),
        reason: format!("expected auto, always or never, got '{}'", cfg.defaults.color),
    })
}

/// Build the pipeline configuration, letting `watch` flags win over the file.
pub fn pipeline_config(cfg: &Config, args: &WatchArgs) -> Result<PipelineConfig, CliError> {
    let mut pipeline = cfg.to_pipeline_config()?;

    if args.clear_on_results {
        pipeline.settle = ScanSettle::NextResults;
    } else if let Some(delay) = args.settle_delay {
        if delay.is_zero() {
            return Err(CliError::Validation {
                field: "--settle-delay".into(),
                reason: "must be greater than zero (or pass --clear-on-results)".into(),
            });
        }
        pipeline.settle = ScanSettle::Delay(delay);
    }
    if args.all_bands {
        pipeline.only_24ghz = false;
    }
    Ok(pipeline)
}
