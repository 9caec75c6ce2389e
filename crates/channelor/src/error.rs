//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable help
//! text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use channelor_config::ConfigError;
use channelor_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const DATA: i32 = 65;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────

    #[error("Scan file '{path}' not found")]
    #[diagnostic(
        code(channelor::scan_not_found),
        help("Pass a JSON or YAML array of observations with --scan <FILE>")
    )]
    ScanNotFound { path: String },

    #[error("Bad scan data ({origin}): {reason}")]
    #[diagnostic(
        code(channelor::scan_format),
        help(
            "Each observation needs `identifier`, `center_frequency_mhz` and\n\
             `signal_strength_dbm` (aliases: ssid, frequency, rssi)."
        )
    )]
    ScanFormat { origin: String, reason: String },

    #[error("Channel {channel} is not a Zigbee channel")]
    #[diagnostic(
        code(channelor::unknown_channel),
        help("Zigbee channels are numbered 11 to 26. Run: channelor channels list --scan <FILE>")
    )]
    UnknownChannel { channel: u8 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(channelor::validation))]
    Validation { field: String, reason: String },

    #[error("Refusing to overwrite {path} without confirmation")]
    #[diagnostic(
        code(channelor::confirmation_required),
        help("Use --yes (-y) or --force to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { path: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(channelor::config),
        help("Check the config file, or regenerate it with: channelor config init --force")
    )]
    Config(#[from] ConfigError),

    // ── Pipeline ─────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(channelor::pipeline))]
    Core(#[from] CoreError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(channelor::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(channelor::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ScanNotFound { .. } => exit_code::NOT_FOUND,
            Self::ScanFormat { .. } => exit_code::DATA,
            Self::UnknownChannel { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            Self::Config(_) | Self::Core(_) | Self::Io(_) | Self::Json(_) | Self::Yaml(_) => {
                exit_code::GENERAL
            }
        }
    }
}
