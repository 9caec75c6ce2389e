//! Clap derive structures for the `channelor` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// channelor -- find the quietest Zigbee channel for your Wi-Fi neighbourhood
#[derive(Debug, Parser)]
#[command(
    name = "channelor",
    version,
    about = "Score Zigbee channels against Wi-Fi congestion and recommend the best ones",
    long_about = "Scores the sixteen 2.4 GHz Zigbee channels (11-26) against recorded\n\
        Wi-Fi scan data and recommends three of them, always including the\n\
        best Zigbee Light Link (ZLL) channel.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "CHANNELOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(long, short = 'o', env = "CHANNELOR_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (overrides config)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect per-channel congestion for a recorded scan
    #[command(alias = "ch")]
    Channels(ChannelsArgs),

    /// Recommend channels for a recorded scan
    #[command(alias = "rec")]
    Recommend(ScanArgs),

    /// Stream scan snapshots (one JSON array per line) through a live pipeline
    Watch(WatchArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared args ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Scan file: JSON or YAML array of observations
    #[arg(long, short = 'f', value_name = "FILE")]
    pub scan: PathBuf,

    /// Keep networks outside the 2.4 GHz band
    #[arg(long)]
    pub all_bands: bool,
}

// ── Channels ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ChannelsArgs {
    #[command(subcommand)]
    pub command: ChannelsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ChannelsCommand {
    /// Score all sixteen channels
    #[command(alias = "ls")]
    List(ScanArgs),

    /// Show one channel with its pros, cons, and interfering networks
    Show {
        /// Zigbee channel number (11-26)
        channel: u8,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Newline-delimited scan snapshots; `-` or omitted reads stdin
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Delay before the scanning flag clears (e.g. `1s`, `500ms`)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub settle_delay: Option<Duration>,

    /// Clear the scanning flag on the next results instead of after a delay
    #[arg(long)]
    pub clear_on_results: bool,

    /// Keep networks outside the 2.4 GHz band
    #[arg(long)]
    pub all_bands: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
