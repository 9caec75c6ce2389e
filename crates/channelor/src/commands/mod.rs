//! Command handlers and the shared context they run with.

pub mod channels;
pub mod config_cmd;
pub mod recommend;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use channelor_core::{
    CoreError, FixedAuthorization, ManualScanSource, Pipeline, PipelineConfig, PipelineState,
};

use crate::cli::{Cli, Command, CompletionsArgs, GlobalOpts, OutputFormat, ScanArgs};
use crate::config::{self, Config};
use crate::error::CliError;

/// Resolved presentation settings plus the loaded config.
pub struct Context {
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Context {
    pub fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_path = config::config_path(global);
        let config = config::load(global)?;
        let output = config::output_format(global, &config)?;
        let color = crate::output::should_color(config::color_mode(global, &config)?);
        Ok(Self {
            output,
            color,
            quiet: global.quiet,
            yes: global.yes,
            config,
            config_path,
        })
    }

    /// Context with a default config, for repairing an unreadable file.
    pub fn with_defaults(global: &GlobalOpts) -> Self {
        let color = global.color.unwrap_or(crate::cli::ColorMode::Auto);
        Self {
            output: global.output.unwrap_or(OutputFormat::Table),
            color: crate::output::should_color(color),
            quiet: global.quiet,
            yes: global.yes,
            config: Config::default(),
            config_path: config::config_path(global),
        }
    }
}

/// Route a command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Channels(args) => channels::handle(args, ctx).await,
        Command::Recommend(args) => recommend::handle(&args, ctx).await,
        Command::Watch(args) => watch::handle(args, ctx).await,
        Command::Config(args) => config_cmd::handle(args, ctx),
        Command::Completions(args) => {
            completions(&args);
            Ok(())
        }
    }
}

/// Write a completion script for `args.shell` to stdout.
pub fn completions(args: &CompletionsArgs) {
    use clap::CommandFactory;

    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "channelor", &mut std::io::stdout());
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Start a pipeline session that is already authorized.
pub async fn start_session(
    pipeline_config: PipelineConfig,
    source: Arc<ManualScanSource>,
) -> Result<Pipeline, CliError> {
    let pipeline = Pipeline::spawn(
        pipeline_config,
        source,
        Arc::new(FixedAuthorization::granted()),
    )?;
    // Snapshots fed before the grant lands would be scored as unauthorized.
    pipeline
        .subscribe()
        .wait_for(|s| s.authorized)
        .await
        .ok_or(CoreError::PipelineClosed)?;
    Ok(pipeline)
}

/// Load a scan file and run it through a one-shot pipeline session.
pub async fn analyze(args: &ScanArgs, ctx: &Context) -> Result<Arc<PipelineState>, CliError> {
    let observations = crate::scan::load_scan_file(&args.scan)?;
    let loaded = observations.len();

    let mut pipeline_config = ctx.config.to_pipeline_config()?;
    if args.all_bands {
        pipeline_config.only_24ghz = false;
    }

    let pipeline = start_session(pipeline_config, Arc::new(ManualScanSource::new())).await?;
    let state = pipeline.observations_updated(observations).await;
    pipeline.shutdown().await;
    let state = state?;

    let dropped = loaded - state.latest_observations.len();
    if dropped > 0 {
        tracing::info!(dropped, "ignored networks outside the 2.4 GHz band");
    }
    Ok(state)
}

/// Congestion score for display: `0` or three significant digits.
pub fn format_score(score: f64) -> String {
    if score > 0.0 {
        format!("{score:.3e}")
    } else {
        "0".into()
    }
}

pub fn format_dbm(dbm: Option<i32>) -> String {
    dbm.map_or_else(|| "-".into(), |d| format!("{d} dBm"))
}
