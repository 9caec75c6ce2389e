//! `watch`: feed newline-delimited scan snapshots through a live pipeline and
//! print each recomputed recommendation.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use channelor_core::{ManualScanSource, Pipeline, PipelineState, SessionPhase};

use crate::cli::{OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::scan::parse_snapshot_line;

use super::{Context, start_session};

/// One line of watch output.
#[derive(Debug, Serialize)]
struct WatchUpdate {
    snapshot: usize,
    networks: usize,
    phase: SessionPhase,
    recommended: Vec<u8>,
    best_zll: Option<u8>,
}

impl WatchUpdate {
    fn from_state(snapshot: usize, state: &PipelineState) -> Self {
        Self {
            snapshot,
            networks: state.latest_observations.len(),
            phase: state.phase(),
            recommended: state
                .recommendations
                .iter()
                .map(|c| c.channel_number)
                .collect(),
            best_zll: state.recommendations.best_zll().map(|c| c.channel_number),
        }
    }

    fn render(&self, format: OutputFormat, color: bool) -> Result<String, CliError> {
        let numbers = self
            .recommended
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        match format {
            OutputFormat::Table => {
                let zll = self
                    .best_zll
                    .map(|n| format!(" (best ZLL {n})"))
                    .unwrap_or_default();
                Ok(format!(
                    "snapshot {}: {} networks, recommended {}{}",
                    self.snapshot,
                    self.networks,
                    output::recommended(&numbers, color),
                    output::muted(&zll, color)
                ))
            }
            // One object per line keeps the stream machine-readable.
            OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(self, true),
            OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(self)?)),
            OutputFormat::Plain => Ok(numbers),
        }
    }
}

async fn open_input(input: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>, CliError> {
    match input {
        None => Ok(Box::new(tokio::io::stdin())),
        Some(path) if path == Path::new("-") => Ok(Box::new(tokio::io::stdin())),
        Some(path) => match tokio::fs::File::open(path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CliError::ScanNotFound {
                path: path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        },
    }
}

pub async fn handle(args: WatchArgs, ctx: &Context) -> Result<(), CliError> {
    let pipeline_config = config::pipeline_config(&ctx.config, &args)?;
    let reader = open_input(args.input.as_deref()).await?;

    let source = Arc::new(ManualScanSource::new());
    let pipeline = start_session(pipeline_config, Arc::clone(&source)).await?;

    let result = feed(&pipeline, reader, ctx).await;

    tracing::info!(
        scan_requests = source.scan_requests(),
        "input exhausted; stopping pipeline"
    );
    pipeline.shutdown().await;
    result
}

async fn feed(
    pipeline: &Pipeline,
    reader: Box<dyn AsyncRead + Unpin + Send>,
    ctx: &Context,
) -> Result<(), CliError> {
    let mut lines = BufReader::new(reader).lines();
    let mut line_number = 0;
    let mut snapshot = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let Some(observations) = parse_snapshot_line(&line, line_number)? else {
            continue;
        };
        snapshot += 1;

        let state = pipeline.observations_updated(observations).await?;
        let update = WatchUpdate::from_state(snapshot, &state);
        tracing::debug!(?update, "snapshot applied");
        output::print_output(&update.render(ctx.output, ctx.color)?, ctx.quiet);
    }
    Ok(())
}
