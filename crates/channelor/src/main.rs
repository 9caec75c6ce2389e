mod cli;
mod commands;
mod config;
mod error;
mod output;
mod scan;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigArgs, ConfigCommand};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Completions don't depend on the config file.
    if let Command::Completions(ref args) = cli.command {
        commands::completions(args);
        return Ok(());
    }

    let ctx = match Context::resolve(&cli.global) {
        Ok(ctx) => ctx,
        Err(CliError::Config(e)) if is_config_init(&cli.command) => {
            tracing::warn!(error = %e, "ignoring unreadable config");
            Context::with_defaults(&cli.global)
        }
        Err(e) => return Err(e),
    };
    tracing::debug!(command = ?cli.command, config = %ctx.config_path.display(), "dispatching command");
    commands::dispatch(cli.command, &ctx).await
}

fn is_config_init(command: &Command) -> bool {
    matches!(
        command,
        Command::Config(ConfigArgs {
            command: ConfigCommand::Init { .. }
        })
    )
}
