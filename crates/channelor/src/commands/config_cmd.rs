//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::Path;

use crate::cli::{ConfigArgs, ConfigCommand, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::Context;

/// Ask before overwriting `path`. Non-interactive sessions need `--yes`.
fn confirm_overwrite(path: &Path, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            path: path.display().to_string(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

fn render_config(cfg: &Config, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            let text = toml::to_string_pretty(cfg).map_err(channelor_config::ConfigError::from)?;
            Ok(text.trim_end().to_owned())
        }
        OutputFormat::Json => output::render_json(cfg, false),
        OutputFormat::JsonCompact => output::render_json(cfg, true),
        OutputFormat::Yaml => output::render_yaml(cfg),
    }
}

pub fn handle(args: ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let out = render_config(&ctx.config, ctx.output)?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&ctx.config_path.display().to_string(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = &ctx.config_path;
            if path.exists() && !force && !confirm_overwrite(path, ctx.yes)? {
                if !ctx.quiet {
                    eprintln!("Left {} unchanged", path.display());
                }
                return Ok(());
            }

            config::save_config_to(&Config::default(), path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            if !ctx.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}
