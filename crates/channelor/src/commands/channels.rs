//! Channel command handlers.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;

use channelor_core::{ChannelCongestion, ZigbeeChannel};

use crate::cli::{ChannelsArgs, ChannelsCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, analyze, format_dbm, format_score};

// ── Views ───────────────────────────────────────────────────────────

/// A scored channel plus whether it made the recommendation.
#[derive(Serialize)]
struct ChannelView<'a> {
    #[serde(flatten)]
    congestion: &'a ChannelCongestion,
    recommended: bool,
}

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "MHz")]
    frequency: String,
    #[tabled(rename = "Congestion")]
    score: String,
    #[tabled(rename = "Level")]
    dbm: String,
    #[tabled(rename = "Networks")]
    networks: String,
    #[tabled(rename = "ZLL")]
    zll: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl ChannelRow {
    fn from_view(view: &ChannelView<'_>, color: bool) -> Self {
        let c = view.congestion;
        let channel = if view.recommended {
            output::recommended(&format!("{} *", c.channel_number), color)
        } else {
            c.channel_number.to_string()
        };
        let notes = if c.is_warning_channel {
            output::warning("compatibility risk", color)
        } else if c.interfering_networks.is_empty() {
            output::muted("clear", color)
        } else {
            String::new()
        };
        Self {
            channel,
            frequency: c.center_frequency_mhz.to_string(),
            score: format_score(c.congestion_score),
            dbm: format_dbm(c.congestion_dbm),
            networks: c.interfering_networks.len().to_string(),
            zll: if c.is_zll_recommended { "yes".into() } else { String::new() },
            notes,
        }
    }
}

fn detail(c: &ChannelCongestion, recommended: &BTreeSet<u8>, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Channel {} ({} MHz)", c.channel_number, c.center_frequency_mhz);
    let _ = writeln!(
        out,
        "  Congestion:   {} ({})",
        format_score(c.congestion_score),
        format_dbm(c.congestion_dbm)
    );
    let _ = writeln!(
        out,
        "  ZLL channel:  {}",
        if c.is_zll_recommended { "yes" } else { "no" }
    );
    let verdict = if recommended.contains(&c.channel_number) {
        output::recommended("yes", color)
    } else {
        "no".into()
    };
    let _ = writeln!(out, "  Recommended:  {verdict}");

    if !c.pros.is_empty() {
        let _ = writeln!(out, "\nPros:");
        for tag in &c.pros {
            let _ = writeln!(out, "  + {tag}");
        }
    }
    if !c.cons.is_empty() {
        let _ = writeln!(out, "\nCons:");
        for tag in &c.cons {
            let line = format!("  - {tag}");
            if c.is_warning_channel {
                let _ = writeln!(out, "{}", output::warning(&line, color));
            } else {
                let _ = writeln!(out, "{line}");
            }
        }
    }

    let interferers = c.interferers_by_strength();
    if interferers.is_empty() {
        let _ = write!(out, "\n{}", output::muted("No interfering networks", color));
    } else {
        let _ = writeln!(out, "\nInterfering networks (strongest first):");
        for network in interferers {
            let _ = writeln!(
                out,
                "  {:>5} dBm  {:>4} MHz  {}",
                network.signal_strength_dbm, network.center_frequency_mhz, network.identifier
            );
        }
    }
    out.trim_end().to_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ChannelsArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ChannelsCommand::List(scan) => {
            let state = analyze(&scan, ctx).await?;
            let recommended = &state.recommended_channel_numbers;
            let views: Vec<ChannelView<'_>> = state
                .congestion
                .iter()
                .map(|congestion| ChannelView {
                    congestion,
                    recommended: recommended.contains(&congestion.channel_number),
                })
                .collect();

            let out = output::render_list(
                ctx.output,
                &views,
                |v| ChannelRow::from_view(v, ctx.color),
                |v| {
                    format!(
                        "{}\t{}",
                        v.congestion.channel_number,
                        format_score(v.congestion.congestion_score)
                    )
                },
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ChannelsCommand::Show { channel, scan } => {
            let Some(zigbee) = ZigbeeChannel::lookup(channel) else {
                return Err(CliError::UnknownChannel { channel });
            };
            let state = analyze(&scan, ctx).await?;
            let recommended = &state.recommended_channel_numbers;
            let congestion = state
                .congestion
                .iter()
                .find(|c| c.channel_number == zigbee.number)
                .ok_or(CliError::UnknownChannel { channel })?;

            tracing::debug!(
                channel,
                networks_in_scan = state.latest_observations.len(),
                interferers = congestion.interfering_networks.len(),
                "showing channel"
            );

            let view = ChannelView {
                congestion,
                recommended: recommended.contains(&channel),
            };
            let out = output::render_single(
                ctx.output,
                &view,
                |v| detail(v.congestion, recommended, ctx.color),
                |v| format_score(v.congestion.congestion_score),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }
    }
}
