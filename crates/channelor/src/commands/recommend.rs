//! Recommendation command handler.

use serde::Serialize;
use tabled::Tabled;

use channelor_core::ChannelCongestion;

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output;

use super::{Context, analyze, format_dbm, format_score};

/// Why a channel was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Pick {
    Quietest,
    BestZll,
}

#[derive(Serialize)]
struct RankedChannel<'a> {
    rank: usize,
    pick: Pick,
    #[serde(flatten)]
    channel: &'a ChannelCongestion,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "MHz")]
    frequency: i32,
    #[tabled(rename = "Congestion")]
    score: String,
    #[tabled(rename = "Level")]
    dbm: String,
    #[tabled(rename = "Pick")]
    pick: String,
}

impl RecommendationRow {
    fn from_ranked(r: &RankedChannel<'_>, color: bool) -> Self {
        Self {
            rank: r.rank,
            channel: output::recommended(&r.channel.channel_number.to_string(), color),
            frequency: r.channel.center_frequency_mhz,
            score: format_score(r.channel.congestion_score),
            dbm: format_dbm(r.channel.congestion_dbm),
            pick: match r.pick {
                Pick::Quietest => "quietest".into(),
                Pick::BestZll => "best ZLL".into(),
            },
        }
    }
}

pub async fn handle(args: &ScanArgs, ctx: &Context) -> Result<(), CliError> {
    let state = analyze(args, ctx).await?;
    let picks = state.recommendations.channels();
    if picks.is_empty() {
        tracing::warn!("no channels to recommend");
    }

    let ranked: Vec<RankedChannel<'_>> = picks
        .iter()
        .enumerate()
        .map(|(i, channel)| RankedChannel {
            rank: i + 1,
            pick: if i + 1 == picks.len() {
                Pick::BestZll
            } else {
                Pick::Quietest
            },
            channel,
        })
        .collect();

    let out = output::render_list(
        ctx.output,
        &ranked,
        |r| RecommendationRow::from_ranked(r, ctx.color),
        |r| r.channel.channel_number.to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
