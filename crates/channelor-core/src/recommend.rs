// ── Recommendation selector ──
//
// Picks three channels: the two quietest of everything else, then the
// quietest ZLL channel last, so a ZLL-compatible choice is always offered.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ChannelCongestion;

/// How many non-ZLL-slot picks precede the ZLL pick.
pub const OPEN_PICKS: usize = 2;

/// Ordered recommendation: up to two open picks followed by the best ZLL
/// channel. Empty when nothing was scored or analysis is not authorized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationSet(Vec<ChannelCongestion>);

impl RecommendationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn channels(&self) -> &[ChannelCongestion] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChannelCongestion> {
        self.0.iter()
    }

    /// The ZLL pick, always the last element.
    pub fn best_zll(&self) -> Option<&ChannelCongestion> {
        self.0.last()
    }

    /// Channel numbers in the set, for highlighting without recomputation.
    pub fn channel_numbers(&self) -> BTreeSet<u8> {
        self.0.iter().map(|c| c.channel_number).collect()
    }
}

impl<'a> IntoIterator for &'a RecommendationSet {
    type Item = &'a ChannelCongestion;
    type IntoIter = std::slice::Iter<'a, ChannelCongestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Lower score first, then lower channel number.
fn by_score_then_number(a: &ChannelCongestion, b: &ChannelCongestion) -> Ordering {
    a.congestion_score
        .total_cmp(&b.congestion_score)
        .then(a.channel_number.cmp(&b.channel_number))
}

/// Select the recommended channels from a fully scored list.
///
/// Deterministic for any input. Returns an empty set if `scored` holds no
/// ZLL-recommended channel (which includes the empty list).
pub fn select_recommendations(scored: &[ChannelCongestion]) -> RecommendationSet {
    let Some(best_zll) = scored
        .iter()
        .filter(|c| c.is_zll_recommended)
        .min_by(|a, b| by_score_then_number(a, b))
    else {
        return RecommendationSet::empty();
    };

    let mut others: Vec<&ChannelCongestion> = scored
        .iter()
        .filter(|c| c.channel_number != best_zll.channel_number)
        .collect();
    others.sort_by(|a, b| by_score_then_number(a, b));

    let picks = others
        .into_iter()
        .take(OPEN_PICKS)
        .chain(std::iter::once(best_zll))
        .cloned()
        .collect();
    RecommendationSet(picks)
}
