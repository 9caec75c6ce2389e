// ── Runtime pipeline configuration ──
//
// Describes *how* the pipeline behaves. Never touches disk: the config
// crate (or a test) builds a `PipelineConfig` and hands it in.

use std::time::Duration;

/// Settle delay applied when nothing else is configured.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// When `is_scanning` goes back to `false` after a scan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSettle {
    /// Fixed delay after the request, whether or not results arrived.
    ///
    /// Only the most recent request's timer clears the flag. A request made
    /// while an earlier one is still pending restarts the delay, so with
    /// requests at 0s and 0.6s and a 1s delay the flag stays set until 1.6s.
    Delay(Duration),
    /// On the next observation update after the request.
    NextResults,
}

impl Default for ScanSettle {
    fn default() -> Self {
        Self::Delay(DEFAULT_SETTLE_DELAY)
    }
}

/// Configuration for one pipeline session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How the scanning flag is cleared.
    pub settle: ScanSettle,
    /// Drop observations outside 2.4 GHz before they reach the model.
    pub only_24ghz: bool,
    /// Capacity of the serialized input queue.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            settle: ScanSettle::default(),
            only_24ghz: true,
            queue_capacity: 64,
        }
    }
}
