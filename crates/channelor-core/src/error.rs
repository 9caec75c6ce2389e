// ── Core error types ──
//
// Scoring and selection are total and never fail. The only errors the core
// raises come from the pipeline lifecycle and from a channel universe that
// does not hold its invariants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid channel plan: {reason}")]
    InvalidChannelPlan { reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Pipeline has shut down")]
    PipelineClosed,
}
