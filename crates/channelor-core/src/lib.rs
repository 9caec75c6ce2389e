//! Wi-Fi congestion scoring and Zigbee channel recommendation.
//!
//! This crate owns the analysis model and the reactive state layer for the
//! channelor workspace:
//!
//! - **[`analyzer`]**: [`score_channels()`] maps one Wi-Fi scan snapshot onto
//!   the sixteen IEEE 802.15.4 channels (11–26), summing the linear power of
//!   every overlapping access point into a per-channel congestion score.
//!
//! - **[`recommend`]**: [`select_recommendations()`] picks the two quietest
//!   channels plus the quietest Zigbee Light Link channel, always last.
//!
//! - **[`Pipeline`]**: Single-writer actor that recomputes both whenever a
//!   new snapshot or authorization signal arrives, publishing consistent
//!   [`PipelineState`] snapshots through a `watch` channel.
//!
//! - **[`StateStream`]**: Subscription handle vended by the pipeline.
//!   Exposes `changed()` / `wait_for()` for reactive consumers.
//!
//! - **Collaborators** ([`source`]): [`ScanSource`] and
//!   [`AuthorizationSource`] trait objects handed to the pipeline, with
//!   in-process implementations for the CLI and tests.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod recommend;
pub mod source;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use analyzer::score_channels;
pub use config::{PipelineConfig, ScanSettle};
pub use error::CoreError;
pub use pipeline::{Pipeline, PipelineState, SessionPhase};
pub use recommend::{RecommendationSet, select_recommendations};
pub use source::{
    AuthorizationSource, FixedAuthorization, ManualAuthorization, ManualScanSource, ScanSource,
};
pub use stream::StateStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ChannelCongestion, ChannelTag, NetworkObservation, ZIGBEE_CHANNELS, ZLL_CHANNELS,
    ZigbeeChannel, retain_24ghz,
};
