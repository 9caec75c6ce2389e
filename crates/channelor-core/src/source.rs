// ── External collaborators ──
//
// The pipeline never talks to a radio or a permission system directly. It is
// handed two trait objects: a scan source (snapshots in, scan requests out)
// and an authorization source. The in-process implementations here back the
// CLI and the tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::StreamExt;
use futures_util::future;
use futures_util::stream::{self, BoxStream};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::model::NetworkObservation;

/// Supplies Wi-Fi scan snapshots and accepts scan requests.
pub trait ScanSource: Send + Sync {
    /// Push-style stream of complete scan snapshots. May yield empty lists.
    fn observations(&self) -> BoxStream<'static, Vec<NetworkObservation>>;

    /// Ask the platform to start a scan. `true` means the request was
    /// accepted, not that results are available.
    fn request_scan(&self) -> bool;
}

/// Supplies the location/scan permission signal, pushed on change.
pub trait AuthorizationSource: Send + Sync {
    fn authorization(&self) -> BoxStream<'static, bool>;
}

// ── ManualScanSource ─────────────────────────────────────────────

/// Scan source fed from code: call [`publish`](Self::publish) with each
/// snapshot.
///
/// Holds only the latest snapshot. A subscriber that joins late still sees
/// the most recent one, and snapshots published faster than they are
/// consumed collapse into the newest.
pub struct ManualScanSource {
    latest: watch::Sender<Option<Vec<NetworkObservation>>>,
    accepting: AtomicBool,
    requests: AtomicU64,
}

impl ManualScanSource {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            latest,
            accepting: AtomicBool::new(true),
            requests: AtomicU64::new(0),
        }
    }

    /// Replace the current snapshot and notify subscribers.
    pub fn publish(&self, observations: Vec<NetworkObservation>) {
        debug!(networks = observations.len(), "publishing scan snapshot");
        self.latest.send_replace(Some(observations));
    }

    /// Number of scan requests received so far.
    pub fn scan_requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Control whether subsequent scan requests are accepted.
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::Relaxed);
    }
}

impl Default for ManualScanSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSource for ManualScanSource {
    fn observations(&self) -> BoxStream<'static, Vec<NetworkObservation>> {
        WatchStream::new(self.latest.subscribe())
            .filter_map(future::ready)
            .boxed()
    }

    fn request_scan(&self) -> bool {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.accepting.load(Ordering::Relaxed)
    }
}

// ── Authorization sources ────────────────────────────────────────

/// Authorization decided up front: emits its value once.
#[derive(Debug, Clone, Copy)]
pub struct FixedAuthorization(pub bool);

impl FixedAuthorization {
    pub fn granted() -> Self {
        Self(true)
    }

    pub fn denied() -> Self {
        Self(false)
    }
}

impl AuthorizationSource for FixedAuthorization {
    fn authorization(&self) -> BoxStream<'static, bool> {
        stream::once(future::ready(self.0)).boxed()
    }
}

/// Authorization toggled from code. Starts denied; each subscriber first
/// sees the current value, then every change.
pub struct ManualAuthorization {
    granted: watch::Sender<bool>,
}

impl ManualAuthorization {
    pub fn new() -> Self {
        let (granted, _) = watch::channel(false);
        Self { granted }
    }

    pub fn set(&self, granted: bool) {
        self.granted.send_replace(granted);
    }

    pub fn is_granted(&self) -> bool {
        *self.granted.borrow()
    }
}

impl Default for ManualAuthorization {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationSource for ManualAuthorization {
    fn authorization(&self) -> BoxStream<'static, bool> {
        WatchStream::new(self.granted.subscribe()).boxed()
    }
}
