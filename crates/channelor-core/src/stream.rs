// ── Reactive state stream ──
//
// Subscription handle for consuming pipeline snapshots.

use std::sync::Arc;

use tokio::sync::watch;

use crate::pipeline::PipelineState;

/// A subscription to pipeline state.
///
/// Every snapshot observed is fully recomputed; partial states are never
/// sent. Snapshots published faster than they are read collapse into the
/// newest.
pub struct StateStream {
    receiver: watch::Receiver<Arc<PipelineState>>,
}

impl StateStream {
    /// The snapshot already published counts as seen; `changed()` waits for
    /// the next one.
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<PipelineState>>) -> Self {
        receiver.mark_unchanged();
        Self { receiver }
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the pipeline has shut down.
    pub async fn changed(&mut self) -> Option<Arc<PipelineState>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `predicate`, checking the latest one
    /// first. Returns `None` if the pipeline shuts down before that.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&PipelineState) -> bool,
    ) -> Option<Arc<PipelineState>> {
        let latest = self.receiver.borrow_and_update().clone();
        if predicate(&latest) {
            return Some(latest);
        }
        loop {
            let snap = self.changed().await?;
            if predicate(&snap) {
                return Some(snap);
            }
        }
    }
}
