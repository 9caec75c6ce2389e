// ── Reactive state pipeline ──
//
// Single-writer actor that owns `PipelineState`. Every input (authorization
// changes, scan snapshots, scan requests, settle timers) becomes a message
// on one mpsc queue and is applied in arrival order. Each applied message
// builds a complete new snapshot before publishing it through a `watch`
// channel, so readers never see observations without matching scores.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::analyzer::{check_channel_plan, score_channels};
use crate::config::{PipelineConfig, ScanSettle};
use crate::error::CoreError;
use crate::model::{ChannelCongestion, NetworkObservation, retain_24ghz};
use crate::recommend::{RecommendationSet, select_recommendations};
use crate::source::{AuthorizationSource, ScanSource};
use crate::stream::StateStream;

// ── PipelineState ────────────────────────────────────────────────

/// Coarse session phase derived from the state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    Unauthorized,
    Idle,
    Scanning,
}

/// Everything the pipeline knows, as one consistent snapshot.
///
/// `congestion` and `recommendations` are always derived from
/// `latest_observations` in the same step; both are empty while
/// unauthorized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineState {
    pub is_scanning: bool,
    pub authorized: bool,
    pub latest_observations: Vec<NetworkObservation>,
    pub congestion: Vec<ChannelCongestion>,
    pub recommendations: RecommendationSet,
    pub recommended_channel_numbers: BTreeSet<u8>,
    /// Scan requests issued during this session.
    pub scan_requests: u64,
    /// When the snapshot was last rebuilt.
    pub updated_at: Option<DateTime<Utc>>,
}

impl PipelineState {
    pub fn phase(&self) -> SessionPhase {
        if !self.authorized {
            SessionPhase::Unauthorized
        } else if self.is_scanning {
            SessionPhase::Scanning
        } else {
            SessionPhase::Idle
        }
    }
}

// ── Messages ─────────────────────────────────────────────────────

#[derive(Debug)]
enum Input {
    Authorization(bool),
    Observations(Vec<NetworkObservation>),
    RequestScan,
    ScanSettled { generation: u64 },
}

/// An input plus an optional channel to hand back the resulting snapshot.
struct Envelope {
    input: Input,
    ack: Option<oneshot::Sender<Arc<PipelineState>>>,
}

impl Envelope {
    fn fire(input: Input) -> Self {
        Self { input, ack: None }
    }
}

// ── Pipeline ─────────────────────────────────────────────────────

/// Handle to a running pipeline session.
///
/// Cheaply cloneable. The session ends on [`shutdown()`](Self::shutdown)
/// or when the last handle is dropped; pending settle timers become no-ops.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    state: watch::Receiver<Arc<PipelineState>>,
    input_tx: mpsc::Sender<Envelope>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for PipelineInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Pipeline {
    /// Start a session: spawns the state actor plus one bridge task per
    /// collaborator stream. Must be called from within a Tokio runtime.
    ///
    /// Fails with [`CoreError::Config`] if `queue_capacity` is zero.
    pub fn spawn(
        config: PipelineConfig,
        scan_source: Arc<dyn ScanSource>,
        authorization: Arc<dyn AuthorizationSource>,
    ) -> Result<Self, CoreError> {
        if config.queue_capacity == 0 {
            return Err(CoreError::Config {
                message: "queue_capacity must be at least 1".into(),
            });
        }

        let (state_tx, state_rx) = watch::channel(Arc::new(PipelineState::default()));
        let (input_tx, input_rx) = mpsc::channel(config.queue_capacity);
        let cancel = CancellationToken::new();

        let observations = scan_source.observations();
        let grants = authorization.authorization();

        let actor = StateActor {
            config: config.clone(),
            current: Arc::new(PipelineState::default()),
            state_tx,
            scan_source,
            timer_tx: input_tx.downgrade(),
            scan_generation: 0,
            cancel: cancel.clone(),
        };

        let handles = vec![
            tokio::spawn(actor_task(actor, input_rx)),
            tokio::spawn(bridge_task(
                observations,
                input_tx.clone(),
                cancel.clone(),
                Input::Observations,
                "scan",
            )),
            tokio::spawn(bridge_task(
                grants,
                input_tx.clone(),
                cancel.clone(),
                Input::Authorization,
                "authorization",
            )),
        ];

        debug!(?config, "pipeline spawned");
        Ok(Self {
            inner: Arc::new(PipelineInner {
                state: state_rx,
                input_tx,
                cancel,
                task_handles: Mutex::new(handles),
            }),
        })
    }

    /// Latest published snapshot.
    pub fn state(&self) -> Arc<PipelineState> {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.inner.state.clone())
    }

    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled()
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Record the authorization signal. Granting also requests a scan.
    pub async fn grant(&self, authorized: bool) -> Result<Arc<PipelineState>, CoreError> {
        self.submit(Input::Authorization(authorized)).await
    }

    /// Replace the current scan snapshot and recompute.
    pub async fn observations_updated(
        &self,
        observations: Vec<NetworkObservation>,
    ) -> Result<Arc<PipelineState>, CoreError> {
        self.submit(Input::Observations(observations)).await
    }

    /// Ask the scan source for a fresh scan.
    pub async fn request_scan(&self) -> Result<Arc<PipelineState>, CoreError> {
        self.submit(Input::RequestScan).await
    }

    /// Stop the session and wait for its tasks to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("pipeline shut down");
    }

    /// Queue an input and wait for the snapshot it produced.
    async fn submit(&self, input: Input) -> Result<Arc<PipelineState>, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::PipelineClosed);
        }
        let (ack, rx) = oneshot::channel();
        self.inner
            .input_tx
            .send(Envelope {
                input,
                ack: Some(ack),
            })
            .await
            .map_err(|_| CoreError::PipelineClosed)?;
        rx.await.map_err(|_| CoreError::PipelineClosed)
    }
}

// ── State actor ──────────────────────────────────────────────────

struct StateActor {
    config: PipelineConfig,
    current: Arc<PipelineState>,
    state_tx: watch::Sender<Arc<PipelineState>>,
    scan_source: Arc<dyn ScanSource>,
    /// Weak so pending timers never keep the queue alive.
    timer_tx: mpsc::WeakSender<Envelope>,
    /// Bumped per scan request; only the newest request's timer may settle.
    scan_generation: u64,
    cancel: CancellationToken,
}

impl StateActor {
    /// Apply one input to a copy of the state and publish it. On error the
    /// published state is left untouched.
    fn apply(&mut self, input: Input) -> Result<Arc<PipelineState>, CoreError> {
        let mut next = (*self.current).clone();

        match input {
            Input::Authorization(authorized) => {
                info!(authorized, "authorization updated");
                next.authorized = authorized;
                recompute(&mut next)?;
                if authorized {
                    self.start_scan(&mut next);
                }
            }
            Input::Observations(observations) => {
                let observations = if self.config.only_24ghz {
                    retain_24ghz(observations)
                } else {
                    observations
                };
                next.latest_observations = observations;
                recompute(&mut next)?;
                if self.config.settle == ScanSettle::NextResults {
                    next.is_scanning = false;
                }
            }
            Input::RequestScan => self.start_scan(&mut next),
            Input::ScanSettled { generation } => {
                if generation != self.scan_generation {
                    debug!(generation, current = self.scan_generation, "stale settle timer ignored");
                    return Ok(Arc::clone(&self.current));
                }
                next.is_scanning = false;
            }
        }

        next.updated_at = Some(Utc::now());
        let next = Arc::new(next);
        self.current = Arc::clone(&next);
        self.state_tx.send_replace(Arc::clone(&next));
        Ok(next)
    }

    fn start_scan(&mut self, next: &mut PipelineState) {
        self.scan_generation += 1;
        next.is_scanning = true;
        next.scan_requests += 1;

        if self.scan_source.request_scan() {
            info!(generation = self.scan_generation, "scan requested");
        } else {
            warn!(generation = self.scan_generation, "scan source rejected scan request");
        }

        if let ScanSettle::Delay(delay) = self.config.settle {
            let generation = self.scan_generation;
            let tx = self.timer_tx.clone();
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(delay) => {
                        if let Some(tx) = tx.upgrade() {
                            let _ = tx.send(Envelope::fire(Input::ScanSettled { generation })).await;
                        }
                    }
                }
            });
        }
    }
}

/// Rebuild congestion and recommendations from `latest_observations`, or
/// clear both while unauthorized.
fn recompute(state: &mut PipelineState) -> Result<(), CoreError> {
    if !state.authorized {
        state.congestion = Vec::new();
        state.recommendations = RecommendationSet::empty();
        state.recommended_channel_numbers = BTreeSet::new();
        return Ok(());
    }

    let congestion = score_channels(&state.latest_observations);
    check_channel_plan(&congestion)?;
    let recommendations = select_recommendations(&congestion);

    debug!(
        networks = state.latest_observations.len(),
        recommended = ?recommendations.channel_numbers(),
        "recomputed congestion"
    );
    state.recommended_channel_numbers = recommendations.channel_numbers();
    state.recommendations = recommendations;
    state.congestion = congestion;
    Ok(())
}

/// Apply inputs one at a time until cancelled or the queue closes.
async fn actor_task(mut actor: StateActor, mut rx: mpsc::Receiver<Envelope>) {
    let cancel = actor.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                match actor.apply(envelope.input) {
                    Ok(snapshot) => {
                        if let Some(ack) = envelope.ack {
                            let _ = ack.send(snapshot);
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "recomputation failed; keeping last state and stopping");
                        cancel.cancel();
                        break;
                    }
                }
            }
        }
    }
}

/// Forward a collaborator stream into the input queue.
async fn bridge_task<T: Send + 'static>(
    mut stream: BoxStream<'static, T>,
    tx: mpsc::Sender<Envelope>,
    cancel: CancellationToken,
    wrap: fn(T) -> Input,
    name: &'static str,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            item = stream.next() => {
                let Some(item) = item else {
                    debug!(source = name, "collaborator stream ended");
                    break;
                };
                if tx.send(Envelope::fire(wrap(item))).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::source::{FixedAuthorization, ManualAuthorization, ManualScanSource};

    fn wifi_channel_one() -> Vec<NetworkObservation> {
        vec![NetworkObservation::new("Net1", 2412, -40)]
    }

    /// Spawn against manual collaborators and wait until the replayed
    /// (denied) authorization has been applied.
    async fn spawn_manual(
        config: PipelineConfig,
    ) -> (Pipeline, Arc<ManualScanSource>, Arc<ManualAuthorization>) {
        let source = Arc::new(ManualScanSource::new());
        let auth = Arc::new(ManualAuthorization::new());
        let pipeline = Pipeline::spawn(config, source.clone(), auth.clone()).unwrap();
        pipeline
            .subscribe()
            .wait_for(|s| s.updated_at.is_some())
            .await
            .unwrap();
        (pipeline, source, auth)
    }

    fn assert_consistent(state: &PipelineState) {
        if state.authorized {
            assert_eq!(state.congestion, score_channels(&state.latest_observations));
            assert_eq!(state.recommendations, select_recommendations(&state.congestion));
            assert_eq!(state.recommended_channel_numbers, state.recommendations.channel_numbers());
        } else {
            assert!(state.congestion.is_empty());
            assert!(state.recommendations.is_empty());
            assert!(state.recommended_channel_numbers.is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn starts_unauthorized_and_empty() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        let state = pipeline.state();
        assert_eq!(state.phase(), SessionPhase::Unauthorized);
        assert!(state.congestion.is_empty());
        assert!(state.recommendations.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn observations_without_authorization_stay_empty() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        let state = pipeline.observations_updated(wifi_channel_one()).await.unwrap();
        assert_eq!(state.latest_observations, wifi_channel_one());
        assert_consistent(&state);
        assert!(state.congestion.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn grant_recomputes_and_requests_scan() {
        let (pipeline, source, _) = spawn_manual(PipelineConfig::default()).await;
        pipeline.observations_updated(wifi_channel_one()).await.unwrap();

        let state = pipeline.grant(true).await.unwrap();
        assert_eq!(state.phase(), SessionPhase::Scanning);
        assert_eq!(state.scan_requests, 1);
        assert_eq!(source.scan_requests(), 1);
        assert_eq!(state.congestion.len(), 16);
        assert!(state.congestion[0].congestion_score > 0.0);
        assert_eq!(state.recommendations.len(), 3);
        assert_consistent(&state);
    }

    #[tokio::test(start_paused = true)]
    async fn every_update_yields_consistent_snapshot() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        pipeline.grant(true).await.unwrap();

        let scans = [
            wifi_channel_one(),
            vec![],
            vec![
                NetworkObservation::new("a", 2437, -50),
                NetworkObservation::new("b", 2462, -70),
            ],
            vec![NetworkObservation::new("c", 2480, -20)],
        ];
        for scan in scans {
            let state = pipeline.observations_updated(scan.clone()).await.unwrap();
            assert_eq!(state.latest_observations, scan);
            assert_consistent(&state);
            assert_eq!(*pipeline.state(), *state);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn revoking_clears_outputs() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        pipeline.grant(true).await.unwrap();
        pipeline.observations_updated(wifi_channel_one()).await.unwrap();

        let state = pipeline.grant(false).await.unwrap();
        assert_eq!(state.phase(), SessionPhase::Unauthorized);
        assert_eq!(state.latest_observations, wifi_channel_one());
        assert_consistent(&state);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_band_networks_are_dropped() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        pipeline.grant(true).await.unwrap();
        let state = pipeline
            .observations_updated(vec![
                NetworkObservation::new("5g", 5180, -30),
                NetworkObservation::new("2g", 2412, -40),
            ])
            .await
            .unwrap();
        assert_eq!(
            state.latest_observations,
            vec![NetworkObservation::new("2g", 2412, -40)]
        );
        assert_consistent(&state);
    }

    #[tokio::test(start_paused = true)]
    async fn scanning_flag_clears_after_settle_delay() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        let started = tokio::time::Instant::now();
        let state = pipeline.request_scan().await.unwrap();
        assert!(state.is_scanning);

        let mut stream = pipeline.subscribe();
        let settled = stream.wait_for(|s| !s.is_scanning).await.unwrap();
        assert!(!settled.is_scanning);
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn only_newest_scan_request_settles() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        let started = tokio::time::Instant::now();
        pipeline.request_scan().await.unwrap();
        tokio::time::advance(Duration::from_millis(600)).await;
        pipeline.request_scan().await.unwrap();

        // The first timer fires at 1.0s but belongs to a superseded request.
        tokio::time::advance(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        let state = pipeline.observations_updated(Vec::new()).await.unwrap();
        assert!(state.is_scanning);
        assert_eq!(state.scan_requests, 2);

        let settled = pipeline.subscribe().wait_for(|s| !s.is_scanning).await.unwrap();
        assert!(!settled.is_scanning);
        assert!(started.elapsed() >= Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn next_results_policy_waits_for_observations() {
        let config = PipelineConfig {
            settle: ScanSettle::NextResults,
            ..PipelineConfig::default()
        };
        let (pipeline, _, _) = spawn_manual(config).await;
        pipeline.grant(true).await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(pipeline.state().is_scanning);

        let state = pipeline.observations_updated(wifi_channel_one()).await.unwrap();
        assert!(!state.is_scanning);
        assert_eq!(state.phase(), SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_scan_request_still_marks_scanning() {
        let (pipeline, source, _) = spawn_manual(PipelineConfig::default()).await;
        source.set_accepting(false);
        let state = pipeline.request_scan().await.unwrap();
        assert!(state.is_scanning);
        assert_eq!(source.scan_requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn collaborator_streams_drive_the_pipeline() {
        let (pipeline, source, auth) = spawn_manual(PipelineConfig::default()).await;
        let mut stream = pipeline.subscribe();

        auth.set(true);
        let granted = stream.wait_for(|s| s.authorized).await.unwrap();
        assert_eq!(granted.scan_requests, 1);

        source.publish(wifi_channel_one());
        let scored = stream
            .wait_for(|s| s.latest_observations == wifi_channel_one())
            .await
            .unwrap();
        assert_consistent(&scored);
        assert!(scored.congestion[0].congestion_score > 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_authorization_grants_on_start() {
        let source = Arc::new(ManualScanSource::new());
        let pipeline = Pipeline::spawn(
            PipelineConfig::default(),
            source.clone(),
            Arc::new(FixedAuthorization::granted()),
        )
        .unwrap();
        let state = pipeline.subscribe().wait_for(|s| s.authorized).await.unwrap();
        assert_eq!(state.congestion.len(), 16);
        assert_eq!(source.scan_requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn grant_made_before_spawn_reaches_pipeline() {
        let source = Arc::new(ManualScanSource::new());
        let auth = Arc::new(ManualAuthorization::new());
        auth.set(true);
        source.publish(wifi_channel_one());

        let pipeline = Pipeline::spawn(PipelineConfig::default(), source.clone(), auth).unwrap();
        let state = tokio::time::timeout(
            Duration::from_secs(30),
            pipeline
                .subscribe()
                .wait_for(|s| s.authorized && s.latest_observations == wifi_channel_one()),
        )
        .await
        .unwrap()
        .unwrap();

        assert_consistent(&state);
        assert_eq!(source.scan_requests(), 1);
        let recommended: Vec<u8> = state.recommendations.iter().map(|c| c.channel_number).collect();
        assert_eq!(recommended, vec![16, 17, 15]);
    }

    #[tokio::test]
    async fn zero_queue_capacity_is_rejected() {
        let config = PipelineConfig {
            queue_capacity: 0,
            ..PipelineConfig::default()
        };
        let result = Pipeline::spawn(
            config,
            Arc::new(ManualScanSource::new()),
            Arc::new(FixedAuthorization::granted()),
        );
        assert!(matches!(result, Err(CoreError::Config { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_pipeline_and_disarms_timer() {
        let (pipeline, _, _) = spawn_manual(PipelineConfig::default()).await;
        let state = pipeline.request_scan().await.unwrap();
        assert!(state.is_scanning);

        let mut stream = pipeline.subscribe();
        pipeline.shutdown().await;
        assert!(!pipeline.is_running());

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(stream.changed().await.is_none());
        assert!(pipeline.state().is_scanning);
        assert!(matches!(
            pipeline.grant(true).await,
            Err(CoreError::PipelineClosed)
        ));
    }
}
