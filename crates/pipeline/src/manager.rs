//! Lifecycle manager: submissions, polling, deletion, reconciliation.
//!
//! [`LifecycleManager`] owns the tile store, the persistence mirror, and
//! the single pending-job slot. All mutable state lives in explicit
//! fields behind one lock — there are no ambient globals — and every
//! status fold is guarded by job identity, so a late in-flight response
//! from a superseded job can never corrupt the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use atelier_core::fold::{fold_job_update, FoldOutcome, JobUpdate};
use atelier_core::progress::MSG_QUEUED;
use atelier_core::request::{
    validate_change_action, validate_change_index, validate_prompt, ACTION_UPSCALE,
    ACTION_VARIATION,
};
use atelier_core::status::TaskState;
use atelier_core::tile::{new_job_tiles, Tile, TileStatus};
use atelier_store::{SnapshotStore, TaskStore};

use crate::error::PipelineError;
use crate::gate;
use crate::gateway::TaskGateway;
use crate::scheduler::{next_retry_delay, PollConfig};
use crate::slicing::CompositeSlicer;

/// Grace period for the poll task to exit during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates the generation task lifecycle.
///
/// Cheap to clone; all clones share the same store and pending-job slot.
#[derive(Clone)]
pub struct LifecycleManager {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn TaskGateway>,
    slicer: Arc<dyn CompositeSlicer>,
    persistence: Arc<dyn SnapshotStore>,
    config: PollConfig,
    state: Mutex<SharedState>,
}

struct SharedState {
    store: TaskStore,
    pending: Option<PendingJob>,
}

/// Bookkeeping for the one job currently being polled.
struct PendingJob {
    job_id: String,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

/// Whether the poll loop should keep ticking after a fold.
enum ApplyResult {
    Continue,
    Stop,
}

impl LifecycleManager {
    /// Create a manager over the given collaborators, starting empty.
    ///
    /// Call [`LifecycleManager::reconcile`] once at startup to hydrate
    /// persisted state.
    pub fn new(
        gateway: Arc<dyn TaskGateway>,
        slicer: Arc<dyn CompositeSlicer>,
        persistence: Arc<dyn SnapshotStore>,
        config: PollConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                slicer,
                persistence,
                config,
                state: Mutex::new(SharedState {
                    store: TaskStore::new(),
                    pending: None,
                }),
            }),
        }
    }

    /// The current immutable tile snapshot, for the display grid.
    pub async fn snapshot(&self) -> Arc<[Tile]> {
        self.inner.state.lock().await.store.snapshot()
    }

    /// The job id currently being polled, if any.
    pub async fn pending_job(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .await
            .pending
            .as_ref()
            .map(|p| p.job_id.clone())
    }

    /// Submit a new text prompt, with an optional base64-encoded
    /// reference image.
    ///
    /// Rejected with [`PipelineError::Busy`] while any tile is
    /// non-terminal; a rejection touches neither store nor network.
    pub async fn submit(
        &self,
        prompt: &str,
        reference_image: Option<&str>,
    ) -> Result<String, PipelineError> {
        validate_prompt(prompt)?;

        let mut state = self.inner.state.lock().await;
        gate::ensure_idle(&state.store)?;

        let job_id = self
            .inner
            .gateway
            .submit_imagine(prompt, reference_image)
            .await?;
        accept_job(&self.inner, &mut state, job_id.clone()).await;
        Ok(job_id)
    }

    /// Request a variation of one quadrant of a finished job.
    ///
    /// `index` is 1-based, as on the wire.
    pub async fn variation(&self, source_job_id: &str, index: u8) -> Result<String, PipelineError> {
        self.submit_change(ACTION_VARIATION, index, source_job_id)
            .await
    }

    /// Request an upscale of one quadrant of a finished job.
    ///
    /// `index` is 1-based, as on the wire.
    pub async fn upscale(&self, source_job_id: &str, index: u8) -> Result<String, PipelineError> {
        self.submit_change(ACTION_UPSCALE, index, source_job_id).await
    }

    /// Delete one tile. The caller has already confirmed with the user.
    ///
    /// Refused while any job is being polled. Deleting the last remaining
    /// tile clears persisted state entirely.
    pub async fn delete_tile(&self, job_id: &str, tile_index: u8) -> Result<(), PipelineError> {
        let mut state = self.inner.state.lock().await;

        // Global pending check: no deletion while a job is in flight.
        if state.pending.is_some() {
            return Err(PipelineError::Busy);
        }

        let removed = state
            .store
            .remove_where(|t| t.belongs_to(job_id) && t.tile_index == tile_index);
        if removed == 0 {
            return Ok(());
        }

        tracing::info!(job_id = %job_id, tile_index, "Tile deleted");
        self.inner.persist(&state.store).await;
        Ok(())
    }

    /// Startup reconciliation: hydrate persisted tiles, re-slice finished
    /// composites, and resume polling for at most one pending job.
    ///
    /// Run once, before any submission.
    pub async fn reconcile(&self) {
        let tiles = self.inner.persistence.load().await;

        let mut state = self.inner.state.lock().await;
        state.store = TaskStore::from_tiles(tiles);

        let snapshot = state.store.snapshot();
        let resumed = state.store.first_non_terminal_job();
        if let Some(job_id) = resumed.clone() {
            // Single-flight governs reconciliation too: only the first
            // pending job found resumes polling.
            start_polling(&self.inner, &mut state, job_id);
        }
        drop(state);

        // Slices are never persisted; recompute them, once per distinct
        // (job, composite) pair even though four tiles reference each.
        let mut sliced: Vec<(String, String)> = Vec::new();
        for tile in snapshot.iter() {
            if tile.status != TileStatus::Generated {
                continue;
            }
            let (Some(job_id), Some(src)) = (&tile.job_id, &tile.preview_url) else {
                continue;
            };
            let key = (job_id.clone(), src.clone());
            if !sliced.contains(&key) {
                sliced.push(key);
            }
        }
        for (job_id, url) in &sliced {
            self.inner.attach_slices(job_id, url).await;
        }

        tracing::info!(
            tiles = snapshot.len(),
            resliced_jobs = sliced.len(),
            resumed_job = resumed.as_deref(),
            "Session reconciled",
        );
    }

    /// Cancel the pending poll task, if any, and wait briefly for it to
    /// exit. The job itself keeps running on the gateway; it will be
    /// picked up again by the next [`LifecycleManager::reconcile`].
    pub async fn shutdown(&self) {
        let pending = self.inner.state.lock().await.pending.take();
        if let Some(pending) = pending {
            tracing::info!(job_id = %pending.job_id, "Stopping poll task");
            pending.cancel.cancel();
            let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, pending.handle).await;
        }
    }

    // ---- private helpers ----

    async fn submit_change(
        &self,
        action: &str,
        index: u8,
        task_id: &str,
    ) -> Result<String, PipelineError> {
        validate_change_action(action)?;
        validate_change_index(index)?;

        let mut state = self.inner.state.lock().await;
        gate::ensure_idle(&state.store)?;

        let job_id = self
            .inner
            .gateway
            .submit_change(action, index, task_id)
            .await?;
        accept_job(&self.inner, &mut state, job_id.clone()).await;
        Ok(job_id)
    }
}

impl Inner {
    /// Fold one status observation into the pending job's tiles.
    async fn apply_update(&self, job_id: &str, update: &JobUpdate) -> ApplyResult {
        let mut state = self.state.lock().await;

        // Job-identity guard: a response that arrives after this job
        // stopped being the pending one is ignored outright.
        if state.pending.as_ref().map(|p| p.job_id.as_str()) != Some(job_id) {
            tracing::debug!(job_id = %job_id, "Ignoring status for superseded job");
            return ApplyResult::Stop;
        }

        let tiles = state.store.job_tiles(job_id);
        match fold_job_update(&tiles, update) {
            FoldOutcome::Unchanged => ApplyResult::Continue,
            FoldOutcome::Progressed(next) => {
                tracing::debug!(
                    job_id = %job_id,
                    progress = next.first().map(|t| t.progress).unwrap_or(0),
                    "Job progressed",
                );
                apply_job_tiles(&mut state.store, job_id, &next);
                self.persist(&state.store).await;
                ApplyResult::Continue
            }
            FoldOutcome::Completed {
                tiles: next,
                composite_url,
            } => {
                tracing::info!(job_id = %job_id, "Job completed");
                apply_job_tiles(&mut state.store, job_id, &next);
                state.pending = None; // release the gate
                self.persist(&state.store).await;
                drop(state);

                self.attach_slices(job_id, &composite_url).await;
                ApplyResult::Stop
            }
            FoldOutcome::Failed { tiles: next, reason } => {
                tracing::warn!(job_id = %job_id, reason = %reason, "Job failed");
                apply_job_tiles(&mut state.store, job_id, &next);
                state.pending = None; // release the gate
                self.persist(&state.store).await;
                ApplyResult::Stop
            }
        }
    }

    /// Slice a finished composite and attach one quadrant per tile.
    ///
    /// A slice failure is not fatal: the tiles keep displaying the
    /// composite preview.
    async fn attach_slices(&self, job_id: &str, composite_url: &str) {
        match self.slicer.slice(composite_url).await {
            Ok(slices) => {
                let mut state = self.state.lock().await;
                for (index, slice) in slices.into_iter().enumerate() {
                    state.store.update_where(
                        |t| t.belongs_to(job_id) && t.tile_index == index as u8,
                        |t| t.slice_url = Some(slice.clone()),
                    );
                }
                // Slice URLs are not persisted, so the on-disk snapshot
                // is already current.
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %job_id,
                    error = %e,
                    "Slicing failed, tiles keep the composite preview",
                );
            }
        }
    }

    /// Mirror the store to durable storage. Failures degrade to the last
    /// good on-disk state; they never propagate.
    async fn persist(&self, store: &TaskStore) {
        let snapshot = store.snapshot();
        if let Err(e) = self.persistence.save(&snapshot).await {
            tracing::error!(error = %e, "Failed to persist session");
        }
    }
}

/// Record an accepted job: append its four tiles, mirror to disk, start
/// the poll task. The caller holds the state lock and has already passed
/// the gate.
async fn accept_job(inner: &Arc<Inner>, state: &mut SharedState, job_id: String) {
    tracing::info!(job_id = %job_id, "Submission accepted");
    state.store.append(new_job_tiles(&job_id, MSG_QUEUED));
    inner.persist(&state.store).await;
    start_polling(inner, state, job_id);
}

/// Spawn the poll task for `job_id` and fill the pending slot.
///
/// The gate guarantees the slot is empty; two concurrent schedulers
/// cannot happen by construction.
fn start_polling(inner: &Arc<Inner>, state: &mut SharedState, job_id: String) {
    debug_assert!(state.pending.is_none());

    let cancel = CancellationToken::new();
    let task_inner = Arc::clone(inner);
    let task_job_id = job_id.clone();
    let task_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        run_poll_loop(task_inner, task_job_id, task_cancel).await;
    });

    state.pending = Some(PendingJob {
        job_id,
        cancel,
        handle,
    });
}

/// Status poll loop for one job: tick, fetch, fold, until terminal or
/// cancelled. Transient fetch failures retry with exponential backoff; an
/// exhausted budget fails the job explicitly instead of leaving it stuck.
async fn run_poll_loop(inner: Arc<Inner>, job_id: String, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(inner.config.poll_interval);
    let mut failures = 0u32;
    let mut retry_delay = inner.config.retry_initial_delay;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %job_id, "Poll loop cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let reply = match inner.gateway.fetch_task(&job_id).await {
            Ok(reply) => {
                failures = 0;
                retry_delay = inner.config.retry_initial_delay;
                reply
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    job_id = %job_id,
                    error = %e,
                    attempt = failures,
                    "Status poll failed",
                );

                if failures >= inner.config.max_transient_failures {
                    let update = JobUpdate {
                        state: TaskState::Failure,
                        image_url: None,
                        progress: None,
                        fail_reason: Some(format!(
                            "status polling failed after {failures} attempts: {e}"
                        )),
                    };
                    inner.apply_update(&job_id, &update).await;
                    return;
                }

                // Back off before the next probe, staying cancellable.
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
                retry_delay = next_retry_delay(retry_delay, &inner.config);
                continue;
            }
        };

        match inner.apply_update(&job_id, &reply.to_update()).await {
            ApplyResult::Continue => {}
            ApplyResult::Stop => return,
        }
    }
}

/// Replace the tiles of `job_id` with the fold's output, matched by
/// `tile_index`.
fn apply_job_tiles(store: &mut TaskStore, job_id: &str, tiles: &[Tile]) {
    store.update_where(
        |t| t.belongs_to(job_id),
        |t| {
            if let Some(next) = tiles.iter().find(|n| n.tile_index == t.tile_index) {
                *t = next.clone();
            }
        },
    );
}
