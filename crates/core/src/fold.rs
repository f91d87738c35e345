//! Pure status-folding state machine.
//!
//! Each poll of the gateway yields one [`JobUpdate`]; folding it into the
//! four tiles of the active job is a pure function so every transition —
//! including the monotonic-progress law and the stale-response discard —
//! can be tested without a network or a clock.

use crate::progress::{failure_message, rendering_message, MSG_DONE, MSG_QUEUED};
use crate::status::TaskState;
use crate::tile::{Tile, TileStatus};

/// One status observation for a job, decoded from a gateway reply.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    /// Reported task state.
    pub state: TaskState,
    /// Composite image URL: a coarse preview while in progress, the final
    /// composite on success.
    pub image_url: Option<String>,
    /// Parsed progress percent, when the reply carried one.
    pub progress: Option<u8>,
    /// Failure reason, when the reply carried one.
    pub fail_reason: Option<String>,
}

/// What a fold decided, and the replacement tiles to apply.
///
/// The tiles in `Progressed`/`Completed`/`Failed` are the job's four tiles
/// with the transition applied, in the same order they were passed in.
#[derive(Debug, Clone)]
pub enum FoldOutcome {
    /// Nothing to apply: not started yet, or a stale/duplicate response.
    Unchanged,
    /// Progress advanced; keep polling.
    Progressed(Vec<Tile>),
    /// The job finished; stop polling, release the gate, slice the
    /// composite at `composite_url`.
    Completed {
        tiles: Vec<Tile>,
        composite_url: String,
    },
    /// The job ended in an error state; stop polling, release the gate.
    Failed { tiles: Vec<Tile>, reason: String },
}

/// Fold one status observation into the job's tiles.
///
/// `tiles` must be the tiles of a single job, in display order. Terminal
/// tiles are never mutated: if every tile is already terminal the fold is
/// a no-op regardless of the update.
pub fn fold_job_update(tiles: &[Tile], update: &JobUpdate) -> FoldOutcome {
    if tiles.is_empty() || tiles.iter().all(Tile::is_terminal) {
        return FoldOutcome::Unchanged;
    }

    match update.state {
        TaskState::NotStart | TaskState::Submitted => FoldOutcome::Unchanged,
        TaskState::InProgress => fold_in_progress(tiles, update),
        TaskState::Success => fold_success(tiles, update),
        TaskState::Failure => {
            let reason = update
                .fail_reason
                .clone()
                .unwrap_or_else(|| "the gateway reported a failure".to_string());
            fold_failure(tiles, reason)
        }
        TaskState::Unknown => fold_failure(tiles, "unexpected task status".to_string()),
    }
}

fn fold_in_progress(tiles: &[Tile], update: &JobUpdate) -> FoldOutcome {
    let incoming = update.progress.unwrap_or(0);
    let stored = tiles.iter().map(|t| t.progress).max().unwrap_or(0);
    let never_progressed = tiles.iter().all(|t| t.status == TileStatus::Submitted);

    // Monotonicity law: stale or duplicate responses are discarded.
    if incoming <= stored && !never_progressed {
        return FoldOutcome::Unchanged;
    }

    let next = tiles
        .iter()
        .map(|t| {
            let mut tile = t.clone();
            tile.status = TileStatus::InProgress;
            tile.progress = incoming;
            match &update.image_url {
                Some(url) => {
                    tile.message = rendering_message(incoming);
                    tile.preview_url = Some(url.clone());
                }
                // No coarse preview yet: keep whatever was displayed.
                None => tile.message = MSG_QUEUED.to_string(),
            }
            tile
        })
        .collect();

    FoldOutcome::Progressed(next)
}

fn fold_success(tiles: &[Tile], update: &JobUpdate) -> FoldOutcome {
    let Some(composite_url) = update.image_url.clone() else {
        // A success without a result image cannot be displayed or sliced.
        return fold_failure(tiles, "success reply carried no image URL".to_string());
    };

    let progress = update.progress.unwrap_or(100);
    let next = tiles
        .iter()
        .map(|t| {
            let mut tile = t.clone();
            tile.status = TileStatus::Generated;
            tile.message = MSG_DONE.to_string();
            tile.progress = progress;
            tile.preview_url = Some(composite_url.clone());
            tile
        })
        .collect();

    FoldOutcome::Completed {
        tiles: next,
        composite_url,
    }
}

fn fold_failure(tiles: &[Tile], reason: String) -> FoldOutcome {
    let next = tiles
        .iter()
        .map(|t| {
            let mut tile = t.clone();
            tile.status = TileStatus::Failed;
            tile.message = failure_message(&reason);
            tile
        })
        .collect();

    FoldOutcome::Failed {
        tiles: next,
        reason,
    }
}
