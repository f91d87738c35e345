//! Submission gate: at most one job in flight.

use atelier_store::TaskStore;

use crate::error::PipelineError;

/// User-visible rejection message while a job is pending.
pub const MSG_WAIT_PREVIOUS: &str = "Please wait for the previous image to finish";

/// Reject a new submission while any tile in the store is non-terminal.
///
/// A rejection touches neither the store nor the network; the gate opens
/// again only once every tile is terminal (success, failure, or the
/// pending job's tiles were deleted).
pub fn ensure_idle(store: &TaskStore) -> Result<(), PipelineError> {
    if store.any_non_terminal() {
        Err(PipelineError::Busy)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::tile::{new_job_tiles, TileStatus};
    use atelier_store::TaskStore;

    #[test]
    fn empty_store_is_idle() {
        assert!(ensure_idle(&TaskStore::new()).is_ok());
    }

    #[test]
    fn non_terminal_tiles_close_the_gate() {
        let mut store = TaskStore::new();
        store.append(new_job_tiles("J1", "queued"));
        assert!(matches!(ensure_idle(&store), Err(PipelineError::Busy)));
    }

    #[test]
    fn terminal_tiles_reopen_the_gate() {
        let mut store = TaskStore::new();
        store.append(new_job_tiles("J1", "queued"));
        store.update_where(|_| true, |t| t.status = TileStatus::Generated);
        assert!(ensure_idle(&store).is_ok());

        store.update_where(|_| true, |t| t.status = TileStatus::Failed);
        assert!(ensure_idle(&store).is_ok());
    }

    #[test]
    fn busy_error_carries_the_user_message() {
        let mut store = TaskStore::new();
        store.append(new_job_tiles("J1", "queued"));
        let err = ensure_idle(&store).unwrap_err();
        assert_eq!(err.to_string(), MSG_WAIT_PREVIOUS);
    }
}
