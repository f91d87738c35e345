//! Tile records: the unit of display and persistence.
//!
//! One accepted generation job produces a 2×2 composite image tracked as
//! four tiles sharing a `job_id`. The four tiles transition status
//! together; each receives its own decoded quadrant once slicing completes.

use serde::{Deserialize, Serialize};

/// Number of tiles produced by one generation job (2×2 grid).
pub const TILES_PER_JOB: usize = 4;

/// Display status of a single tile.
///
/// Serialized in snake_case — these strings are what the persistence layer
/// stores on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStatus {
    /// Submission accepted by the gateway, no progress yet.
    Submitted,
    /// The gateway is rendering; `progress` and a coarse preview may exist.
    InProgress,
    /// Final composite received and (where possible) sliced.
    Generated,
    /// The job ended in an error state; the tile keeps its last preview.
    Failed,
}

impl TileStatus {
    /// Terminal statuses never transition again (a `Generated` tile may
    /// still receive a late `slice_url`).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Generated | Self::Failed)
    }
}

/// One quadrant of a generation job's 2×2 result grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Server-issued job identifier shared by the four tiles of one
    /// submission. `None` only for tiles never attached to a job.
    pub job_id: Option<String>,
    /// Position within the result grid, row-major 0–3.
    pub tile_index: u8,
    /// Current display status.
    pub status: TileStatus,
    /// Human-readable status text shown under the tile.
    pub message: String,
    /// Integer percent, monotonically non-decreasing while the job polls.
    pub progress: u8,
    /// Best-known image to display: the coarse in-progress composite
    /// preview, or the final composite URL.
    pub preview_url: Option<String>,
    /// The tile's own decoded quadrant once slicing completed.
    /// Recomputed at load time, never persisted.
    pub slice_url: Option<String>,
}

impl Tile {
    /// A freshly-submitted tile with no progress information.
    pub fn submitted(job_id: &str, tile_index: u8, message: &str) -> Self {
        Self {
            job_id: Some(job_id.to_string()),
            tile_index,
            status: TileStatus::Submitted,
            message: message.to_string(),
            progress: 0,
            preview_url: None,
            slice_url: None,
        }
    }

    /// Whether this tile has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this tile belongs to the given job.
    pub fn belongs_to(&self, job_id: &str) -> bool {
        self.job_id.as_deref() == Some(job_id)
    }
}

/// Create the four tiles of a newly-accepted job, in display order.
pub fn new_job_tiles(job_id: &str, message: &str) -> Vec<Tile> {
    (0..TILES_PER_JOB as u8)
        .map(|i| Tile::submitted(job_id, i, message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_creates_four_ordered_tiles() {
        let tiles = new_job_tiles("J1", "queued");
        assert_eq!(tiles.len(), TILES_PER_JOB);
        for (i, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.tile_index, i as u8);
            assert_eq!(tile.job_id.as_deref(), Some("J1"));
            assert_eq!(tile.status, TileStatus::Submitted);
            assert_eq!(tile.progress, 0);
            assert!(tile.preview_url.is_none());
            assert!(tile.slice_url.is_none());
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(TileStatus::Generated.is_terminal());
        assert!(TileStatus::Failed.is_terminal());
        assert!(!TileStatus::Submitted.is_terminal());
        assert!(!TileStatus::InProgress.is_terminal());
    }

    #[test]
    fn belongs_to_matches_job_id() {
        let tile = Tile::submitted("J1", 0, "queued");
        assert!(tile.belongs_to("J1"));
        assert!(!tile.belongs_to("J2"));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TileStatus::InProgress).unwrap(),
            r#""in_progress""#
        );
        assert_eq!(
            serde_json::to_string(&TileStatus::Generated).unwrap(),
            r#""generated""#
        );
    }
}
