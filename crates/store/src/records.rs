//! On-disk record layout.
//!
//! Tiles persist as `{status, message, tileIndex, jobId, src, progress}`.
//! The decoded `slice_url` is intentionally not persisted — quadrant data
//! URLs are large and cheap to recompute at load time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::tile::{Tile, TileStatus};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One tile as written to the session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTile {
    /// Display status.
    pub status: TileStatus,
    /// Status text.
    pub message: String,
    /// Position within the 2×2 grid.
    pub tile_index: u8,
    /// Owning job, when attached.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Best-known composite image URL (preview or final).
    #[serde(default)]
    pub src: Option<String>,
    /// Last recorded progress percent.
    #[serde(default)]
    pub progress: u8,
}

impl From<&Tile> for PersistedTile {
    fn from(tile: &Tile) -> Self {
        Self {
            status: tile.status,
            message: tile.message.clone(),
            tile_index: tile.tile_index,
            job_id: tile.job_id.clone(),
            src: tile.preview_url.clone(),
            progress: tile.progress,
        }
    }
}

impl From<PersistedTile> for Tile {
    fn from(record: PersistedTile) -> Self {
        Self {
            job_id: record.job_id,
            tile_index: record.tile_index,
            status: record.status,
            message: record.message,
            progress: record.progress,
            preview_url: record.src,
            slice_url: None,
        }
    }
}

/// The session file: a versioned envelope around the tile list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEnvelope {
    /// Format version; mismatches are treated as no prior session.
    pub version: u32,
    /// When the snapshot was written (UTC).
    pub saved_at: DateTime<Utc>,
    /// Tile records in display order.
    pub tiles: Vec<PersistedTile>,
}

impl SnapshotEnvelope {
    /// Build an envelope for the given tiles, stamped now.
    pub fn new(tiles: &[Tile]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            tiles: tiles.iter().map(PersistedTile::from).collect(),
        }
    }
}
