//! Durable session persistence.
//!
//! The session file is the process-external mirror of the tile store: it
//! is rewritten after every mutation and read back once at startup. Any
//! unreadable state — missing file, corrupt JSON, unknown version — is
//! treated as "no prior session" rather than an error.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use atelier_core::tile::Tile;

use crate::records::{SnapshotEnvelope, SNAPSHOT_VERSION};

/// Errors from writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem write/rename/remove failed.
    #[error("Failed to write session file: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failed.
    #[error("Failed to serialize session snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable storage seam for the tile list.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted tiles. Unreadable state yields an empty list.
    async fn load(&self) -> Vec<Tile>;

    /// Persist the tiles. An empty list clears storage entirely instead
    /// of persisting an empty collection.
    async fn save(&self, tiles: &[Tile]) -> Result<(), StoreError>;
}

/// JSON-file implementation of [`SnapshotStore`].
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Vec<Tile> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file unreadable, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<SnapshotEnvelope>(&bytes) {
            Ok(envelope) if envelope.version == SNAPSHOT_VERSION => {
                envelope.tiles.into_iter().map(Tile::from).collect()
            }
            Ok(envelope) => {
                tracing::warn!(
                    version = envelope.version,
                    expected = SNAPSHOT_VERSION,
                    "Session file has unknown version, starting empty",
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file corrupt, starting empty");
                Vec::new()
            }
        }
    }

    async fn save(&self, tiles: &[Tile]) -> Result<(), StoreError> {
        if tiles.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        let json = serde_json::to_vec_pretty(&SnapshotEnvelope::new(tiles))?;

        // Write-then-rename keeps a crash from leaving a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::tile::{new_job_tiles, TileStatus};

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("session.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().await.is_empty());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut tiles = new_job_tiles("J1", "queued");
        tiles[0].progress = 42;
        tiles[0].status = TileStatus::InProgress;
        tiles[0].preview_url = Some("http://p/preview.png".to_string());
        store.save(&tiles).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded[0].progress, 42);
        assert_eq!(loaded[0].status, TileStatus::InProgress);
        assert_eq!(loaded[0].preview_url.as_deref(), Some("http://p/preview.png"));
    }

    #[tokio::test]
    async fn slice_urls_are_recomputed_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut tiles = new_job_tiles("J1", "done");
        for tile in &mut tiles {
            tile.status = TileStatus::Generated;
            tile.slice_url = Some("data:image/png;base64,huge".to_string());
        }
        store.save(&tiles).await.unwrap();

        let loaded = store.load().await;
        assert!(loaded.iter().all(|t| t.slice_url.is_none()));
    }

    #[tokio::test]
    async fn empty_save_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let path = dir.path().join("session.json");

        store.save(&new_job_tiles("J1", "queued")).await.unwrap();
        assert!(path.exists());

        store.save(&[]).await.unwrap();
        assert!(!path.exists());

        // Clearing twice is fine.
        store.save(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        assert!(JsonFileStore::new(path).load().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_version_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, br#"{"version":99,"savedAt":"2024-01-01T00:00:00Z","tiles":[]}"#)
            .await
            .unwrap();

        assert!(JsonFileStore::new(path).load().await.is_empty());
    }
}
