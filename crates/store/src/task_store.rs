//! Ordered tile collection with immutable snapshots.

use std::sync::Arc;

use atelier_core::tile::Tile;

/// The ordered collection of tile records for the current session.
///
/// Tiles are append-only in display order (oldest first). Every mutation
/// rebuilds an immutable snapshot, so a consumer holding a previous
/// [`TaskStore::snapshot`] never observes a partially-updated collection.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tiles: Vec<Tile>,
    snapshot: Arc<[Tile]>,
}

impl TaskStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::from_tiles(Vec::new())
    }

    /// A store hydrated from persisted tiles.
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        let snapshot: Arc<[Tile]> = tiles.clone().into();
        Self { tiles, snapshot }
    }

    /// The current immutable snapshot. Cheap to clone and hand out.
    pub fn snapshot(&self) -> Arc<[Tile]> {
        Arc::clone(&self.snapshot)
    }

    /// Number of tiles in the store.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the store holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Append tiles at the end of the display order.
    pub fn append(&mut self, tiles: Vec<Tile>) {
        self.tiles.extend(tiles);
        self.rebuild_snapshot();
    }

    /// Apply `mutator` to every tile matching `predicate`.
    ///
    /// Returns the number of tiles mutated.
    pub fn update_where(
        &mut self,
        predicate: impl Fn(&Tile) -> bool,
        mut mutator: impl FnMut(&mut Tile),
    ) -> usize {
        let mut updated = 0;
        for tile in self.tiles.iter_mut().filter(|t| predicate(t)) {
            mutator(tile);
            updated += 1;
        }
        if updated > 0 {
            self.rebuild_snapshot();
        }
        updated
    }

    /// Remove every tile matching `predicate`.
    ///
    /// Returns the number of tiles removed.
    pub fn remove_where(&mut self, predicate: impl Fn(&Tile) -> bool) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(|t| !predicate(t));
        let removed = before - self.tiles.len();
        if removed > 0 {
            self.rebuild_snapshot();
        }
        removed
    }

    /// The tiles of one job, in display order.
    pub fn job_tiles(&self, job_id: &str) -> Vec<Tile> {
        self.tiles
            .iter()
            .filter(|t| t.belongs_to(job_id))
            .cloned()
            .collect()
    }

    /// Whether any tile is in a non-terminal status.
    pub fn any_non_terminal(&self) -> bool {
        self.tiles.iter().any(|t| !t.is_terminal())
    }

    /// The job id of the first non-terminal tile, in display order.
    pub fn first_non_terminal_job(&self) -> Option<String> {
        self.tiles
            .iter()
            .find(|t| !t.is_terminal())
            .and_then(|t| t.job_id.clone())
    }

    fn rebuild_snapshot(&mut self) {
        self.snapshot = self.tiles.clone().into();
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
