//! Tile store and durable session persistence.
//!
//! [`TaskStore`](task_store::TaskStore) is the ordered, snapshot-producing
//! collection of tile records the display layer renders.
//! [`JsonFileStore`](persistence::JsonFileStore) mirrors it to a JSON file
//! so a session survives restarts.

pub mod persistence;
pub mod records;
pub mod task_store;

pub use persistence::{JsonFileStore, SnapshotStore, StoreError};
pub use task_store::TaskStore;
