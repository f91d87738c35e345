//! Slicer seam consumed by the lifecycle manager.

use async_trait::async_trait;

use atelier_core::tile::TILES_PER_JOB;
use atelier_slicer::{SliceError, Slicer};

/// Decompose a finished composite into four display-ready quadrant URLs.
#[async_trait]
pub trait CompositeSlicer: Send + Sync {
    /// Fetch and slice the composite at `url`, row-major.
    async fn slice(&self, url: &str) -> Result<[String; TILES_PER_JOB], SliceError>;
}

#[async_trait]
impl CompositeSlicer for Slicer {
    async fn slice(&self, url: &str) -> Result<[String; TILES_PER_JOB], SliceError> {
        self.slice_url(url).await
    }
}
