//! Composite download + slice, returning display-ready data URLs.

use atelier_core::tile::TILES_PER_JOB;

use crate::slice::{slice_composite, SliceError};

/// Downloads composite images and decomposes them into quadrants.
pub struct Slicer {
    client: reqwest::Client,
}

impl Slicer {
    /// Create a slicer with its own HTTP client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a slicer reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch a composite image and return its four quadrants as
    /// `data:image/png;base64,…` URLs, row-major.
    ///
    /// The await on the download is the suspension point: no pixel access
    /// happens before the full image body has arrived.
    pub async fn slice_url(&self, url: &str) -> Result<[String; TILES_PER_JOB], SliceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SliceError::HttpStatus {
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;

        let slices = slice_composite(&bytes)?;
        Ok(slices.map(|s| s.to_data_url()))
    }
}

impl Default for Slicer {
    fn default() -> Self {
        Self::new()
    }
}
