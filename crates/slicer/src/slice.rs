//! Pure quadrant decomposition of an in-memory composite image.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageFormat};

use atelier_core::error::CoreError;
use atelier_core::geometry::{quadrant_rects, QuadRect};
use atelier_core::tile::TILES_PER_JOB;

/// One decoded quadrant, re-encoded as PNG.
#[derive(Debug, Clone)]
pub struct SliceImage {
    /// PNG-encoded pixel data.
    pub png: Vec<u8>,
    /// Quadrant width in pixels.
    pub width: u32,
    /// Quadrant height in pixels.
    pub height: u32,
}

impl SliceImage {
    /// Render as a self-contained `data:` URL for direct display.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", BASE64.encode(&self.png))
    }
}

/// Errors from composite download or decomposition.
#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    /// The composite download failed (network, DNS, TLS, etc.).
    #[error("Failed to fetch composite image: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The composite URL answered with a non-2xx status code.
    #[error("Composite image fetch returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The downloaded bytes are not a decodable image.
    #[error("Failed to decode composite image: {0}")]
    Decode(#[source] image::ImageError),

    /// Re-encoding a quadrant as PNG failed.
    #[error("Failed to encode quadrant: {0}")]
    Encode(#[source] image::ImageError),

    /// The composite is too small to split into quadrants.
    #[error(transparent)]
    Geometry(#[from] CoreError),
}

/// Split an encoded composite image into its four quadrants, row-major:
/// top-left, top-right, bottom-left, bottom-right.
///
/// Odd dimensions lose a single midline row/column (see
/// [`quadrant_rects`]); every returned quadrant has identical dimensions.
pub fn slice_composite(bytes: &[u8]) -> Result<[SliceImage; TILES_PER_JOB], SliceError> {
    let img = image::load_from_memory(bytes).map_err(SliceError::Decode)?;
    let (width, height) = img.dimensions();
    let rects = quadrant_rects(width, height)?;

    Ok([
        encode_quadrant(&img, rects[0])?,
        encode_quadrant(&img, rects[1])?,
        encode_quadrant(&img, rects[2])?,
        encode_quadrant(&img, rects[3])?,
    ])
}

/// Crop one quadrant and re-encode it as PNG.
fn encode_quadrant(img: &DynamicImage, rect: QuadRect) -> Result<SliceImage, SliceError> {
    let quad = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
    let mut png = Vec::new();
    quad.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(SliceError::Encode)?;
    Ok(SliceImage {
        png,
        width: rect.width,
        height: rect.height,
    })
}
