//! Composite-image slicing.
//!
//! A finished generation job returns one 2×2 composite image; this crate
//! downloads it and decomposes it into four quadrant images, returned as
//! self-contained `data:image/png;base64,…` URLs so they never need to be
//! persisted or re-fetched.

pub mod fetch;
pub mod slice;

pub use fetch::Slicer;
pub use slice::{slice_composite, SliceError, SliceImage};
