//! REST client for the Midjourney-proxy generation gateway.
//!
//! Provides typed reply parsing and HTTP wrappers for the three endpoints
//! the lifecycle manager consumes: imagine submission, variation/upscale
//! submission, and task status fetch.

pub mod api;
pub mod messages;
