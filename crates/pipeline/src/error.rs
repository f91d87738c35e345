use atelier_core::error::CoreError;
use atelier_midjourney::api::MidjourneyApiError;

use crate::gate::MSG_WAIT_PREVIOUS;

/// Errors surfaced by the lifecycle manager.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Another job is still pending; the request was not acted on.
    #[error("{}", MSG_WAIT_PREVIOUS)]
    Busy,

    /// The gateway call failed or the submission was rejected.
    #[error(transparent)]
    Gateway(#[from] MidjourneyApiError),

    /// Request validation failed before any I/O happened.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}
