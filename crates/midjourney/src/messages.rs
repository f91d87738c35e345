//! Gateway reply types.
//!
//! The gateway answers submissions with `{"code": 1, "result": "<job id>",
//! "description": "..."}` and status fetches with `{"status": "...",
//! "imageUrl"?: "...", "progress"?: "<int>%"}`. This module deserializes
//! both into typed structs; unknown extra fields are ignored.

use serde::Deserialize;

use atelier_core::fold::JobUpdate;
use atelier_core::progress::parse_progress_percent;
use atelier_core::status::TaskState;

/// `code` value of an accepted submission. Anything else is a rejection.
pub const CODE_ACCEPTED: i64 = 1;

/// A job identifier as it appears on the wire.
///
/// The gateway documents a string, but some deployments issue numeric
/// timestamps — both are accepted and normalized to a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    /// String identifier.
    Text(String),
    /// Numeric identifier, normalized via `to_string`.
    Number(i64),
}

impl JobId {
    /// The identifier as a string.
    pub fn as_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Reply to an imagine or variation/upscale submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReply {
    /// Gateway result code; [`CODE_ACCEPTED`] on success.
    pub code: i64,
    /// Job identifier, present on acceptance.
    #[serde(default)]
    pub result: Option<JobId>,
    /// Human-readable outcome description.
    #[serde(default)]
    pub description: Option<String>,
}

impl SubmitReply {
    /// Whether the gateway accepted the submission.
    pub fn accepted(&self) -> bool {
        self.code == CODE_ACCEPTED
    }

    /// The rejection text to surface to the user.
    pub fn rejection_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("gateway returned code {}", self.code))
    }
}

/// Reply to a task status fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusReply {
    /// Raw status string; interpreted via [`TaskStatusReply::state`].
    pub status: String,
    /// Composite image URL: coarse preview while rendering, final
    /// composite on success.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Progress string such as `"25%"`.
    #[serde(default)]
    pub progress: Option<String>,
    /// Failure reason, when the gateway provides one.
    #[serde(default)]
    pub fail_reason: Option<String>,
}

impl TaskStatusReply {
    /// The typed task state.
    pub fn state(&self) -> TaskState {
        TaskState::parse(&self.status)
    }

    /// Decode into the fold layer's observation type.
    pub fn to_update(&self) -> JobUpdate {
        JobUpdate {
            state: self.state(),
            image_url: self.image_url.clone(),
            progress: self.progress.as_deref().and_then(parse_progress_percent),
            fail_reason: self.fail_reason.clone(),
        }
    }
}
