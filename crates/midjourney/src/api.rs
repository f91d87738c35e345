//! HTTP client for the generation gateway endpoints.
//!
//! Wraps submission (imagine, variation/upscale) and task status fetch
//! using [`reqwest`].

use serde::de::DeserializeOwned;

use crate::messages::{SubmitReply, TaskStatusReply};

/// HTTP client for a single gateway deployment.
pub struct MidjourneyApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the gateway REST layer.
#[derive(Debug, thiserror::Error)]
pub enum MidjourneyApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Gateway error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The gateway answered with a non-accepted submission code.
    #[error("Submission rejected: {description}")]
    Rejected {
        /// Gateway-provided rejection text, surfaced to the user.
        description: String,
    },
}

impl MidjourneyApi {
    /// Create a new API client for a gateway deployment.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://host:9000`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling with the slicer).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Submit a text prompt for generation.
    ///
    /// Sends a `POST /mj/submit/imagine` request. `reference_image` is an
    /// optional base64-encoded image the generation should take cues from.
    /// Returns the accepted job identifier.
    pub async fn submit_imagine(
        &self,
        prompt: &str,
        reference_image: Option<&str>,
    ) -> Result<String, MidjourneyApiError> {
        let mut body = serde_json::json!({ "prompt": prompt });
        if let Some(data) = reference_image {
            body["referenceImageData"] = serde_json::Value::String(data.to_string());
        }

        let response = self
            .client
            .post(format!("{}/mj/submit/imagine", self.base_url))
            .json(&body)
            .send()
            .await?;

        let reply: SubmitReply = Self::parse_response(response).await?;
        Self::accepted_job_id(reply)
    }

    /// Submit a variation or upscale of one quadrant of a finished job.
    ///
    /// Sends a `POST /mj/submit/change` request. `index` is 1-based on the
    /// wire. Returns the accepted job identifier for the new job.
    pub async fn submit_change(
        &self,
        action: &str,
        index: u8,
        task_id: &str,
    ) -> Result<String, MidjourneyApiError> {
        let body = serde_json::json!({
            "action": action,
            "index": index,
            "taskId": task_id,
        });

        let response = self
            .client
            .post(format!("{}/mj/submit/change", self.base_url))
            .json(&body)
            .send()
            .await?;

        let reply: SubmitReply = Self::parse_response(response).await?;
        Self::accepted_job_id(reply)
    }

    /// Fetch the current status of a job.
    ///
    /// Sends a `GET /mj/task/{id}/fetch` request.
    pub async fn fetch_task(&self, task_id: &str) -> Result<TaskStatusReply, MidjourneyApiError> {
        let response = self
            .client
            .get(format!("{}/mj/task/{}/fetch", self.base_url, task_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Map a submission reply to its job id, or a [`MidjourneyApiError::Rejected`].
    fn accepted_job_id(reply: SubmitReply) -> Result<String, MidjourneyApiError> {
        if !reply.accepted() {
            return Err(MidjourneyApiError::Rejected {
                description: reply.rejection_description(),
            });
        }
        match reply.result {
            Some(id) => Ok(id.as_string()),
            // An "accepted" reply without a job id cannot be polled.
            None => Err(MidjourneyApiError::Rejected {
                description: "gateway accepted the job but returned no id".to_string(),
            }),
        }
    }

    /// Ensure the response has a success status code, then parse the JSON
    /// body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MidjourneyApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MidjourneyApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::JobId;

    fn reply(code: i64, result: Option<JobId>, description: Option<&str>) -> SubmitReply {
        SubmitReply {
            code,
            result,
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn accepted_reply_yields_job_id() {
        let id = MidjourneyApi::accepted_job_id(reply(1, Some(JobId::Text("J1".into())), None));
        assert_eq!(id.unwrap(), "J1");
    }

    #[test]
    fn non_accepted_code_is_rejected_with_description() {
        let err =
            MidjourneyApi::accepted_job_id(reply(24, None, Some("prompt blocked"))).unwrap_err();
        match err {
            MidjourneyApiError::Rejected { description } => {
                assert_eq!(description, "prompt blocked");
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn accepted_without_id_is_rejected() {
        let err = MidjourneyApi::accepted_job_id(reply(1, None, None)).unwrap_err();
        assert!(matches!(err, MidjourneyApiError::Rejected { .. }));
    }
}
