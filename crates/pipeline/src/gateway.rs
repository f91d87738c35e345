//! Gateway seam consumed by the lifecycle manager.
//!
//! The manager talks to the generation gateway through this trait so the
//! poll loop and submission flow can be driven by a scripted fake in
//! tests. The production implementation is [`MidjourneyApi`].

use async_trait::async_trait;

use atelier_midjourney::api::{MidjourneyApi, MidjourneyApiError};
use atelier_midjourney::messages::TaskStatusReply;

/// The three gateway operations the lifecycle consumes.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Submit a text prompt; returns the accepted job id.
    async fn submit_imagine(
        &self,
        prompt: &str,
        reference_image: Option<&str>,
    ) -> Result<String, MidjourneyApiError>;

    /// Submit a variation or upscale of a finished job's quadrant
    /// (`index` is 1-based); returns the accepted job id.
    async fn submit_change(
        &self,
        action: &str,
        index: u8,
        task_id: &str,
    ) -> Result<String, MidjourneyApiError>;

    /// Fetch the current status of a job.
    async fn fetch_task(&self, task_id: &str) -> Result<TaskStatusReply, MidjourneyApiError>;
}

#[async_trait]
impl TaskGateway for MidjourneyApi {
    async fn submit_imagine(
        &self,
        prompt: &str,
        reference_image: Option<&str>,
    ) -> Result<String, MidjourneyApiError> {
        MidjourneyApi::submit_imagine(self, prompt, reference_image).await
    }

    async fn submit_change(
        &self,
        action: &str,
        index: u8,
        task_id: &str,
    ) -> Result<String, MidjourneyApiError> {
        MidjourneyApi::submit_change(self, action, index, task_id).await
    }

    async fn fetch_task(&self, task_id: &str) -> Result<TaskStatusReply, MidjourneyApiError> {
        MidjourneyApi::fetch_task(self, task_id).await
    }
}
