/*
[INPUT]:  ImagePayload for submission, JobId for status queries
[OUTPUT]: JobId on submit, JobStatus on query
[POS]:    HTTP layer - visual/scale task endpoints (API key required)
[UPDATE]: When adding new task endpoints or changing response parsing
*/

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use crate::gateway::ApiGateway;
use crate::http::{EnhancerError, PicwishClient, Result};
use crate::types::{
    ApiEnvelope, CreateTaskData, ImagePayload, JobId, JobStatus, ScaleTaskRequest, TaskStatusData,
};

/// Create and query endpoints share this path
pub const SCALE_TASKS_ENDPOINT: &str = "/api/tasks/visual/scale";

impl PicwishClient {
    /// Create an asynchronous enhancement task
    ///
    /// POST /api/tasks/visual/scale (multipart: image_file, sync=0, type=clean, return_type=1)
    pub async fn create_scale_task(
        &self,
        payload: &ImagePayload,
        request: ScaleTaskRequest,
    ) -> Result<JobId> {
        let form = request.into_form(payload)?;
        let builder = self
            .request(Method::POST, SCALE_TASKS_ENDPOINT)?
            .multipart(form);
        let envelope: ApiEnvelope<CreateTaskData> = self.send_json(builder).await?;
        let job_id = envelope.into_job_id()?;
        debug!(job_id = %job_id, bytes = payload.len(), "scale task created");
        Ok(job_id)
    }

    /// Query an enhancement task
    ///
    /// GET /api/tasks/visual/scale/{task_id}
    pub async fn get_scale_task(&self, job_id: &JobId) -> Result<JobStatus> {
        // Dot segments would be resolved away and address another resource.
        if matches!(job_id.as_str().trim(), "" | "." | "..") {
            return Err(EnhancerError::InvalidResponse(format!(
                "unusable job id {:?}",
                job_id.as_str()
            )));
        }
        let builder = self.resource_request(Method::GET, SCALE_TASKS_ENDPOINT, job_id.as_str())?;
        let envelope: ApiEnvelope<TaskStatusData> = self.send_json(builder).await?;
        envelope.into_job_status()
    }
}

#[async_trait]
impl ApiGateway for PicwishClient {
    async fn start_job(&self, payload: &ImagePayload) -> Result<JobId> {
        self.create_scale_task(payload, ScaleTaskRequest::default())
            .await
    }

    async fn query_job(&self, job_id: &JobId) -> Result<JobStatus> {
        self.get_scale_task(job_id).await
    }
}
