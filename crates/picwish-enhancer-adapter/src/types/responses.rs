/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed response envelopes and their conversion into domain models
[POS]:    Data layer - wire types for the visual/scale task endpoints
[UPDATE]: When API schema changes or new fields are needed
*/

use serde::Deserialize;
use tracing::debug;

use super::models::{JobId, JobStatus};
use crate::http::{EnhancerError, Result};

/// `state` value the service reports once a job has finished
pub const STATE_COMPLETED: i64 = 1;

/// Every PicWish response nests its payload under `data`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<i64>,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateTaskData {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_id")]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskStatusData {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_id")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub state: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_progress")]
    pub progress: Option<f64>,
}

impl<T> ApiEnvelope<T> {
    /// Take `data`, reporting the service's own status and message when it is absent.
    fn into_data(self, what: &str) -> Result<T> {
        match self.data {
            Some(data) => Ok(data),
            None => {
                debug!(status = ?self.status, message = ?self.message, "response without data");
                let mut detail = format!("missing {what}");
                if let Some(message) = self.message.filter(|m| !m.trim().is_empty()) {
                    detail.push_str(&format!(" ({message})"));
                }
                Err(EnhancerError::InvalidResponse(detail))
            }
        }
    }
}

impl ApiEnvelope<CreateTaskData> {
    /// Extract `data.task_id`; its absence is a protocol violation.
    pub fn into_job_id(self) -> Result<JobId> {
        self.into_data("data.task_id")?
            .task_id
            .filter(|id| !id.trim().is_empty())
            .map(JobId::from)
            .ok_or_else(|| EnhancerError::InvalidResponse("missing data.task_id".to_string()))
    }
}

impl ApiEnvelope<TaskStatusData> {
    /// Completed needs `state == 1` and a non-empty image; otherwise progress must be below 100.
    pub fn into_job_status(self) -> Result<JobStatus> {
        let data = self.into_data("data object")?;

        if data.state == Some(STATE_COMPLETED) {
            if let Some(image_url) = data.image.filter(|image| !image.trim().is_empty()) {
                return Ok(JobStatus::Completed { image_url });
            }
        }

        match data.progress {
            Some(progress) if (0.0..100.0).contains(&progress) => Ok(JobStatus::Processing {
                progress: progress.floor() as u8,
            }),
            Some(progress) => Err(EnhancerError::InvalidResponse(format!(
                "progress {progress} reported without a completed result"
            ))),
            None => Err(EnhancerError::InvalidResponse(
                "status has neither a completed result nor progress".to_string(),
            )),
        }
    }
}

mod serde_helpers {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Ids arrive as strings or numbers; anything else counts as absent.
    pub fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(id) => Some(id),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
    }

    pub fn deserialize_progress<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(progress) => progress.as_f64(),
            Value::String(raw) => raw.trim().parse().ok(),
            _ => None,
        })
    }
}
