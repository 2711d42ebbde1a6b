/*
[INPUT]:  ImagePayload to submit, JobId to query
[OUTPUT]: JobId / JobStatus or a classified EnhancerError
[POS]:    Gateway abstraction - seam between the task controller and the remote service
[UPDATE]: When the job protocol gains operations or the mock needs new scripting
*/

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::http::{EnhancerError, Result};
use crate::types::{ImagePayload, JobId, JobStatus};

/// The two logical operations of the asynchronous job API
///
/// Implementations perform no retries, no caching and keep no state across calls.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Submit an image and return the job identifier
    async fn start_job(&self, payload: &ImagePayload) -> Result<JobId>;

    /// Fetch the current status of a job
    async fn query_job(&self, job_id: &JobId) -> Result<JobStatus>;
}

/// A call observed by [`MockGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    StartJob { mime_type: String, at: Instant },
    QueryJob { job_id: JobId, at: Instant },
}

struct Scripted<T> {
    delay: Duration,
    result: Result<T>,
}

#[derive(Default)]
struct Script {
    starts: VecDeque<Scripted<JobId>>,
    queries: HashMap<JobId, VecDeque<Scripted<JobStatus>>>,
    calls: Vec<GatewayCall>,
}

/// Scripted gateway for testing
///
/// Submit results are consumed in call order, query results per job id. A delay makes the
/// call suspend on the tokio clock before answering, so paused-time tests stay deterministic.
#[derive(Default)]
pub struct MockGateway {
    script: Mutex<Script>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_start(&self, result: Result<JobId>) -> &Self {
        self.push_start_delayed(Duration::ZERO, result)
    }

    pub fn push_start_delayed(&self, delay: Duration, result: Result<JobId>) -> &Self {
        self.lock().starts.push_back(Scripted { delay, result });
        self
    }

    pub fn push_query(&self, job_id: impl Into<JobId>, result: Result<JobStatus>) -> &Self {
        self.push_query_delayed(job_id, Duration::ZERO, result)
    }

    pub fn push_query_delayed(
        &self,
        job_id: impl Into<JobId>,
        delay: Duration,
        result: Result<JobStatus>,
    ) -> &Self {
        self.lock()
            .queries
            .entry(job_id.into())
            .or_default()
            .push_back(Scripted { delay, result });
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn start_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, GatewayCall::StartJob { .. }))
            .count()
    }

    /// Dispatch instants of the queries issued for one job
    pub fn query_times(&self, job_id: &JobId) -> Vec<Instant> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::QueryJob { job_id: id, at } if id == job_id => Some(*at),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn answer<T>(scripted: Option<Scripted<T>>, what: &str) -> Result<T> {
        match scripted {
            Some(Scripted { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(EnhancerError::InvalidResponse(format!(
                "mock gateway has no scripted {what}"
            ))),
        }
    }
}

#[async_trait]
impl ApiGateway for MockGateway {
    async fn start_job(&self, payload: &ImagePayload) -> Result<JobId> {
        let scripted = {
            let mut script = self.lock();
            script.calls.push(GatewayCall::StartJob {
                mime_type: payload.mime_type().to_string(),
                at: Instant::now(),
            });
            script.starts.pop_front()
        };
        Self::answer(scripted, "start_job").await
    }

    async fn query_job(&self, job_id: &JobId) -> Result<JobStatus> {
        let scripted = {
            let mut script = self.lock();
            script.calls.push(GatewayCall::QueryJob {
                job_id: job_id.clone(),
                at: Instant::now(),
            });
            script
                .queries
                .get_mut(job_id)
                .and_then(|queue| queue.pop_front())
        };
        Self::answer(scripted, "query_job").await
    }
}
