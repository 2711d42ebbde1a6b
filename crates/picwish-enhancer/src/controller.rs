/*
[INPUT]:  ImagePayload from an image source, ApiGateway for the remote job API
[OUTPUT]: Single observable Task (watch channel) driven submit -> poll -> terminal
[POS]:    Execution layer - owns the one task slot, supersession and cancellation
[UPDATE]: When changing poll cadence, cancellation guarantees, or stale-result handling
*/

use std::sync::Arc;
use std::time::Duration;

use picwish_enhancer_adapter::{ApiGateway, Failure, ImagePayload, JobId, JobStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EnhancerConfig;
use crate::task::{Task, TaskEvent, TaskToken};

/// Delay between receiving one status response and dispatching the next query
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug)]
struct ActiveTask {
    token: TaskToken,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives one enhancement task at a time and publishes its state.
///
/// `submit` and `cancel` return immediately; the effects are observed through
/// [`current_state`](Self::current_state) or a [`subscribe`](Self::subscribe)d receiver.
/// Both must be called from within a Tokio runtime.
pub struct TaskController {
    gateway: Arc<dyn ApiGateway>,
    poll_interval: Duration,
    state: Arc<watch::Sender<Task>>,
    last_token: TaskToken,
    active: Option<ActiveTask>,
}

impl TaskController {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self::with_poll_interval(gateway, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(gateway: Arc<dyn ApiGateway>, poll_interval: Duration) -> Self {
        let (state, _rx) = watch::channel(Task::idle(TaskToken::INITIAL));
        Self {
            gateway,
            poll_interval,
            state: Arc::new(state),
            last_token: TaskToken::INITIAL,
            active: None,
        }
    }

    /// Build a controller backed by the HTTP client described in `config`.
    pub fn from_config(config: &EnhancerConfig) -> anyhow::Result<Self> {
        let client = config.build_client()?;
        Ok(Self::with_poll_interval(
            Arc::new(client),
            config.poll_interval(),
        ))
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Start a new task for `payload`, superseding whatever was in flight.
    pub fn submit(&mut self, payload: ImagePayload) {
        self.supersede();
        let token = self.next_token();
        let mut task = Task::idle(token);

        if let Err(err) = payload.validate() {
            let failure = err.failure();
            warn!(task = %token, error = %err, "image rejected before submission");
            // Idle -> Failed is always valid.
            let _ = task.transition(TaskEvent::Rejected(failure));
            self.state.send_replace(task);
            return;
        }

        let _ = task.transition(TaskEvent::Accepted);
        self.state.send_replace(task);
        info!(
            task = %token,
            bytes = payload.len(),
            mime_type = payload.mime_type(),
            "submitting image"
        );

        let shutdown = CancellationToken::new();
        let driver = TaskDriver {
            token,
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
            shutdown: shutdown.clone(),
            poll_interval: self.poll_interval,
        };
        let handle = tokio::spawn(driver.run(payload));

        self.active = Some(ActiveTask {
            token,
            shutdown,
            handle,
        });
    }

    /// Discard the current task; later responses for it are dropped.
    ///
    /// Idempotent, and a no-op when nothing has been submitted since the last cancel.
    pub fn cancel(&mut self) {
        self.supersede();
        if self.state.borrow().is_idle() {
            return;
        }
        let token = self.next_token();
        self.state.send_replace(Task::idle(token));
        debug!(task = %token, "controller back to idle");
    }

    /// Snapshot of the current task
    pub fn current_state(&self) -> Task {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published state change
    pub fn subscribe(&self) -> watch::Receiver<Task> {
        self.state.subscribe()
    }

    /// Resolve once the observed task is idle, succeeded or failed.
    pub async fn wait_for_terminal(&self) -> Task {
        let mut rx = self.state.subscribe();
        match rx.wait_for(Task::is_settled).await {
            Ok(task) => task.clone(),
            Err(_) => self.current_state(),
        }
    }

    /// Whether a driver for the current task is still running
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    fn next_token(&mut self) -> TaskToken {
        self.last_token = self.last_token.next();
        self.last_token
    }

    fn supersede(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.handle.is_finished() {
                info!(task = %active.token, "cancelling in-flight task");
            }
            active.shutdown.cancel();
        }
    }
}

impl Drop for TaskController {
    fn drop(&mut self) {
        self.supersede();
    }
}

/// Async side of one task: submit, then poll until a terminal outcome
struct TaskDriver {
    token: TaskToken,
    gateway: Arc<dyn ApiGateway>,
    state: Arc<watch::Sender<Task>>,
    shutdown: CancellationToken,
    poll_interval: Duration,
}

impl TaskDriver {
    async fn run(self, payload: ImagePayload) {
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                debug!(task = %self.token, "cancelled during submission");
                return;
            }
            result = self.gateway.start_job(&payload) => result,
        };
        // The payload is not needed once the upload finished.
        drop(payload);

        let job_id = match result {
            Ok(job_id) => job_id,
            Err(err) => {
                warn!(task = %self.token, error = %err, "submission failed");
                self.publish(TaskEvent::Failed(err.failure()));
                return;
            }
        };

        info!(task = %self.token, job_id = %job_id, "job accepted, polling");
        if self.publish(TaskEvent::JobStarted(job_id.clone())) {
            self.poll(job_id).await;
        }
    }

    async fn poll(&self, job_id: JobId) {
        loop {
            let result = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(task = %self.token, job_id = %job_id, "cancelled during poll");
                    return;
                }
                result = self.gateway.query_job(&job_id) => result,
            };

            let event = match result {
                Ok(JobStatus::Completed { image_url }) => {
                    info!(task = %self.token, job_id = %job_id, result = %image_url, "job completed");
                    self.publish(TaskEvent::Completed(image_url));
                    return;
                }
                Ok(JobStatus::Processing { progress }) if progress < 100 => {
                    debug!(task = %self.token, job_id = %job_id, progress, "job in progress");
                    TaskEvent::Progress(progress)
                }
                Ok(JobStatus::Processing { progress }) => {
                    let failure = Failure::ProtocolError {
                        detail: format!("progress {progress} reported without a completed result"),
                    };
                    warn!(task = %self.token, job_id = %job_id, %failure, "malformed status");
                    self.publish(TaskEvent::Failed(failure));
                    return;
                }
                Err(err) => {
                    warn!(task = %self.token, job_id = %job_id, error = %err, "status query failed");
                    self.publish(TaskEvent::Failed(err.failure()));
                    return;
                }
            };

            if !self.publish(event) {
                return;
            }

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(task = %self.token, job_id = %job_id, "cancelled between polls");
                    return;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Apply `event` only if the observed task still carries this driver's token.
    fn publish(&self, event: TaskEvent) -> bool {
        if self.shutdown.is_cancelled() {
            debug!(task = %self.token, ?event, "discarding result of cancelled task");
            return false;
        }

        let token = self.token;
        let mut applied = false;
        self.state.send_if_modified(|current| {
            if current.token() != token {
                debug!(task = %token, current = %current.token(), "discarding stale result");
                return false;
            }
            match current.transition(event) {
                Ok(()) => {
                    applied = true;
                    true
                }
                Err(err) => {
                    debug!(task = %token, error = %err, "ignoring event");
                    false
                }
            }
        });
        applied
    }
}
