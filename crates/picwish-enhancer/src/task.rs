/*
[INPUT]:  Task events produced by the controller's driver (job started, progress, result, failure)
[OUTPUT]: Validated Task snapshots; invalid transitions rejected
[POS]:    Task domain logic - state machine for one enhancement task
[UPDATE]: When task phases or transition rules change
*/

use std::fmt;

use picwish_enhancer_adapter::{Failure, JobId};
use thiserror::Error;

/// Identity of one task inside a controller; every submit or cancel allocates a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskToken(u64);

impl TaskToken {
    pub(crate) const INITIAL: TaskToken = TaskToken(0);

    pub(crate) fn next(self) -> TaskToken {
        TaskToken(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase; attributes live only in the phase where they mean something
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPhase {
    Idle,
    Submitting,
    Polling { progress: u8 },
    Succeeded { result_location: String },
    Failed { failure: Failure },
}

impl TaskPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TaskPhase::Idle => "idle",
            TaskPhase::Submitting => "submitting",
            TaskPhase::Polling { .. } => "polling",
            TaskPhase::Succeeded { .. } => "succeeded",
            TaskPhase::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskPhase::Succeeded { .. } | TaskPhase::Failed { .. })
    }
}

/// Inputs that move a task between phases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// Payload passed validation; submission starts
    Accepted,
    /// Payload failed validation; no request is made
    Rejected(Failure),
    JobStarted(JobId),
    Progress(u8),
    Completed(String),
    Failed(Failure),
}

/// Errors occurring during state transitions
#[derive(Debug, Clone, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {from} -> {event:?}")]
    InvalidTransition { from: &'static str, event: TaskEvent },
}

/// Snapshot of the controller's single task slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    token: TaskToken,
    job_id: Option<JobId>,
    phase: TaskPhase,
}

impl Task {
    /// Empty slot tagged with `token`
    pub fn idle(token: TaskToken) -> Self {
        Self {
            token,
            job_id: None,
            phase: TaskPhase::Idle,
        }
    }

    pub fn token(&self) -> TaskToken {
        self.token
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn phase(&self) -> &TaskPhase {
        &self.phase
    }

    pub fn progress(&self) -> Option<u8> {
        match self.phase {
            TaskPhase::Polling { progress } => Some(progress),
            _ => None,
        }
    }

    pub fn result_location(&self) -> Option<&str> {
        match &self.phase {
            TaskPhase::Succeeded { result_location } => Some(result_location),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.phase {
            TaskPhase::Failed { failure } => Some(failure),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TaskPhase::Idle
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Idle or terminal: nothing left in flight for this snapshot
    pub fn is_settled(&self) -> bool {
        self.is_idle() || self.is_terminal()
    }

    /// Apply an event in place; on error the task is left unchanged.
    pub fn transition(&mut self, event: TaskEvent) -> Result<(), TransitionError> {
        let next = match (&self.phase, event) {
            (TaskPhase::Idle, TaskEvent::Accepted) => TaskPhase::Submitting,
            (TaskPhase::Idle, TaskEvent::Rejected(failure)) => TaskPhase::Failed { failure },
            (TaskPhase::Submitting, TaskEvent::JobStarted(job_id)) => {
                self.job_id = Some(job_id);
                TaskPhase::Polling { progress: 0 }
            }
            (TaskPhase::Submitting, TaskEvent::Failed(failure)) => TaskPhase::Failed { failure },
            (TaskPhase::Polling { .. }, TaskEvent::Progress(progress)) if progress < 100 => {
                TaskPhase::Polling { progress }
            }
            (TaskPhase::Polling { .. }, TaskEvent::Completed(result_location)) => {
                TaskPhase::Succeeded { result_location }
            }
            (TaskPhase::Polling { .. }, TaskEvent::Failed(failure)) => TaskPhase::Failed { failure },
            (phase, event) => {
                return Err(TransitionError::InvalidTransition {
                    from: phase.name(),
                    event,
                });
            }
        };

        self.phase = next;
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.phase {
            TaskPhase::Idle => write!(f, "idle"),
            TaskPhase::Submitting => write!(f, "task {} submitting", self.token),
            TaskPhase::Polling { progress } => {
                write!(f, "task {} processing ({progress}%)", self.token)
            }
            TaskPhase::Succeeded { result_location } => {
                write!(f, "task {} done: {result_location}", self.token)
            }
            TaskPhase::Failed { failure } => write!(f, "task {} failed: {failure}", self.token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polling(progress: u8) -> Task {
        let mut task = Task::idle(TaskToken(1));
        task.transition(TaskEvent::Accepted).unwrap();
        task.transition(TaskEvent::JobStarted(JobId::from("j1"))).unwrap();
        if progress > 0 {
            task.transition(TaskEvent::Progress(progress)).unwrap();
        }
        task
    }

    #[test]
    fn test_initial_state() {
        let task = Task::idle(TaskToken::INITIAL);
        assert!(task.is_idle());
        assert!(task.is_settled());
        assert_eq!(task.job_id(), None);
        assert_eq!(task.progress(), None);
    }

    #[test]
    fn test_happy_path() {
        let mut task = Task::idle(TaskToken(1));
        assert!(task.transition(TaskEvent::Accepted).is_ok());
        assert_eq!(task.phase(), &TaskPhase::Submitting);

        assert!(task.transition(TaskEvent::JobStarted(JobId::from("j1"))).is_ok());
        assert_eq!(task.progress(), Some(0));
        assert_eq!(task.job_id(), Some(&JobId::from("j1")));

        assert!(task.transition(TaskEvent::Progress(42)).is_ok());
        assert_eq!(task.progress(), Some(42));

        assert!(
            task.transition(TaskEvent::Completed("https://x/out.jpg".to_string()))
                .is_ok()
        );
        assert_eq!(task.result_location(), Some("https://x/out.jpg"));
        assert_eq!(task.progress(), None);
        assert!(task.is_terminal());
    }

    #[test]
    fn test_rejected_goes_straight_to_failed() {
        let mut task = Task::idle(TaskToken(1));
        let failure = Failure::InvalidInput {
            reason: "empty".to_string(),
        };
        assert!(task.transition(TaskEvent::Rejected(failure.clone())).is_ok());
        assert_eq!(task.failure(), Some(&failure));
        assert_eq!(task.job_id(), None);
    }

    #[test]
    fn test_submit_failure() {
        let mut task = Task::idle(TaskToken(1));
        task.transition(TaskEvent::Accepted).unwrap();
        assert!(task.transition(TaskEvent::Failed(Failure::Unauthorized)).is_ok());
        assert_eq!(task.failure(), Some(&Failure::Unauthorized));
    }

    #[test]
    fn test_terminal_phases_are_sinks() {
        let mut done = polling(10);
        done.transition(TaskEvent::Completed("https://x/out.jpg".to_string()))
            .unwrap();
        let snapshot = done.clone();

        for event in [
            TaskEvent::Accepted,
            TaskEvent::Progress(50),
            TaskEvent::Failed(Failure::Unauthorized),
            TaskEvent::Completed("https://x/other.jpg".to_string()),
        ] {
            assert!(done.transition(event).is_err());
            assert_eq!(done, snapshot);
        }

        let mut failed = polling(10);
        failed.transition(TaskEvent::Failed(Failure::Unauthorized)).unwrap();
        assert!(failed.transition(TaskEvent::Progress(20)).is_err());
        assert_eq!(failed.failure(), Some(&Failure::Unauthorized));
    }

    #[test]
    fn test_full_progress_is_not_a_polling_state() {
        let mut task = polling(10);
        let result = task.transition(TaskEvent::Progress(100));
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTransition { from: "polling", .. })
        ));
        assert_eq!(task.progress(), Some(10));
    }

    #[test]
    fn test_invalid_transition_from_idle() {
        let mut task = Task::idle(TaskToken(3));
        let result = task.transition(TaskEvent::Progress(5));
        if let Err(TransitionError::InvalidTransition { from, event }) = result {
            assert_eq!(from, "idle");
            assert_eq!(event, TaskEvent::Progress(5));
        } else {
            panic!("expected invalid transition");
        }
        assert!(task.is_idle());
    }

    #[test]
    fn test_tokens_increase() {
        let first = TaskToken::INITIAL.next();
        assert!(first.next() > first);
        assert_eq!(first.to_string(), "#1");
    }
}
