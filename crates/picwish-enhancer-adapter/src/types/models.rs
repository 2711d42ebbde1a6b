/*
[INPUT]:  Parsed PicWish task responses
[OUTPUT]: JobId handle and JobStatus vocabulary used by the controller
[POS]:    Data layer - domain models for the asynchronous job protocol
[UPDATE]: When the job lifecycle vocabulary changes
*/

use std::fmt;

/// Opaque job identifier assigned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Outcome of a single status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Still running; progress is strictly below 100
    Processing { progress: u8 },
    /// Finished; the enhanced image is available at `image_url`
    Completed { image_url: String },
}
