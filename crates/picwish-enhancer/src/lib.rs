/*
[INPUT]:  Public API exports for picwish-enhancer crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod controller;
pub mod source;
pub mod task;

// Re-export main types for convenience
pub use config::EnhancerConfig;
pub use controller::{DEFAULT_POLL_INTERVAL, TaskController};
pub use task::{Task, TaskEvent, TaskPhase, TaskToken, TransitionError};

pub use picwish_enhancer_adapter::{ApiGateway, Failure, ImagePayload, JobId, JobStatus};
