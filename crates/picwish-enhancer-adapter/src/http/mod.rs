/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod tasks;

pub use error::{EnhancerError, Result};

pub use client::{API_KEY_HEADER, ClientConfig, Credentials, DEFAULT_BASE_URL, PicwishClient};
pub use tasks::SCALE_TASKS_ENDPOINT;
