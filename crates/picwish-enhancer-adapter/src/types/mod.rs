/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs/enums for payloads, requests, responses and failures
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

pub mod failure;
pub mod models;
pub mod payload;
pub mod requests;
pub mod responses;

pub use failure::*;
pub use models::*;
pub use payload::*;
pub use requests::*;
pub use responses::*;
