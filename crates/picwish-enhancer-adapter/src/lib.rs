/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public PicWish adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod gateway;
pub mod http;
pub mod types;

pub use gateway::{ApiGateway, GatewayCall, MockGateway};

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    Credentials,
    EnhancerError,
    PicwishClient,
    Result,
};

// Re-export all types
pub use types::*;
