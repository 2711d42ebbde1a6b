/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for picwish-enhancer-adapter tests

use picwish_enhancer_adapter::{ClientConfig, Credentials, ImagePayload, PicwishClient};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> PicwishClient {
    PicwishClient::with_config_and_base_url(
        ClientConfig::default(),
        &server.uri(),
        Credentials::new(TEST_API_KEY),
    )
    .expect("client init")
}

/// Small ASCII payload so multipart bodies stay matchable as strings
pub fn sample_jpeg() -> ImagePayload {
    ImagePayload::new(b"not-really-a-jpeg".to_vec(), "image/jpeg")
}
