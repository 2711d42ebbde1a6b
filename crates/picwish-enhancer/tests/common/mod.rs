/*
[INPUT]:  Test scenarios needing a controller and scripted gateway
[OUTPUT]: Shared fixtures for controller integration tests
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use picwish_enhancer::{ImagePayload, Task, TaskController};
use picwish_enhancer_adapter::MockGateway;
use tokio::sync::watch;

pub const RESULT_URL: &str = "https://x/out.jpg";

pub fn sample_jpeg() -> ImagePayload {
    ImagePayload::new(b"fake-jpeg".to_vec(), "image/jpeg")
}

pub fn controller_with(gateway: &Arc<MockGateway>) -> TaskController {
    TaskController::new(gateway.clone())
}

/// Wait until `predicate` holds, failing the test after a generous (virtual) timeout
pub async fn wait_until(rx: &mut watch::Receiver<Task>, predicate: impl FnMut(&Task) -> bool) -> Task {
    tokio::time::timeout(Duration::from_secs(60), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for task state")
        .expect("controller dropped")
        .clone()
}
