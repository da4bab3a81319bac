//! Submissions through the worker pool: intake never waits on processing.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use common::{options, ScriptedImage, StubBackends, TestHarness};

use studylens::content::ContentStatus;
use studylens::store::ContentStore;
use studylens::submission::UploadedFile;
use studylens::worker::WorkerPool;

fn png(name: &str) -> Option<UploadedFile> {
    Some(UploadedFile {
        file_name: name.to_string(),
        bytes: b"\x89PNG fake".to_vec(),
    })
}

#[tokio::test]
async fn test_submissions_return_pending_while_worker_is_busy() {
    let gate = Arc::new(Semaphore::new(0));
    let harness = TestHarness::with_stubs(StubBackends {
        image: Arc::new(ScriptedImage::gated("Leaf cross-section", gate.clone())),
        ..StubBackends::default()
    });
    let pool = Arc::new(WorkerPool::new(harness.pipeline.clone(), 1));
    let handler = harness.submission_handler(pool.clone());

    let mut ids = Vec::new();
    for name in ["a.png", "b.png", "c.png"] {
        let item = tokio::time::timeout(
            Duration::from_secs(2),
            handler.submit_image(None, options(false, false, false), png(name)),
        )
        .await
        .expect("submission must not wait for a free worker")
        .unwrap();
        assert_eq!(item.status, ContentStatus::Pending);
        ids.push(item.id);
    }

    gate.add_permits(ids.len());
    pool.wait().await;

    for id in &ids {
        let item = harness.store.get(id).await.unwrap().unwrap();
        assert_eq!(item.status, ContentStatus::Completed);
        assert_eq!(item.extracted_text.as_deref(), Some("Leaf cross-section"));
    }
    assert_eq!(harness.stubs.image.calls.count(), 3);
    assert_eq!(harness.upload_count(), 0);
}

#[tokio::test]
async fn test_submission_after_shutdown_fails_the_record() {
    let harness = TestHarness::new();
    let pool = Arc::new(WorkerPool::new(harness.pipeline.clone(), 1));
    let handler = harness.submission_handler(pool.clone());
    pool.wait().await;

    let err = handler
        .submit_image(Some("Late".to_string()), options(false, false, false), png("late.png"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("shut down"), "{}", err);

    let items = harness.store.list_by_owner("default-user").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, ContentStatus::Failed);
    assert_eq!(harness.upload_count(), 0);
    assert_eq!(harness.stubs.image.calls.count(), 0);
}
