//! Isolated pipeline environment for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use studylens::content::{ContentItem, ContentSource, ContentType, ProcessingOptions};
use studylens::db::Database;
use studylens::pipeline::Pipeline;
use studylens::storage::{ArtifactStore, UploadStore};
use studylens::store::{ContentStore, SqliteContentStore};
use studylens::submission::SubmissionHandler;
use studylens::worker::{JobResult, PipelineJob, WorkerPool};

use super::backends::StubBackends;

pub struct TestHarness {
    temp_dir: TempDir,
    pub stubs: StubBackends,
    pub store: Arc<SqliteContentStore>,
    pub pipeline: Arc<Pipeline>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_stubs(StubBackends::default())
    }

    pub fn with_stubs(stubs: StubBackends) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(SqliteContentStore::new(
            Database::open_in_memory().expect("Failed to open in-memory database"),
        ));
        let pipeline = Arc::new(Pipeline::new(
            store.clone(),
            stubs.backends(),
            UploadStore::new(temp_dir.path().join("uploads")),
            ArtifactStore::new(temp_dir.path().join("audio")),
        ));

        Self {
            temp_dir,
            stubs,
            store,
            pipeline,
        }
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.temp_dir.path().join("uploads")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.temp_dir.path().join("audio")
    }

    /// Creates a pending record and stores its upload, as a submission would.
    pub async fn submit_file(
        &self,
        content_type: ContentType,
        file_name: &str,
        bytes: &[u8],
        options: ProcessingOptions,
    ) -> PipelineJob {
        let item = ContentItem::pending(
            "default-user",
            None,
            content_type,
            ContentSource::File {
                file_name: file_name.to_string(),
            },
            options,
        );
        self.store.create(&item).await.unwrap();
        let path = self.pipeline.uploads().save(file_name, bytes).await.unwrap();
        PipelineJob::with_upload(item.id, path)
    }

    pub async fn submit_video(&self, url: &str, options: ProcessingOptions) -> PipelineJob {
        let item = ContentItem::pending(
            "default-user",
            None,
            ContentType::Video,
            ContentSource::Url {
                url: url.to_string(),
            },
            options,
        );
        self.store.create(&item).await.unwrap();
        PipelineJob::new(item.id)
    }

    /// Runs the pipeline and returns the result together with the stored record.
    pub async fn run(&self, job: PipelineJob) -> (JobResult, ContentItem) {
        let id = job.content_id.clone();
        let result = self.pipeline.run(job).await;
        let item = self
            .store
            .get(&id)
            .await
            .unwrap()
            .expect("record should still exist");
        (result, item)
    }

    /// Submission front end wired to this harness's store, uploads and `pool`.
    pub fn submission_handler(&self, pool: Arc<WorkerPool>) -> SubmissionHandler {
        SubmissionHandler::new(
            self.store.clone(),
            self.pipeline.uploads().clone(),
            pool,
            "default-user",
            1024 * 1024,
        )
    }

    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.uploads_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
