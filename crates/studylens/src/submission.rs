//! Accepting new material: validate, store the upload, create the pending
//! record and hand the run to the worker pool.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::content::{ContentItem, ContentSource, ContentType, ProcessingOptions};
use crate::error::SubmissionError;
use crate::sanitize;
use crate::storage::UploadStore;
use crate::store::ContentStore;
use crate::worker::{PipelineJob, WorkerPool};

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct SubmissionHandler {
    store: Arc<dyn ContentStore>,
    uploads: UploadStore,
    pool: Arc<WorkerPool>,
    owner_id: String,
    max_upload_bytes: usize,
}

impl SubmissionHandler {
    pub fn new(
        store: Arc<dyn ContentStore>,
        uploads: UploadStore,
        pool: Arc<WorkerPool>,
        owner_id: impl Into<String>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            uploads,
            pool,
            owner_id: owner_id.into(),
            max_upload_bytes,
        }
    }

    /// Accepts a PDF or DOCX. The format is only checked by the pipeline, so
    /// an unsupported extension yields a record that later fails.
    pub async fn submit_document(
        &self,
        title: Option<String>,
        options: ProcessingOptions,
        file: Option<UploadedFile>,
    ) -> Result<ContentItem, SubmissionError> {
        let file = file.ok_or_else(|| SubmissionError::invalid("No file uploaded"))?;
        self.submit_file(ContentType::Document, title, options, file)
            .await
    }

    pub async fn submit_image(
        &self,
        title: Option<String>,
        options: ProcessingOptions,
        file: Option<UploadedFile>,
    ) -> Result<ContentItem, SubmissionError> {
        let file = file.ok_or_else(|| SubmissionError::invalid("No image uploaded"))?;
        self.submit_file(ContentType::Image, title, options, file)
            .await
    }

    pub async fn submit_video(
        &self,
        title: Option<String>,
        options: ProcessingOptions,
        url: Option<&str>,
    ) -> Result<ContentItem, SubmissionError> {
        let url = validate_video_url(url)?;
        let item = ContentItem::pending(
            self.owner_id.as_str(),
            title,
            ContentType::Video,
            ContentSource::Url { url },
            options,
        );

        self.store.create(&item).await?;
        self.enqueue(&item, PipelineJob::new(item.id.clone())).await?;
        Ok(item)
    }

    async fn submit_file(
        &self,
        content_type: ContentType,
        title: Option<String>,
        options: ProcessingOptions,
        file: UploadedFile,
    ) -> Result<ContentItem, SubmissionError> {
        let file_name = client_file_name(&file.file_name)
            .ok_or_else(|| SubmissionError::invalid("Uploaded file has no name"))?;
        if file.bytes.is_empty() {
            return Err(SubmissionError::invalid("Uploaded file is empty"));
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(SubmissionError::invalid(format!(
                "Uploaded file exceeds the {} byte limit",
                self.max_upload_bytes
            )));
        }

        let item = ContentItem::pending(
            self.owner_id.as_str(),
            title,
            content_type,
            ContentSource::File {
                file_name: file_name.clone(),
            },
            options,
        );

        let upload_path = self.uploads.save(&file_name, &file.bytes).await?;

        if let Err(e) = self.store.create(&item).await {
            self.discard_upload(&upload_path).await;
            return Err(e.into());
        }

        self.enqueue(&item, PipelineJob::with_upload(item.id.clone(), upload_path))
            .await?;
        Ok(item)
    }

    async fn enqueue(&self, item: &ContentItem, job: PipelineJob) -> Result<(), SubmissionError> {
        let upload_path = job.upload_path.clone();

        if let Err(e) = self.pool.submit(job) {
            error!(content_id = %item.id, error = %e, "failed to queue content");
            let err = SubmissionError::from(e);
            if let Err(store_err) = self.store.fail_pending(&item.id, &err.to_string()).await {
                warn!(content_id = %item.id, error = %store_err, "could not mark item as failed");
            }
            if let Some(path) = upload_path {
                self.discard_upload(&path).await;
            }
            return Err(err);
        }

        info!(
            content_id = %item.id,
            content_type = %item.content_type,
            source = %source_for_log(&item.source),
            "content queued"
        );
        Ok(())
    }

    async fn discard_upload(&self, path: &Path) {
        if let Err(e) = self.uploads.remove(path).await {
            warn!(error = %e, "failed to remove rejected upload");
        }
    }
}

/// Parses the multipart `processingOptions` field. Absent or blank means defaults.
pub fn parse_options_json(raw: Option<&str>) -> Result<ProcessingOptions, SubmissionError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(ProcessingOptions::default()),
        Some(raw) => ProcessingOptions::from_json_str(raw)
            .map_err(|e| SubmissionError::invalid(format!("Invalid processing options: {}", e))),
    }
}

/// Parses `processingOptions` from a JSON body. A JSON-encoded string is
/// accepted as well, matching what multipart clients send.
pub fn parse_options_value(
    value: Option<serde_json::Value>,
) -> Result<ProcessingOptions, SubmissionError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(ProcessingOptions::default()),
        Some(serde_json::Value::String(raw)) => parse_options_json(Some(&raw)),
        Some(value) => ProcessingOptions::from_json_value(value)
            .map_err(|e| SubmissionError::invalid(format!("Invalid processing options: {}", e))),
    }
}

fn validate_video_url(url: Option<&str>) -> Result<String, SubmissionError> {
    let raw = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| SubmissionError::invalid("No video URL provided"))?;

    let parsed = reqwest::Url::parse(raw)
        .map_err(|e| SubmissionError::invalid(format!("Invalid video URL: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(SubmissionError::invalid(
            "Invalid video URL: only http and https URLs are supported",
        ));
    }

    Ok(raw.to_string())
}

/// Keeps only the final path component of a client-supplied name.
fn client_file_name(raw: &str) -> Option<String> {
    let normalized = raw.trim().replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

fn source_for_log(source: &ContentSource) -> String {
    match source {
        ContentSource::File { file_name } => sanitize::redact_path(Path::new(file_name)),
        ContentSource::Url { url } => sanitize::redact_url(url),
    }
}
