use std::path::PathBuf;

use crate::content::ContentStatus;
use crate::pipeline::PipelineWarning;

/// One queued pipeline run. The record itself is re-read from the store when
/// the run starts; the job only carries what the store does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineJob {
    pub content_id: String,
    /// Stored upload for document and image items. Removed when the run concludes.
    pub upload_path: Option<PathBuf>,
}

impl PipelineJob {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            upload_path: None,
        }
    }

    pub fn with_upload(content_id: impl Into<String>, upload_path: PathBuf) -> Self {
        Self {
            content_id: content_id.into(),
            upload_path: Some(upload_path),
        }
    }
}

/// How a run ended, as seen by the worker.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub content_id: String,
    /// Terminal status written to the store. `None` when the run aborted
    /// before a terminal write succeeded.
    pub status: Option<ContentStatus>,
    pub error: Option<String>,
    pub warnings: Vec<PipelineWarning>,
}

impl JobResult {
    pub fn completed(job: &PipelineJob, warnings: Vec<PipelineWarning>) -> Self {
        Self {
            content_id: job.content_id.clone(),
            status: Some(ContentStatus::Completed),
            error: None,
            warnings,
        }
    }

    pub fn failed(job: &PipelineJob, error: String, warnings: Vec<PipelineWarning>) -> Self {
        Self {
            content_id: job.content_id.clone(),
            status: Some(ContentStatus::Failed),
            error: Some(error),
            warnings,
        }
    }

    pub fn aborted(job: &PipelineJob, error: String, warnings: Vec<PipelineWarning>) -> Self {
        Self {
            content_id: job.content_id.clone(),
            status: None,
            error: Some(error),
            warnings,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(ContentStatus::Completed)
    }
}
