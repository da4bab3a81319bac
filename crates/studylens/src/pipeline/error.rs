use std::fmt;

use thiserror::Error;

use crate::error::{ExtractionError, GenerationError, StoreError};

/// Fatal failures of a run. The `Display` text of the extraction and
/// summarization variants becomes the item's `errorMessage`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Failed to summarize content: {0}")]
    Summarization(GenerationError),

    /// The quiz backend itself failed. Malformed output is only a warning.
    #[error("Failed to generate quiz: {0}")]
    QuizGeneration(GenerationError),

    #[error("Record store failed: {0}")]
    Store(#[from] StoreError),

    #[error("Content item '{0}' disappeared before processing")]
    MissingRecord(String),

    #[error("Pipeline task failed: {0}")]
    Task(String),
}

/// Non-fatal problems. The item still completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    AudioFailed { error: String },
    QuizMalformed { reason: String },
    QuizItemDropped { count: usize },
    UploadCleanupFailed { error: String },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::AudioFailed { error } => {
                write!(f, "audio synthesis failed: {}", error)
            }
            PipelineWarning::QuizMalformed { reason } => {
                write!(f, "quiz output was malformed: {}", reason)
            }
            PipelineWarning::QuizItemDropped { count } => {
                write!(f, "dropped {} invalid quiz question(s)", count)
            }
            PipelineWarning::UploadCleanupFailed { error } => {
                write!(f, "failed to remove upload: {}", error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_message_passes_through() {
        let err = PipelineError::from(ExtractionError::EmptyExtraction);
        assert_eq!(
            err.to_string(),
            ExtractionError::EmptyExtraction.to_string()
        );
    }

    #[test]
    fn test_summarization_message_names_stage() {
        let err = PipelineError::Summarization(GenerationError::EmptyResponse("summary"));
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to summarize content"));
        assert!(msg.contains("summary"));
    }

    #[test]
    fn test_quiz_backend_failure_message() {
        let err = PipelineError::QuizGeneration(GenerationError::Status {
            status: 503,
            body: "overloaded".to_string(),
        });
        assert!(err.to_string().starts_with("Failed to generate quiz: "));
    }

    #[test]
    fn test_warning_display() {
        let warning = PipelineWarning::QuizItemDropped { count: 2 };
        assert_eq!(warning.to_string(), "dropped 2 invalid quiz question(s)");
    }
}
