use super::{ContentStatus, QuizItem};

/// Derived fields persisted when an item completes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedContent {
    pub extracted_text: String,
    pub summary: Option<String>,
    pub audio_locator: Option<String>,
    /// `None` when the quiz was not requested or produced no valid questions.
    pub quiz_items: Option<Vec<QuizItem>>,
}

/// Terminal update written by the pipeline at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed(CompletedContent),
    Failed { message: String },
}

impl PipelineOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Processing failed".to_string()
        } else {
            message
        };
        PipelineOutcome::Failed { message }
    }

    pub fn status(&self) -> ContentStatus {
        match self {
            PipelineOutcome::Completed(_) => ContentStatus::Completed,
            PipelineOutcome::Failed { .. } => ContentStatus::Failed,
        }
    }
}
