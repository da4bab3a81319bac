use crate::content::{CompletedContent, ContentItem, PipelineOutcome};
use crate::generation::QuizDraft;
use crate::worker::job::PipelineJob;

use super::error::PipelineWarning;

/// Trimmed, non-empty text from the extraction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary(pub String);

/// Audio written to the artifact store for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub locator: String,
}

pub struct PipelineContext {
    // Input
    pub job: PipelineJob,

    // Loaded when the run starts
    pub item: Option<ContentItem>,

    // Extraction result, guaranteed Some after step_extract
    pub extracted: Option<Extracted>,

    // Only when the item asked for them
    pub summary: Option<Summary>,
    pub narration: Option<Narration>,
    pub quiz: Option<QuizDraft>,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineContext {
    pub fn new(job: PipelineJob) -> Self {
        Self {
            job,
            item: None,
            extracted: None,
            summary: None,
            narration: None,
            quiz: None,
            warnings: Vec::new(),
        }
    }

    /// Folds the stage outputs into the terminal update.
    pub fn completed_outcome(&self) -> PipelineOutcome {
        PipelineOutcome::Completed(CompletedContent {
            extracted_text: self
                .extracted
                .as_ref()
                .map(|e| e.0.clone())
                .unwrap_or_default(),
            summary: self.summary.as_ref().map(|s| s.0.clone()),
            audio_locator: self.narration.as_ref().map(|n| n.locator.clone()),
            quiz_items: self.quiz.clone().and_then(QuizDraft::into_persisted),
        })
    }
}
