use std::sync::Arc;

use async_trait::async_trait;

use super::{prompts, GenerationRequest, GenerativeModel, Summarizer};
use crate::error::GenerationError;

/// Summaries produced by a generative model.
pub struct LlmSummarizer {
    model: Arc<dyn GenerativeModel>,
}

impl LlmSummarizer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, GenerationError> {
        let summary = self
            .model
            .generate(GenerationRequest::text(prompts::summary(text)))
            .await?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(GenerationError::EmptyResponse("summary"));
        }
        Ok(summary.to_string())
    }
}
