//! Quiz generation and tolerant parsing of model output.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{prompts, GenerationRequest, GenerativeModel, QuizGenerator};
use crate::content::QuizItem;
use crate::error::GenerationError;

/// Parsed quiz output. `malformed` is set when the model's reply could not be
/// read as a quiz at all; `dropped` counts individual questions rejected for
/// breaking the quiz invariants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizDraft {
    pub items: Vec<QuizItem>,
    pub dropped: usize,
    pub malformed: Option<String>,
}

impl QuizDraft {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            dropped: 0,
            malformed: Some(reason.into()),
        }
    }

    /// Questions to persist: `None` when nothing valid remains.
    pub fn into_persisted(self) -> Option<Vec<QuizItem>> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items)
        }
    }
}

/// One question as the model writes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: Option<i64>,
}

impl WireQuestion {
    fn into_item(self) -> Option<QuizItem> {
        let index = usize::try_from(self.correct_answer?).ok()?;
        let item = QuizItem {
            question_text: self.question.trim().to_string(),
            option_texts: self.options.into_iter().map(|o| o.trim().to_string()).collect(),
            correct_option_index: index,
        };
        item.is_valid().then_some(item)
    }
}

/// Removes a surrounding markdown code fence (```json ... ```), if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}

/// Reads model output into a draft. Never fails: unreadable output becomes a
/// malformed draft, invalid questions are counted and dropped.
pub fn parse_quiz(raw: &str) -> QuizDraft {
    let value: Value = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(value) => value,
        Err(e) => return QuizDraft::malformed(format!("quiz output is not JSON: {}", e)),
    };

    let questions = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            Some(_) => return QuizDraft::malformed("\"questions\" is not an array"),
            None => return QuizDraft::malformed("quiz output has no \"questions\" field"),
        },
        _ => return QuizDraft::malformed("quiz output is neither an object nor an array"),
    };

    let mut draft = QuizDraft::default();
    for question in questions {
        match serde_json::from_value::<WireQuestion>(question)
            .ok()
            .and_then(WireQuestion::into_item)
        {
            Some(item) => draft.items.push(item),
            None => draft.dropped += 1,
        }
    }
    draft
}

/// Quizzes produced by a generative model in JSON mode.
pub struct LlmQuizGenerator {
    model: Arc<dyn GenerativeModel>,
}

impl LlmQuizGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl QuizGenerator for LlmQuizGenerator {
    async fn generate_quiz(&self, text: &str) -> Result<QuizDraft, GenerationError> {
        let raw = self
            .model
            .generate(GenerationRequest::json(prompts::quiz(text)))
            .await?;
        Ok(parse_quiz(&raw))
    }
}
