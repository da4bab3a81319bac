//! Generation backends: a shared generative model plus the summary, quiz and
//! speech capabilities the pipeline calls.

pub mod gemini;
pub mod prompts;
pub mod quiz;
pub mod speech;
pub mod summarizer;

use async_trait::async_trait;

use crate::error::GenerationError;

pub use gemini::GeminiClient;
pub use quiz::{parse_quiz, LlmQuizGenerator, QuizDraft};
pub use speech::{OpenAiSpeech, UnavailableSpeech};
pub use summarizer::LlmSummarizer;

/// Image attached to a generation request.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
    /// Ask the backend for a JSON document instead of prose.
    pub json_output: bool,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            json_output: false,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            json_output: true,
            ..Self::text(prompt)
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: InlineImage) -> Self {
        Self {
            image: Some(image),
            ..Self::text(prompt)
        }
    }
}

/// A text-generating model, optionally multimodal.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, GenerationError>;
}

/// Produces quiz questions. Malformed model output is not an error: it comes
/// back as an empty draft flagged as malformed.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    async fn generate_quiz(&self, text: &str) -> Result<QuizDraft, GenerationError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns MP3 bytes.
    async fn synthesize_speech(&self, text: &str, voice_id: &str)
        -> Result<Vec<u8>, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let json = GenerationRequest::json("q");
        assert!(json.json_output);
        assert!(json.image.is_none());

        let img = GenerationRequest::with_image(
            "describe",
            InlineImage {
                mime_type: "image/png".to_string(),
                data: vec![1, 2, 3],
            },
        );
        assert!(!img.json_output);
        assert_eq!(img.image.unwrap().mime_type, "image/png");
    }
}
