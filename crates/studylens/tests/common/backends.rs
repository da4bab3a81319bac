//! Scripted stand-ins for the external services.
//!
//! Each stub counts its calls so tests can check which stages ran.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use studylens::error::{ExtractionError, GenerationError};
use studylens::generation::{parse_quiz, QuizDraft, QuizGenerator, SpeechSynthesizer, Summarizer};
use studylens::pipeline::Backends;
use studylens::processor::{ImageExtractor, ProcessorRegistry, UnavailableVideoExtractor};

#[derive(Default)]
pub struct CallCounter(AtomicUsize);

impl CallCounter {
    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ScriptedImage {
    reply: Result<String, String>,
    gate: Option<Arc<Semaphore>>,
    pub calls: CallCounter,
}

impl ScriptedImage {
    pub fn text(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            gate: None,
            calls: CallCounter::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            gate: None,
            calls: CallCounter::default(),
        }
    }

    /// Each call blocks until the test adds a permit to `gate`.
    pub fn gated(text: &str, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::text(text)
        }
    }
}

#[async_trait]
impl ImageExtractor for ScriptedImage {
    async fn extract_image_text(
        &self,
        _image: &[u8],
        _file_name: &str,
    ) -> Result<String, ExtractionError> {
        self.calls.hit();
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.reply
            .clone()
            .map_err(ExtractionError::ImageProcessing)
    }
}

pub struct ScriptedSummarizer {
    reply: Option<String>,
    pub calls: CallCounter,
}

impl ScriptedSummarizer {
    pub fn text(summary: &str) -> Self {
        Self {
            reply: Some(summary.to_string()),
            calls: CallCounter::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: CallCounter::default(),
        }
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, GenerationError> {
        self.calls.hit();
        self.reply
            .clone()
            .ok_or_else(|| GenerationError::Unavailable("summary service offline".to_string()))
    }
}

/// Feeds canned model output through the real quiz parser.
pub struct ScriptedQuiz {
    raw: Option<String>,
    pub calls: CallCounter,
}

impl ScriptedQuiz {
    pub fn raw(output: &str) -> Self {
        Self {
            raw: Some(output.to_string()),
            calls: CallCounter::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            raw: None,
            calls: CallCounter::default(),
        }
    }
}

#[async_trait]
impl QuizGenerator for ScriptedQuiz {
    async fn generate_quiz(&self, _text: &str) -> Result<QuizDraft, GenerationError> {
        self.calls.hit();
        match &self.raw {
            Some(raw) => Ok(parse_quiz(raw)),
            None => Err(GenerationError::Status {
                status: 503,
                body: "overloaded".to_string(),
            }),
        }
    }
}

pub struct ScriptedSpeech {
    reply: Option<Vec<u8>>,
    pub calls: CallCounter,
}

impl ScriptedSpeech {
    pub fn audio(bytes: &[u8]) -> Self {
        Self {
            reply: Some(bytes.to_vec()),
            calls: CallCounter::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: CallCounter::default(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSpeech {
    async fn synthesize_speech(
        &self,
        _text: &str,
        _voice_id: &str,
    ) -> Result<Vec<u8>, GenerationError> {
        self.calls.hit();
        self.reply
            .clone()
            .ok_or_else(|| GenerationError::Request("connection reset".to_string()))
    }
}

/// Handles on the stubs behind a `Backends` value.
pub struct StubBackends {
    pub image: Arc<ScriptedImage>,
    pub summarizer: Arc<ScriptedSummarizer>,
    pub quiz: Arc<ScriptedQuiz>,
    pub speech: Arc<ScriptedSpeech>,
}

pub const VALID_QUIZ: &str = r#"{
    "questions": [
        {
            "question": "What do plants absorb for photosynthesis?",
            "options": ["Carbon dioxide", "Nitrogen", "Helium", "Neon"],
            "correctAnswer": 0
        },
        {
            "question": "Where does photosynthesis happen?",
            "options": ["Mitochondria", "Chloroplasts", "Nucleus", "Ribosomes"],
            "correctAnswer": 1
        },
        {
            "question": "What gas is released?",
            "options": ["Oxygen", "Methane", "Argon", "Hydrogen"],
            "correctAnswer": 0
        }
    ]
}"#;

impl Default for StubBackends {
    fn default() -> Self {
        Self {
            image: Arc::new(ScriptedImage::text("A labelled diagram of a plant cell")),
            summarizer: Arc::new(ScriptedSummarizer::text(
                "Plants turn light into chemical energy.",
            )),
            quiz: Arc::new(ScriptedQuiz::raw(VALID_QUIZ)),
            speech: Arc::new(ScriptedSpeech::audio(b"ID3narration")),
        }
    }
}

impl StubBackends {
    pub fn backends(&self) -> Backends {
        Backends {
            documents: Arc::new(ProcessorRegistry::new()),
            image: self.image.clone(),
            video: Arc::new(UnavailableVideoExtractor),
            summarizer: self.summarizer.clone(),
            quiz: self.quiz.clone(),
            speech: self.speech.clone(),
        }
    }
}
