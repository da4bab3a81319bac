//! Text-to-speech backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use super::SpeechSynthesizer;
use crate::config::SpeechConfig;
use crate::error::{ConfigError, GenerationError};

/// OpenAI-compatible `/v1/audio/speech` client producing MP3.
///
/// Text longer than `max_input_chars` is sent in several requests split on
/// whitespace; the MP3 responses are concatenated in order.
pub struct OpenAiSpeech {
    client: Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
    max_input_chars: usize,
}

impl OpenAiSpeech {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
        max_input_chars: usize,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            max_input_chars: max_input_chars.max(1),
        })
    }

    pub fn from_config(config: &SpeechConfig, api_key: SecretString) -> Result<Self, ConfigError> {
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            api_key,
            config.max_input_chars,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build_url(&self) -> String {
        format!("{}/v1/audio/speech", self.endpoint.trim_end_matches('/'))
    }

    async fn synthesize_chunk(&self, input: &str, voice_id: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self
            .client
            .post(self.build_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "model": self.model,
                "input": input,
                "voice": voice_id,
                "response_format": "mp3",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GenerationError::EmptyResponse("audio stream"));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize_speech(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<Vec<u8>, GenerationError> {
        let chunks = chunk_text(text, self.max_input_chars);
        if chunks.is_empty() {
            return Err(GenerationError::EmptyResponse("speech input"));
        }

        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            log::debug!(
                "Synthesizing speech chunk {}/{} ({} chars)",
                index + 1,
                chunks.len(),
                chunk.chars().count()
            );
            audio.extend(self.synthesize_chunk(chunk, voice_id).await?);
        }
        Ok(audio)
    }
}

/// Splits text into pieces of at most `max_chars` characters.
///
/// A chunk ends at the last sentence end (`.`, `!` or `?` closing a word)
/// that fits, otherwise at the last whitespace. A single word longer than
/// the limit is split mid-word.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !pending.is_empty() {
                chunks.push(pending.join(" "));
                pending.clear();
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if !pending.is_empty() && joined_len(&pending) + 1 + word_len > max_chars {
            let cut = pending
                .iter()
                .rposition(|w| ends_sentence(w))
                .map_or(pending.len(), |i| i + 1);
            let carried = pending.split_off(cut);
            chunks.push(pending.join(" "));
            pending = carried;

            if !pending.is_empty() && joined_len(&pending) + 1 + word_len > max_chars {
                chunks.push(pending.join(" "));
                pending.clear();
            }
        }
        pending.push(word);
    }

    if !pending.is_empty() {
        chunks.push(pending.join(" "));
    }
    chunks
}

fn ends_sentence(word: &str) -> bool {
    word.ends_with(&['.', '!', '?'][..])
}

/// Length in characters of `words` joined by single spaces.
fn joined_len(words: &[&str]) -> usize {
    let chars: usize = words.iter().map(|w| w.chars().count()).sum();
    chars + words.len().saturating_sub(1)
}

/// Speech backend used when synthesis is disabled or has no credentials.
#[derive(Debug, Clone)]
pub struct UnavailableSpeech {
    reason: String,
}

impl UnavailableSpeech {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for UnavailableSpeech {
    async fn synthesize_speech(
        &self,
        _text: &str,
        _voice_id: &str,
    ) -> Result<Vec<u8>, GenerationError> {
        Err(GenerationError::Unavailable(self.reason.clone()))
    }
}
