use std::sync::Arc;

use crate::config::Config;
use crate::error::ConfigError;
use crate::generation::{
    GeminiClient, GenerativeModel, LlmQuizGenerator, LlmSummarizer, OpenAiSpeech, QuizGenerator,
    SpeechSynthesizer, Summarizer, UnavailableSpeech,
};
use crate::processor::{
    ImageExtractor, ProcessorRegistry, UnavailableVideoExtractor, VideoExtractor,
    VisionImageExtractor,
};
use crate::secrets::resolve_secret_optional;

/// Every external capability the pipeline calls. Built once from
/// configuration and shared by all workers.
#[derive(Clone)]
pub struct Backends {
    pub documents: Arc<ProcessorRegistry>,
    pub image: Arc<dyn ImageExtractor>,
    pub video: Arc<dyn VideoExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub quiz: Arc<dyn QuizGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl Backends {
    /// Production constructor. One Gemini client serves vision, summary and
    /// quiz; speech falls back to the unavailable backend when disabled or
    /// when no key resolves.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::from_config(&config.gemini)?);

        let speech: Arc<dyn SpeechSynthesizer> = if !config.speech.enabled {
            log::info!("Speech synthesis disabled by configuration");
            Arc::new(UnavailableSpeech::new("speech synthesis is disabled"))
        } else {
            match resolve_secret_optional(
                config.speech.api_key.as_deref(),
                config.speech.api_key_file.as_deref(),
                config.speech.api_key_env_var.as_deref(),
            )? {
                Some(key) => Arc::new(OpenAiSpeech::from_config(&config.speech, key)?),
                None => {
                    log::warn!("No speech API key configured; audio narration will be skipped");
                    Arc::new(UnavailableSpeech::new("no speech API key configured"))
                }
            }
        };

        Ok(Self {
            documents: Arc::new(ProcessorRegistry::new()),
            image: Arc::new(VisionImageExtractor::new(Arc::clone(&model))),
            video: Arc::new(UnavailableVideoExtractor),
            summarizer: Arc::new(LlmSummarizer::new(Arc::clone(&model))),
            quiz: Arc::new(LlmQuizGenerator::new(model)),
            speech,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeechConfig;

    #[test]
    fn test_from_config_without_keys() {
        let mut config = Config::default();
        config.gemini.api_key_env_var = None;
        config.speech = SpeechConfig {
            api_key_env_var: None,
            ..SpeechConfig::default()
        };

        assert!(Backends::from_config(&config).is_ok());
    }

    #[test]
    fn test_from_config_with_speech_disabled() {
        let mut config = Config::default();
        config.gemini.api_key = Some("test-key".to_string());
        config.speech.enabled = false;

        assert!(Backends::from_config(&config).is_ok());
    }

    #[test]
    fn test_missing_key_file_is_an_error() {
        let mut config = Config::default();
        config.gemini.api_key_file = Some("/nonexistent/studylens/gemini.key".to_string());

        assert!(matches!(
            Backends::from_config(&config),
            Err(ConfigError::Secret(_))
        ));
    }
}
