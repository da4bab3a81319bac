use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::content::DEFAULT_OWNER_ID;
use crate::secrets::expand_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_data_directory")]
    pub data_directory: String,
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_data_directory() -> String {
    "~/.studylens".to_string()
}

fn default_owner_id() -> String {
    DEFAULT_OWNER_ID.to_string()
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_directory: default_data_directory(),
            owner_id: default_owner_id(),
            worker_count: default_worker_count(),
            max_upload_bytes: default_max_upload_bytes(),
            gemini: GeminiConfig::default(),
            speech: SpeechConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Data directory with `~` expanded.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.data_directory))
    }

    pub fn database_path(&self) -> PathBuf {
        crate::db::database_path(&self.data_dir())
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir().join("uploads")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir().join("audio")
    }
}

/// Gemini `generateContent` backend used for vision, summaries and quizzes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_key_env() -> Option<String> {
    Some("GEMINI_API_KEY".to_string())
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            model: default_gemini_model(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_gemini_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OpenAI-compatible text-to-speech backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_speech_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_speech_key_env")]
    pub api_key_env_var: Option<String>,
    /// Longest input accepted per request; longer text is split.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_speech_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_speech_model() -> String {
    "tts-1".to_string()
}

fn default_speech_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_max_input_chars() -> usize {
    4096
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_speech_endpoint(),
            model: default_speech_model(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_speech_key_env(),
            max_input_chars: default_max_input_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
