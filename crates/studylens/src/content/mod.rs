//! Content items: the unit of work and the persisted record of its outcome.

pub mod options;
pub mod outcome;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub use options::{ProcessingOptions, DEFAULT_VOICE_ID};
pub use outcome::{CompletedContent, PipelineOutcome};

/// Owner used when no authentication system is in front of the store.
pub const DEFAULT_OWNER_ID: &str = "default-user";

/// Kind of submitted material. Fixed at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Document,
    Image,
    Video,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Document => "document",
            ContentType::Image => "image",
            ContentType::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(ContentType::Document),
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            other => Err(format!("unknown content type '{}'", other)),
        }
    }
}

/// Lifecycle state. `Completed` and `Failed` are absorbing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Processing => "processing",
            ContentStatus::Completed => "completed",
            ContentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContentStatus::Pending),
            "processing" => Ok(ContentStatus::Processing),
            "completed" => Ok(ContentStatus::Completed),
            "failed" => Ok(ContentStatus::Failed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Where the material came from. Exactly one of file name or URL exists.
///
/// On the wire both `sourceFileName` and `sourceUrl` are always present and
/// the one that does not apply is null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "SourceFields", try_from = "SourceFields")]
pub enum ContentSource {
    File { file_name: String },
    Url { url: String },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceFields {
    source_file_name: Option<String>,
    source_url: Option<String>,
}

impl From<ContentSource> for SourceFields {
    fn from(source: ContentSource) -> Self {
        match source {
            ContentSource::File { file_name } => SourceFields {
                source_file_name: Some(file_name),
                source_url: None,
            },
            ContentSource::Url { url } => SourceFields {
                source_file_name: None,
                source_url: Some(url),
            },
        }
    }
}

impl TryFrom<SourceFields> for ContentSource {
    type Error = String;

    fn try_from(fields: SourceFields) -> Result<Self, Self::Error> {
        match (fields.source_file_name, fields.source_url) {
            (Some(file_name), None) => Ok(ContentSource::File { file_name }),
            (None, Some(url)) => Ok(ContentSource::Url { url }),
            (Some(_), Some(_)) => Err("both sourceFileName and sourceUrl are set".to_string()),
            (None, None) => Err("neither sourceFileName nor sourceUrl is set".to_string()),
        }
    }
}

impl ContentSource {
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ContentSource::File { file_name } => Some(file_name),
            ContentSource::Url { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ContentSource::Url { url } => Some(url),
            ContentSource::File { .. } => None,
        }
    }

    /// Display string used as the default title.
    pub fn label(&self) -> &str {
        match self {
            ContentSource::File { file_name } => file_name,
            ContentSource::Url { url } => url,
        }
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    pub question_text: String,
    pub option_texts: Vec<String>,
    /// Zero-based index into `option_texts`.
    pub correct_option_index: usize,
}

impl QuizItem {
    pub fn is_valid(&self) -> bool {
        !self.question_text.trim().is_empty()
            && !self.option_texts.is_empty()
            && self.correct_option_index < self.option_texts.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content_type: ContentType,
    #[serde(flatten)]
    pub source: ContentSource,
    pub status: ContentStatus,
    pub extracted_text: Option<String>,
    pub summary: Option<String>,
    pub audio_locator: Option<String>,
    pub quiz_items: Option<Vec<QuizItem>>,
    pub error_message: Option<String>,
    pub processing_options: ProcessingOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Builds a fresh pending record. A blank title falls back to the source label.
    pub fn pending(
        owner_id: impl Into<String>,
        title: Option<String>,
        content_type: ContentType,
        source: ContentSource,
        processing_options: ProcessingOptions,
    ) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| source.label().to_string());
        // Stored timestamps carry microsecond precision.
        let now = Utc::now().trunc_subsecs(6);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            title,
            content_type,
            source,
            status: ContentStatus::Pending,
            extracted_text: None,
            summary: None,
            audio_locator: None,
            quiz_items: None,
            error_message: None,
            processing_options,
            created_at: now,
            updated_at: now,
        }
    }
}
