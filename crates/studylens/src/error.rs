use std::path::PathBuf;
use thiserror::Error;

use crate::content::ContentStatus;

#[derive(Error, Debug)]
pub enum StudylensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Artifact storage error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Failed to resolve secret: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failures of the extraction stage. Every variant is fatal to the item.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: {}. Supported formats: .pdf, .docx", display_extension(.extension))]
    UnsupportedFormat { extension: String },

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error("Failed to process image: {0}")]
    ImageProcessing(String),

    #[error("Failed to process video: {0}")]
    NotImplemented(String),

    #[error("No text could be extracted from the content")]
    EmptyExtraction,

    #[error("Extraction backend failed: {0}")]
    Backend(String),
}

fn display_extension(extension: &str) -> String {
    if extension.is_empty() {
        "(no extension)".to_string()
    } else {
        format!(".{}", extension)
    }
}

/// Failures of the generation backends (summary, quiz, speech, vision).
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Request to generation backend failed: {0}")]
    Request(String),

    #[error("Generation backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation backend returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Generation backend returned an empty {0}")]
    EmptyResponse(&'static str),

    #[error("Generation backend unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact locator: {0}")]
    InvalidLocator(String),

    #[error("File already exists: {0}")]
    FileExists(PathBuf),
}

/// Failures of the content record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Content item '{0}' not found")]
    NotFound(String),

    #[error("Content item '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: ContentStatus,
        to: ContentStatus,
    },

    #[error("Store task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker pool is shut down")]
    ChannelClosed,
}

/// Failures while accepting new material. Only `InvalidInput` is the
/// submitter's fault.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to store upload: {0}")]
    Upload(#[from] ArtifactError),

    #[error("Failed to save content record: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to queue content for processing: {0}")]
    Queue(#[from] WorkerError),
}

impl SubmissionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SubmissionError::InvalidInput(message.into())
    }
}

/// Failures while reading or removing stored content.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

pub type Result<T> = std::result::Result<T, StudylensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_names_supported_extensions() {
        let err = ExtractionError::UnsupportedFormat {
            extension: "txt".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unsupported document format"));
        assert!(msg.contains(".txt"));
        assert!(msg.contains(".pdf"));
        assert!(msg.contains(".docx"));
    }

    #[test]
    fn test_unsupported_format_without_extension() {
        let err = ExtractionError::UnsupportedFormat {
            extension: String::new(),
        };
        assert!(err.to_string().contains("(no extension)"));
    }

    #[test]
    fn test_invalid_input_message_is_verbatim() {
        let err = SubmissionError::invalid("No file provided");
        assert_eq!(err.to_string(), "No file provided");
    }

    #[test]
    fn test_not_implemented_message() {
        let err = ExtractionError::NotImplemented("video transcription".to_string());
        assert!(err.to_string().contains("video transcription"));
    }
}
