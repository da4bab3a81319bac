pub mod catalog;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod secrets;
pub mod storage;
pub mod store;
pub mod submission;
pub mod worker;

pub use catalog::Catalog;
pub use config::{load_config, Config};
pub use content::{
    ContentItem, ContentSource, ContentStatus, ContentType, PipelineOutcome, ProcessingOptions,
    QuizItem,
};
pub use db::Database;
pub use error::{
    CatalogError, ConfigError, ExtractionError, GenerationError, Result, StoreError,
    StudylensError, SubmissionError, WorkerError,
};
pub use pipeline::{Backends, Pipeline, PipelineWarning};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use store::{ContentStore, SqliteContentStore};
pub use submission::{SubmissionHandler, UploadedFile};
pub use worker::{JobResult, PipelineJob, WorkerPool};
