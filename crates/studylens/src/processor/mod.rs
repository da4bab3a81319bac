//! Text extraction from submitted material.

pub mod docx;
pub mod image;
pub mod pdf;
pub mod video;

use std::path::Path;

use async_trait::async_trait;

use crate::error::ExtractionError;

pub use self::image::VisionImageExtractor;
pub use video::UnavailableVideoExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Case-insensitive match on a file extension without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

/// Synchronous extractor for one document format.
pub trait DocumentProcessor: Send + Sync {
    fn process(&self, path: &Path) -> Result<String, ExtractionError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

pub struct ProcessorRegistry {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            processors: vec![
                Box::new(pdf::PdfProcessor::new()),
                Box::new(docx::DocxProcessor::new()),
            ],
        }
    }

    /// Extracts text from the file at `path`. The format comes from the
    /// submitter's `file_name`, not from the stored path.
    pub fn extract_document_text(
        &self,
        path: &Path,
        file_name: &str,
    ) -> Result<String, ExtractionError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let format = DocumentFormat::from_extension(&extension).ok_or_else(|| {
            ExtractionError::UnsupportedFormat {
                extension: extension.clone(),
            }
        })?;

        self.processors
            .iter()
            .find(|processor| processor.supports(format))
            .ok_or(ExtractionError::UnsupportedFormat { extension })?
            .process(path)
    }
}

/// Turns an image into readable text (transcription plus descriptions of
/// visual elements).
#[async_trait]
pub trait ImageExtractor: Send + Sync {
    async fn extract_image_text(
        &self,
        image: &[u8],
        file_name: &str,
    ) -> Result<String, ExtractionError>;
}

/// Turns a video URL into a transcript.
#[async_trait]
pub trait VideoExtractor: Send + Sync {
    async fn extract_video_text(&self, url: &reqwest::Url) -> Result<String, ExtractionError>;
}
