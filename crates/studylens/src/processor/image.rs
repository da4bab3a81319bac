use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ExtractionError, GenerationError};
use crate::generation::{prompts, GenerationRequest, GenerativeModel, InlineImage};
use crate::processor::ImageExtractor;

const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

/// Image text extraction through a multimodal model: visible text is
/// transcribed and diagrams or charts are described.
pub struct VisionImageExtractor {
    model: Arc<dyn GenerativeModel>,
}

impl VisionImageExtractor {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

/// MIME type from the image bytes, then from the file name, then JPEG.
pub fn sniff_image_mime(bytes: &[u8], file_name: &str) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }

    mime_guess::from_path(file_name)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string())
}

#[async_trait]
impl ImageExtractor for VisionImageExtractor {
    async fn extract_image_text(
        &self,
        image: &[u8],
        file_name: &str,
    ) -> Result<String, ExtractionError> {
        if image.is_empty() {
            return Err(ExtractionError::ImageProcessing("image is empty".to_string()));
        }

        let mime_type = sniff_image_mime(image, file_name);
        tracing::debug!(mime_type = %mime_type, bytes = image.len(), "Sending image to vision model");

        let request = GenerationRequest::with_image(
            prompts::IMAGE_TRANSCRIPTION,
            InlineImage {
                mime_type,
                data: image.to_vec(),
            },
        );

        match self.model.generate(request).await {
            Ok(text) => Ok(text),
            // Blank output is reported by the pipeline as an empty extraction.
            Err(GenerationError::EmptyResponse(_)) => Ok(String::new()),
            Err(e) => Err(ExtractionError::ImageProcessing(e.to_string())),
        }
    }
}
