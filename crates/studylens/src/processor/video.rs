use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::processor::VideoExtractor;
use crate::sanitize::redact_url;

/// Video extractor for deployments without a transcription backend.
/// Every call fails with `NotImplemented`.
#[derive(Debug, Clone, Default)]
pub struct UnavailableVideoExtractor;

#[async_trait]
impl VideoExtractor for UnavailableVideoExtractor {
    async fn extract_video_text(&self, url: &reqwest::Url) -> Result<String, ExtractionError> {
        log::debug!("No video backend for {}", redact_url(url.as_str()));
        Err(ExtractionError::NotImplemented(
            "Video processing not fully implemented - requires a video transcription backend"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_not_implemented() {
        let url = reqwest::Url::parse("https://videos.example.com/watch?v=1").unwrap();
        let err = UnavailableVideoExtractor
            .extract_video_text(&url)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::NotImplemented(_)));
        assert!(err.to_string().contains("not fully implemented"));
    }
}
