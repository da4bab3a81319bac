use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, field, info, info_span, warn, Instrument, Span};

use crate::config::Config;
use crate::content::{ContentType, PipelineOutcome};
use crate::error::{ConfigError, ExtractionError, StoreError};
use crate::sanitize;
use crate::storage::{ArtifactStore, UploadStore};
use crate::store::ContentStore;
use crate::worker::job::{JobResult, PipelineJob};

use super::backends::Backends;
use super::context::{Extracted, Narration, PipelineContext, Summary};
use super::error::{PipelineError, PipelineWarning};

/// How a run ended before the job result is assembled.
enum RunEnd {
    Completed,
    Failed(String),
    Aborted(String),
}

pub struct Pipeline {
    store: Arc<dyn ContentStore>,
    backends: Backends,
    uploads: UploadStore,
    artifacts: ArtifactStore,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ContentStore>,
        backends: Backends,
        uploads: UploadStore,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            store,
            backends,
            uploads,
            artifacts,
        }
    }

    /// Production constructor: backends and storage areas come from config.
    pub fn from_config(config: &Config, store: Arc<dyn ContentStore>) -> Result<Self, ConfigError> {
        Ok(Self::new(
            store,
            Backends::from_config(config)?,
            UploadStore::new(config.uploads_dir()),
            ArtifactStore::new(config.audio_dir()),
        ))
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Runs every stage for one item and writes its terminal state.
    ///
    /// Never panics and never returns an error: failures end up in the
    /// record's status and `errorMessage`, or in the result's warnings.
    pub async fn run(&self, job: PipelineJob) -> JobResult {
        let span = info_span!(
            "pipeline",
            content_id = %job.content_id,
            content_type = field::Empty,
        );
        self.run_inner(PipelineContext::new(job))
            .instrument(span)
            .await
    }

    async fn run_inner(&self, mut ctx: PipelineContext) -> JobResult {
        let end = self.execute(&mut ctx).await;

        // The upload goes away however the run ended.
        self.step_cleanup_upload(&mut ctx).await;

        let warnings = std::mem::take(&mut ctx.warnings);
        match end {
            RunEnd::Completed => {
                info!(warnings = warnings.len(), "content processing completed");
                JobResult::completed(&ctx.job, warnings)
            }
            RunEnd::Failed(message) => {
                info!(error = %message, "content processing failed");
                JobResult::failed(&ctx.job, message, warnings)
            }
            RunEnd::Aborted(reason) => JobResult::aborted(&ctx.job, reason, warnings),
        }
    }

    async fn execute(&self, ctx: &mut PipelineContext) -> RunEnd {
        if let Err(e) = self.step_load(ctx).await {
            error!(error = %e, "cannot start pipeline run");
            return RunEnd::Aborted(e.to_string());
        }

        if let Err(e) = self.step_mark_processing(ctx).await {
            error!(error = %e, "failed to mark item as processing");
            return RunEnd::Aborted(e.to_string());
        }

        let outcome = match self.run_stages(ctx).await {
            Ok(()) => ctx.completed_outcome(),
            Err(e) => {
                warn!(error = %e, "fatal stage failure");
                // A failed item carries no derived artifacts.
                self.discard_narration(ctx).await;
                PipelineOutcome::failed(e.to_string())
            }
        };

        let persisted = self
            .step_persist(ctx, &outcome)
            .instrument(info_span!("persist"))
            .await;

        match (persisted, outcome) {
            (Ok(()), PipelineOutcome::Completed(_)) => RunEnd::Completed,
            (Ok(()), PipelineOutcome::Failed { message }) => RunEnd::Failed(message),
            (Err(e), PipelineOutcome::Completed(_)) => {
                error!(error = %e, "failed to persist results");
                let fallback = PipelineOutcome::failed(format!("Failed to save results: {}", e));
                match self.store.finish(&ctx.job.content_id, &fallback).await {
                    Ok(()) => RunEnd::Failed(e.to_string()),
                    Err(second) => {
                        error!(error = %second, "failed to record failure");
                        RunEnd::Aborted(e.to_string())
                    }
                }
            }
            (Err(e), PipelineOutcome::Failed { .. }) => {
                error!(error = %e, "failed to record failure");
                RunEnd::Aborted(e.to_string())
            }
        }
    }

    async fn run_stages(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        // Stage 1: extraction (mandatory)
        self.step_extract(ctx)
            .instrument(info_span!("extract"))
            .await?;

        let options = match ctx.item.as_ref() {
            Some(item) => item.processing_options.clone(),
            None => return Err(PipelineError::MissingRecord(ctx.job.content_id.clone())),
        };

        // Stage 2: summary (fatal on failure)
        if options.generate_summary {
            self.step_summarize(ctx)
                .instrument(info_span!("summarize"))
                .await?;
        }

        // Stage 3: narration (non-fatal)
        if options.generate_audio {
            self.step_synthesize_audio(ctx, options.voice())
                .instrument(info_span!("synthesize_audio", voice = options.voice()))
                .await;
        }

        // Stage 4: quiz (malformed output degrades, backend errors are fatal)
        if options.generate_quiz {
            self.step_generate_quiz(ctx)
                .instrument(info_span!("generate_quiz"))
                .await?;
        }

        Ok(())
    }

    async fn step_load(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let item = self
            .store
            .get(&ctx.job.content_id)
            .await?
            .ok_or_else(|| PipelineError::MissingRecord(ctx.job.content_id.clone()))?;

        Span::current().record("content_type", item.content_type.as_str());
        ctx.item = Some(item);
        Ok(())
    }

    async fn step_mark_processing(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let id = &ctx.job.content_id;
        match self.store.mark_processing(id).await {
            Ok(()) => Ok(()),
            Err(e @ (StoreError::Database(_) | StoreError::Task(_))) => {
                // Leave nothing stuck in pending when the store itself hiccups.
                if let Err(second) = self.store.fail_pending(id, &e.to_string()).await {
                    warn!(error = %second, "could not mark item as failed");
                }
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn step_extract(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let item = ctx
            .item
            .as_ref()
            .ok_or_else(|| PipelineError::MissingRecord(ctx.job.content_id.clone()))?;
        let file_name = item.source.file_name().unwrap_or_default().to_string();

        let raw = match item.content_type {
            ContentType::Document => {
                let path = upload_path(&ctx.job)?;
                debug!(file = %sanitize::redact_path(&path), "extracting document text");
                let registry = Arc::clone(&self.backends.documents);
                let extracted = tokio::task::spawn_blocking(move || {
                    registry.extract_document_text(&path, &file_name)
                })
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?;
                extracted?
            }
            ContentType::Image => {
                let path = upload_path(&ctx.job)?;
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    ExtractionError::ImageProcessing(format!(
                        "cannot read uploaded image '{}': {}",
                        file_name, e
                    ))
                })?;
                debug!(bytes = bytes.len(), "extracting image text");
                self.backends
                    .image
                    .extract_image_text(&bytes, &file_name)
                    .await?
            }
            ContentType::Video => {
                let raw_url = item.source.url().unwrap_or_default();
                let url = reqwest::Url::parse(raw_url).map_err(|e| {
                    ExtractionError::Backend(format!("invalid video URL: {}", e))
                })?;
                debug!(url = %sanitize::redact_url(raw_url), "extracting video transcript");
                self.backends.video.extract_video_text(&url).await?
            }
        };

        let text = raw.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyExtraction.into());
        }

        debug!(chars = text.chars().count(), "extraction finished");
        ctx.extracted = Some(Extracted(text.to_string()));
        Ok(())
    }

    async fn step_summarize(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let text = extracted_text(ctx)?;
        let summary = self
            .backends
            .summarizer
            .summarize(&text)
            .await
            .map_err(PipelineError::Summarization)?;

        debug!(chars = summary.chars().count(), "summary generated");
        ctx.summary = Some(Summary(summary));
        Ok(())
    }

    async fn step_synthesize_audio(&self, ctx: &mut PipelineContext, voice_id: &str) {
        let Ok(text) = extracted_text(ctx) else {
            return;
        };

        let audio = match self.backends.speech.synthesize_speech(&text, voice_id).await {
            Ok(audio) if audio.is_empty() => {
                warn!("speech backend returned no audio");
                ctx.warnings.push(PipelineWarning::AudioFailed {
                    error: "speech backend returned no audio".to_string(),
                });
                return;
            }
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, "audio synthesis failed");
                ctx.warnings.push(PipelineWarning::AudioFailed {
                    error: e.to_string(),
                });
                return;
            }
        };

        match self
            .artifacts
            .write_audio(&ctx.job.content_id, &audio)
            .await
        {
            Ok(locator) => {
                debug!(locator = %locator, bytes = audio.len(), "audio stored");
                ctx.narration = Some(Narration { locator });
            }
            Err(e) => {
                warn!(error = %e, "failed to store audio");
                ctx.warnings.push(PipelineWarning::AudioFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    async fn step_generate_quiz(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let text = extracted_text(ctx)?;
        let draft = self
            .backends
            .quiz
            .generate_quiz(&text)
            .await
            .map_err(PipelineError::QuizGeneration)?;

        if let Some(reason) = &draft.malformed {
            warn!(reason = %reason, "quiz output was malformed; storing no quiz");
            ctx.warnings.push(PipelineWarning::QuizMalformed {
                reason: reason.clone(),
            });
        }
        if draft.dropped > 0 {
            warn!(dropped = draft.dropped, "dropped invalid quiz questions");
            ctx.warnings.push(PipelineWarning::QuizItemDropped {
                count: draft.dropped,
            });
        }
        debug!(questions = draft.items.len(), "quiz generated");
        ctx.quiz = Some(draft);
        Ok(())
    }

    async fn step_persist(
        &self,
        ctx: &mut PipelineContext,
        outcome: &PipelineOutcome,
    ) -> Result<(), PipelineError> {
        match self.store.finish(&ctx.job.content_id, outcome).await {
            Ok(()) => {
                debug!(status = %outcome.status(), "terminal state stored");
                Ok(())
            }
            Err(e) => {
                // A record that does not point at the audio must not keep it.
                self.discard_narration(ctx).await;
                Err(e.into())
            }
        }
    }

    async fn discard_narration(&self, ctx: &mut PipelineContext) {
        if let Some(narration) = ctx.narration.take() {
            if let Err(e) = self.artifacts.remove(&narration.locator).await {
                warn!(error = %e, "failed to remove orphaned audio");
            }
        }
    }

    async fn step_cleanup_upload(&self, ctx: &mut PipelineContext) {
        let Some(path) = ctx.job.upload_path.as_ref() else {
            return;
        };

        if let Err(e) = self.uploads.remove(path).await {
            warn!(error = %e, "failed to remove upload");
            ctx.warnings.push(PipelineWarning::UploadCleanupFailed {
                error: e.to_string(),
            });
        }
    }
}

fn upload_path(job: &PipelineJob) -> Result<PathBuf, ExtractionError> {
    job.upload_path
        .clone()
        .ok_or_else(|| ExtractionError::Backend("no uploaded file for this item".to_string()))
}

fn extracted_text(ctx: &PipelineContext) -> Result<String, PipelineError> {
    ctx.extracted
        .as_ref()
        .map(|e| e.0.clone())
        .ok_or(PipelineError::Extraction(ExtractionError::EmptyExtraction))
}
