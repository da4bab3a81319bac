use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use studylens::submission::{parse_options_json, parse_options_value};
use studylens::{ContentItem, UploadedFile};

use super::error::ApiError;
use crate::state::AppState;

/// Fields of the document and image upload forms.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    title: Option<String>,
    processing_options: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                form.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "title" | "processingOptions" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                if name == "title" {
                    form.title = Some(text);
                } else {
                    form.processing_options = Some(text);
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

pub async fn submit_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ContentItem>, ApiError> {
    let form = read_upload_form(multipart).await?;
    let options = parse_options_json(form.processing_options.as_deref())?;
    let item = state
        .submissions
        .submit_document(form.title, options, form.file)
        .await?;
    Ok(Json(item))
}

pub async fn submit_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ContentItem>, ApiError> {
    let form = read_upload_form(multipart).await?;
    let options = parse_options_json(form.processing_options.as_deref())?;
    let item = state
        .submissions
        .submit_image(form.title, options, form.file)
        .await?;
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub processing_options: Option<Value>,
}

pub async fn submit_video(
    State(state): State<AppState>,
    body: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<ContentItem>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let options = parse_options_value(request.processing_options)?;
    let item = state
        .submissions
        .submit_video(request.title, options, request.url.as_deref())
        .await?;
    Ok(Json(item))
}

pub async fn list_content(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContentItem>, ApiError> {
    state
        .catalog
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))
}

pub async fn get_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let audio = state
        .catalog
        .audio(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Audio not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if state.catalog.delete(&id).await? {
        Ok(Json(json!({ "message": "Content deleted successfully" })))
    } else {
        Err(ApiError::NotFound("Content not found".to_string()))
    }
}
