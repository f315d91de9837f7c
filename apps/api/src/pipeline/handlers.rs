//! Axum route handlers for the generation pipeline.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::encoder::ImageAsset;
use crate::pipeline::orchestrator::RunSnapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub slot: &'static str,
    pub mime_type: String,
    pub size_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub data_uri: String,
}

/// POST /api/v1/images/scene
///
/// Multipart upload (`image` field) of the background/environment photo.
/// Replaces any previously held scene and clears a stale result.
pub async fn handle_upload_scene(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let asset = read_image_field(multipart).await?;
    let response = upload_response("scene", &asset);
    state.orchestrator.set_scene(asset)?;
    info!("Scene image stored ({} bytes)", response.size_bytes);
    Ok(Json(response))
}

/// POST /api/v1/images/person
///
/// Multipart upload (`image` field) of the person to insert into the scene.
pub async fn handle_upload_person(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let asset = read_image_field(multipart).await?;
    let response = upload_response("person", &asset);
    state.orchestrator.set_person(asset)?;
    info!("Person image stored ({} bytes)", response.size_bytes);
    Ok(Json(response))
}

/// POST /api/v1/generate
///
/// Full pipeline: describe scene → compose person into scene. Responds with
/// the composite as a self-contained data URI.
pub async fn handle_generate(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    let data_uri = state.orchestrator.run().await?;
    Ok(Json(GenerateResponse { data_uri }))
}

/// GET /api/v1/status
///
/// Snapshot of the run state machine for the presentation layer.
pub async fn handle_status(State(state): State<AppState>) -> Json<RunSnapshot> {
    Json(state.orchestrator.snapshot())
}

/// POST /api/v1/reset
///
/// Clears the result and both held images, returning to Idle.
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.orchestrator.reset()?;
    Ok(Json(json!({ "status": "reset" })))
}

fn upload_response(slot: &'static str, asset: &ImageAsset) -> UploadResponse {
    UploadResponse {
        slot,
        mime_type: asset.mime_type.clone(),
        size_bytes: asset.bytes.len(),
    }
}

/// Pulls the `image` field out of a multipart body.
///
/// Stream read failures and a missing declared content type are encoding
/// errors — local, never retried. A missing field is a validation error.
async fn read_image_field(mut multipart: Multipart) -> Result<ImageAsset, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Encoding(format!("failed to read upload: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let mime_type = field
            .content_type()
            .ok_or_else(|| {
                AppError::Encoding("image field must declare a content type".to_string())
            })?
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Encoding(format!("failed to read image bytes: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("image upload is empty".to_string()));
        }

        return Ok(ImageAsset::new(bytes, mime_type));
    }

    Err(AppError::Validation(
        "multipart field 'image' is required".to_string(),
    ))
}
