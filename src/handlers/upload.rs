//! `POST /upload`: store a voice sample and a synthesized counterpart.
//!
//! Multipart fields:
//! - `audioFile` (file part with a filename, required)
//! - `text` (required)
//! - `name` (optional, voice name for cloning, default `cloned-voice`)
//! - `gender` (optional, default `male`)

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, multipart::Field},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::orchestrator::{AudioUpload, UploadRequest};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str = "Audio processed successfully.";

const AUDIO_FIELD: &str = "audioFile";
const TEXT_FIELD: &str = "text";
const NAME_FIELD: &str = "name";
const GENDER_FIELD: &str = "gender";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub original_audio_url: String,
    pub generated_audio_url: String,
}

pub async fn upload_audio(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let request = read_upload_form(multipart).await?;
    info!(
        file_name = %request.audio.file_name,
        size_bytes = request.audio.data.len(),
        text_chars = request.text.chars().count(),
        "Received upload"
    );

    let processed = state.orchestrator.process(request).await?;

    Ok(Json(UploadResponse {
        message: SUCCESS_MESSAGE.to_string(),
        original_audio_url: processed.original.public_url,
        generated_audio_url: processed.generated.public_url,
    }))
}

/// Collect the form fields and validate them into an [`UploadRequest`].
async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadRequest> {
    let mut audio = None;
    let mut text = None;
    let mut name = None;
    let mut gender = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            AUDIO_FIELD => audio = read_audio_field(field).await?,
            TEXT_FIELD => text = Some(field.text().await.map_err(invalid_form)?),
            NAME_FIELD => name = Some(field.text().await.map_err(invalid_form)?),
            GENDER_FIELD => gender = Some(field.text().await.map_err(invalid_form)?),
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    UploadRequest::from_parts(audio, text, name, gender)
}

/// Read the audio part. A part without a filename is not a file upload and
/// counts as no audio.
async fn read_audio_field(field: Field<'_>) -> AppResult<Option<AudioUpload>> {
    let Some(file_name) = field.file_name().map(str::to_string) else {
        debug!("Ignoring audioFile part without a filename");
        return Ok(None);
    };
    let content_type = field.content_type().map(str::to_string);
    let data = field.bytes().await.map_err(invalid_form)?;

    Ok(Some(AudioUpload {
        file_name,
        content_type,
        data,
    }))
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart request: {}", err.body_text()))
}
