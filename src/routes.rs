use axum::{
    extract::{Multipart, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::audio;
use crate::error::{ApiError, ErrorPolicy, NO_SPEECH_MESSAGE, REQUEST_ERROR_TEXT};
use crate::recognizer::RecognitionOutcome;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    // axum answers HEAD for GET routes, covering both probe methods
    Router::new().route("/", get(identity).post(transcribe_audio))
}

/// Liveness/identity probe. Fixed body, no side effects.
async fn identity() -> Json<Value> {
    Json(json!({ "message": "This is STT API" }))
}

/// One upload in, one transcript (or one mapped failure) out.
async fn transcribe_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() == Some("file") {
            upload = field.bytes().await.ok();
            break;
        }
    }
    let data = upload.ok_or(ApiError::MissingFile)?;

    info!(bytes = data.len(), "received audio upload");

    let policy = state.config.error_policy;

    // Decode/transcode is CPU-bound; keep it off the async workers.
    let wav_data = tokio::task::spawn_blocking(move || audio::transcode_to_wav(&data))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| match policy {
            ErrorPolicy::Structured => ApiError::InvalidAudio(e.to_string()),
            ErrorPolicy::Placeholder => ApiError::Internal(e.to_string()),
        })?;

    let outcome = state
        .recognizer
        .recognize(wav_data, &state.config.recognition.language)
        .await;

    match (outcome, policy) {
        (RecognitionOutcome::Transcript(text), _) => Ok(Json(json!({ "text": text }))),
        (RecognitionOutcome::NoSpeechDetected, ErrorPolicy::Placeholder) => {
            Ok(Json(json!({ "text": NO_SPEECH_MESSAGE })))
        }
        (RecognitionOutcome::NoSpeechDetected, ErrorPolicy::Structured) => {
            Err(ApiError::NoSpeech)
        }
        (RecognitionOutcome::ServiceUnavailable(detail), ErrorPolicy::Placeholder) => {
            warn!(%detail, "recognition service failure reported in-band");
            Ok(Json(json!({ "text": REQUEST_ERROR_TEXT })))
        }
        (RecognitionOutcome::ServiceUnavailable(detail), ErrorPolicy::Structured) => {
            Err(ApiError::ServiceUnavailable(detail))
        }
    }
}
