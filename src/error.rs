use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Fixed message returned when the recognizer heard no intelligible speech.
pub const NO_SPEECH_MESSAGE: &str = "音声を理解できませんでした";

/// In-band text returned for upstream failures under the placeholder policy.
pub const REQUEST_ERROR_TEXT: &str = "RequestError";

/// How recognition failures are surfaced to the caller.
///
/// `Placeholder` keeps the legacy behavior: failures are delivered as plain
/// text inside a 200 response. `Structured` maps each failure category to a
/// status code with a `detail` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    Placeholder,
    #[default]
    Structured,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No audio file provided")]
    MissingFile,

    #[error("Invalid audio file: {0}")]
    InvalidAudio(String),

    #[error("{}", NO_SPEECH_MESSAGE)]
    NoSpeech,

    #[error("Speech recognition service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidAudio(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NoSpeech => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ApiError::Internal(msg) => {
                error!("unhandled error in transcription pipeline: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_policy_defaults_to_structured() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Structured);
    }

    #[test]
    fn error_policy_deserializes_lowercase() {
        let policy: ErrorPolicy = serde_yaml::from_str("placeholder").unwrap();
        assert_eq!(policy, ErrorPolicy::Placeholder);
        let policy: ErrorPolicy = serde_yaml::from_str("structured").unwrap();
        assert_eq!(policy, ErrorPolicy::Structured);
    }

    #[test]
    fn internal_error_hides_detail() {
        let response = ApiError::Internal("decoder went sideways".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
