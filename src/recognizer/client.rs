use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::interface::{RecognitionOutcome, Recognizer};

/// Client for an OpenAI-compatible `audio/transcriptions` endpoint.
#[derive(Debug, Clone)]
pub struct HttpRecognizer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl HttpRecognizer {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Recognizer for HttpRecognizer {
    async fn recognize(&self, wav_data: Vec<u8>, language: &str) -> RecognitionOutcome {
        let file_part = match multipart::Part::bytes(wav_data)
            .file_name("audio.wav")
            .mime_str("audio/wav")
        {
            Ok(part) => part,
            Err(e) => return RecognitionOutcome::ServiceUnavailable(e.to_string()),
        };

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", language.to_string())
            .text("response_format", "json")
            .part("file", file_part);

        debug!(endpoint = %self.endpoint, language, "sending recognition request");

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "recognition request failed");
                return RecognitionOutcome::ServiceUnavailable(e.to_string());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "recognition service returned an error");
            return RecognitionOutcome::ServiceUnavailable(format!(
                "upstream status {}: {}",
                status, body
            ));
        }

        let parsed: TranscriptionResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                return RecognitionOutcome::ServiceUnavailable(format!(
                    "malformed upstream response: {}",
                    e
                ))
            }
        };

        // The protocol has no dedicated no-speech signal; a successful call
        // with an empty transcript is how it presents.
        let text = parsed.text.trim();
        if text.is_empty() {
            RecognitionOutcome::NoSpeechDetected
        } else {
            RecognitionOutcome::Transcript(text.to_string())
        }
    }
}
