use async_trait::async_trait;

/// Result of one recognition call over one discrete utterance.
///
/// Failures the caller is expected to translate are part of the outcome
/// rather than an error channel, so no category can be silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// The recognizer produced a transcript.
    Transcript(String),
    /// The call succeeded but no intelligible speech was found.
    NoSpeechDetected,
    /// The upstream service could not be reached or refused the call.
    ServiceUnavailable(String),
}

/// Speech-to-text seam. One shared instance serves all requests; each call
/// carries its own waveform buffer, so implementations hold configuration
/// only and no per-call state.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize the whole WAV buffer as a single utterance in `language`.
    async fn recognize(&self, wav_data: Vec<u8>, language: &str) -> RecognitionOutcome;
}
