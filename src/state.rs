use std::sync::Arc;

use crate::config::Config;
use crate::recognizer::{HttpRecognizer, Recognizer};

/// Shared across all requests. The recognizer carries configuration only;
/// every call passes its own audio buffer, so no synchronization is needed.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub recognizer: Arc<dyn Recognizer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let recognizer = Arc::new(HttpRecognizer::new(
            config.recognition.endpoint.clone(),
            config.recognition.resolved_api_key(),
            config.recognition.model.clone(),
        ));

        Self { config, recognizer }
    }

    /// State with an injected recognizer, for tests.
    pub fn with_recognizer(config: Config, recognizer: Arc<dyn Recognizer>) -> Self {
        Self { config, recognizer }
    }
}
