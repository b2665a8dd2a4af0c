use serde::{Deserialize, Serialize};
use std::fs;
use anyhow::Result;

use crate::error::ErrorPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// OpenAI-compatible `audio/transcriptions` endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Target language passed with every recognition call.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_endpoint() -> String {
    "http://localhost:9000/v1/audio/transcriptions".to_string()
}

fn default_model() -> String {
    "whisper-1".to_string()
}

fn default_language() -> String {
    "ja".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        }
    }
}

impl RecognitionConfig {
    /// The environment wins over the config file so keys stay out of it.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("STT_API_KEY").ok().or_else(|| self.api_key.clone())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            language: default_language(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.system.port, 8000);
        assert_eq!(config.recognition.language, "ja");
        assert_eq!(config.error_policy, ErrorPolicy::Structured);
    }

    #[test]
    fn partial_yaml_overrides_defaults() {
        let yaml = r#"
system:
  port: 9090
error_policy: placeholder
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.system.port, 9090);
        assert_eq!(config.system.host, "0.0.0.0");
        assert_eq!(config.error_policy, ErrorPolicy::Placeholder);
    }
}
