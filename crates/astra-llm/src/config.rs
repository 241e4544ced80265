// Provider configuration for the generation client

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use anyhow::Result;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Configuration for the Gemini provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Base URL for the Gemini API (defaults to the public v1beta endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: default_model(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }
}

/// Factory for creating generation clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(
        config: &GeminiConfig,
    ) -> Result<Arc<dyn crate::traits::GenerationClient>> {
        let client = crate::gemini::GeminiClient::from_config(config)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::new("test-key");
        assert_eq!(config.base_url(), DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_model_defaults_when_missing() {
        let config: GeminiConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_factory_rejects_missing_key() {
        assert!(ClientFactory::create_client(&GeminiConfig::new("")).is_err());
        assert!(ClientFactory::create_client(&GeminiConfig::new("key")).is_ok());
    }
}
