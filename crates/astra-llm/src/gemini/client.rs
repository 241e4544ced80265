// Gemini streaming client (HTTP direct, no SDK)

use crate::config::{GeminiConfig, DEFAULT_GEMINI_BASE_URL};
use crate::gemini::types::{GeminiContent, GeminiRequest, GenerationConfig};
use crate::streaming::{parse_gemini_sse_stream, EventStream};
use crate::traits::{GenerateRequest, GenerationClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create new client with API key. An empty key is an error.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            anyhow::bail!("Gemini API key is missing");
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key.trim()).context("Invalid API key format")?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        Ok(Self::new(config.api_key.clone())?.with_base_url(config.base_url()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }

    fn build_request(&self, request: &GenerateRequest) -> GeminiRequest {
        let generation_config = if request.options.is_empty() {
            None
        } else {
            Some(GenerationConfig {
                temperature: request.options.temperature,
                max_output_tokens: request.options.max_output_tokens,
            })
        };

        GeminiRequest {
            contents: vec![GeminiContent::user_text(request.prompt.clone())],
            generation_config,
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate_stream(&self, request: GenerateRequest) -> Result<EventStream> {
        let payload = self.build_request(&request);

        tracing::debug!(model = %request.model, prompt_len = request.prompt.len(), "Opening Gemini stream");

        let response = self
            .http_client
            .post(self.stream_url(&request.model))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        Ok(parse_gemini_sse_stream(response.bytes_stream()))
    }
}
