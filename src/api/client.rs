use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::api::RequestBody;
use crate::error::{HyperlocalError, Result};

/// Handle on the chat-completions API. One instance is built at startup and
/// shared by the extractor and the agent loop.
#[derive(Debug, Clone)]
pub struct LlmClient {
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_key: &str, endpoint: &str, model: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                HyperlocalError::ConfigError(format!("Invalid authorization header: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(LlmClient {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one non-streaming chat completion request and return the parsed
    /// response body. Non-2xx statuses become `ApiError`.
    pub async fn chat(&self, request_body: &RequestBody) -> Result<Value> {
        let response = self.http.post(&self.endpoint).json(request_body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HyperlocalError::ApiError { status, message });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
