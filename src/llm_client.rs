use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::adapter::{ModelProvider, ProviderError};
use crate::converters::gemini::{
    GeminiErrorResponse, GeminiFinishReason, GeminiRequest, GeminiResponse,
};
use crate::history::Turn;
use crate::prompt::CallPart;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: Arc<reqwest::Client>,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http_client: Arc<reqwest::Client>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Same credentials and connection pool, different model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self { model: model.into(), ..self.clone() }
    }

    fn build_target_url(&self) -> String {
        let path = format!("models/{}:generateContent", self.model);
        if self.api_base.ends_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        }
    }

    async fn send(&self, request: &GeminiRequest) -> Result<String, ProviderError> {
        let target_url = self.build_target_url();
        info!("Forwarding request to: {}", target_url);
        trace!(
            "request body: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let response = self
            .http_client
            .post(&target_url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("upstream status {}, {} bytes", status, body.len());

        if !status.is_success() {
            let message = match serde_json::from_str::<GeminiErrorResponse>(&body) {
                Ok(err) => err.error.message,
                Err(_) => body,
            };
            return Err(ProviderError::Status { status: status.as_u16(), message });
        }

        let response: GeminiResponse = serde_json::from_str(&body)?;
        reply_text(response)
    }
}

fn reply_text(response: GeminiResponse) -> Result<String, ProviderError> {
    if let Some(text) = response.text() {
        return Ok(text);
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Blocked(reason.to_string()));
    }

    match response.candidates.first().and_then(|c| c.finish_reason.as_ref()) {
        Some(GeminiFinishReason::Stop) | None => Err(ProviderError::EmptyResponse),
        Some(reason) => {
            let reason = serde_json::to_value(reason)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("{:?}", reason));
            Err(ProviderError::Blocked(format!("finish reason {}", reason)))
        }
    }
}

impl ModelProvider for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn issue_single_call(&self, parts: &[CallPart]) -> Result<String, ProviderError> {
        self.send(&GeminiRequest::single(parts)).await
    }

    async fn issue_history_call(
        &self,
        transcript: &[Turn],
        parts: &[CallPart],
    ) -> Result<String, ProviderError> {
        self.send(&GeminiRequest::with_history(transcript, parts)).await
    }
}
