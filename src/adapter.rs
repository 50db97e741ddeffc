use std::future::Future;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::history::Turn;
use crate::prompt::{CallPart, Prompt, normalize};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("prompt blocked: {0}")]
    Blocked(String),
    #[error("response contained no text")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The remote model, reduced to the two calls the adapter makes.
pub trait ModelProvider {
    fn model_name(&self) -> &str;

    fn issue_single_call(
        &self,
        parts: &[CallPart],
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    fn issue_history_call(
        &self,
        transcript: &[Turn],
        parts: &[CallPart],
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Debug)]
pub struct PromptAdapter<P> {
    provider: P,
}

impl<P: ModelProvider> PromptAdapter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Normalizes `prompt` and sends it, threading `history` when it holds any turns.
    pub async fn try_generate(
        &self,
        prompt: &Prompt,
        history: Option<&[Turn]>,
    ) -> Result<String, ProviderError> {
        let parts = normalize(prompt);
        match history {
            Some(transcript) if !transcript.is_empty() => {
                debug!("history call: {} prior turns, {} parts", transcript.len(), parts.len());
                self.provider.issue_history_call(transcript, &parts).await
            }
            _ => {
                debug!("single call: {} parts", parts.len());
                self.provider.issue_single_call(&parts).await
            }
        }
    }

    /// Like [`try_generate`](Self::try_generate), but failures come back as
    /// `"Error: <details>"` so the result can be shown as-is.
    pub async fn generate(&self, prompt: &Prompt, history: Option<&[Turn]>) -> String {
        let span = info_span!(
            "generate",
            request_id = %Uuid::new_v4(),
            model = %self.model_name()
        );
        async {
            match self.try_generate(prompt, history).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("generation failed: {}", e);
                    format!("Error: {}", e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
