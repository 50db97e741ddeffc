use serde::{Deserialize, Serialize};

use crate::converters::gemini::{GeminiCandidate, GeminiPromptFeedback, GeminiUsage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(rename = "promptFeedback")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(rename = "responseId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl GeminiResponse {
    /// Concatenated visible text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.visible_text()).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::gemini::{GeminiBlockReason, GeminiFinishReason};
    use serde_json::json;

    #[test]
    fn test_text_skips_thoughts_and_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking hard", "thought": true },
                        { "text": "The image shows " },
                        { "text": "a red square.", "thoughtSignature": "abc" }
                    ]
                },
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17 },
            "modelVersion": "gemini-2.5-flash"
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("The image shows a red square."));
        assert_eq!(response.candidates[0].finish_reason, Some(GeminiFinishReason::Stop));
        assert_eq!(response.usage_metadata.unwrap().total_token_count, Some(17));
    }

    #[test]
    fn test_blocked_prompt_has_no_text() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        assert!(response.text().is_none());
        assert_eq!(
            response.prompt_feedback.unwrap().block_reason,
            Some(GeminiBlockReason::Safety)
        );
    }

    #[test]
    fn test_unknown_parts_and_finish_reasons_are_tolerated() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "functionCall": { "name": "lookup", "args": {} } },
                        { "text": "done" }
                    ]
                },
                "finishReason": "SOMETHING_NEW"
            }]
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("done"));
        assert_eq!(response.candidates[0].finish_reason, Some(GeminiFinishReason::Unknown));
    }
}
