use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::converters::gemini::GeminiInlineData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    // Function calls, code execution and the like; never produced by this client
    Other(Value),
}

impl GeminiPart {
    pub fn text(text: impl Into<String>) -> Self {
        GeminiPart::Text { text: text.into(), thought: None }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        GeminiPart::InlineData {
            inline_data: GeminiInlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// Text of a visible (non-thought) text part.
    pub fn visible_text(&self) -> Option<&str> {
        match self {
            GeminiPart::Text { text, thought } if *thought != Some(true) => Some(text),
            _ => None,
        }
    }
}
