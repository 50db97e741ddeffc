use serde::{Deserialize, Serialize};

use crate::converters::gemini::{GeminiContent, GeminiPart};
use crate::history::{Fragment, Role, Turn};
use crate::prompt::CallPart;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    /// One user content holding the normalized parts, no transcript.
    pub fn single(parts: &[CallPart]) -> Self {
        GeminiRequest { contents: vec![user_content(parts)] }
    }

    /// Every prior turn, in order, followed by the new user content.
    pub fn with_history(transcript: &[Turn], parts: &[CallPart]) -> Self {
        let mut contents: Vec<GeminiContent> = transcript.iter().map(GeminiContent::from).collect();
        contents.push(user_content(parts));
        GeminiRequest { contents }
    }
}

fn user_content(parts: &[CallPart]) -> GeminiContent {
    GeminiContent {
        role: Some(Role::User.as_str().to_string()),
        parts: parts.iter().map(GeminiPart::from).collect(),
    }
}

impl From<&CallPart> for GeminiPart {
    fn from(part: &CallPart) -> Self {
        match part {
            CallPart::Text(text) => GeminiPart::text(text.clone()),
            CallPart::Image(image) => GeminiPart::inline_data(image.mime_type(), image.to_base64()),
        }
    }
}

impl From<&Fragment> for GeminiPart {
    fn from(fragment: &Fragment) -> Self {
        match fragment {
            Fragment::Text { text } => GeminiPart::text(text.clone()),
            Fragment::InlineData { inline_data } => {
                GeminiPart::inline_data(inline_data.mime_type.clone(), inline_data.data.clone())
            }
        }
    }
}

impl From<&Turn> for GeminiContent {
    fn from(turn: &Turn) -> Self {
        GeminiContent {
            role: Some(turn.role.as_str().to_string()),
            parts: turn.parts.iter().map(GeminiPart::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Fragment;
    use serde_json::json;

    #[test]
    fn test_single_request_has_one_user_content() {
        let parts = vec![CallPart::Text("hello".to_string())];
        let body = serde_json::to_value(GeminiRequest::single(&parts)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [
                    { "role": "user", "parts": [ { "text": "hello" } ] }
                ]
            })
        );
    }

    #[test]
    fn test_history_request_keeps_transcript_order() {
        let transcript = vec![
            Turn::user(vec![
                Fragment::text("what is this?"),
                Fragment::inline_data("image/png", "iVBORw0KGgo="),
            ]),
            Turn::model("a cat"),
        ];
        let parts = vec![CallPart::Text("and its colour?".to_string())];
        let body = serde_json::to_value(GeminiRequest::with_history(&transcript, &parts)).unwrap();

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "what is this?");
        assert_eq!(contents[0]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(contents[0]["parts"][1]["inlineData"]["data"], "iVBORw0KGgo=");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "a cat");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "and its colour?");
    }
}
