use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use serde_json::Value;
use tracing::{debug, warn};

/// Text substituted for an image part that cannot be decoded.
pub const IMAGE_ERROR_PLACEHOLDER: &str = "Error: Unable to process image";

/// User input as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Text(String),
    Parts(Vec<PromptPart>),
    /// Anything else; sent as its textual representation.
    Other(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    /// Base64 payload together with its MIME type.
    Image { data: String, mime_type: String },
    Other(Value),
}

impl PromptPart {
    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        PromptPart::Image {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<Vec<PromptPart>> for Prompt {
    fn from(parts: Vec<PromptPart>) -> Self {
        Prompt::Parts(parts)
    }
}

impl From<Value> for Prompt {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Prompt::Text(s),
            Value::Array(items) => Prompt::Parts(items.into_iter().map(PromptPart::from).collect()),
            other => Prompt::Other(other),
        }
    }
}

impl From<Value> for PromptPart {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => PromptPart::Text(s),
            Value::Object(map) => {
                if let (Some(Value::String(data)), Some(Value::String(mime_type))) =
                    (map.get("data"), map.get("mime_type"))
                {
                    return PromptPart::image(data.clone(), mime_type.clone());
                }
                PromptPart::Other(Value::Object(map))
            }
            other => PromptPart::Other(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageDecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),
}

/// An image whose bytes were verified to decode.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    mime_type: String,
    width: u32,
    height: u32,
}

impl DecodedImage {
    pub fn decode(data: &str, mime_type: &str) -> Result<Self, ImageDecodeError> {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        let image = image::load_from_memory(&bytes)?;
        let (width, height) = (image.width(), image.height());
        // The mime type the caller guessed (usually from a file extension) loses to the actual format
        let mime_type = sniff_mime_type(&bytes).unwrap_or(mime_type).to_string();
        Ok(Self { bytes, mime_type, width, height })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// MIME type of the image format the bytes start with, if recognized.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().and_then(format_mime_type)
}

fn format_mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}

/// A prompt unit ready to be sent to the provider.
#[derive(Debug, Clone)]
pub enum CallPart {
    Text(String),
    Image(DecodedImage),
}

#[cfg(test)]
impl CallPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CallPart::Text(text) => Some(text),
            CallPart::Image(_) => None,
        }
    }
}

/// Flattens a prompt into provider call parts, preserving order.
///
/// An image that fails to decode becomes [`IMAGE_ERROR_PLACEHOLDER`] in place;
/// later parts are still processed.
pub fn normalize(prompt: &Prompt) -> Vec<CallPart> {
    match prompt {
        Prompt::Text(text) => vec![CallPart::Text(text.clone())],
        Prompt::Parts(parts) => parts
            .iter()
            .enumerate()
            .map(|(index, part)| normalize_part(index, part))
            .collect(),
        Prompt::Other(value) => vec![CallPart::Text(value_text(value))],
    }
}

fn normalize_part(index: usize, part: &PromptPart) -> CallPart {
    match part {
        PromptPart::Text(text) => CallPart::Text(text.clone()),
        PromptPart::Image { data, mime_type } => match DecodedImage::decode(data, mime_type) {
            Ok(image) => {
                debug!(
                    "part {}: decoded {} image {}x{}",
                    index,
                    image.mime_type(),
                    image.width(),
                    image.height()
                );
                CallPart::Image(image)
            }
            Err(e) => {
                warn!("part {}: {}", index, e);
                CallPart::Text(IMAGE_ERROR_PLACEHOLDER.to_string())
            }
        },
        PromptPart::Other(value) => CallPart::Text(value_text(value)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
