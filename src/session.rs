use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::adapter::{ModelProvider, PromptAdapter};
use crate::history::{Fragment, Turn};
use crate::prompt::{Prompt, PromptPart, sniff_mime_type};

pub const EMPTY_INPUT_REPLY: &str = "Please enter a prompt or select an image.";

/// An image file staged for the next prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub path: PathBuf,
    pub mime_type: String,
    // base64
    pub data: String,
}

impl ImageAttachment {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
        // Bytes first, so the outbound part and the history fragment carry the same label
        let mime_type = sniff_mime_type(&bytes).unwrap_or_else(|| mime_type_for(path));
        Ok(Self {
            path: path.to_path_buf(),
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        })
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

/// One conversation: the history the adapter is fed and the image currently attached.
pub struct ChatSession<P> {
    adapter: PromptAdapter<P>,
    history: Vec<Turn>,
    image: Option<ImageAttachment>,
}

impl<P: ModelProvider> ChatSession<P> {
    pub fn new(adapter: PromptAdapter<P>) -> Self {
        Self {
            adapter,
            history: Vec::new(),
            image: None,
        }
    }

    pub fn adapter(&self) -> &PromptAdapter<P> {
        &self.adapter
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    /// Replaces the adapter, e.g. after a model switch. History is kept.
    pub fn switch_adapter(&mut self, adapter: PromptAdapter<P>) {
        info!("switching model {} -> {}", self.adapter.model_name(), adapter.model_name());
        self.adapter = adapter;
    }

    pub fn attach_image(&mut self, path: impl AsRef<Path>) -> anyhow::Result<&ImageAttachment> {
        let attachment = ImageAttachment::from_file(path)?;
        Ok(&*self.image.insert(attachment))
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Sends `text` plus the attached image, if any, and records the exchange.
    pub async fn send(&mut self, text: &str) -> String {
        if text.is_empty() && self.image.is_none() {
            return EMPTY_INPUT_REPLY.to_string();
        }

        let mut prompt_parts = Vec::new();
        let mut fragments = Vec::new();
        if !text.is_empty() {
            prompt_parts.push(PromptPart::Text(text.to_string()));
            fragments.push(Fragment::text(text));
        }
        if let Some(image) = &self.image {
            prompt_parts.push(PromptPart::image(image.data.clone(), image.mime_type.clone()));
            fragments.push(Fragment::inline_data(image.mime_type.clone(), image.data.clone()));
        }

        let reply = self
            .adapter
            .generate(&Prompt::Parts(prompt_parts), Some(self.history.as_slice()))
            .await;

        self.history.push(Turn::user(fragments));
        self.history.push(Turn::model(reply.clone()));
        reply
    }
}
