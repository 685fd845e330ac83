use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling temperature used for every capability call.
pub const TEMPERATURE: f32 = 0.1;

/// A single remote model call.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends the request and returns the text of the first content block.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<CompletionMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { media_type: String, data: String },
}

impl CompletionMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// User message with an instruction followed by a base64 image.
    pub fn user_image(
        text: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![
                ContentBlock::Text { text: text.into() },
                ContentBlock::Image {
                    media_type: media_type.into(),
                    data: data.into(),
                },
            ],
        }
    }

    /// Concatenated text blocks, ignoring images.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl CompletionRequest {
    /// Text of every message in order; what the model is asked.
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .map(CompletionMessage::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
