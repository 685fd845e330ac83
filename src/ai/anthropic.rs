// Anthropic Messages API backend.

use super::completion::{CompletionBackend, CompletionMessage, CompletionRequest, ContentBlock};
use crate::{Error, Result, config::VendorConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: Vec<WireContent<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContent<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(config: &VendorConfig) -> Self {
        let base_url = if config.base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            config.base_url.trim_end_matches('/').to_string()
        };

        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url,
        }
    }
}

fn to_wire(message: &CompletionMessage) -> WireMessage<'_> {
    WireMessage {
        role: &message.role,
        content: message
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => WireContent::Text { text },
                ContentBlock::Image { media_type, data } => WireContent::Image {
                    source: ImageSource {
                        source_type: "base64",
                        media_type,
                        data,
                    },
                },
            })
            .collect(),
    }
}

#[async_trait]
impl CompletionBackend for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        debug!(
            "Sending {} messages to Anthropic model {}",
            request.messages.len(),
            request.model
        );

        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: request.messages.iter().map(to_wire).collect(),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => Error::Authentication(body),
                429 => Error::RateLimit,
                code => Error::HttpStatus { status: code, body },
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("Failed to parse Anthropic response: {e}")))?;

        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| Error::provider("Anthropic response contained no text content"))
    }
}
