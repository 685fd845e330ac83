use super::completion::{CompletionBackend, CompletionMessage, CompletionRequest, ContentBlock};
use crate::{Error, Result, config::VendorConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart, ImageUrl,
};
use async_trait::async_trait;
use tracing::debug;

pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiClient {
    pub fn new(config: &VendorConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url.clone());
        }

        Self {
            client: Client::with_config(openai_config),
        }
    }
}

/// System and assistant turns are sent as plain text; only user turns carry images.
pub fn to_openai_message(message: &CompletionMessage) -> Result<ChatCompletionRequestMessage> {
    match message.role.as_str() {
        "system" => {
            let msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(ChatCompletionRequestSystemMessageContent::Text(
                    message.text(),
                ))
                .build()
                .map_err(|e| Error::provider(format!("Failed to build system message: {}", e)))?;
            Ok(msg.into())
        }
        "user" => {
            let has_image = message
                .content
                .iter()
                .any(|block| matches!(block, ContentBlock::Image { .. }));

            let content = if has_image {
                let parts = message
                    .content
                    .iter()
                    .map(|block| match block {
                        ContentBlock::Text { text } => {
                            ChatCompletionRequestUserMessageContentPart::Text(
                                ChatCompletionRequestMessageContentPartText { text: text.clone() },
                            )
                        }
                        ContentBlock::Image { media_type, data } => {
                            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                                ChatCompletionRequestMessageContentPartImage {
                                    image_url: ImageUrl {
                                        url: format!("data:{media_type};base64,{data}"),
                                        detail: None,
                                    },
                                },
                            )
                        }
                    })
                    .collect();
                ChatCompletionRequestUserMessageContent::Array(parts)
            } else {
                ChatCompletionRequestUserMessageContent::Text(message.text())
            };

            let msg = ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| Error::provider(format!("Failed to build user message: {}", e)))?;
            Ok(msg.into())
        }
        "assistant" => {
            let msg = ChatCompletionRequestAssistantMessageArgs::default()
                .content(ChatCompletionRequestAssistantMessageContent::Text(
                    message.text(),
                ))
                .build()
                .map_err(|e| {
                    Error::provider(format!("Failed to build assistant message: {}", e))
                })?;
            Ok(msg.into())
        }
        _ => Err(Error::provider(format!(
            "Unknown message role: {}",
            message.role
        ))),
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        debug!(
            "Creating chat completion with {} messages for model {}",
            request.messages.len(),
            request.model
        );

        let messages = request
            .messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>>>()?;

        let openai_request = openai_types::CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()?;

        let response = self.client.chat().create(openai_request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::provider("OpenAI response contained no message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::completion::TEMPERATURE;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message(role: &str, text: &str) -> CompletionMessage {
        CompletionMessage {
            role: role.to_string(),
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
        }
    }

    #[test]
    fn test_system_message() {
        let msg = to_openai_message(&message("system", "You are a technical writer")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::System(_)));
    }

    #[test]
    fn test_text_user_message() {
        let msg = to_openai_message(&message("user", "Classify this")).unwrap();
        match msg {
            ChatCompletionRequestMessage::User(user) => assert!(matches!(
                user.content,
                ChatCompletionRequestUserMessageContent::Text(ref text) if text == "Classify this"
            )),
            other => panic!("expected user message, got {other:?}"),
        }
    }

    #[test]
    fn test_image_user_message_uses_data_url() {
        let msg = to_openai_message(&CompletionMessage::user_image(
            "Caption this",
            "image/png",
            "AAAA",
        ))
        .unwrap();

        let ChatCompletionRequestMessage::User(user) = msg else {
            panic!("expected user message");
        };
        let ChatCompletionRequestUserMessageContent::Array(parts) = user.content else {
            panic!("expected content parts");
        };
        assert_eq!(parts.len(), 2);
        match &parts[1] {
            ChatCompletionRequestUserMessageContentPart::ImageUrl(image) => {
                assert_eq!(image.image_url.url, "data:image/png;base64,AAAA");
            }
            other => panic!("expected image part, got {other:?}"),
        }
    }

    #[test]
    fn test_assistant_message() {
        let msg = to_openai_message(&message("assistant", "Done")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_invalid_role() {
        let result = to_openai_message(&message("tool", "x"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unknown message role")
        );
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "max_tokens": 300})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "[\"pump\"]"},
                    "finish_reason": "stop",
                    "logprobs": null
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&VendorConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            text_model: "gpt-4o-mini".to_string(),
            vision_model: "gpt-4o-mini".to_string(),
        });

        let text = client
            .complete(CompletionRequest {
                model: "gpt-4o-mini".to_string(),
                max_tokens: 300,
                temperature: TEMPERATURE,
                messages: vec![message("user", "List objects")],
            })
            .await
            .unwrap();

        assert_eq!(text, "[\"pump\"]");
    }
}
