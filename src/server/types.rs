use crate::ai::{TextTask, VisionTask};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One inbound WebSocket frame.
#[derive(Debug, Deserialize)]
pub struct WsRequest {
    pub action: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// One outbound WebSocket frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WsReply {
    Data { action: String, data: Value },
    Error { error: String },
}

impl WsReply {
    pub fn data(action: impl Into<String>, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self::Data {
                action: action.into(),
                data,
            },
            Err(e) => Self::error(format!("Failed to encode reply: {e}")),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadPayload {
    #[serde(default)]
    pub filename: Option<String>,
    /// Base64-encoded file content.
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ModuleRef {
    pub dmc: String,
}

#[derive(Debug, Deserialize)]
pub struct TextTaskPayload {
    pub task: TextTask,
    pub text: String,
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Overrides the provider selected in the settings.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageTaskPayload {
    pub task: VisionTask,
    pub image_data: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub provider: Option<String>,
}
