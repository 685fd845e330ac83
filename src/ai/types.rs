use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTask {
    Classify,
    Extract,
    Rewrite,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionTask {
    Caption,
    Objects,
    Hotspots,
}

impl TextTask {
    /// Upper bound on completion tokens requested from the vendor.
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Classify => 500,
            Self::Extract => 2000,
            Self::Rewrite => 1500,
            Self::Review => 1500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::Extract => "extract",
            Self::Rewrite => "rewrite",
            Self::Review => "review",
        }
    }
}

impl VisionTask {
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Caption => 200,
            Self::Objects => 300,
            Self::Hotspots => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caption => "caption",
            Self::Objects => "objects",
            Self::Hotspots => "hotspots",
        }
    }
}

impl fmt::Display for TextTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VisionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextProcessingRequest {
    pub text: String,
    pub task: TextTask,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl TextProcessingRequest {
    pub fn new(task: TextTask, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            task,
            context: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProcessingResponse {
    pub result: Value,
    pub confidence: f64,
    pub processing_time: f64,
    pub provider: String,
    pub model_used: String,
}

impl TextProcessingResponse {
    /// Error message carried in `result`, if the call degraded.
    pub fn error(&self) -> Option<&str> {
        self.result.get("error").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionProcessingRequest {
    /// Base64-encoded image bytes.
    pub image_data: String,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    pub task: VisionTask,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl VisionProcessingRequest {
    pub fn new(task: VisionTask, image_data: impl Into<String>) -> Self {
        Self {
            image_data: image_data.into(),
            media_type: default_media_type(),
            task,
            context: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionProcessingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotspots: Option<Vec<Value>>,
    pub confidence: f64,
    pub processing_time: f64,
    pub provider: String,
    pub model_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Interactive region suggested on an illustration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub description: String,
}

impl Hotspot {
    /// Reads the hotspots of a response that match the expected shape, skipping the rest.
    pub fn from_values(values: &[Value]) -> Vec<Hotspot> {
        values
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .collect()
    }
}

fn default_media_type() -> String {
    "image/jpeg".to_string()
}
