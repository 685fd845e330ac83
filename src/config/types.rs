use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Provider used for text tasks unless the stored settings name another.
    #[serde(default = "default_provider")]
    pub text_provider: String,
    #[serde(default = "default_provider")]
    pub vision_provider: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub confidence: ConfidenceDefaults,
    #[serde(default)]
    pub anthropic: Option<VendorConfig>,
    #[serde(default)]
    pub openai: Option<VendorConfig>,
}

/// Credentials and models for one remote vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
}

/// Confidence reported when the model output carries no score of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDefaults {
    #[serde(default = "default_extract_confidence")]
    pub extract: f64,
    #[serde(default = "default_review_confidence")]
    pub review: f64,
    #[serde(default = "default_caption_confidence")]
    pub caption: f64,
    #[serde(default = "default_objects_confidence")]
    pub objects: f64,
    #[serde(default = "default_hotspots_confidence")]
    pub hotspots: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            text_provider: default_provider(),
            vision_provider: default_provider(),
            request_timeout_secs: default_request_timeout_secs(),
            confidence: ConfidenceDefaults::default(),
            anthropic: None,
            openai: None,
        }
    }
}

impl Default for ConfidenceDefaults {
    fn default() -> Self {
        Self {
            extract: default_extract_confidence(),
            review: default_review_confidence(),
            caption: default_caption_confidence(),
            objects: default_objects_confidence(),
            hotspots: default_hotspots_confidence(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            database_path: default_database_path(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_extract_confidence() -> f64 {
    0.85
}

fn default_review_confidence() -> f64 {
    1.0
}

fn default_caption_confidence() -> f64 {
    0.85
}

fn default_objects_confidence() -> f64 {
    0.80
}

fn default_hotspots_confidence() -> f64 {
    0.75
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_path() -> String {
    "aquila.db".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}
