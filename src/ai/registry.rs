use super::adapter::ModelAdapter;
use super::anthropic::AnthropicClient;
use super::completion::CompletionBackend;
use super::local::{self, LocalProvider};
use super::openai::OpenAiClient;
use super::provider::{TextProvider, VisionProvider};
use crate::{Error, Result, config::{AiConfig, VendorConfig}};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Named providers available to request handlers, plus the configured defaults.
///
/// Built once at startup and shared read-only; which provider serves a
/// request is decided by the caller passing a name, never by global state.
pub struct ProviderRegistry {
    text: HashMap<String, Arc<dyn TextProvider>>,
    vision: HashMap<String, Arc<dyn VisionProvider>>,
    default_text: String,
    default_vision: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderListing {
    pub text: Vec<String>,
    pub vision: Vec<String>,
    pub default_text: String,
    pub default_vision: String,
}

impl ProviderRegistry {
    pub fn new(default_text: impl Into<String>, default_vision: impl Into<String>) -> Self {
        Self {
            text: HashMap::new(),
            vision: HashMap::new(),
            default_text: default_text.into(),
            default_vision: default_vision.into(),
        }
    }

    /// Registers the local provider and every vendor that has credentials.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let mut registry = Self::new(&config.text_provider, &config.vision_provider);

        let local = Arc::new(LocalProvider::new());
        registry.register_text(local::NAME, local.clone());
        registry.register_vision(local::NAME, local);

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let vendors = [
            ("anthropic", config.anthropic.as_ref()),
            ("openai", config.openai.as_ref()),
        ];

        for (name, vendor) in vendors {
            let Some(vendor) = vendor else { continue };
            if vendor.api_key.is_empty() {
                warn!("{} is configured without an API key, skipping", name);
                continue;
            }

            let adapter = Arc::new(
                ModelAdapter::new(
                    name,
                    backend_for(name, vendor),
                    &vendor.text_model,
                    &vendor.vision_model,
                )
                .with_timeout(timeout)
                .with_confidence(config.confidence),
            );
            registry.register_text(name, adapter.clone());
            registry.register_vision(name, adapter);
            info!("Registered AI provider: {}", name);
        }

        registry.text(&registry.default_text)?;
        registry.vision(&registry.default_vision)?;

        Ok(registry)
    }

    pub fn register_text(&mut self, name: impl Into<String>, provider: Arc<dyn TextProvider>) {
        self.text.insert(name.into(), provider);
    }

    pub fn register_vision(&mut self, name: impl Into<String>, provider: Arc<dyn VisionProvider>) {
        self.vision.insert(name.into(), provider);
    }

    pub fn text(&self, name: &str) -> Result<Arc<dyn TextProvider>> {
        self.text
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProvider { name: name.to_string() })
    }

    pub fn vision(&self, name: &str) -> Result<Arc<dyn VisionProvider>> {
        self.vision
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProvider { name: name.to_string() })
    }

    /// Resolves `name`, or the configured default when no name is given.
    pub fn text_or_default(&self, name: Option<&str>) -> Result<Arc<dyn TextProvider>> {
        self.text(name.unwrap_or(&self.default_text))
    }

    pub fn vision_or_default(&self, name: Option<&str>) -> Result<Arc<dyn VisionProvider>> {
        self.vision(name.unwrap_or(&self.default_vision))
    }

    pub fn listing(&self) -> ProviderListing {
        let mut text: Vec<String> = self.text.keys().cloned().collect();
        let mut vision: Vec<String> = self.vision.keys().cloned().collect();
        text.sort();
        vision.sort();

        ProviderListing {
            text,
            vision,
            default_text: self.default_text.clone(),
            default_vision: self.default_vision.clone(),
        }
    }
}

fn backend_for(name: &str, vendor: &VendorConfig) -> Arc<dyn CompletionBackend> {
    match name {
        "anthropic" => Arc::new(AnthropicClient::new(vendor)),
        _ => Arc::new(OpenAiClient::new(vendor)),
    }
}
