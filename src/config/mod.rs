mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(&config_path).await?;
    let mut config = parse(&config_str)?;
    apply_env_overrides(&mut config);

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config_str)?;

    if config.ai.request_timeout_secs == 0 {
        return Err(Error::config("ai.request_timeout_secs must be greater than zero"));
    }

    Ok(config)
}

/// Fills secrets and paths that were left out of the file from the environment.
fn apply_env_overrides(config: &mut Config) {
    if let Some(vendor) = config.ai.anthropic.as_mut() {
        fill_api_key(vendor, "ANTHROPIC_API_KEY");
    }
    if let Some(vendor) = config.ai.openai.as_mut() {
        fill_api_key(vendor, "OPENAI_API_KEY");
    }
    if let Ok(path) = env::var("DATABASE_PATH") {
        config.server.database_path = path;
    }
}

fn fill_api_key(vendor: &mut VendorConfig, var: &str) {
    if vendor.api_key.is_empty() {
        if let Ok(key) = env::var(var) {
            vendor.api_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty_document_uses_defaults() {
        let config = parse("{}").unwrap();

        assert_eq!(config.ai.text_provider, "local");
        assert_eq!(config.ai.vision_provider, "local");
        assert_eq!(config.ai.request_timeout_secs, 60);
        assert_eq!(config.ai.confidence, ConfidenceDefaults::default());
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.server.database_path, "aquila.db");
        assert_eq!(config.server.logs.level, "info");
        assert!(config.ai.anthropic.is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let yaml = r#"
ai:
  text_provider: anthropic
  vision_provider: openai
  request_timeout_secs: 15
  confidence:
    extract: 0.5
  anthropic:
    api_key: sk-ant
    text_model: claude-3-sonnet-20240229
    vision_model: claude-3-sonnet-20240229
  openai:
    text_model: gpt-4o-mini
    vision_model: gpt-4o-mini
server:
  host: 127.0.0.1
  port: 9000
  logs:
    level: debug
"#;
        let config = parse(yaml).unwrap();

        assert_eq!(config.ai.text_provider, "anthropic");
        assert_eq!(config.ai.vision_provider, "openai");
        assert_eq!(config.ai.request_timeout_secs, 15);
        assert_eq!(config.ai.confidence.extract, 0.5);
        assert_eq!(config.ai.confidence.objects, 0.80);

        let anthropic = config.ai.anthropic.unwrap();
        assert_eq!(anthropic.api_key, "sk-ant");
        assert_eq!(anthropic.base_url, "");

        let openai = config.ai.openai.unwrap();
        assert!(openai.api_key.is_empty());
        assert_eq!(openai.text_model, "gpt-4o-mini");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.logs.level, "debug");
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        assert!(parse("ai: [unclosed").is_err());
    }

    #[test]
    fn test_parse_rejects_zero_timeout() {
        let err = parse("ai:\n  request_timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_inline_api_key_is_not_overwritten() {
        let mut vendor = VendorConfig {
            api_key: "inline".to_string(),
            base_url: String::new(),
            text_model: "m".to_string(),
            vision_model: "m".to_string(),
        };

        fill_api_key(&mut vendor, "AQUILA_TEST_UNSET_KEY_VAR");
        assert_eq!(vendor.api_key, "inline");
    }
}
