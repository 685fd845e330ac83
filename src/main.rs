use anyhow::Result;
use aquila::{config, server};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<LevelFilter> {
    level.parse::<LevelFilter>().map_err(|_| {
        anyhow::anyhow!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            level
        )
    })
}

fn env_filter(level: LevelFilter, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives.unwrap_or_default())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let log_level = config.server.logs.level.clone();
    let level = match validate_log_level(&log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG directives take precedence over the configured level
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level, rust_log.as_deref()))
        .json()
        .init();

    info!(
        "Starting Aquila server with log level: {}",
        rust_log.as_deref().unwrap_or(&log_level)
    );
    info!("Configuration loaded successfully");

    server::run(config).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_log_level() {
        assert_eq!(validate_log_level("debug").unwrap(), LevelFilter::DEBUG);
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn test_env_filter_accepts_directives() {
        let filter = env_filter(LevelFilter::INFO, Some("aquila=debug,tower_http=info"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_env_filter_defaults_to_configured_level() {
        let filter = env_filter(LevelFilter::WARN, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
