mod dispatch;
mod handlers;
mod types;

pub use dispatch::handle_frame;
pub use handlers::{AppState, serve_connection};
pub use types::{WsReply, WsRequest};

use crate::{Result, ai::ProviderRegistry, config::Config, storage::DocumentStore};
use axum::{Router, routing::get};
use serde_json::json;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(handlers::ws_handler))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let store = DocumentStore::new(&config.server.database_path).await?;
    store.ensure_settings(json!({ "brex_rules": {} })).await?;

    let providers = ProviderRegistry::from_config(&config.ai)?;
    info!(
        "AI providers ready (text: {}, vision: {})",
        config.ai.text_provider, config.ai.vision_provider
    );

    let app_state = AppState {
        store: Arc::new(store),
        providers: Arc::new(providers),
        upload_dir: PathBuf::from(&config.server.upload_dir),
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(app_state)).await?;

    Ok(())
}
