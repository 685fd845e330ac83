use super::mocks::{MockBackend, SharedBackend};
use aquila::{
    ai::{ModelAdapter, ProviderRegistry},
    config::AiConfig,
    server::AppState,
    storage::DocumentStore,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

pub const MOCK_PROVIDER: &str = "mock";

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Adapter named [`MOCK_PROVIDER`] driven by `backend`.
pub fn create_mock_adapter(backend: Arc<MockBackend>) -> ModelAdapter {
    ModelAdapter::new(
        MOCK_PROVIDER,
        Arc::new(SharedBackend(backend)),
        "mock-text",
        "mock-vision",
    )
}

/// Registry with the local provider plus a mock-backed adapter.
pub fn create_test_registry(backend: Arc<MockBackend>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::from_config(&AiConfig::default()).unwrap();
    let adapter = Arc::new(create_mock_adapter(backend));
    registry.register_text(MOCK_PROVIDER, adapter.clone());
    registry.register_vision(MOCK_PROVIDER, adapter);
    registry
}

/// Application state over an in-memory database and uploads under `dir`.
pub async fn create_test_state(dir: &TempDir, backend: Arc<MockBackend>) -> AppState {
    let store = DocumentStore::new(":memory:").await.unwrap();
    AppState {
        store: Arc::new(store),
        providers: Arc::new(create_test_registry(backend)),
        upload_dir: dir.path().join("uploads"),
    }
}

pub fn parse_frame(frame: &str) -> Value {
    serde_json::from_str(frame).expect("reply frame is not JSON")
}
