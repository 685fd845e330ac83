use aquila::storage::{DocumentStore, UploadedDocument};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_documents_keep_upload_metadata() {
    let store = assert_ok!(DocumentStore::new(":memory:").await);

    let document = UploadedDocument::new(
        "manual.pdf".to_string(),
        "uploads/manual.pdf".to_string(),
        b"%PDF-1.7",
    );
    store
        .insert_document(&document.id, &serde_json::to_value(&document).unwrap())
        .await
        .unwrap();

    let stored = store.get_document(&document.id).await.unwrap().unwrap();
    let decoded: UploadedDocument = serde_json::from_value(stored).unwrap();
    assert_eq!(decoded, document);
}

#[tokio::test]
async fn test_file_database_keeps_everything() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("aquila.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    {
        let store = DocumentStore::new(&db_path_str).await.unwrap();
        assert!(store.is_persistent());
        store.ensure_settings(json!({"brex_rules": {}})).await.unwrap();
        store.insert_document("doc-1", &json!({"id": "doc-1"})).await.unwrap();
        store.insert_document("doc-2", &json!({"id": "doc-2"})).await.unwrap();
        store
            .insert_data_module("DMC-1", &json!({"dmc": "DMC-1", "title": "Pump"}))
            .await
            .unwrap();
    }

    let store = DocumentStore::new(&db_path_str).await.unwrap();
    let settings = store
        .ensure_settings(json!({"brex_rules": {"ignored": true}}))
        .await
        .unwrap();

    assert_eq!(settings, json!({"brex_rules": {}}));
    assert_eq!(
        store.list_documents().await.unwrap(),
        vec![json!({"id": "doc-1"}), json!({"id": "doc-2"})]
    );
    assert_eq!(
        store.get_data_module("DMC-1").await.unwrap(),
        Some(json!({"dmc": "DMC-1", "title": "Pump"}))
    );
}

#[tokio::test]
async fn test_concurrent_module_saves() {
    let store = Arc::new(DocumentStore::new(":memory:").await.unwrap());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let dmc = format!("DMC-{i}");
                store
                    .insert_data_module(&dmc, &json!({"dmc": dmc}))
                    .await
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.list_data_modules().await.unwrap().len(), 10);
}

#[test_log::test(tokio::test)]
async fn test_unopenable_database_falls_back_to_memory() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("missing").join("nested").join("aquila.db");

    let store = assert_ok!(DocumentStore::new(&db_path.to_string_lossy()).await);
    assert!(!store.is_persistent());

    assert_ok!(store.save_settings(&json!({"brex_rules": {}})).await);
    assert_ok!(store.insert_document("doc-1", &json!({"id": "doc-1"})).await);

    assert_eq!(
        store.get_settings().await.unwrap(),
        Some(json!({"brex_rules": {}}))
    );
    assert_eq!(store.list_documents().await.unwrap(), vec![json!({"id": "doc-1"})]);
}
