use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Metadata of a source file uploaded for conversion into data modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: String,
    pub filename: String,
    pub file_path: String,
    pub mime_type: String,
    pub file_size: u64,
    pub sha256_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UploadedDocument {
    pub fn new(filename: String, file_path: String, content: &[u8]) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            filename,
            file_path,
            mime_type: "application/octet-stream".to_string(),
            file_size: content.len() as u64,
            sha256_hash: sha256_hex(content),
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn sha256_hex(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}
