use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::models::FileRecord;
use crate::shared::AppError;

/// Content store keyed by filename
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `content` under `filename` and returns the new blob's id.
    /// A later put with the same filename shadows the earlier one.
    async fn put(&self, filename: &str, content: Vec<u8>) -> Result<String, AppError>;

    /// Latest content stored under `filename`
    async fn get(&self, filename: &str) -> Result<Option<Vec<u8>>, AppError>;
}

/// Store for file metadata documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts the record, ignoring its `id`, and returns the id it was stored under
    async fn insert(&self, record: FileRecord) -> Result<String, AppError>;

    /// All records for the client, oldest first
    async fn find_by_client(&self, client_id: &str) -> Result<Vec<FileRecord>, AppError>;
}

fn new_object_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<(String, Vec<u8>)>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, filename: &str, content: Vec<u8>) -> Result<String, AppError> {
        let blob_id = new_object_id();
        debug!(filename = %filename, blob_id = %blob_id, size = content.len(), "Storing blob in memory");

        let mut blobs = self.blobs.write().await;
        blobs
            .entry(filename.to_string())
            .or_default()
            .push((blob_id.clone(), content));

        Ok(blob_id)
    }

    async fn get(&self, filename: &str) -> Result<Option<Vec<u8>>, AppError> {
        let blobs = self.blobs.read().await;
        Ok(blobs
            .get(filename)
            .and_then(|versions| versions.last())
            .map(|(_, content)| content.clone()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    records: Arc<RwLock<Vec<FileRecord>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, mut record: FileRecord) -> Result<String, AppError> {
        record.id = new_object_id();
        debug!(record_id = %record.id, client_id = %record.client_id, "Inserting file record in memory");

        let id = record.id.clone();
        self.records.write().await.push(record);
        Ok(id)
    }

    async fn find_by_client(&self, client_id: &str) -> Result<Vec<FileRecord>, AppError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.client_id == client_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(client_id: &str, filename: &str) -> FileRecord {
        FileRecord {
            id: String::new(),
            client_id: client_id.to_string(),
            filename: filename.to_string(),
            content_type: None,
            size: 0,
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_blob_latest_version_wins() {
        let store = InMemoryBlobStore::new();
        let first = store.put("notes.txt", b"one".to_vec()).await.unwrap();
        let second = store.put("notes.txt", b"two".to_vec()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.get("notes.txt").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.get("missing.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_documents_filtered_by_client() {
        let store = InMemoryDocumentStore::new();
        let id = store.insert(record("client-1", "a.txt")).await.unwrap();
        store.insert(record("client-2", "b.txt")).await.unwrap();
        store.insert(record("client-1", "c.txt")).await.unwrap();

        let found = store.find_by_client("client-1").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].filename, "a.txt");
        assert_eq!(found[1].filename, "c.txt");

        assert!(store.find_by_client("client-3").await.unwrap().is_empty());
    }
}
