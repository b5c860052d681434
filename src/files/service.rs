use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::FileRecord,
    store::{BlobStore, DocumentStore},
};
use crate::shared::AppError;

/// Stores file content in a blob store and file metadata in a document store
pub struct FileService {
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentStore>,
}

impl FileService {
    pub fn new(blobs: Arc<dyn BlobStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { blobs, documents }
    }

    #[instrument(skip(self, content))]
    pub async fn upload(
        &self,
        client_id: &str,
        filename: &str,
        content: String,
        content_type: Option<String>,
    ) -> Result<FileRecord, AppError> {
        if client_id.trim().is_empty() {
            return Err(AppError::InvalidInput("client_id must not be empty".to_string()));
        }
        if filename.trim().is_empty() {
            return Err(AppError::InvalidInput("filename must not be empty".to_string()));
        }

        let size = content.len() as u64;
        let blob_id = self.blobs.put(filename, content.into_bytes()).await?;

        let mut record = FileRecord {
            id: String::new(),
            client_id: client_id.to_string(),
            filename: filename.to_string(),
            content_type,
            size,
            uploaded_at: Utc::now(),
        };
        record.id = self.documents.insert(record.clone()).await.map_err(|e| {
            warn!(blob_id = %blob_id, error = %e, "Metadata insert failed, blob left unreferenced");
            e
        })?;

        info!(record_id = %record.id, blob_id = %blob_id, size, "File uploaded");
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn history(&self, client_id: &str) -> Result<Vec<FileRecord>, AppError> {
        let records = self.documents.find_by_client(client_id).await?;
        info!(count = records.len(), "Fetched client file history");
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn contents(&self, filename: &str) -> Result<String, AppError> {
        let bytes = self
            .blobs
            .get(filename)
            .await?
            .ok_or_else(|| AppError::FileNotFound(filename.to_string()))?;

        String::from_utf8(bytes).map_err(|e| {
            warn!(error = %e, "Stored file content is not UTF-8");
            AppError::DatabaseError(format!("stored content for {} is not UTF-8", filename))
        })
    }
}
