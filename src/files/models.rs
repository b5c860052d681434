use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata document describing one uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Assigned by the document store on insert
    pub id: String,
    pub client_id: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Request body for file upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadFileRequest {
    pub client_id: String,
    pub filename: String,
    pub content: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Response structure for file content endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileContentResponse {
    pub filename: String,
    pub content: String,
}
