// Public API - what other modules can use
pub use handlers::{file_content, file_history, upload_file};
pub use models::{FileContentResponse, FileRecord, UploadFileRequest};
pub use service::FileService;
pub use store::{BlobStore, DocumentStore, InMemoryBlobStore, InMemoryDocumentStore};

// Internal modules
mod handlers;
pub mod models;
mod service;
pub mod store;
