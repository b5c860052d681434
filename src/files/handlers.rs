use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use super::models::{FileContentResponse, FileRecord, UploadFileRequest};
use crate::shared::{AppError, AppState};

/// POST /files
#[instrument(name = "upload_file", skip(state, body), fields(client_id = %body.client_id, filename = %body.filename))]
pub async fn upload_file(
    State(state): State<AppState>,
    Json(body): Json<UploadFileRequest>,
) -> Result<(StatusCode, Json<FileRecord>), AppError> {
    let record = state
        .file_service
        .upload(&body.client_id, &body.filename, body.content, body.content_type)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /files/client/:client_id
#[instrument(name = "file_history", skip(state))]
pub async fn file_history(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    Ok(Json(state.file_service.history(&client_id).await?))
}

/// GET /files/content/:filename
#[instrument(name = "file_content", skip(state))]
pub async fn file_content(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<FileContentResponse>, AppError> {
    let content = state.file_service.contents(&filename).await?;
    Ok(Json(FileContentResponse { filename, content }))
}
