use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::files::FileService;
use crate::user::Authenticator;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub file_service: Arc<FileService>,
}

impl AppState {
    pub fn new(authenticator: Arc<Authenticator>, file_service: Arc<FileService>) -> Self {
        Self {
            authenticator,
            file_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not found")]
    UserNotFound,

    #[error("User name already exists")]
    UserNameAlreadyExists,

    #[error("Unauthorised request")]
    UnauthorisedRequest,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store could not be reached. Fatal when raised while connecting at startup.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::UserNameAlreadyExists => "USER_NAME_ALREADY_EXISTS",
            AppError::UnauthorisedRequest => "UNAUTHORISED_REQUEST",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::FileNotFound(_) => "FILE_NOT_FOUND",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UserNotFound | AppError::FileNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UserNameAlreadyExists => StatusCode::CONFLICT,
            AppError::UnauthorisedRequest => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));

        (self.status_code(), body).into_response()
    }
}
