use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::types::{CreateUserRequest, CreateUserResponse, LoginSession, NameRequest, UserResponse};
use crate::shared::{AppError, AppState};

/// Pulls the access token out of an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let header = headers
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::UnauthorisedRequest
        })?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::UnauthorisedRequest
    })?;

    Uuid::parse_str(token.trim()).map_err(|_| {
        warn!("Bearer token is not a valid access token");
        AppError::UnauthorisedRequest
    })
}

/// POST /users
#[instrument(name = "create_user", skip(state, body), fields(name = %body.name))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let user = state
        .authenticator
        .create_user(&body.role, &body.name)
        .await?;

    info!(user_id = %user.id, "User created via API");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/:id, authorised by the user's access token
#[instrument(name = "get_user", skip(state, headers))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|e| AppError::InvalidInput(format!("invalid user id {:?}: {}", id, e)))?;
    let access_token = bearer_token(&headers)?;

    let user = state.authenticator.get_user(&id, &access_token).await?;
    Ok(Json(user.into()))
}

/// POST /login
#[instrument(name = "login", skip(state, body), fields(name = %body.name))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<Json<LoginSession>, AppError> {
    let session = state.authenticator.login(&body.name).await?;
    Ok(Json(session))
}

/// POST /logout
#[instrument(name = "logout", skip(state, body), fields(name = %body.name))]
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<StatusCode, AppError> {
    state.authenticator.logout(&body.name).await?;
    Ok(StatusCode::NO_CONTENT)
}
