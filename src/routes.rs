use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::files;
use crate::shared::AppState;
use crate::user;

/// Builds the HTTP router over the user and file services
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/users", post(user::create_user))
        .route("/users/:id", get(user::get_user))
        .route("/login", post(user::login))
        .route("/logout", post(user::logout))
        .route("/files", post(files::upload_file))
        .route("/files/client/:client_id", get(files::file_history))
        .route("/files/content/:filename", get(files::file_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
