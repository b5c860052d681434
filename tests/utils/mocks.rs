use async_trait::async_trait;
use uuid::Uuid;

use user_auth::user::models::LoginStateUpdate;
use user_auth::{AppError, UserModel, UserRepository};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Repository whose store is always unreachable
#[allow(dead_code)]
pub struct UnavailableUserRepository;

#[allow(dead_code)]
fn unavailable() -> AppError {
    AppError::StoreUnavailable("connection refused".to_string())
}

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    async fn insert_user(&self, _user: &UserModel) -> Result<(), AppError> {
        Err(unavailable())
    }

    async fn find_user_by_id(&self, _id: &Uuid) -> Result<Option<UserModel>, AppError> {
        Err(unavailable())
    }

    async fn find_user_by_name(&self, _name: &str) -> Result<Option<UserModel>, AppError> {
        Err(unavailable())
    }

    async fn update_login_state(
        &self,
        _name: &str,
        _update: LoginStateUpdate,
    ) -> Result<Option<Uuid>, AppError> {
        Err(unavailable())
    }

    async fn close(&self) {}
}
