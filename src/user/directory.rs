use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    models::{LoginStateUpdate, NewUser, UserModel},
    repository::UserRepository,
};
use crate::shared::AppError;

/// Persistence-backed directory of users, looked up by id or name.
///
/// Owns the repository handle for its whole lifetime; call [`UserDirectory::shutdown`]
/// to release it.
pub struct UserDirectory {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserDirectory {
    pub fn open(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Inserts a new user. Name collisions are reported by the store, not pre-checked.
    #[instrument(skip(self, details), fields(name = %details.name))]
    pub async fn create_user(&self, details: NewUser) -> Result<UserModel, AppError> {
        let id = Uuid::parse_str(&details.id).map_err(|e| {
            warn!(id = %details.id, "Rejecting user with malformed id");
            AppError::InvalidInput(format!("invalid user id {:?}: {}", details.id, e))
        })?;

        let user = UserModel::new(
            id,
            details.name,
            details.role,
            details.access_token,
            details.logged_in,
        );

        match self.repository.insert_user(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "User created");
                Ok(user)
            }
            Err(error) => {
                warn!(user_id = %user.id, error = %error, "User creation failed");
                Err(error)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &Uuid) -> Result<UserModel, AppError> {
        self.repository
            .find_user_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_name(&self, name: &str) -> Result<UserModel, AppError> {
        self.repository
            .find_user_by_name(name)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Marks the user logged in and stores `access_token` as their current token
    #[instrument(skip(self, access_token))]
    pub async fn login(&self, name: &str, access_token: Uuid) -> Result<Uuid, AppError> {
        let user_id = self
            .repository
            .update_login_state(name, LoginStateUpdate::login(access_token))
            .await?
            .ok_or_else(|| {
                warn!(name = %name, "Login for unknown user");
                AppError::UserNotFound
            })?;

        info!(user_id = %user_id, "User logged in");
        Ok(user_id)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, name: &str) -> Result<(), AppError> {
        let user_id = self
            .repository
            .update_login_state(name, LoginStateUpdate::logout())
            .await?
            .ok_or_else(|| {
                warn!(name = %name, "Logout for unknown user");
                AppError::UserNotFound
            })?;

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Closes the store handle. Later operations fail with `StoreUnavailable`.
    pub async fn shutdown(&self) {
        self.repository.close().await;
        info!("User directory shut down");
    }
}
