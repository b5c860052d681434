use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    directory::UserDirectory,
    generators::{IdGenerator, RandomIdGenerator},
    models::{NewUser, UserModel},
    types::LoginSession,
};
use crate::shared::AppError;

/// Public entry point for user operations.
///
/// Adds id/token issuing and token checks on top of [`UserDirectory`].
pub struct Authenticator {
    directory: Arc<UserDirectory>,
    id_generator: Arc<dyn IdGenerator>,
}

impl Authenticator {
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self::with_generator(directory, Arc::new(RandomIdGenerator::new()))
    }

    pub fn with_generator(directory: Arc<UserDirectory>, id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            directory,
            id_generator,
        }
    }

    /// Creates a logged-out user with a fresh id and access token
    #[instrument(skip(self))]
    pub async fn create_user(&self, role: &str, name: &str) -> Result<UserModel, AppError> {
        let id = self.id_generator.generate().await;
        let access_token = self.id_generator.generate().await;

        self.directory
            .create_user(NewUser::new(id.to_string(), name, role, access_token))
            .await
    }

    /// Fetches a user on behalf of the holder of `access_token`
    #[instrument(skip(self, access_token))]
    pub async fn get_user(&self, id: &Uuid, access_token: &Uuid) -> Result<UserModel, AppError> {
        let user = self.directory.get_user(id).await?;

        if !user.holds_token(access_token) {
            warn!(user_id = %id, "Access token does not match user");
            return Err(AppError::UnauthorisedRequest);
        }

        Ok(user)
    }

    /// Logs the user in under a newly issued token, replacing any previous one
    #[instrument(skip(self))]
    pub async fn login(&self, name: &str) -> Result<LoginSession, AppError> {
        let access_token = self.id_generator.generate().await;
        let user_id = self.directory.login(name, access_token).await?;

        info!(user_id = %user_id, "Issued new access token");
        Ok(LoginSession {
            user_id,
            access_token,
        })
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, name: &str) -> Result<(), AppError> {
        self.directory.logout(name).await
    }
}
