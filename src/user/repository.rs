use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::models::{LoginStateUpdate, UserModel};
use crate::config::DatabaseConfig;
use crate::shared::AppError;

/// Postgres' default name for the UNIQUE constraint on `users.name`
const USERS_NAME_CONSTRAINT: &str = "users_name_key";

/// SQLSTATE for a value that cannot be parsed into the column type
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY NOT NULL,
    name VARCHAR NOT NULL UNIQUE,
    role VARCHAR NOT NULL,
    access_token UUID NOT NULL,
    logged_in BOOL DEFAULT FALSE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<UserModel>, AppError>;
    async fn find_user_by_name(&self, name: &str) -> Result<Option<UserModel>, AppError>;

    /// Applies a login or logout to the named user in a single write.
    /// Returns the user's id, or `None` when no user has that name.
    async fn update_login_state(
        &self,
        name: &str,
        update: LoginStateUpdate,
    ) -> Result<Option<Uuid>, AppError>;

    /// Releases the underlying store handle
    async fn close(&self);
}

/// In-memory implementation of UserRepository for development and testing
///
/// Uniqueness of `id` and `name` is enforced on insert, the same way the
/// table constraints do it in Postgres.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, UserModel>>,
    closed: AtomicBool,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();

        Self {
            users: Mutex::new(users),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    /// Checks if a user exists by ID
    pub fn has_user(&self, id: &Uuid) -> bool {
        self.users
            .lock()
            .map(|users| users.contains_key(id))
            .unwrap_or(false)
    }

    fn users(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, UserModel>>, AppError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(
                "in-memory store has been closed".to_string(),
            ));
        }
        self.users.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, name = %user.name, "Inserting user in memory");

        let mut users = self.users()?;
        if users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User id already exists in memory");
            return Err(AppError::DatabaseError(
                "duplicate key value violates primary key".to_string(),
            ));
        }
        if users.values().any(|existing| existing.name == user.name) {
            warn!(name = %user.name, "User name already exists in memory");
            return Err(AppError::UserNameAlreadyExists);
        }
        users.insert(user.id, user.clone());

        debug!(user_id = %user.id, "User inserted successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %id, "Fetching user by id from memory");

        let user = self.users()?.get(id).cloned();

        match &user {
            Some(u) => debug!(user_id = %id, name = %u.name, "User found in memory"),
            None => debug!(user_id = %id, "User not found in memory"),
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_name(&self, name: &str) -> Result<Option<UserModel>, AppError> {
        debug!(name = %name, "Fetching user by name from memory");

        let user = self
            .users()?
            .values()
            .find(|user| user.name == name)
            .cloned();

        Ok(user)
    }

    #[instrument(skip(self, update))]
    async fn update_login_state(
        &self,
        name: &str,
        update: LoginStateUpdate,
    ) -> Result<Option<Uuid>, AppError> {
        debug!(name = %name, logged_in = update.logged_in, "Updating login state in memory");

        let mut users = self.users()?;
        let user = match users.values_mut().find(|user| user.name == name) {
            Some(user) => user,
            None => {
                debug!(name = %name, "User not found for login state update in memory");
                return Ok(None);
            }
        };

        user.logged_in = update.logged_in;
        if let Some(token) = update.access_token {
            user.access_token = token;
        }
        user.updated_at = update.updated_at;

        Ok(Some(user.id))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        debug!("In-memory user store closed");
    }
}

/// Converts a sqlx error into the matching application error kind
pub fn map_sqlx_error(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() && db_err.constraint() == Some(USERS_NAME_CONSTRAINT) {
                return AppError::UserNameAlreadyExists;
            }
            if db_err.code().as_deref() == Some(INVALID_TEXT_REPRESENTATION) {
                return AppError::InvalidInput(db_err.message().to_string());
            }
            AppError::DatabaseError(db_err.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::StoreUnavailable(error.to_string())
        }
        _ => AppError::DatabaseError(error.to_string()),
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the single connection this repository works over.
    /// Any failure here is reported as `StoreUnavailable`.
    #[instrument(skip(config), fields(host = %config.host, db_name = %config.db_name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!("Connecting to user store");

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to connect to user store");
                AppError::StoreUnavailable(e.to_string())
            })?;

        info!("Connected to user store");
        Ok(Self::new(pool))
    }

    /// Creates the users table when it does not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create users table");
                map_sqlx_error(e)
            })?;

        debug!("Users table ready");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, name = %user.name, "Inserting user in database");

        sqlx::query(
            "INSERT INTO users (id, name, role, access_token, logged_in, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.role)
        .bind(user.access_token)
        .bind(user.logged_in)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user.id, "Failed to insert user in database");
            map_sqlx_error(e)
        })?;

        debug!(user_id = %user.id, "User inserted successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %id, "Fetching user by id from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, name, role, access_token, logged_in, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %id, "Failed to fetch user from database");
            map_sqlx_error(e)
        })
    }

    #[instrument(skip(self))]
    async fn find_user_by_name(&self, name: &str) -> Result<Option<UserModel>, AppError> {
        debug!(name = %name, "Fetching user by name from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, name, role, access_token, logged_in, created_at, updated_at FROM users WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, name = %name, "Failed to fetch user from database");
            map_sqlx_error(e)
        })
    }

    #[instrument(skip(self, update))]
    async fn update_login_state(
        &self,
        name: &str,
        update: LoginStateUpdate,
    ) -> Result<Option<Uuid>, AppError> {
        debug!(name = %name, logged_in = update.logged_in, "Updating login state in database");

        let user_id = sqlx::query_scalar::<_, Uuid>(
            "UPDATE users SET logged_in = $2, access_token = COALESCE($3, access_token), updated_at = $4 WHERE name = $1 RETURNING id",
        )
        .bind(name)
        .bind(update.logged_in)
        .bind(update.access_token)
        .bind(update.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, name = %name, "Failed to update login state in database");
            map_sqlx_error(e)
        })?;

        if user_id.is_none() {
            debug!(name = %name, "User not found for login state update");
        }

        Ok(user_id)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("User store connection closed");
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    mod helpers {
        use super::*;

        pub fn create_test_user(name: &str) -> UserModel {
            UserModel::new(
                Uuid::new_v4(),
                name.to_string(),
                "admin".to_string(),
                Uuid::new_v4(),
                false,
            )
        }
    }

    use helpers::*;

    /// Stand-in for a Postgres error response
    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    struct PgErrorResponse {
        code: &'static str,
        constraint: Option<&'static str>,
        kind: ErrorKind,
        message: String,
    }

    impl PgErrorResponse {
        fn into_sqlx(
            code: &'static str,
            constraint: Option<&'static str>,
            kind: ErrorKind,
        ) -> sqlx::Error {
            sqlx::Error::Database(Box::new(Self {
                code,
                constraint,
                kind,
                message: format!("error {}", code),
            }))
        }
    }

    impl DatabaseError for PgErrorResponse {
        fn message(&self) -> &str {
            &self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1");

        repo.insert_user(&user).await.unwrap();

        let by_id = repo.find_user_by_id(&user.id).await.unwrap();
        assert_eq!(by_id, Some(user.clone()));

        let by_name = repo.find_user_by_name("user-1").await.unwrap();
        assert_eq!(by_name, Some(user));
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let repo = InMemoryUserRepository::new();

        assert!(repo.find_user_by_id(&Uuid::new_v4()).await.unwrap().is_none());
        assert!(repo.find_user_by_name("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_name() {
        let repo = InMemoryUserRepository::new();
        repo.insert_user(&create_test_user("user-1")).await.unwrap();

        let result = repo.insert_user(&create_test_user("user-1")).await;
        assert!(matches!(result, Err(AppError::UserNameAlreadyExists)));
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1");
        repo.insert_user(&user).await.unwrap();

        let mut clash = create_test_user("user-2");
        clash.id = user.id;
        let result = repo.insert_user(&clash).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_update_login_state() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1");
        repo.insert_user(&user).await.unwrap();

        let token = Uuid::new_v4();
        let id = repo
            .update_login_state("user-1", LoginStateUpdate::login(token))
            .await
            .unwrap();
        assert_eq!(id, Some(user.id));

        let stored = repo.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.logged_in);
        assert_eq!(stored.access_token, token);
        assert!(stored.updated_at >= user.updated_at);

        repo.update_login_state("user-1", LoginStateUpdate::logout())
            .await
            .unwrap();
        let stored = repo.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(!stored.logged_in);
        assert_eq!(stored.access_token, token);
    }

    #[tokio::test]
    async fn test_update_login_state_writes_updated_at() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1");
        repo.insert_user(&user).await.unwrap();

        let mut login = LoginStateUpdate::login(Uuid::new_v4());
        login.updated_at = user.updated_at + Duration::seconds(5);
        repo.update_login_state("user-1", login).await.unwrap();

        let stored = repo.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, user.updated_at + Duration::seconds(5));
        assert_eq!(stored.created_at, user.created_at);

        let mut logout = LoginStateUpdate::logout();
        logout.updated_at = user.updated_at + Duration::seconds(10);
        repo.update_login_state("user-1", logout).await.unwrap();

        let stored = repo.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, user.updated_at + Duration::seconds(10));
    }

    #[tokio::test]
    async fn test_update_login_state_missing_user() {
        let repo = InMemoryUserRepository::new();

        let result = repo
            .update_login_state("ghost", LoginStateUpdate::logout())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_closed_repository_is_unavailable() {
        let repo = InMemoryUserRepository::with_users(vec![create_test_user("user-1")]);
        assert_eq!(repo.user_count(), 1);

        repo.close().await;

        let result = repo.find_user_by_name("user-1").await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[rstest]
    #[case(sqlx::Error::PoolTimedOut)]
    #[case(sqlx::Error::PoolClosed)]
    #[case(sqlx::Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused")))]
    fn test_connectivity_errors_map_to_store_unavailable(#[case] error: sqlx::Error) {
        assert!(matches!(map_sqlx_error(error), AppError::StoreUnavailable(_)));
    }

    #[test]
    fn test_name_unique_violation_maps_to_name_exists() {
        let error = PgErrorResponse::into_sqlx(
            "23505",
            Some("users_name_key"),
            ErrorKind::UniqueViolation,
        );
        assert!(matches!(
            map_sqlx_error(error),
            AppError::UserNameAlreadyExists
        ));
    }

    #[rstest]
    #[case("23505", Some("users_pkey"), ErrorKind::UniqueViolation)]
    #[case("23502", None, ErrorKind::NotNullViolation)]
    #[case("42P01", None, ErrorKind::Other)]
    fn test_other_database_errors_map_to_database_error(
        #[case] code: &'static str,
        #[case] constraint: Option<&'static str>,
        #[case] kind: ErrorKind,
    ) {
        let error = PgErrorResponse::into_sqlx(code, constraint, kind);
        assert!(matches!(
            map_sqlx_error(error),
            AppError::DatabaseError(message) if message == format!("error {}", code)
        ));
    }

    #[test]
    fn test_invalid_text_representation_maps_to_invalid_input() {
        let error = PgErrorResponse::into_sqlx("22P02", None, ErrorKind::Other);
        assert!(matches!(
            map_sqlx_error(error),
            AppError::InvalidInput(message) if message == "error 22P02"
        ));
    }

    #[test]
    fn test_other_errors_map_to_database_error() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            AppError::DatabaseError(_)
        ));
    }
}
