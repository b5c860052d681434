use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the users table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub access_token: Uuid,
    pub logged_in: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new user model with both timestamps set to now
    pub fn new(id: Uuid, name: String, role: String, access_token: Uuid, logged_in: bool) -> Self {
        let now = Utc::now();

        Self {
            id,
            name,
            role,
            access_token,
            logged_in,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `token` is the token currently held by this user
    pub fn holds_token(&self, token: &Uuid) -> bool {
        self.access_token == *token
    }
}

/// Details supplied when creating a user.
///
/// `id` arrives unparsed; a value that is not a UUID is rejected as invalid input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub role: String,
    pub access_token: Uuid,
    #[serde(default)]
    pub logged_in: bool,
}

impl NewUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>, access_token: Uuid) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            access_token,
            logged_in: false,
        }
    }

    pub fn logged_in(mut self, logged_in: bool) -> Self {
        self.logged_in = logged_in;
        self
    }
}

/// Fields written together by a login or logout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoginStateUpdate {
    pub logged_in: bool,
    /// Replacement token, `None` keeps the stored one
    pub access_token: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl LoginStateUpdate {
    pub fn login(access_token: Uuid) -> Self {
        Self {
            logged_in: true,
            access_token: Some(access_token),
            updated_at: Utc::now(),
        }
    }

    pub fn logout() -> Self {
        Self {
            logged_in: false,
            access_token: None,
            updated_at: Utc::now(),
        }
    }
}
