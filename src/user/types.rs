use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::UserModel;

/// Request body for user creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateUserRequest {
    pub role: String,
    pub name: String,
}

/// Response structure for user creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateUserResponse {
    pub created: bool,
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub access_token: Uuid,
    pub logged_in: bool,
}

impl From<UserModel> for CreateUserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            created: true,
            id: user.id,
            name: user.name,
            role: user.role,
            access_token: user.access_token,
            logged_in: user.logged_in,
        }
    }
}

/// A user as returned to the holder of its access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub access_token: Uuid,
    pub logged_in: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            access_token: user.access_token,
            logged_in: user.logged_in,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request body for login and logout endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameRequest {
    pub name: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LoginSession {
    pub user_id: Uuid,
    pub access_token: Uuid,
}
