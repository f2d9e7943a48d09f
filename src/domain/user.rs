//! User domain model

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User entity as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: StringUuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            name: String::new(),
            email: String::new(),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields of a user that are safe to return to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: StringUuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "must be between 6 and 128 characters"))]
    pub password: String,
}

/// Login payload. Missing fields deserialize as empty so the service can
/// answer with a single "provide email and password" message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Data handed to the repository when creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
