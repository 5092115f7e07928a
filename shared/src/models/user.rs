//! User Model

use serde::{Deserialize, Serialize};

/// User entity (registered account or guest created at booking time)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Argon2 hash, absent for guests
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub is_guest: bool,
    pub is_admin: bool,
    pub earned_points: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn role(&self) -> UserRole {
        if self.is_admin {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

/// Access role carried in tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}
