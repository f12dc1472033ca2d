use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Main user model for the `users` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key. Files reference this as their owner.
    pub id: Uuid,

    /// Identity used for one-time codes.
    pub account_id: Uuid,

    pub full_name: String,

    /// Always lowercase.
    pub email: String,

    /// Avatar URL.
    pub avatar: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for inserting.
#[derive(Debug)]
pub struct UserInsert<'a> {
    pub id: Uuid,
    pub account_id: Uuid,
    pub full_name: &'a str,
    pub email: &'a str,
    pub avatar: &'a str,
}

impl<'a> UserInsert<'a> {
    pub fn new(full_name: &'a str, email: &'a str, avatar: &'a str) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            full_name,
            email,
            avatar,
        }
    }
}

/// A live session. The raw token only exists here, the repository stores its digest.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip)]
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// DTO for inserting a session.
#[derive(Debug)]
pub struct SessionInsert<'a> {
    pub token_hash: &'a str,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// DTO for storing a one-time code.
#[derive(Debug)]
pub struct OtpInsert<'a> {
    pub account_id: Uuid,
    pub code_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

/// Initials of a full name, used for generated avatars.
pub fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
