use serde::{Deserialize, Serialize};

/// A registered user. The stored record includes the password hash, so this
/// type is never serialized to API clients directly — see [`UserSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Unique login/display name.
    pub username: String,

    /// Argon2id password hash (PHC string).
    pub password_hash: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
}

/// API view of a user: name plus follow graph counts.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub followers_number: usize,
    pub following_number: usize,
}
