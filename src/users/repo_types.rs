use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Credential held by a `User`: nothing yet, the plaintext from a request,
/// or the hash read from or written to the store.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Password {
    #[default]
    Empty,
    Plain(String),
    Hashed(String),
}

impl Password {
    pub fn is_empty(&self) -> bool {
        match self {
            Password::Empty => true,
            Password::Plain(s) | Password::Hashed(s) => s.is_empty(),
        }
    }

    pub fn as_hash(&self) -> Option<&str> {
        match self {
            Password::Hashed(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Password::Empty => f.write_str("Empty"),
            Password::Plain(_) => f.write_str("Plain(..)"),
            Password::Hashed(_) => f.write_str("Hashed(..)"),
        }
    }
}

/// Account record. The password never leaves the process in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: Password,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Build an unsaved user from request input.
    pub fn new(
        nickname: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            nickname: nickname.into(),
            email: email.into(),
            password: Password::Plain(password.into()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row shape of the `users` table.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            nickname: r.nickname,
            email: r.email,
            password: Password::Hashed(r.password),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Insert payload; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Columns rewritten by an update.
#[derive(Debug, Clone)]
pub struct UserPatch {
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub updated_at: OffsetDateTime,
}
