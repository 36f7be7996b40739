use argon2::password_hash;
use axum::http::StatusCode;
use thiserror::Error;

/// Field-level validation failures, one per rule.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required Nickname")]
    RequiredNickname,
    #[error("required Password")]
    RequiredPassword,
    #[error("required Email")]
    RequiredEmail,
    #[error("invalid Email")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
    #[error("password does not match")]
    Mismatch,
    #[error("password is already hashed")]
    AlreadyHashed,
    #[error("no password to hash")]
    Missing,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("User Not Found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),
}

impl UserError {
    /// Map a sqlx error, turning unique violations into `Conflict`.
    pub fn from_store(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                let what = db_err.constraint().unwrap_or("users").to_string();
                return UserError::Conflict(what);
            }
        }
        UserError::Store(e)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Conflict(_) => StatusCode::CONFLICT,
            UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            UserError::Password(_) | UserError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
