use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// Request body for create and update.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<UserPayload> for User {
    fn from(p: UserPayload) -> Self {
        User::new(p.nickname, p.email, p.password)
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public part of the user returned after login.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub nickname: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            nickname: u.nickname,
            email: u.email,
        }
    }
}
