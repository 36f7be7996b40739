use std::sync::Mutex;

use async_trait::async_trait;

use crate::users::error::UserError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, Password, User, UserPatch};

/// In-process store for tests. Enforces the same unique keys as the
/// `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: Vec<User>,
}

impl Inner {
    fn clash(&self, id: i64, nickname: &str, email: &str) -> Option<UserError> {
        self.rows.iter().filter(|u| u.id != id).find_map(|u| {
            if u.nickname == nickname {
                Some(UserError::Conflict("users_nickname_key".into()))
            } else if u.email == email {
                Some(UserError::Conflict("users_email_key".into()))
            } else {
                None
            }
        })
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &NewUser) -> Result<User, UserError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(e) = inner.clash(0, &user.nickname, &user.email) {
            return Err(e);
        }
        inner.next_id += 1;
        let row = User {
            id: inner.next_id,
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            password: Password::Hashed(user.password_hash.clone()),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn list(&self, limit: i64) -> Result<Vec<User>, UserError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().take(limit as usize).cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<u64, UserError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.rows.iter().any(|u| u.id == id) {
            return Ok(0);
        }
        if let Some(e) = inner.clash(id, &patch.nickname, &patch.email) {
            return Err(e);
        }
        let Some(row) = inner.rows.iter_mut().find(|u| u.id == id) else {
            return Ok(0);
        };
        row.nickname = patch.nickname.clone();
        row.email = patch.email.clone();
        row.password = Password::Hashed(patch.password_hash.clone());
        row.updated_at = patch.updated_at;
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64, UserError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|u| u.id != id);
        Ok((before - inner.rows.len()) as u64)
    }
}
