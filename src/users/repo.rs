use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use crate::users::error::{PasswordError, UserError};
use crate::users::password::{verify_dummy, verify_password};
use crate::users::repo_types::{NewUser, Password, User, UserPatch, UserRow};

/// Max rows returned by `User::find_all_users`.
pub const LIST_LIMIT: i64 = 100;

/// Persistence seam for users. Uniqueness of nickname and email is the
/// store's job and surfaces as `UserError::Conflict`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &NewUser) -> Result<User, UserError>;
    async fn list(&self, limit: i64) -> Result<Vec<User>, UserError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
    /// Returns the number of rows touched.
    async fn update(&self, id: i64, patch: &UserPatch) -> Result<u64, UserError>;
    /// Returns the number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64, UserError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &NewUser) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (nickname, email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nickname, email, password, created_at, updated_at
            "#,
        )
        .bind(&user.nickname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(UserError::from_store)?;
        Ok(row.into())
    }

    async fn list(&self, limit: i64) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, nickname, email, password, created_at, updated_at
            FROM users
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, nickname, email, password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, nickname, email, password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<u64, UserError> {
        let res = sqlx::query(
            r#"
            UPDATE users
            SET password = $1, nickname = $2, email = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&patch.password_hash)
        .bind(&patch.nickname)
        .bind(&patch.email)
        .bind(patch.updated_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(UserError::from_store)?;
        Ok(res.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, UserError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}

impl User {
    /// Persist a prepared, validated and hashed user.
    #[instrument(skip(self, store), fields(nickname = %self.nickname))]
    pub async fn save_user(&self, store: &dyn UserStore) -> Result<User, UserError> {
        let password_hash = self
            .password
            .as_hash()
            .ok_or(PasswordError::Missing)?
            .to_string();
        let new = NewUser {
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        let saved = store.insert(&new).await.map_err(|e| {
            warn!(error = %e, "insert user failed");
            e
        })?;
        debug!(user_id = saved.id, "user saved");
        Ok(saved)
    }

    pub async fn find_all_users(store: &dyn UserStore) -> Result<Vec<User>, UserError> {
        let users = store.list(LIST_LIMIT).await?;
        debug!(count = users.len(), "users listed");
        Ok(users)
    }

    pub async fn find_by_id(store: &dyn UserStore, id: i64) -> Result<User, UserError> {
        store.find_by_id(id).await?.ok_or(UserError::NotFound)
    }

    /// Hash the password, rewrite the mutable columns of row `id` and
    /// return the row as stored. `self` keeps its plaintext until the
    /// store accepts the change, so a failed update can be retried.
    #[instrument(skip(self, store))]
    pub async fn updated_user(
        &mut self,
        store: &dyn UserStore,
        id: i64,
    ) -> Result<User, UserError> {
        let password_hash = self.hash_plaintext()?;
        let patch = UserPatch {
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            password_hash,
            updated_at: self.updated_at,
        };
        if store.update(id, &patch).await? == 0 {
            return Err(UserError::NotFound);
        }
        self.password = Password::Hashed(patch.password_hash);
        debug!(user_id = id, "user updated");
        User::find_by_id(store, id).await
    }

    pub async fn delete_user(store: &dyn UserStore, id: i64) -> Result<u64, UserError> {
        let affected = store.delete(id).await?;
        debug!(user_id = id, affected, "user delete");
        Ok(affected)
    }

    /// Look up `email` and check `password` against the stored hash.
    #[instrument(skip(store, password))]
    pub async fn sign_in(
        store: &dyn UserStore,
        email: &str,
        password: &str,
    ) -> Result<User, UserError> {
        let Some(user) = store.find_by_email(email).await? else {
            // same Argon2 cost as a known account
            let _ = verify_dummy(password);
            warn!("login unknown email");
            return Err(UserError::InvalidCredentials);
        };
        let hash = user.password.as_hash().ok_or(UserError::InvalidCredentials)?;
        match verify_password(hash, password) {
            Ok(()) => Ok(user),
            Err(PasswordError::Mismatch) => {
                warn!(user_id = user.id, "login invalid password");
                Err(UserError::InvalidCredentials)
            }
            Err(e) => Err(e.into()),
        }
    }
}
