//! Credential store contract and its PostgreSQL implementation
//!
//! The store owns the identity record. Uniqueness of usernames is enforced
//! here, atomically, by the unique index on `users.username`; callers treat
//! their own existence checks as a fast path only.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::{NewUser, Photo, User};

/// Failure kinds the store reports
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record violates a uniqueness constraint
    #[error("record conflicts with an existing identity")]
    Conflict,

    /// The store could not be reached or the operation timed out
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Conflict;
            }
        }
        StoreError::Unavailable(e.to_string())
    }
}

/// Persistence contract for identity records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether an identity with this (normalized) username exists
    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;

    /// Create an identity record. Fails with `Conflict` if the username is
    /// already taken at insertion time.
    async fn create(&self, record: NewUser) -> Result<User, StoreError>;

    /// Look up an identity by (normalized) username, photos included
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

/// PostgreSQL-backed credential store
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn load_photos(&self, user_id: Uuid) -> Result<Vec<Photo>, StoreError> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, url, is_main FROM photos WHERE user_id = $1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(photos)
    }
}

#[async_trait]
impl CredentialStore for PgUserStore {
    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn create(&self, record: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_digest, password_salt, known_as, profile)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.username)
        .bind(&record.password_digest)
        .bind(&record.password_salt)
        .bind(&record.known_as)
        .bind(&record.profile)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        match user {
            Some(mut user) => {
                user.photos = self.load_photos(user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}
