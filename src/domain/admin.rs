//! Admin accounts and the storage port the credential authority depends on.
//!
//! The authority never talks to an ORM directly; anything that can look
//! accounts up, insert them atomically under a unique `username`, and
//! overwrite a password hash can back it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Upper bound on `username`, mirrored by the column width.
pub const MAX_USERNAME_LEN: usize = 50;

/// A stored operator identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// An account to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's uniqueness constraint rejected the insert.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn count(&self) -> Result<u64, StoreError>;

    /// Exact, case-sensitive match.
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<AdminAccount>, StoreError>;

    /// Must fail with [`StoreError::DuplicateUsername`] when the username is
    /// taken, even if a concurrent writer inserted it after any prior read.
    async fn insert(&self, admin: NewAdmin) -> Result<AdminAccount, StoreError>;

    /// Returns `false` when no account has `id`.
    async fn update_password_hash(&self, id: i32, password_hash: &str)
    -> Result<bool, StoreError>;
}
