//! Domain service for admin authentication.
//!
//! Handles first-start bootstrap, login, registration, password changes and
//! bearer token validation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::StoreError;
use crate::services::token::TokenError;

/// Username seeded into an empty store at first start.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Password seeded alongside [`DEFAULT_ADMIN_USERNAME`]; operators are told to change it.
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    /// Unknown username and wrong password are deliberately indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed, tampered or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn admin_exists() -> Self {
        Self::Conflict("Admin user already exists".to_string())
    }

    pub(crate) fn admin_not_found() -> Self {
        Self::NotFound("Admin not found".to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(_) => Self::admin_exists(),
            StoreError::Database(msg) => Self::Database(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid(_) => Self::Unauthorized,
            TokenError::Signing(msg) => Self::Internal(msg),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity asserted by a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The store was empty and the default account was created.
    Created { username: String },

    AlreadyInitialized,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Seeds the default admin when no account exists; a no-op otherwise.
    async fn bootstrap(&self) -> Result<BootstrapOutcome, AuthError>;

    /// Verifies credentials and mints a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for empty fields and
    /// [`AuthError::InvalidCredentials`] for any credential mismatch.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Creates a new admin account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the username is taken.
    async fn register(&self, username: &str, password: &str) -> Result<(), AuthError>;

    /// Replaces the password of the account `admin_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] if the account is gone and
    /// [`AuthError::Validation`] if `current_password` does not verify.
    async fn change_password(
        &self,
        admin_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Validates a bearer token and returns the identity it asserts.
    fn authenticate(&self, token: &str) -> Result<AuthenticatedAdmin, AuthError>;
}
