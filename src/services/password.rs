//! Argon2id password hashing.
//!
//! Hashing and verification are CPU-bound and deliberately slow, so both run
//! on tokio's blocking pool instead of an async worker.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::services::auth_service::AuthError;

#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: &SecurityConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Produces a PHC string with a fresh random salt.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();

        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::Internal(format!("Failed to hash password: {e}")))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
    }

    /// Checks `password` against a stored PHC string.
    ///
    /// The parameters embedded in the hash are used, so hashes produced under
    /// older settings keep verifying.
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| AuthError::Internal(format!("Invalid password hash format: {e}")))?;

            Ok(argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Admin@123").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Admin@123"));
        assert!(hasher.verify("Admin@123", &hash).await.unwrap());
        assert!(!hasher.verify("admin@123", &hash).await.unwrap());
        assert!(!hasher.verify("", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_is_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("same-password").await.unwrap();
        let second = hasher.hash("same-password").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_verify_uses_embedded_params() {
        let old = fast_hasher();
        let hash = old.hash("rotate-me").await.unwrap();

        let new = PasswordHasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 2048,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
        })
        .unwrap();
        assert!(new.verify("rotate-me", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        let hasher = fast_hasher();
        let result = hasher.verify("anything", "not-a-phc-string").await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let result = PasswordHasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 0,
            argon2_parallelism: 1,
        });
        assert!(result.is_err());
    }
}
