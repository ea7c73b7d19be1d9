//! Credential authority: the [`AuthService`] implementation over an [`AdminStore`].

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::{JwtConfig, SecurityConfig};
use crate::domain::{AdminStore, MAX_USERNAME_LEN, NewAdmin, StoreError};
use crate::services::auth_service::{
    AuthError, AuthService, AuthenticatedAdmin, BootstrapOutcome, DEFAULT_ADMIN_PASSWORD,
    DEFAULT_ADMIN_USERNAME, LoginResult,
};
use crate::services::password::PasswordHasher;
use crate::services::token::TokenIssuer;

pub struct CredentialAuthority {
    store: Arc<dyn AdminStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    /// Verified against when the username is unknown, so both login failures cost the same.
    dummy_hash: OnceCell<String>,
}

impl CredentialAuthority {
    pub fn new(
        store: Arc<dyn AdminStore>,
        jwt: &JwtConfig,
        security: &SecurityConfig,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            store,
            hasher: PasswordHasher::new(security)?,
            tokens: TokenIssuer::new(jwt),
            dummy_hash: OnceCell::new(),
        })
    }

    async fn dummy_hash(&self) -> Result<&str, AuthError> {
        self.dummy_hash
            .get_or_try_init(|| self.hasher.hash("gymdesk-timing-equalizer"))
            .await
            .map(String::as_str)
    }
}

fn require_both(first: &str, second: &str, message: &str) -> Result<(), AuthError> {
    if first.is_empty() || second.is_empty() {
        return Err(AuthError::validation(message));
    }
    Ok(())
}

#[async_trait]
impl AuthService for CredentialAuthority {
    async fn bootstrap(&self) -> Result<BootstrapOutcome, AuthError> {
        if self.store.count().await? > 0 {
            return Ok(BootstrapOutcome::AlreadyInitialized);
        }

        let password_hash = self.hasher.hash(DEFAULT_ADMIN_PASSWORD).await?;
        let admin = NewAdmin {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        match self.store.insert(admin).await {
            Ok(_) => {}
            // Another instance seeded the store first
            Err(StoreError::DuplicateUsername(_)) => {
                return Ok(BootstrapOutcome::AlreadyInitialized);
            }
            Err(e) => return Err(e.into()),
        }

        warn!("========================================");
        warn!("DEFAULT ADMIN CREATED:");
        warn!("Username: {DEFAULT_ADMIN_USERNAME}");
        warn!("Password: {DEFAULT_ADMIN_PASSWORD}");
        warn!("PLEASE CHANGE THIS PASSWORD IMMEDIATELY!");
        warn!("========================================");

        Ok(BootstrapOutcome::Created {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        require_both(username, password, "Username and password are required")?;

        let account = self.store.find_by_username(username).await?;

        let verified = if let Some(account) = &account {
            self.hasher.verify(password, &account.password_hash).await?
        } else {
            let dummy = self.dummy_hash().await?;
            let _ = self.hasher.verify(password, dummy).await?;
            false
        };

        let Some(account) = account.filter(|_| verified) else {
            metrics::counter!("auth_login_total", "outcome" => "failure").increment(1);
            info!(event = "login_failed", "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let issued = self.tokens.issue(account.id, &account.username)?;

        metrics::counter!("auth_login_total", "outcome" => "success").increment(1);
        info!(event = "login_succeeded", admin_id = account.id, "Admin logged in");

        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        require_both(username, password, "Username and password are required")?;

        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AuthError::validation(format!(
                "Username must be {MAX_USERNAME_LEN} characters or less"
            )));
        }

        // Fast path only; the unique index settles races
        if self.store.find_by_username(username).await?.is_some() {
            metrics::counter!("auth_register_total", "outcome" => "conflict").increment(1);
            return Err(AuthError::admin_exists());
        }

        let password_hash = self.hasher.hash(password).await?;
        let created = self
            .store
            .insert(NewAdmin {
                username: username.to_string(),
                password_hash,
                created_at: Utc::now(),
            })
            .await
            .inspect_err(|e| {
                if matches!(e, StoreError::DuplicateUsername(_)) {
                    metrics::counter!("auth_register_total", "outcome" => "conflict")
                        .increment(1);
                }
            })?;

        metrics::counter!("auth_register_total", "outcome" => "success").increment(1);
        info!(
            event = "admin_registered",
            admin_id = created.id,
            username = %created.username,
            "Admin registered"
        );

        Ok(())
    }

    async fn change_password(
        &self,
        admin_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        require_both(
            current_password,
            new_password,
            "Current password and new password are required",
        )?;

        let account = self
            .store
            .find_by_id(admin_id)
            .await?
            .ok_or_else(AuthError::admin_not_found)?;

        if !self
            .hasher
            .verify(current_password, &account.password_hash)
            .await?
        {
            return Err(AuthError::validation("Current password is incorrect"));
        }

        let new_hash = self.hasher.hash(new_password).await?;
        if !self
            .store
            .update_password_hash(account.id, &new_hash)
            .await?
        {
            return Err(AuthError::admin_not_found());
        }

        info!(event = "password_changed", admin_id = account.id, "Password changed");

        Ok(())
    }

    fn authenticate(&self, token: &str) -> Result<AuthenticatedAdmin, AuthError> {
        let claims = self.tokens.validate(token)?;

        Ok(AuthenticatedAdmin {
            id: claims.admin_id,
            username: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AdminAccount;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory port that enforces username uniqueness under one lock.
    #[derive(Default)]
    struct MemoryStore {
        admins: Mutex<Vec<AdminAccount>>,
    }

    #[async_trait]
    impl AdminStore for MemoryStore {
        async fn count(&self) -> Result<u64, StoreError> {
            Ok(self.admins.lock().unwrap().len() as u64)
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<AdminAccount>, StoreError> {
            let admins = self.admins.lock().unwrap();
            Ok(admins.iter().find(|a| a.username == username).cloned())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<AdminAccount>, StoreError> {
            let admins = self.admins.lock().unwrap();
            Ok(admins.iter().find(|a| a.id == id).cloned())
        }

        async fn insert(&self, admin: NewAdmin) -> Result<AdminAccount, StoreError> {
            let mut admins = self.admins.lock().unwrap();
            if admins.iter().any(|a| a.username == admin.username) {
                return Err(StoreError::DuplicateUsername(admin.username));
            }
            let account = AdminAccount {
                id: i32::try_from(admins.len()).unwrap() + 1,
                username: admin.username,
                password_hash: admin.password_hash,
                created_at: admin.created_at,
            };
            admins.push(account.clone());
            Ok(account)
        }

        async fn update_password_hash(
            &self,
            id: i32,
            password_hash: &str,
        ) -> Result<bool, StoreError> {
            let mut admins = self.admins.lock().unwrap();
            Ok(admins
                .iter_mut()
                .find(|a| a.id == id)
                .map(|a| a.password_hash = password_hash.to_string())
                .is_some())
        }
    }

    fn authority(store: Arc<MemoryStore>) -> CredentialAuthority {
        let jwt = JwtConfig {
            key: "unit-test-signing-key-0123456789abcdef".to_string(),
            issuer: "gymdesk".to_string(),
            audience: "gymdesk-dashboard".to_string(),
            expiry_in_minutes: 30,
        };
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        CredentialAuthority::new(store, &jwt, &security).unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_once() {
        let store = Arc::new(MemoryStore::default());
        let auth = authority(store.clone());

        assert_eq!(
            auth.bootstrap().await.unwrap(),
            BootstrapOutcome::Created {
                username: "admin".to_string()
            }
        );
        assert_eq!(
            auth.bootstrap().await.unwrap(),
            BootstrapOutcome::AlreadyInitialized
        );
        assert_eq!(store.count().await.unwrap(), 1);

        let seeded = store.find_by_username("admin").await.unwrap().unwrap();
        assert_ne!(seeded.password_hash, DEFAULT_ADMIN_PASSWORD);
        auth.login("admin", "Admin@123").await.unwrap();
    }

    #[tokio::test]
    async fn test_bootstrap_skips_non_empty_store() {
        let store = Arc::new(MemoryStore::default());
        let auth = authority(store.clone());
        auth.register("owner", "secret").await.unwrap();

        assert_eq!(
            auth.bootstrap().await.unwrap(),
            BootstrapOutcome::AlreadyInitialized
        );
        assert!(store.find_by_username("admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_issues_token_for_account() {
        let store = Arc::new(MemoryStore::default());
        let auth = authority(store);
        auth.register("coach", "pa55word").await.unwrap();

        let before = Utc::now();
        let result = auth.login("coach", "pa55word").await.unwrap();
        let expected = before + chrono::Duration::minutes(30);
        assert!((result.expires_at - expected).num_seconds().abs() <= 5);

        let who = auth.authenticate(&result.token).unwrap();
        assert_eq!(who.username, "coach");
        assert_eq!(who.id, 1);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let store = Arc::new(MemoryStore::default());
        let auth = authority(store);
        auth.register("coach", "pa55word").await.unwrap();

        let wrong_password = auth.login("coach", "nope").await.unwrap_err();
        let unknown_user = auth.login("ghost", "pa55word").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_is_case_sensitive() {
        let store = Arc::new(MemoryStore::default());
        let auth = authority(store);
        auth.register("Coach", "pa55word").await.unwrap();

        assert!(matches!(
            auth.login("coach", "pa55word").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_empty_fields_are_validation_errors() {
        let auth = authority(Arc::new(MemoryStore::default()));

        assert!(matches!(auth.login("", "x").await, Err(AuthError::Validation(_))));
        assert!(matches!(auth.login("x", "").await, Err(AuthError::Validation(_))));
        assert!(matches!(auth.register("", "x").await, Err(AuthError::Validation(_))));
        assert!(matches!(
            auth.change_password(1, "", "x").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_long_username() {
        let auth = authority(Arc::new(MemoryStore::default()));

        let err = auth.register(&"a".repeat(51), "x").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        auth.register(&"a".repeat(50), "x").await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_register_conflicts_and_keeps_password() {
        let store = Arc::new(MemoryStore::default());
        let auth = authority(store);
        auth.register("coach", "original").await.unwrap();

        let err = auth.register("coach", "hijack").await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));

        auth.login("coach", "original").await.unwrap();
        assert!(auth.login("coach", "hijack").await.is_err());
    }

    #[tokio::test]
    async fn test_change_password() {
        let store = Arc::new(MemoryStore::default());
        let auth = authority(store.clone());
        auth.register("coach", "old-pass").await.unwrap();

        let err = auth.change_password(1, "wrong", "new-pass").await.unwrap_err();
        assert_eq!(err.to_string(), "Current password is incorrect");
        auth.login("coach", "old-pass").await.unwrap();

        auth.change_password(1, "old-pass", "new-pass").await.unwrap();
        assert!(auth.login("coach", "old-pass").await.is_err());
        auth.login("coach", "new-pass").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_for_missing_account() {
        let auth = authority(Arc::new(MemoryStore::default()));
        let err = auth.change_password(42, "a", "b").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let auth = authority(Arc::new(MemoryStore::default()));
        assert!(matches!(
            auth.authenticate("not-a-token"),
            Err(AuthError::Unauthorized)
        ));
    }
}
