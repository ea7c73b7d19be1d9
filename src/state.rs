use anyhow::Context;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, CredentialAuthority};

#[derive(Clone)]
pub struct SharedState {
    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    /// Connects the store, applies migrations and seeds the default admin.
    ///
    /// Any failure here is fatal to startup.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth_service = Arc::new(
            CredentialAuthority::new(Arc::new(store.clone()), &config.jwt, &config.security)
                .context("Failed to build credential authority")?,
        ) as Arc<dyn AuthService>;

        auth_service
            .bootstrap()
            .await
            .context("Failed to bootstrap admin account")?;

        Ok(Self {
            store,
            auth_service,
        })
    }
}
