use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{AdminAccount, AdminStore, NewAdmin, StoreError};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path) = sqlite_file_path(db_url)
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }

        let mut opt = ConnectOptions::new(with_create_mode(db_url));
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply database migrations")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl AdminStore for Store {
    async fn count(&self) -> Result<u64, StoreError> {
        self.admin_repo().count().await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError> {
        self.admin_repo().get_by_username(username).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<AdminAccount>, StoreError> {
        self.admin_repo().get_by_id(id).await
    }

    async fn insert(&self, admin: NewAdmin) -> Result<AdminAccount, StoreError> {
        self.admin_repo().insert(admin).await
    }

    async fn update_password_hash(
        &self,
        id: i32,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        self.admin_repo()
            .update_password_hash(id, password_hash)
            .await
    }
}

/// Filesystem path of a file-backed SQLite URL, `None` for anything else.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

/// SQLite refuses to open a missing file unless asked to create it.
fn with_create_mode(db_url: &str) -> String {
    if sqlite_file_path(db_url).is_some() && !db_url.contains("mode=") {
        let separator = if db_url.contains('?') { '&' } else { '?' };
        format!("{db_url}{separator}mode=rwc")
    } else {
        db_url.to_string()
    }
}
