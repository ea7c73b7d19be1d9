use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};

use crate::domain::{AdminAccount, NewAdmin, StoreError};
use crate::entities::admins;

impl From<admins::Model> for AdminAccount {
    fn from(model: admins::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            created_at: model.created_at,
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

pub struct AdminRepository {
    conn: DatabaseConnection,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        Ok(admins::Entity::find().count(&self.conn).await?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError> {
        let admin = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(admin.map(AdminAccount::from))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<AdminAccount>, StoreError> {
        let admin = admins::Entity::find_by_id(id).one(&self.conn).await?;

        Ok(admin.map(AdminAccount::from))
    }

    /// The unique index on `username` decides concurrent inserts.
    pub async fn insert(&self, admin: NewAdmin) -> Result<AdminAccount, StoreError> {
        let username = admin.username.clone();

        let active = admins::ActiveModel {
            id: NotSet,
            username: Set(admin.username),
            password_hash: Set(admin.password_hash),
            created_at: Set(admin.created_at),
        };

        let model = active
            .insert(&self.conn)
            .await
            .map_err(|e| map_insert_error(e, &username))?;

        Ok(AdminAccount::from(model))
    }

    pub async fn update_password_hash(
        &self,
        id: i32,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = admins::Entity::update_many()
            .col_expr(admins::Column::PasswordHash, Expr::value(password_hash))
            .filter(admins::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn map_insert_error(err: DbErr, username: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            StoreError::DuplicateUsername(username.to_string())
        }
        _ => StoreError::from(err),
    }
}
