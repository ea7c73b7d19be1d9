use sea_orm_migration::prelude::*;

mod m20260206_create_admins;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260206_create_admins::Migration)]
    }
}
