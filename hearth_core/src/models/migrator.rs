use sea_orm_migration::prelude::*;

mod m20261019_000001_create_user_table;
mod m20261019_000002_create_post_table;
mod m20261019_000003_create_reply_table;
mod m20261019_000004_create_notification_table;
mod m20261019_000005_create_verification_code_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_user_table::Migration),
            Box::new(m20261019_000002_create_post_table::Migration),
            Box::new(m20261019_000003_create_reply_table::Migration),
            Box::new(m20261019_000004_create_notification_table::Migration),
            Box::new(m20261019_000005_create_verification_code_table::Migration),
        ]
    }
}

#[cfg(test)]
use sea_orm::{Database, DbErr};

#[tokio::test]
async fn test_migrations_okay() -> Result<(), DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let schema_manager = SchemaManager::new(&db);

    Migrator::refresh(&db).await?;

    assert!(schema_manager.has_table("user").await?);
    assert!(schema_manager.has_table("post").await?);
    assert!(schema_manager.has_table("reply").await?);
    assert!(schema_manager.has_table("notification").await?);
    assert!(schema_manager.has_table("verification_code").await?);
    assert!(schema_manager.has_column("reply", "parent_id").await?);

    Ok(())
}
