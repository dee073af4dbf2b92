use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::HearthConfig;

pub mod migrator;
pub mod views;

pub async fn open_or_create_db(config: &HearthConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    // sqlx statement logging is far too chatty at info
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(url = %config.database_url, "connected to database");
    Ok(db)
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
