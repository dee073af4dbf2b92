use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use crate::auth::Role;
use crate::entity::prelude::*;
use crate::ids::UserId;
use crate::models::migrator::Migrator;

/// Fixed instant tests start their `ManualClock` at.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// Fresh in-memory SQLite database with every migration applied.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn create_test_user(db: &DatabaseConnection, nickname: &str) -> UserId {
    create_test_user_with_role(db, nickname, Role::User).await
}

pub async fn create_test_user_with_role(
    db: &DatabaseConnection,
    nickname: &str,
    role: Role,
) -> UserId {
    let user_id = UserId::new();
    let user = UserActiveModel {
        id: Set(user_id),
        nickname: Set(nickname.to_string()),
        avatar: Set(None),
        phone: Set(None),
        role: Set(role.as_str().to_string()),
        password_hash: Set(None),
        created_at: Set(start_time()),
    };
    User::insert(user).exec(db).await.unwrap();
    user_id
}
