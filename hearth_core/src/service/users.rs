use std::sync::Arc;

use sea_orm::DatabaseConnection;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::Role,
    clock::Clock,
    entity::prelude::*,
    ids::UserId,
    password::{self, PasswordError},
};

const MAX_NICKNAME_CHARS: usize = 32;

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("phone number is already registered")]
    PhoneTaken,

    #[error("nickname must be 1 to 32 characters")]
    InvalidNickname,

    #[error(transparent)]
    Password(#[from] PasswordError),
}

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl UsersService {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub async fn create_user(
        &self,
        nickname: &str,
        avatar: Option<String>,
        phone: Option<String>,
        role: Role,
    ) -> Result<UserModel, UsersServiceError> {
        let nickname = nickname.trim();
        let length = nickname.chars().count();
        if length == 0 || length > MAX_NICKNAME_CHARS {
            return Err(UsersServiceError::InvalidNickname);
        }

        if let Some(phone) = phone.as_deref() {
            if self.find_by_phone(phone).await?.is_some() {
                return Err(UsersServiceError::PhoneTaken);
            }
        }

        let user = UserActiveModel {
            id: Set(UserId::new()),
            nickname: Set(nickname.to_string()),
            avatar: Set(avatar),
            phone: Set(phone),
            role: Set(role.as_str().to_string()),
            password_hash: Set(None),
            created_at: Set(self.clock.now()),
        };

        let user = User::insert(user).exec_with_returning(&self.db).await?;
        info!(user_id = %user.id, role = %role, "user created");

        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<UserModel, UsersServiceError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::UserNotFound)
    }

    /// Replaces the stored hash. The plaintext is never persisted.
    pub async fn set_password(
        &self,
        user_id: UserId,
        password: &str,
    ) -> Result<UserModel, UsersServiceError> {
        let user = self.get_user(user_id).await?;
        let hash = password::hash_password(password)?;

        let mut user: UserActiveModel = user.into();
        user.password_hash = Set(Some(hash));
        let user = user.update(&self.db).await?;
        info!(user_id = %user.id, "password updated");

        Ok(user)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<UserModel>, UsersServiceError> {
        let user = User::find()
            .filter(UserColumn::Phone.eq(phone))
            .one(&self.db)
            .await?;

        Ok(user)
    }
}
