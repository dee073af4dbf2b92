use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::Role,
    entity::prelude::*,
    ids::UserId,
    password,
    service::{
        users::{UsersService, UsersServiceError},
        verification::{is_valid_phone, CodeKind, VerificationService, VerificationServiceError},
    },
};

#[derive(Debug, Error)]
pub enum AccountsServiceError {
    #[error(transparent)]
    Users(#[from] UsersServiceError),

    #[error(transparent)]
    Verification(#[from] VerificationServiceError),

    #[error("no account is registered for this phone")]
    AccountNotFound,

    #[error("phone or password is incorrect")]
    InvalidCredentials,

    #[error("phone does not match the signed-in account")]
    PhoneMismatch,
}

/// Phone-code and password sign-in on top of users and verification codes.
///
/// Every flow validates its inputs and looks the account up before a code is
/// spent, so a request that fails for any other reason leaves the code usable.
#[derive(Clone)]
pub struct AccountsService {
    users: UsersService,
    verification: VerificationService,
}

impl AccountsService {
    pub fn new(users: UsersService, verification: VerificationService) -> Self {
        Self {
            users,
            verification,
        }
    }

    async fn account_for(&self, phone: &str) -> Result<UserModel, AccountsServiceError> {
        if !is_valid_phone(phone) {
            return Err(VerificationServiceError::InvalidPhone.into());
        }

        self.users
            .find_by_phone(phone)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)
    }

    pub async fn sms_login(&self, phone: &str, code: &str) -> Result<UserModel, AccountsServiceError> {
        let user = self.account_for(phone).await?;

        self.verification
            .consume_code(phone, CodeKind::Login, code)
            .await?;

        info!(user_id = %user.id, "sms login");
        Ok(user)
    }

    /// Unknown phones and wrong passwords are indistinguishable to the caller.
    pub async fn password_login(
        &self,
        phone: &str,
        password: &str,
    ) -> Result<UserModel, AccountsServiceError> {
        let user = match self.account_for(phone).await {
            Ok(user) => user,
            Err(AccountsServiceError::AccountNotFound) => {
                return Err(AccountsServiceError::InvalidCredentials)
            }
            Err(error) => return Err(error),
        };

        let verified = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| password::verify_password(password, hash));
        if !verified {
            warn!(user_id = %user.id, "password login rejected");
            return Err(AccountsServiceError::InvalidCredentials);
        }

        info!(user_id = %user.id, "password login");
        Ok(user)
    }

    pub async fn register(
        &self,
        phone: &str,
        code: &str,
        nickname: &str,
        password: Option<&str>,
    ) -> Result<UserModel, AccountsServiceError> {
        if !is_valid_phone(phone) {
            return Err(VerificationServiceError::InvalidPhone.into());
        }
        if let Some(password) = password {
            password::check_strength(password).map_err(UsersServiceError::from)?;
        }
        if self.users.find_by_phone(phone).await?.is_some() {
            return Err(UsersServiceError::PhoneTaken.into());
        }

        self.verification
            .consume_code(phone, CodeKind::Register, code)
            .await?;

        let mut user = self
            .users
            .create_user(nickname, None, Some(phone.to_string()), Role::User)
            .await?;
        if let Some(password) = password {
            user = self.users.set_password(user.id, password).await?;
        }

        Ok(user)
    }

    /// Forgotten-password flow, spends a `RESET_PWD` code.
    pub async fn reset_password(
        &self,
        phone: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AccountsServiceError> {
        password::check_strength(new_password).map_err(UsersServiceError::from)?;
        let user = self.account_for(phone).await?;

        self.verification
            .consume_code(phone, CodeKind::ResetPwd, code)
            .await?;
        self.users.set_password(user.id, new_password).await?;

        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Signed-in flow, spends a `CHANGE_PWD` code sent to the account's own
    /// phone.
    pub async fn change_password(
        &self,
        user_id: UserId,
        phone: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AccountsServiceError> {
        let user = self.users.get_user(user_id).await?;
        if user.phone.as_deref() != Some(phone) {
            return Err(AccountsServiceError::PhoneMismatch);
        }
        if !is_valid_phone(phone) {
            return Err(VerificationServiceError::InvalidPhone.into());
        }
        password::check_strength(new_password).map_err(UsersServiceError::from)?;

        self.verification
            .consume_code(phone, CodeKind::ChangePwd, code)
            .await?;
        self.users.set_password(user.id, new_password).await?;

        info!(user_id = %user.id, "password changed");
        Ok(())
    }
}
