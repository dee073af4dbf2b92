use std::{fmt, str::FromStr, sync::Arc};

use chrono::Duration;
use rand::Rng;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    clock::Clock,
    config::VerificationSettings,
    entity::prelude::*,
    ids::VerificationCodeId,
    service::sms::{SmsError, SmsSender},
};

const CODE_DIGITS: usize = 6;

/// What a verification code may be spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeKind {
    #[default]
    Register,
    Login,
    ResetPwd,
    ChangePwd,
}

#[derive(Debug, Error)]
#[error("unknown verification code type: {0}")]
pub struct UnknownCodeKind(String);

impl CodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeKind::Register => "REGISTER",
            CodeKind::Login => "LOGIN",
            CodeKind::ResetPwd => "RESET_PWD",
            CodeKind::ChangePwd => "CHANGE_PWD",
        }
    }
}

impl FromStr for CodeKind {
    type Err = UnknownCodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REGISTER" => Ok(CodeKind::Register),
            "LOGIN" => Ok(CodeKind::Login),
            "RESET_PWD" => Ok(CodeKind::ResetPwd),
            "CHANGE_PWD" => Ok(CodeKind::ChangePwd),
            _ => Err(UnknownCodeKind(s.to_string())),
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum VerificationServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("invalid phone number")]
    InvalidPhone,

    #[error("verification code must be 6 digits")]
    InvalidCodeFormat,

    #[error("verification code is invalid or expired")]
    CodeRejected,

    #[error("failed to deliver verification code")]
    Delivery(#[from] SmsError),
}

/// Mainland mobile numbers: 11 digits, `1` then `3`..=`9`.
pub fn is_valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1])
}

fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Clone)]
pub struct VerificationService {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    sms: Arc<dyn SmsSender>,
    settings: VerificationSettings,
}

impl VerificationService {
    pub fn new(
        db: DatabaseConnection,
        clock: Arc<dyn Clock>,
        sms: Arc<dyn SmsSender>,
        settings: VerificationSettings,
    ) -> Self {
        Self {
            db,
            clock,
            sms,
            settings,
        }
    }

    /// Generates, delivers and stores a fresh code. Only delivered codes are
    /// stored.
    pub async fn issue_code(
        &self,
        phone: &str,
        kind: CodeKind,
    ) -> Result<VerificationCodeModel, VerificationServiceError> {
        if !is_valid_phone(phone) {
            return Err(VerificationServiceError::InvalidPhone);
        }

        let code = rand::rng().random_range(100_000..=999_999u32).to_string();
        self.sms.send_code(phone, &code).await?;

        let now = self.clock.now();
        let record = VerificationCodeActiveModel {
            id: Set(VerificationCodeId::new()),
            phone: Set(phone.to_string()),
            code: Set(code),
            kind: Set(kind.as_str().to_string()),
            expires_at: Set(now + Duration::minutes(self.settings.code_ttl_minutes)),
            created_at: Set(now),
        };

        let record = VerificationCode::insert(record)
            .exec_with_returning(&self.db)
            .await?;
        info!(%phone, kind = %kind, expires_at = %record.expires_at, "verification code issued");

        Ok(record)
    }

    /// Spends the newest live code matching all three fields.
    pub async fn consume_code(
        &self,
        phone: &str,
        kind: CodeKind,
        code: &str,
    ) -> Result<(), VerificationServiceError> {
        if !is_valid_phone(phone) {
            return Err(VerificationServiceError::InvalidPhone);
        }
        if !is_valid_code(code) {
            return Err(VerificationServiceError::InvalidCodeFormat);
        }

        let record = VerificationCode::find()
            .filter(VerificationCodeColumn::Phone.eq(phone))
            .filter(VerificationCodeColumn::Kind.eq(kind.as_str()))
            .filter(VerificationCodeColumn::Code.eq(code))
            .filter(VerificationCodeColumn::ExpiresAt.gte(self.clock.now()))
            .order_by_desc(VerificationCodeColumn::CreatedAt)
            .order_by_desc(VerificationCodeColumn::Id)
            .one(&self.db)
            .await?
            .ok_or(VerificationServiceError::CodeRejected)?;

        record.delete(&self.db).await?;
        debug!(%phone, kind = %kind, "verification code consumed");

        Ok(())
    }
}
