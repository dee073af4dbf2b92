use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use hearth_core::{
    entity::prelude::UserModel, service::verification::CodeKind, HearthCore,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    extract::AuthUser,
    response::ApiResponse,
};

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
    /// Defaults to `REGISTER`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeOutcome {
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SmsLoginRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub phone: String,
    pub code: String,
    pub nickname: String,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordLoginRequest {
    pub phone: String,
    pub password: String,
}

/// Body of both the reset and the change flow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    pub phone: String,
    pub code: String,
    pub new_password: String,
}

pub async fn send_code(
    State(core): State<HearthCore>,
    body: Result<Json<SendCodeRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<SendCodeOutcome>> {
    let Json(body) = body?;
    let kind = match body.kind.as_deref() {
        None => CodeKind::default(),
        Some(kind) => kind.parse::<CodeKind>().map_err(ApiError::app_validation)?,
    };

    let record = core.verification.issue_code(body.phone.trim(), kind).await?;

    Ok(ApiResponse::ok(SendCodeOutcome {
        expires_at: record.expires_at,
    })
    .with_message("verification code sent"))
}

pub async fn sms_login(
    State(core): State<HearthCore>,
    body: Result<Json<SmsLoginRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<UserModel>> {
    let Json(body) = body?;
    let user = core
        .accounts
        .sms_login(body.phone.trim(), body.code.trim())
        .await?;

    Ok(ApiResponse::ok(user).with_message("signed in"))
}

pub async fn register(
    State(core): State<HearthCore>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<UserModel>> {
    let Json(body) = body?;
    let user = core
        .accounts
        .register(
            body.phone.trim(),
            body.code.trim(),
            &body.nickname,
            body.password.as_deref(),
        )
        .await?;

    Ok(ApiResponse::created(user).with_message("registered"))
}

pub async fn password_login(
    State(core): State<HearthCore>,
    body: Result<Json<PasswordLoginRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<UserModel>> {
    let Json(body) = body?;
    let user = core
        .accounts
        .password_login(body.phone.trim(), &body.password)
        .await?;

    Ok(ApiResponse::ok(user).with_message("signed in"))
}

pub async fn reset_password(
    State(core): State<HearthCore>,
    body: Result<Json<NewPasswordRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<()>> {
    let Json(body) = body?;
    core.accounts
        .reset_password(body.phone.trim(), body.code.trim(), &body.new_password)
        .await?;

    Ok(ApiResponse::ok(()).with_message("password reset"))
}

pub async fn change_password(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
    body: Result<Json<NewPasswordRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<()>> {
    let Json(body) = body?;
    core.accounts
        .change_password(
            requester.user_id,
            body.phone.trim(),
            body.code.trim(),
            &body.new_password,
        )
        .await?;

    Ok(ApiResponse::ok(()).with_message("password changed"))
}
