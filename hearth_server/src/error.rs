use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hearth_core::{
    password::PasswordError,
    service::{
        accounts::AccountsServiceError, notifications::NotificationsServiceError,
        posts::PostsServiceError, users::UsersServiceError,
        verification::VerificationServiceError,
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can report. App errors carry a message safe to
/// show the caller; infra errors are logged and replaced by a generic one.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    BadCredentials(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    RateLimited {
        message: String,
        remaining_seconds: Option<u64>,
    },

    #[error("internal server error")]
    Internal(#[source] BoxError),
}

impl ApiError {
    pub fn app_validation(error: impl std::fmt::Display) -> Self {
        ApiError::Validation(error.to_string())
    }

    pub fn infra(error: impl Into<BoxError>) -> Self {
        ApiError::Internal(error.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated | ApiError::BadCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_seconds: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            error!(error = %source, details = ?source, "request failed");
        }

        let remaining_seconds = match &self {
            ApiError::RateLimited {
                remaining_seconds, ..
            } => *remaining_seconds,
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            remaining_seconds,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PostsServiceError> for ApiError {
    fn from(error: PostsServiceError) -> Self {
        match error {
            PostsServiceError::DbError(error) => ApiError::infra(error),
            PostsServiceError::InvalidContent(error) => ApiError::app_validation(error),
            PostsServiceError::RateLimited {
                message,
                remaining_seconds,
            } => ApiError::RateLimited {
                message,
                remaining_seconds,
            },
            PostsServiceError::UserNotFound => ApiError::Unauthenticated,
            error @ (PostsServiceError::PostNotFound
            | PostsServiceError::ReplyNotFound
            | PostsServiceError::ParentReplyNotFound) => ApiError::NotFound(error.to_string()),
            error @ PostsServiceError::Forbidden => ApiError::Forbidden(error.to_string()),
        }
    }
}

impl From<NotificationsServiceError> for ApiError {
    fn from(error: NotificationsServiceError) -> Self {
        match error {
            NotificationsServiceError::DbError(error) => ApiError::infra(error),
            error @ NotificationsServiceError::NotificationNotFound => {
                ApiError::NotFound(error.to_string())
            }
            error @ NotificationsServiceError::Forbidden => ApiError::Forbidden(error.to_string()),
        }
    }
}

impl From<UsersServiceError> for ApiError {
    fn from(error: UsersServiceError) -> Self {
        match error {
            UsersServiceError::DbError(error) => ApiError::infra(error),
            error @ UsersServiceError::UserNotFound => ApiError::NotFound(error.to_string()),
            error @ (UsersServiceError::PhoneTaken | UsersServiceError::InvalidNickname) => {
                ApiError::app_validation(error)
            }
            UsersServiceError::Password(error) => error.into(),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(error: PasswordError) -> Self {
        match error {
            error @ PasswordError::TooShort => ApiError::app_validation(error),
            error @ PasswordError::Hash(_) => ApiError::infra(error),
        }
    }
}

impl From<VerificationServiceError> for ApiError {
    fn from(error: VerificationServiceError) -> Self {
        match error {
            VerificationServiceError::DbError(error) => ApiError::infra(error),
            VerificationServiceError::Delivery(error) => ApiError::infra(error),
            error @ (VerificationServiceError::InvalidPhone
            | VerificationServiceError::InvalidCodeFormat
            | VerificationServiceError::CodeRejected) => ApiError::app_validation(error),
        }
    }
}

impl From<AccountsServiceError> for ApiError {
    fn from(error: AccountsServiceError) -> Self {
        match error {
            AccountsServiceError::Users(error) => error.into(),
            AccountsServiceError::Verification(error) => error.into(),
            error @ AccountsServiceError::AccountNotFound => ApiError::NotFound(error.to_string()),
            error @ AccountsServiceError::InvalidCredentials => {
                ApiError::BadCredentials(error.to_string())
            }
            error @ AccountsServiceError::PhoneMismatch => ApiError::Forbidden(error.to_string()),
        }
    }
}
