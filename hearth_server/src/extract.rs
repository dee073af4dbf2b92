use axum::{extract::FromRequestParts, http::request::Parts};
use hearth_core::{
    auth::{Requester, Role},
    ids::UserId,
};
use tracing::debug;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity asserted by the fronting auth layer. A missing or unparsable
/// user id is a 401; a missing role means `USER`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Requester);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let role = match parts.headers.get(USER_ROLE_HEADER) {
            None => Role::User,
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|value| value.trim().parse::<Role>().ok())
                .ok_or(ApiError::Unauthenticated)?,
        };

        debug!(%user_id, %role, "authenticated request");
        Ok(AuthUser(Requester::new(user_id, role)))
    }
}
