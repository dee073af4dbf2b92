use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};
use hearth_core::{
    entity::prelude::NotificationModel,
    ids::NotificationId,
    models::views::{NotificationPage, PageRequest},
    HearthCore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, extract::AuthUser, response::ApiResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkAllOutcome {
    pub updated: u64,
}

pub async fn list_notifications(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
    query: Result<Query<NotificationQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<NotificationPage>> {
    let Query(query) = query?;
    let page = core
        .notifications
        .list(
            requester.user_id,
            query.unread_only,
            PageRequest::new(query.page, query.limit),
        )
        .await?;

    Ok(ApiResponse::ok(page))
}

pub async fn mark_read(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
    notification_id: Result<Path<NotificationId>, PathRejection>,
) -> ApiResult<ApiResponse<NotificationModel>> {
    let Path(notification_id) = notification_id?;
    let notification = core
        .notifications
        .mark_read(requester.user_id, notification_id)
        .await?;

    Ok(ApiResponse::ok(notification))
}

pub async fn mark_all_read(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
) -> ApiResult<ApiResponse<MarkAllOutcome>> {
    let updated = core.notifications.mark_all_read(requester.user_id).await?;

    Ok(ApiResponse::ok(MarkAllOutcome { updated }))
}
