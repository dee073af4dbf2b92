use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use hearth_core::{
    ids::{PostId, ReplyId},
    models::views::{PageRequest, PostPage, PostView, ReplyView},
    HearthCore,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiResult,
    extract::AuthUser,
    response::ApiResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyRequest {
    pub content: String,
    pub parent_id: Option<ReplyId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome<I> {
    pub id: I,
    /// Replies soft-deleted along with the target.
    pub cascaded: u64,
}

pub async fn list_posts(
    State(core): State<HearthCore>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<PostPage>> {
    let Query(query) = query?;
    let page = core
        .posts
        .list_posts(PageRequest::new(query.page, query.limit))
        .await?;

    Ok(ApiResponse::ok(page))
}

pub async fn create_post(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<PostView>> {
    let Json(body) = body?;
    let post = core.posts.create_post(&requester, &body.content).await?;

    Ok(ApiResponse::created(post).with_message("post published"))
}

pub async fn delete_post(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
    post_id: Result<Path<PostId>, PathRejection>,
) -> ApiResult<ApiResponse<DeleteOutcome<PostId>>> {
    let Path(post_id) = post_id?;
    let cascaded = core.posts.delete_post(&requester, post_id).await?;

    Ok(ApiResponse::ok(DeleteOutcome {
        id: post_id,
        cascaded,
    })
    .with_message("post deleted"))
}

pub async fn create_reply(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
    post_id: Result<Path<PostId>, PathRejection>,
    body: Result<Json<CreateReplyRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<ReplyView>> {
    let Path(post_id) = post_id?;
    let Json(body) = body?;
    let reply = core
        .posts
        .create_reply(&requester, post_id, body.parent_id, &body.content)
        .await?;

    Ok(ApiResponse::created(reply).with_message("reply published"))
}

pub async fn delete_reply(
    State(core): State<HearthCore>,
    AuthUser(requester): AuthUser,
    reply_id: Result<Path<ReplyId>, PathRejection>,
) -> ApiResult<ApiResponse<DeleteOutcome<ReplyId>>> {
    let Path(reply_id) = reply_id?;
    let cascaded = core.posts.delete_reply(&requester, reply_id).await?;

    Ok(ApiResponse::ok(DeleteOutcome {
        id: reply_id,
        cascaded,
    })
    .with_message("reply deleted"))
}
