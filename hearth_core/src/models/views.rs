use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::prelude::*;
use crate::ids::{PostId, ReplyId, UserId};

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// 1-based page request. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Saturates at the largest offset SQLite accepts.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(request.limit),
        }
    }
}

/// Public slice of a user shown next to their content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: UserId,
    pub nickname: String,
    pub avatar: Option<String>,
}

impl From<&UserModel> for AuthorView {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: ReplyId,
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,
    pub parent_id: Option<ReplyId>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub author: Option<AuthorView>,
    pub children: Vec<ReplyView>,
}

impl ReplyView {
    pub fn new(reply: ReplyModel, author: Option<AuthorView>, children: Vec<ReplyView>) -> Self {
        Self {
            id: reply.id,
            content: reply.content,
            author_id: reply.author_id,
            post_id: reply.post_id,
            parent_id: reply.parent_id,
            is_deleted: reply.is_deleted,
            created_at: reply.created_at,
            author,
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub content: String,
    pub author_id: UserId,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub author: Option<AuthorView>,
    pub replies: Vec<ReplyView>,
}

impl PostView {
    pub fn new(post: PostModel, author: Option<AuthorView>, replies: Vec<ReplyView>) -> Self {
        Self {
            id: post.id,
            content: post.content,
            author_id: post.author_id,
            is_deleted: post.is_deleted,
            created_at: post.created_at,
            author,
            replies,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<NotificationModel>,
    pub pagination: Pagination,
    /// Across all of the user's notifications, regardless of filters.
    pub unread_count: u64,
}
