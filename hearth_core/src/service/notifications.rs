use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, DatabaseConnection};
use thiserror::Error;
use tracing::info;

use crate::{
    entity::{notification::KIND_REPLY, prelude::*},
    ids::{NotificationId, UserId},
    models::views::{NotificationPage, PageRequest, Pagination},
};

const PREVIEW_CHARS: usize = 50;
const FALLBACK_NAME: &str = "Someone";

#[derive(Debug, Error)]
pub enum NotificationsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("notification not found")]
    NotificationNotFound,

    #[error("forbidden: notification belongs to another user")]
    Forbidden,
}

#[derive(Clone)]
pub struct NotificationsService {
    db: DatabaseConnection,
}

impl NotificationsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first. `unread_count` ignores the `unread_only` filter.
    pub async fn list(
        &self,
        user_id: UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<NotificationPage, NotificationsServiceError> {
        let mut query = Notification::find().filter(NotificationColumn::UserId.eq(user_id));
        if unread_only {
            query = query.filter(NotificationColumn::IsRead.eq(false));
        }

        let total = query.clone().count(&self.db).await?;

        let notifications = query
            .order_by_desc(NotificationColumn::CreatedAt)
            .order_by_desc(NotificationColumn::Id)
            .limit(page.limit)
            .offset(page.offset())
            .all(&self.db)
            .await?;

        let unread_count = self.unread_count(user_id).await?;

        Ok(NotificationPage {
            notifications,
            pagination: Pagination::new(page, total),
            unread_count,
        })
    }

    pub async fn unread_count(&self, user_id: UserId) -> Result<u64, NotificationsServiceError> {
        let count = Notification::find()
            .filter(NotificationColumn::UserId.eq(user_id))
            .filter(NotificationColumn::IsRead.eq(false))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Marking an already-read notification again is a no-op success.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        notification_id: NotificationId,
    ) -> Result<NotificationModel, NotificationsServiceError> {
        let notification = Notification::find_by_id(notification_id)
            .one(&self.db)
            .await?
            .ok_or(NotificationsServiceError::NotificationNotFound)?;

        if notification.user_id != user_id {
            return Err(NotificationsServiceError::Forbidden);
        }

        if notification.is_read {
            return Ok(notification);
        }

        let mut active: NotificationActiveModel = notification.into();
        active.is_read = Set(true);
        let updated = active.update(&self.db).await?;

        Ok(updated)
    }

    /// Returns how many notifications flipped to read.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, NotificationsServiceError> {
        let result = Notification::update_many()
            .col_expr(NotificationColumn::IsRead, Expr::value(true))
            .filter(NotificationColumn::UserId.eq(user_id))
            .filter(NotificationColumn::IsRead.eq(false))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

/// Everything the fan-out needs to know about a freshly inserted reply.
pub(crate) struct ReplyEvent<'a> {
    pub reply: &'a ReplyModel,
    pub post: &'a PostModel,
    pub replier_name: Option<&'a str>,
    pub parent_author: Option<UserId>,
    /// Replies on the post that existed before this one, oldest first.
    pub prior_replies: &'a [ReplyModel],
    pub now: DateTime<Utc>,
}

/// Who hears about a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Recipients {
    pub post_author: Option<UserId>,
    /// Parent author first, then prior repliers in thread order.
    pub participants: Vec<UserId>,
}

pub(crate) fn recipients(event: &ReplyEvent<'_>) -> Recipients {
    let replier = event.reply.author_id;
    let post_author = event.post.author_id;

    let mut seen = HashSet::new();
    let mut participants = Vec::new();
    let mut consider = |user_id: UserId| {
        if user_id != replier && user_id != post_author && seen.insert(user_id) {
            participants.push(user_id);
        }
    };

    if let Some(parent_author) = event.parent_author {
        consider(parent_author);
    }
    event
        .prior_replies
        .iter()
        .filter(|reply| !reply.is_deleted && reply.id != event.reply.id)
        .for_each(|reply| consider(reply.author_id));

    Recipients {
        post_author: (post_author != replier).then_some(post_author),
        participants,
    }
}

pub(crate) fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub(crate) fn post_link(event: &ReplyEvent<'_>) -> String {
    format!("/message-board#post-{}", event.post.id)
}

/// Inserts one notification per recipient. Runs on the caller's connection
/// so it shares the reply's transaction.
pub(crate) async fn fan_out_reply<C>(
    conn: &C,
    event: &ReplyEvent<'_>,
) -> Result<Vec<NotificationModel>, DbErr>
where
    C: ConnectionTrait,
{
    let recipients = recipients(event);
    let name = event.replier_name.unwrap_or(FALLBACK_NAME);
    let snippet = preview(&event.reply.content);
    let link = post_link(event);

    let mut inserted = Vec::with_capacity(recipients.participants.len() + 1);

    if let Some(post_author) = recipients.post_author {
        let content = format!("{name} replied to your post: {snippet}");
        inserted.push(insert_reply_notification(conn, event, post_author, content, &link).await?);
    }

    for user_id in recipients.participants {
        let content = format!("{name} replied to your comment on a post: {snippet}");
        inserted.push(insert_reply_notification(conn, event, user_id, content, &link).await?);
    }

    info!(
        reply_id = %event.reply.id,
        post_id = %event.post.id,
        notified = inserted.len(),
        "fanned out reply notifications"
    );

    Ok(inserted)
}

async fn insert_reply_notification<C>(
    conn: &C,
    event: &ReplyEvent<'_>,
    user_id: UserId,
    content: String,
    link: &str,
) -> Result<NotificationModel, DbErr>
where
    C: ConnectionTrait,
{
    let notification = NotificationActiveModel {
        id: Set(NotificationId::new()),
        user_id: Set(user_id),
        content: Set(content),
        kind: Set(KIND_REPLY.to_string()),
        related_id: Set(Some(event.reply.id)),
        link: Set(Some(link.to_string())),
        is_read: Set(false),
        created_at: Set(event.now),
    };

    Notification::insert(notification)
        .exec_with_returning(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PostId, ReplyId};
    use crate::test_utils::{create_test_user, setup_test_db, start_time};
    use chrono::Duration;

    fn post_by(author: UserId) -> PostModel {
        PostModel {
            id: PostId::new(),
            content: "Hello".to_string(),
            author_id: author,
            is_deleted: false,
            created_at: start_time(),
        }
    }

    fn reply_by(author: UserId, post: &PostModel, content: &str) -> ReplyModel {
        ReplyModel {
            id: ReplyId::new(),
            content: content.to_string(),
            author_id: author,
            post_id: post.id,
            parent_id: None,
            is_deleted: false,
            created_at: start_time(),
        }
    }

    async fn insert_notification(
        db: &DatabaseConnection,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> NotificationId {
        let id = NotificationId::new();
        let notification = NotificationActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            content: Set("Bob replied to your post: hi".to_string()),
            kind: Set(KIND_REPLY.to_string()),
            related_id: Set(None),
            link: Set(Some("/message-board#post-x".to_string())),
            is_read: Set(false),
            created_at: Set(at),
        };
        Notification::insert(notification).exec(db).await.unwrap();
        id
    }

    #[test]
    fn test_preview_truncates_at_fifty_chars() {
        assert_eq!(preview("Hi there"), "Hi there");

        let exact = "a".repeat(50);
        assert_eq!(preview(&exact), exact);

        let long = "ü".repeat(51);
        assert_eq!(preview(&long), format!("{}...", "ü".repeat(50)));
    }

    #[test]
    fn test_replier_is_never_a_recipient() {
        let author = UserId::new();
        let post = post_by(author);
        let own_reply = reply_by(author, &post, "bump");
        let prior = vec![reply_by(author, &post, "earlier")];

        let event = ReplyEvent {
            reply: &own_reply,
            post: &post,
            replier_name: None,
            parent_author: Some(author),
            prior_replies: &prior,
            now: start_time(),
        };

        let recipients = recipients(&event);
        assert_eq!(recipients.post_author, None);
        assert!(recipients.participants.is_empty());
    }

    #[test]
    fn test_participants_are_deduplicated_in_thread_order() {
        let (a, b, c, d) = (UserId::new(), UserId::new(), UserId::new(), UserId::new());
        let post = post_by(a);
        let prior = vec![
            reply_by(b, &post, "first"),
            reply_by(a, &post, "author chiming in"),
            reply_by(d, &post, "second"),
            reply_by(b, &post, "third"),
        ];
        let mut deleted = reply_by(UserId::new(), &post, "gone");
        deleted.is_deleted = true;
        let mut prior_with_deleted = prior.clone();
        prior_with_deleted.push(deleted);

        let new_reply = reply_by(c, &post, "reply to d");
        let event = ReplyEvent {
            reply: &new_reply,
            post: &post,
            replier_name: Some("Cat"),
            parent_author: Some(d),
            prior_replies: &prior_with_deleted,
            now: start_time(),
        };

        let recipients = recipients(&event);
        assert_eq!(recipients.post_author, Some(a));
        assert_eq!(recipients.participants, vec![d, b]);
    }

    #[tokio::test]
    async fn test_list_filters_and_counts_unread() {
        let db = setup_test_db().await;
        let service = NotificationsService::new(db.clone());
        let user = create_test_user(&db, "Ann").await;
        let other = create_test_user(&db, "Bob").await;

        let first = insert_notification(&db, user, start_time()).await;
        let second =
            insert_notification(&db, user, start_time() + Duration::seconds(1)).await;
        insert_notification(&db, user, start_time() + Duration::seconds(2)).await;
        insert_notification(&db, other, start_time()).await;

        service.mark_read(user, first).await.unwrap();

        let page = service
            .list(user, false, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.notifications.len(), 3);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.unread_count, 2);
        assert_eq!(page.notifications[1].id, second, "newest first");

        let unread = service
            .list(user, true, PageRequest::new(Some(1), Some(1)))
            .await
            .unwrap();
        assert_eq!(unread.notifications.len(), 1);
        assert_eq!(unread.pagination.total, 2);
        assert_eq!(unread.pagination.total_pages, 2);
        assert_eq!(unread.unread_count, 2);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let db = setup_test_db().await;
        let service = NotificationsService::new(db.clone());
        let user = create_test_user(&db, "Ann").await;
        let id = insert_notification(&db, user, start_time()).await;

        let once = service.mark_read(user, id).await.unwrap();
        assert!(once.is_read);

        let twice = service.mark_read(user, id).await.unwrap();
        assert!(twice.is_read);
        assert_eq!(service.unread_count(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_checks_ownership() {
        let db = setup_test_db().await;
        let service = NotificationsService::new(db.clone());
        let owner = create_test_user(&db, "Ann").await;
        let intruder = create_test_user(&db, "Eve").await;
        let id = insert_notification(&db, owner, start_time()).await;

        let result = service.mark_read(intruder, id).await;
        assert!(matches!(result, Err(NotificationsServiceError::Forbidden)));

        let result = service.mark_read(owner, NotificationId::new()).await;
        assert!(matches!(
            result,
            Err(NotificationsServiceError::NotificationNotFound)
        ));

        assert_eq!(service.unread_count(owner).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_all_read_only_touches_own_unread() {
        let db = setup_test_db().await;
        let service = NotificationsService::new(db.clone());
        let user = create_test_user(&db, "Ann").await;
        let other = create_test_user(&db, "Bob").await;

        let read = insert_notification(&db, user, start_time()).await;
        service.mark_read(user, read).await.unwrap();
        insert_notification(&db, user, start_time()).await;
        insert_notification(&db, user, start_time()).await;
        insert_notification(&db, other, start_time()).await;

        assert_eq!(service.mark_all_read(user).await.unwrap(), 2);
        assert_eq!(service.unread_count(user).await.unwrap(), 0);
        assert_eq!(service.unread_count(other).await.unwrap(), 1);
    }
}
