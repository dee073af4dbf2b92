use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sea_orm::{sea_query::Expr, DatabaseConnection};
use thiserror::Error;
use tracing::info;

use crate::{
    auth::Requester,
    clock::Clock,
    content_filter::{ContentError, ContentFilter},
    entity::prelude::*,
    ids::{PostId, ReplyId, UserId},
    models::views::{AuthorView, PageRequest, Pagination, PostPage, PostView, ReplyView},
    service::{
        notifications::{fan_out_reply, ReplyEvent},
        rate_limit::{RateLimitDecision, RateLimiter},
        reply_tree,
    },
};

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error(transparent)]
    InvalidContent(#[from] ContentError),

    #[error("{message}")]
    RateLimited {
        message: String,
        remaining_seconds: Option<u64>,
    },

    #[error("post not found")]
    PostNotFound,

    #[error("reply not found")]
    ReplyNotFound,

    #[error("parent reply not found")]
    ParentReplyNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("forbidden: not the author or an admin")]
    Forbidden,
}

#[derive(Clone)]
pub struct PostsService {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    filter: Arc<ContentFilter>,
    limiter: RateLimiter,
}

impl PostsService {
    pub fn new(
        db: DatabaseConnection,
        clock: Arc<dyn Clock>,
        filter: Arc<ContentFilter>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            db,
            clock,
            filter,
            limiter,
        }
    }

    /// Create a new top-level post
    pub async fn create_post(
        &self,
        requester: &Requester,
        content: &str,
    ) -> Result<PostView, PostsServiceError> {
        let content = self.filter.validate(content)?;
        self.enforce_rate_limit(requester.user_id).await?;

        let author = User::find_by_id(requester.user_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::UserNotFound)?;

        let post = PostActiveModel {
            id: Set(PostId::new()),
            content: Set(content),
            author_id: Set(author.id),
            is_deleted: Set(false),
            created_at: Set(self.clock.now()),
        };

        let post = Post::insert(post).exec_with_returning(&self.db).await?;
        info!(post_id = %post.id, author_id = %author.id, "post created");

        Ok(PostView::new(post, Some(AuthorView::from(&author)), vec![]))
    }

    /// Reply to a post, or to another reply on the same post. The insert and
    /// its notifications commit together.
    pub async fn create_reply(
        &self,
        requester: &Requester,
        post_id: PostId,
        parent_id: Option<ReplyId>,
        content: &str,
    ) -> Result<ReplyView, PostsServiceError> {
        let content = self.filter.validate(content)?;
        self.enforce_rate_limit(requester.user_id).await?;

        let post = self.live_post(post_id).await?;

        let parent = match parent_id {
            Some(parent_id) => Some(
                Reply::find_by_id(parent_id)
                    .one(&self.db)
                    .await?
                    .filter(|parent| !parent.is_deleted && parent.post_id == post.id)
                    .ok_or(PostsServiceError::ParentReplyNotFound)?,
            ),
            None => None,
        };

        let author = User::find_by_id(requester.user_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::UserNotFound)?;

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let prior_replies = Reply::find()
            .filter(ReplyColumn::PostId.eq(post.id))
            .filter(ReplyColumn::IsDeleted.eq(false))
            .order_by_asc(ReplyColumn::CreatedAt)
            .order_by_asc(ReplyColumn::Id)
            .all(&txn)
            .await?;

        let reply = ReplyActiveModel {
            id: Set(ReplyId::new()),
            content: Set(content),
            author_id: Set(author.id),
            post_id: Set(post.id),
            parent_id: Set(parent.as_ref().map(|parent| parent.id)),
            is_deleted: Set(false),
            created_at: Set(now),
        };
        let reply = Reply::insert(reply).exec_with_returning(&txn).await?;

        let event = ReplyEvent {
            reply: &reply,
            post: &post,
            replier_name: Some(author.nickname.as_str()),
            parent_author: parent.as_ref().map(|parent| parent.author_id),
            prior_replies: &prior_replies,
            now,
        };
        fan_out_reply(&txn, &event).await?;

        txn.commit().await?;
        info!(reply_id = %reply.id, post_id = %post.id, "reply created");

        Ok(ReplyView::new(reply, Some(AuthorView::from(&author)), vec![]))
    }

    /// Soft-delete a post and every reply under it (author or admin only)
    pub async fn delete_post(
        &self,
        requester: &Requester,
        post_id: PostId,
    ) -> Result<u64, PostsServiceError> {
        let post = self.live_post(post_id).await?;

        if !requester.may_moderate(post.author_id) {
            return Err(PostsServiceError::Forbidden);
        }

        let txn = self.db.begin().await?;

        Post::update_many()
            .col_expr(PostColumn::IsDeleted, Expr::value(true))
            .filter(PostColumn::Id.eq(post.id))
            .exec(&txn)
            .await?;

        let hidden = Reply::update_many()
            .col_expr(ReplyColumn::IsDeleted, Expr::value(true))
            .filter(ReplyColumn::PostId.eq(post.id))
            .filter(ReplyColumn::IsDeleted.eq(false))
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;
        info!(post_id = %post.id, deleted_by = %requester.user_id, replies = hidden, "post deleted");

        Ok(hidden)
    }

    /// Soft-delete a reply and its whole subtree (author or admin only).
    /// Returns how many descendants went with it.
    pub async fn delete_reply(
        &self,
        requester: &Requester,
        reply_id: ReplyId,
    ) -> Result<u64, PostsServiceError> {
        let reply = Reply::find_by_id(reply_id)
            .one(&self.db)
            .await?
            .filter(|reply| !reply.is_deleted)
            .ok_or(PostsServiceError::ReplyNotFound)?;

        if !requester.may_moderate(reply.author_id) {
            return Err(PostsServiceError::Forbidden);
        }

        let txn = self.db.begin().await?;

        let mut children: HashMap<ReplyId, Vec<ReplyId>> = HashMap::new();
        for row in Reply::find()
            .filter(ReplyColumn::PostId.eq(reply.post_id))
            .filter(ReplyColumn::IsDeleted.eq(false))
            .all(&txn)
            .await?
        {
            if let Some(parent) = row.parent_id {
                children.entry(parent).or_default().push(row.id);
            }
        }

        let descendants = reply_tree::descendants(reply.id, &children);
        let mut doomed = descendants.clone();
        doomed.push(reply.id);

        Reply::update_many()
            .col_expr(ReplyColumn::IsDeleted, Expr::value(true))
            .filter(ReplyColumn::Id.is_in(doomed))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(
            reply_id = %reply.id,
            deleted_by = %requester.user_id,
            descendants = descendants.len(),
            "reply deleted"
        );

        Ok(descendants.len() as u64)
    }

    /// Newest posts first, each with its live reply tree (oldest first)
    pub async fn list_posts(&self, page: PageRequest) -> Result<PostPage, PostsServiceError> {
        let live_posts = Post::find().filter(PostColumn::IsDeleted.eq(false));

        let total = live_posts.clone().count(&self.db).await?;

        let posts = live_posts
            .order_by_desc(PostColumn::CreatedAt)
            .order_by_desc(PostColumn::Id)
            .limit(page.limit)
            .offset(page.offset())
            .all(&self.db)
            .await?;

        let post_ids: Vec<PostId> = posts.iter().map(|post| post.id).collect();
        let replies = if post_ids.is_empty() {
            vec![]
        } else {
            Reply::find()
                .filter(ReplyColumn::PostId.is_in(post_ids))
                .filter(ReplyColumn::IsDeleted.eq(false))
                .order_by_asc(ReplyColumn::CreatedAt)
                .order_by_asc(ReplyColumn::Id)
                .all(&self.db)
                .await?
        };

        let author_ids: HashSet<UserId> = posts
            .iter()
            .map(|post| post.author_id)
            .chain(replies.iter().map(|reply| reply.author_id))
            .collect();
        let authors = self.author_views(author_ids).await?;

        let mut threads = reply_tree::assemble(replies, &authors);
        let posts = posts
            .into_iter()
            .map(|post| {
                let replies = threads.remove(&post.id).unwrap_or_default();
                let author = authors.get(&post.author_id).cloned();
                PostView::new(post, author, replies)
            })
            .collect();

        Ok(PostPage {
            posts,
            pagination: Pagination::new(page, total),
        })
    }

    async fn live_post(&self, post_id: PostId) -> Result<PostModel, PostsServiceError> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .filter(|post| !post.is_deleted)
            .ok_or(PostsServiceError::PostNotFound)
    }

    async fn enforce_rate_limit(&self, user_id: UserId) -> Result<(), PostsServiceError> {
        match self.limiter.check(user_id).await {
            RateLimitDecision::Allowed => Ok(()),
            RateLimitDecision::Denied {
                message,
                remaining_seconds,
            } => Err(PostsServiceError::RateLimited {
                message,
                remaining_seconds,
            }),
        }
    }

    async fn author_views(
        &self,
        author_ids: HashSet<UserId>,
    ) -> Result<HashMap<UserId, AuthorView>, DbErr> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = User::find()
            .filter(UserColumn::Id.is_in(author_ids))
            .all(&self.db)
            .await?;

        Ok(users
            .iter()
            .map(|user| (user.id, AuthorView::from(user)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::clock::ManualClock;
    use crate::config::{ContentSettings, RateLimitSettings};
    use crate::test_utils::{
        create_test_user, create_test_user_with_role, setup_test_db, start_time,
    };
    use chrono::Duration;

    struct Harness {
        db: DatabaseConnection,
        clock: ManualClock,
        service: PostsService,
    }

    async fn harness_with_limit(max_count: u64) -> Harness {
        let db = setup_test_db().await;
        let clock = ManualClock::new(start_time());
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let limiter = RateLimiter::new(
            db.clone(),
            shared_clock.clone(),
            RateLimitSettings {
                max_count,
                window_minutes: 1,
            },
        );
        let filter = Arc::new(ContentFilter::new(&ContentSettings {
            disallowed_terms: vec!["spam".to_string()],
            ..ContentSettings::default()
        }));

        Harness {
            service: PostsService::new(db.clone(), shared_clock, filter, limiter),
            db,
            clock,
        }
    }

    /// Generous limit so tests that are not about throttling never trip it.
    async fn harness() -> Harness {
        harness_with_limit(1000).await
    }

    impl Harness {
        fn tick(&self) {
            self.clock.advance(Duration::seconds(1));
        }

        async fn notifications_for(&self, user_id: UserId) -> Vec<NotificationModel> {
            Notification::find()
                .filter(NotificationColumn::UserId.eq(user_id))
                .all(&self.db)
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_create_post_trims_and_embeds_author() {
        let h = harness().await;
        let user = create_test_user(&h.db, "Ann").await;

        let post = h
            .service
            .create_post(&Requester::user(user), "  Hello board  ")
            .await
            .expect("Failed to create post");

        assert_eq!(post.content, "Hello board");
        assert_eq!(post.author_id, user);
        assert_eq!(post.author.unwrap().nickname, "Ann");
        assert!(post.replies.is_empty());
        assert!(!post.is_deleted);
        assert_eq!(post.created_at, start_time());
    }

    #[tokio::test]
    async fn test_create_post_truncates_long_content() {
        let h = harness().await;
        let user = create_test_user(&h.db, "Ann").await;

        let post = h
            .service
            .create_post(&Requester::user(user), &"x".repeat(6000))
            .await
            .unwrap();

        assert_eq!(post.content.chars().count(), 5000);
    }

    #[tokio::test]
    async fn test_disallowed_content_inserts_nothing() {
        let h = harness().await;
        let user = create_test_user(&h.db, "Ann").await;

        let result = h
            .service
            .create_post(&Requester::user(user), "cheap SPAM here")
            .await;

        assert!(matches!(
            result,
            Err(PostsServiceError::InvalidContent(ContentError::Disallowed))
        ));
        assert_eq!(Post::find().count(&h.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_author_is_rejected() {
        let h = harness().await;

        let result = h
            .service
            .create_post(&Requester::user(UserId::new()), "Hello")
            .await;

        assert!(matches!(result, Err(PostsServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_fourth_write_until_window_passes() {
        let h = harness_with_limit(3).await;
        let user = create_test_user(&h.db, "Ann").await;
        let requester = Requester::user(user);

        let post = h.service.create_post(&requester, "one").await.unwrap();
        h.clock.advance(Duration::seconds(5));
        h.service.create_post(&requester, "two").await.unwrap();
        h.clock.advance(Duration::seconds(5));
        h.service
            .create_reply(&requester, post.id, None, "three")
            .await
            .unwrap();
        h.clock.advance(Duration::seconds(5));

        match h.service.create_post(&requester, "four").await {
            Err(PostsServiceError::RateLimited {
                remaining_seconds, ..
            }) => assert_eq!(remaining_seconds, Some(45)),
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert_eq!(Post::find().count(&h.db).await.unwrap(), 2);

        h.clock.advance(Duration::seconds(46));
        h.service
            .create_post(&requester, "four again")
            .await
            .expect("window has moved past the first post");
    }

    #[tokio::test]
    async fn test_reply_to_missing_or_deleted_post() {
        let h = harness().await;
        let user = create_test_user(&h.db, "Ann").await;
        let requester = Requester::user(user);

        let result = h
            .service
            .create_reply(&requester, PostId::new(), None, "hello?")
            .await;
        assert!(matches!(result, Err(PostsServiceError::PostNotFound)));

        let post = h.service.create_post(&requester, "Hello").await.unwrap();
        h.service.delete_post(&requester, post.id).await.unwrap();

        let result = h
            .service
            .create_reply(&requester, post.id, None, "hello?")
            .await;
        assert!(matches!(result, Err(PostsServiceError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_parent_must_be_live_and_on_same_post() {
        let h = harness().await;
        let user = create_test_user(&h.db, "Ann").await;
        let requester = Requester::user(user);

        let first = h.service.create_post(&requester, "first").await.unwrap();
        let second = h.service.create_post(&requester, "second").await.unwrap();
        let reply = h
            .service
            .create_reply(&requester, first.id, None, "on first")
            .await
            .unwrap();

        let cross = h
            .service
            .create_reply(&requester, second.id, Some(reply.id), "wrong post")
            .await;
        assert!(matches!(cross, Err(PostsServiceError::ParentReplyNotFound)));

        let missing = h
            .service
            .create_reply(&requester, first.id, Some(ReplyId::new()), "ghost")
            .await;
        assert!(matches!(missing, Err(PostsServiceError::ParentReplyNotFound)));

        h.service.delete_reply(&requester, reply.id).await.unwrap();
        let deleted = h
            .service
            .create_reply(&requester, first.id, Some(reply.id), "too late")
            .await;
        assert!(matches!(deleted, Err(PostsServiceError::ParentReplyNotFound)));
    }

    #[tokio::test]
    async fn test_reply_notifies_post_author_only() {
        let h = harness().await;
        let u1 = create_test_user(&h.db, "Ann").await;
        let u2 = create_test_user(&h.db, "Bob").await;

        let post = h
            .service
            .create_post(&Requester::user(u1), "Hello")
            .await
            .unwrap();
        let reply = h
            .service
            .create_reply(&Requester::user(u2), post.id, None, "Hi there")
            .await
            .unwrap();

        let for_u1 = h.notifications_for(u1).await;
        assert_eq!(for_u1.len(), 1);
        assert_eq!(for_u1[0].kind, "reply");
        assert!(for_u1[0].content.contains("Hi there"));
        assert!(for_u1[0].content.contains("replied to your post"));
        assert_eq!(for_u1[0].related_id, Some(reply.id));
        assert_eq!(
            for_u1[0].link.as_deref(),
            Some(format!("/message-board#post-{}", post.id).as_str())
        );
        assert!(!for_u1[0].is_read);

        assert!(h.notifications_for(u2).await.is_empty());
    }

    #[tokio::test]
    async fn test_reply_to_reply_notifies_post_and_parent_authors() {
        let h = harness().await;
        let a = create_test_user(&h.db, "Ann").await;
        let b = create_test_user(&h.db, "Bob").await;
        let c = create_test_user(&h.db, "Cat").await;

        let post = h
            .service
            .create_post(&Requester::user(a), "Hello")
            .await
            .unwrap();
        h.tick();
        let b_reply = h
            .service
            .create_reply(&Requester::user(b), post.id, None, "first!")
            .await
            .unwrap();
        h.tick();
        h.service
            .create_reply(&Requester::user(c), post.id, Some(b_reply.id), "answering Bob")
            .await
            .unwrap();

        let for_a = h.notifications_for(a).await;
        assert_eq!(for_a.len(), 2, "one per reply on Ann's post");

        let for_b = h.notifications_for(b).await;
        assert_eq!(for_b.len(), 1);
        assert!(for_b[0].content.starts_with("Cat replied to your comment on a post"));

        assert!(h.notifications_for(c).await.is_empty());
    }

    #[tokio::test]
    async fn test_prior_repliers_are_notified_each_time() {
        let h = harness().await;
        let a = create_test_user(&h.db, "Ann").await;
        let b = create_test_user(&h.db, "Bob").await;
        let c = create_test_user(&h.db, "Cat").await;

        let post = h
            .service
            .create_post(&Requester::user(a), "Hello")
            .await
            .unwrap();
        h.service
            .create_reply(&Requester::user(b), post.id, None, "one")
            .await
            .unwrap();
        h.service
            .create_reply(&Requester::user(c), post.id, None, "two")
            .await
            .unwrap();
        h.service
            .create_reply(&Requester::user(c), post.id, None, "three")
            .await
            .unwrap();

        assert_eq!(h.notifications_for(a).await.len(), 3);
        assert_eq!(h.notifications_for(b).await.len(), 2);
        assert!(h.notifications_for(c).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_post_requires_author_or_admin() {
        let h = harness().await;
        let author = create_test_user(&h.db, "Ann").await;
        let stranger = create_test_user(&h.db, "Eve").await;
        let admin = create_test_user_with_role(&h.db, "Mod", Role::Admin).await;

        let post = h
            .service
            .create_post(&Requester::user(author), "Hello")
            .await
            .unwrap();

        let result = h
            .service
            .delete_post(&Requester::user(stranger), post.id)
            .await;
        assert!(matches!(result, Err(PostsServiceError::Forbidden)));

        h.service
            .delete_post(&Requester::admin(admin), post.id)
            .await
            .expect("admins may delete anything");

        let again = h
            .service
            .delete_post(&Requester::user(author), post.id)
            .await;
        assert!(matches!(again, Err(PostsServiceError::PostNotFound)));
    }

    #[tokio::test]
    async fn test_delete_post_soft_deletes_replies() {
        let h = harness().await;
        let a = create_test_user(&h.db, "Ann").await;
        let b = create_test_user(&h.db, "Bob").await;

        let post = h
            .service
            .create_post(&Requester::user(a), "Hello")
            .await
            .unwrap();
        let top = h
            .service
            .create_reply(&Requester::user(b), post.id, None, "top")
            .await
            .unwrap();
        h.service
            .create_reply(&Requester::user(a), post.id, Some(top.id), "nested")
            .await
            .unwrap();

        let hidden = h
            .service
            .delete_post(&Requester::user(a), post.id)
            .await
            .unwrap();
        assert_eq!(hidden, 2);

        let page = h.service.list_posts(PageRequest::default()).await.unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.pagination.total, 0);

        let row = Post::find_by_id(post.id).one(&h.db).await.unwrap().unwrap();
        assert!(row.is_deleted, "row is kept, only flagged");
        let replies = Reply::find()
            .filter(ReplyColumn::PostId.eq(post.id))
            .all(&h.db)
            .await
            .unwrap();
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|reply| reply.is_deleted));
    }

    #[tokio::test]
    async fn test_delete_reply_cascades_through_all_descendants() {
        let h = harness().await;
        let a = create_test_user(&h.db, "Ann").await;
        let requester = Requester::user(a);

        let post = h.service.create_post(&requester, "Hello").await.unwrap();
        let top = h
            .service
            .create_reply(&requester, post.id, None, "top")
            .await
            .unwrap();
        let child = h
            .service
            .create_reply(&requester, post.id, Some(top.id), "child")
            .await
            .unwrap();
        let grandchild = h
            .service
            .create_reply(&requester, post.id, Some(child.id), "grandchild")
            .await
            .unwrap();
        let sibling = h
            .service
            .create_reply(&requester, post.id, None, "sibling")
            .await
            .unwrap();

        let removed = h.service.delete_reply(&requester, top.id).await.unwrap();
        assert_eq!(removed, 2);

        for id in [top.id, child.id, grandchild.id] {
            let row = Reply::find_by_id(id).one(&h.db).await.unwrap().unwrap();
            assert!(row.is_deleted);
        }
        let sibling_row = Reply::find_by_id(sibling.id)
            .one(&h.db)
            .await
            .unwrap()
            .unwrap();
        assert!(!sibling_row.is_deleted);
    }

    #[tokio::test]
    async fn test_delete_reply_by_stranger_is_forbidden() {
        let h = harness().await;
        let a = create_test_user(&h.db, "Ann").await;
        let eve = create_test_user(&h.db, "Eve").await;

        let post = h
            .service
            .create_post(&Requester::user(a), "Hello")
            .await
            .unwrap();
        let reply = h
            .service
            .create_reply(&Requester::user(a), post.id, None, "mine")
            .await
            .unwrap();

        let result = h.service.delete_reply(&Requester::user(eve), reply.id).await;
        assert!(matches!(result, Err(PostsServiceError::Forbidden)));

        let result = h
            .service
            .delete_reply(&Requester::user(a), ReplyId::new())
            .await;
        assert!(matches!(result, Err(PostsServiceError::ReplyNotFound)));
    }

    #[tokio::test]
    async fn test_list_posts_orders_and_nests() {
        let h = harness().await;
        let a = create_test_user(&h.db, "Ann").await;
        let b = create_test_user(&h.db, "Bob").await;

        let older = h
            .service
            .create_post(&Requester::user(a), "older")
            .await
            .unwrap();
        h.tick();
        let newer = h
            .service
            .create_post(&Requester::user(b), "newer")
            .await
            .unwrap();
        h.tick();
        let first = h
            .service
            .create_reply(&Requester::user(b), older.id, None, "first reply")
            .await
            .unwrap();
        h.tick();
        let second = h
            .service
            .create_reply(&Requester::user(a), older.id, None, "second reply")
            .await
            .unwrap();
        h.tick();
        let nested = h
            .service
            .create_reply(&Requester::user(a), older.id, Some(first.id), "nested")
            .await
            .unwrap();
        h.tick();
        let removed = h
            .service
            .create_reply(&Requester::user(b), older.id, Some(first.id), "removed")
            .await
            .unwrap();
        h.service
            .delete_reply(&Requester::user(b), removed.id)
            .await
            .unwrap();

        let page = h.service.list_posts(PageRequest::default()).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.posts[0].id, newer.id);
        assert_eq!(page.posts[1].id, older.id);

        let thread = &page.posts[1].replies;
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, first.id);
        assert_eq!(thread[1].id, second.id);
        assert_eq!(thread[0].children.len(), 1);
        assert_eq!(thread[0].children[0].id, nested.id);
        assert_eq!(
            thread[0].author.as_ref().map(|author| author.nickname.as_str()),
            Some("Bob")
        );
    }

    #[tokio::test]
    async fn test_list_posts_paginates() {
        let h = harness().await;
        let a = create_test_user(&h.db, "Ann").await;

        for i in 0..5 {
            h.service
                .create_post(&Requester::user(a), &format!("Post {i}"))
                .await
                .unwrap();
            h.tick();
        }

        let page = h
            .service
            .list_posts(PageRequest::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[0].content, "Post 2");
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
    }
}
