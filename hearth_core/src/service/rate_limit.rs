use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use tracing::{debug, warn};

use crate::{clock::Clock, config::RateLimitSettings, entity::prelude::*, ids::UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied {
        message: String,
        /// Unknown when the oldest activity could not be located.
        remaining_seconds: Option<u64>,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

/// Sliding-window limit on how many posts plus replies a user may write.
///
/// The window is `(now - window, now]` and a denial reports at least one
/// second to wait.
///
/// Counts live rows in the store rather than keeping in-process counters,
/// so soft-deleted content frees up its slot and nothing needs expiring.
/// Store failures allow the write (fail-open).
#[derive(Clone)]
pub struct RateLimiter {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    settings: RateLimitSettings,
}

impl RateLimiter {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>, settings: RateLimitSettings) -> Self {
        Self {
            db,
            clock,
            settings,
        }
    }

    pub async fn check(&self, user_id: UserId) -> RateLimitDecision {
        match self.evaluate(user_id).await {
            Ok(decision) => decision,
            Err(error) => {
                warn!(%user_id, %error, "rate limit check failed, allowing the write");
                RateLimitDecision::Allowed
            }
        }
    }

    async fn evaluate(&self, user_id: UserId) -> Result<RateLimitDecision, DbErr> {
        let now = self.clock.now();
        let window = Duration::minutes(self.settings.window_minutes as i64);
        let window_start = now - window;

        let post_count = Post::find()
            .filter(PostColumn::AuthorId.eq(user_id))
            .filter(PostColumn::IsDeleted.eq(false))
            .filter(PostColumn::CreatedAt.gt(window_start))
            .filter(PostColumn::CreatedAt.lte(now))
            .count(&self.db)
            .await?;

        let reply_count = Reply::find()
            .filter(ReplyColumn::AuthorId.eq(user_id))
            .filter(ReplyColumn::IsDeleted.eq(false))
            .filter(ReplyColumn::CreatedAt.gt(window_start))
            .filter(ReplyColumn::CreatedAt.lte(now))
            .count(&self.db)
            .await?;

        let total = post_count + reply_count;
        debug!(%user_id, post_count, reply_count, limit = self.settings.max_count, "rate window");

        if total < self.settings.max_count {
            return Ok(RateLimitDecision::Allowed);
        }

        let oldest = self.oldest_activity(user_id, window_start, now).await?;
        let remaining_seconds = oldest.map(|oldest| {
            let elapsed = (now - oldest).num_seconds();
            (window.num_seconds() - elapsed).max(1) as u64
        });

        let message = match remaining_seconds {
            Some(seconds) => format!(
                "Too many messages, please wait {seconds} seconds (at most {} per {} minute(s))",
                self.settings.max_count, self.settings.window_minutes
            ),
            None => format!(
                "Too many messages, please try again later (at most {} per {} minute(s))",
                self.settings.max_count, self.settings.window_minutes
            ),
        };

        Ok(RateLimitDecision::Denied {
            message,
            remaining_seconds,
        })
    }

    async fn oldest_activity(
        &self,
        user_id: UserId,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DbErr> {
        let oldest_post = Post::find()
            .filter(PostColumn::AuthorId.eq(user_id))
            .filter(PostColumn::IsDeleted.eq(false))
            .filter(PostColumn::CreatedAt.gt(window_start))
            .filter(PostColumn::CreatedAt.lte(now))
            .order_by_asc(PostColumn::CreatedAt)
            .one(&self.db)
            .await?
            .map(|post| post.created_at);

        let oldest_reply = Reply::find()
            .filter(ReplyColumn::AuthorId.eq(user_id))
            .filter(ReplyColumn::IsDeleted.eq(false))
            .filter(ReplyColumn::CreatedAt.gt(window_start))
            .filter(ReplyColumn::CreatedAt.lte(now))
            .order_by_asc(ReplyColumn::CreatedAt)
            .one(&self.db)
            .await?
            .map(|reply| reply.created_at);

        Ok(oldest_post.into_iter().chain(oldest_reply).min())
    }
}
