pub mod auth;
pub mod clock;
pub mod config;
pub mod content_filter;
pub mod entity;
pub mod ids;
pub mod models;
pub mod password;
pub mod service;

#[cfg(test)]
mod test_utils;

use std::{sync::Arc, time::Duration};

use sea_orm::{DatabaseConnection, DbErr};
use tracing::info;

use crate::{
    clock::{Clock, SystemClock},
    config::HearthConfig,
    content_filter::ContentFilter,
    service::{
        accounts::AccountsService,
        notifications::NotificationsService,
        posts::PostsService,
        rate_limit::RateLimiter,
        sms::{LogSmsSender, RetryingSmsSender, SmsSender},
        users::UsersService,
        verification::VerificationService,
    },
};

/// Main runtime handle for Hearth: the database plus every service wired to it.
#[derive(Clone)]
pub struct HearthCore {
    pub config: HearthConfig,
    pub db: DatabaseConnection,

    pub users: UsersService,
    pub posts: PostsService,
    pub notifications: NotificationsService,
    pub verification: VerificationService,
    pub accounts: AccountsService,
}

impl HearthCore {
    /// Opens the configured database, migrates it and wires the services to
    /// the system clock. Codes are delivered to the log with retries.
    pub async fn start(config: HearthConfig) -> Result<Self, DbErr> {
        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        let settings = config.verification;
        let sms = RetryingSmsSender::new(
            LogSmsSender,
            settings.sms_max_attempts,
            Duration::from_millis(settings.sms_backoff_ms),
        );

        let core = Self::from_parts(db, config, Arc::new(SystemClock), Arc::new(sms));
        info!(bind_addr = %core.config.bind_addr, "hearth core started");
        Ok(core)
    }

    /// Wires services over an already migrated database.
    pub fn from_parts(
        db: DatabaseConnection,
        config: HearthConfig,
        clock: Arc<dyn Clock>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        let filter = Arc::new(ContentFilter::new(&config.content));
        let limiter = RateLimiter::new(db.clone(), clock.clone(), config.rate_limit);

        let users = UsersService::new(db.clone(), clock.clone());
        let posts = PostsService::new(db.clone(), clock.clone(), filter, limiter);
        let notifications = NotificationsService::new(db.clone());
        let verification =
            VerificationService::new(db.clone(), clock, sms, config.verification);
        let accounts = AccountsService::new(users.clone(), verification.clone());

        Self {
            config,
            db,
            users,
            posts,
            notifications,
            verification,
            accounts,
        }
    }
}

pub mod prelude {
    pub use super::auth;
    pub use super::clock;
    pub use super::config;
    pub use super::content_filter;
    pub use super::entity;
    pub use super::ids;
    pub use super::models;

    pub use super::service;

    pub use super::HearthCore;
}
