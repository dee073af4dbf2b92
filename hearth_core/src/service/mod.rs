pub mod accounts;
pub mod notifications;
pub mod posts;
pub mod rate_limit;
pub mod reply_tree;
pub mod sms;
pub mod users;
pub mod verification;
