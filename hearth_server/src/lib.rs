//! HTTP surface for the Hearth message board.
//!
//! Every route answers with the `{ success, data | error }` envelope. Identity
//! is taken from trusted headers set by the fronting auth layer, see
//! [`extract::AuthUser`].

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use hearth_core::HearthCore;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, notifications, posts};

pub fn router(core: HearthCore) -> Router {
    let board = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/{post_id}", delete(posts::delete_post))
        .route("/{post_id}/reply", post(posts::create_reply))
        .route("/reply/{reply_id}", delete(posts::delete_reply));

    let notifications = Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/read-all", put(notifications::mark_all_read))
        .route("/{notification_id}/read", put(notifications::mark_read));

    let auth = Router::new()
        .route("/send-code", post(auth::send_code))
        .route("/sms-login", post(auth::sms_login))
        .route("/register", post(auth::register))
        .route("/login", post(auth::password_login))
        .route("/reset-password", post(auth::reset_password))
        .route("/change-password", post(auth::change_password));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/message-board", board)
        .nest("/api/notifications", notifications)
        .nest("/api/auth", auth)
        .layer(TraceLayer::new_for_http())
        .with_state(core)
}
