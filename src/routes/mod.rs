// src/routes/mod.rs
pub mod auth;
pub mod feedback;
pub mod users;


use axum::{response::Response, routing::get, Router};
use tracing::warn;

use crate::session::{FlashCategory, Session};
use crate::views::{redirect, user_path};

pub fn create_router() -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users/:username", get(users::show))
        .route("/users/:username/delete", get(users::delete_account))
        .route(
            "/users/:username/feedback/add",
            get(feedback::new_form).post(feedback::create),
        )
        .route(
            "/feedback/:feedback_id/update",
            get(feedback::edit_form).post(feedback::update),
        )
        .route("/feedback/:feedback_id/delete", get(feedback::delete))
}

/// Hands back the session together with the logged-in username, or the
/// redirect to the login page when nobody is logged in.
fn require_login(mut session: Session) -> Result<(Session, String), Response> {
    match session.username().map(str::to_owned) {
        Some(username) => Ok((session, username)),
        None => {
            session.flash(FlashCategory::Danger, "You're not logged in! Please login first.");
            Err(redirect(session, "/login"))
        }
    }
}

fn refuse_foreign(mut session: Session, current: &str, owner: &str) -> Response {
    warn!("User {} tried to modify data owned by {}", current, owner);
    session.flash(
        FlashCategory::Danger,
        "You can only change your own account and feedback.",
    );
    redirect(session, &user_path(current))
}
