use axum::{
    extract::Path,
    http::StatusCode,
    response::Response,
    Extension,
};
use std::sync::Arc;
use tracing::info;

use super::{refuse_foreign, require_login};
use crate::{
    error::AppError,
    models::user::Profile,
    session::{FlashCategory, Session},
    state::AppState,
    views::{redirect, render, UserPage},
};

/// Any logged-in user may look at any user's page.
pub async fn show(
    Extension(app_state): Extension<Arc<AppState>>,
    session: Session,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let (session, _current) = match require_login(session) {
        Ok(granted) => granted,
        Err(response) => return Ok(response),
    };

    let user = app_state
        .store
        .find_user(&username)
        .await?
        .ok_or(AppError::NotFound)?;
    let feedback = app_state.store.feedback_for(&user.username).await?;

    let page = UserPage {
        user: Profile::from(&user),
        feedback,
    };
    Ok(render(session, StatusCode::OK, "user", page))
}

pub async fn delete_account(
    Extension(app_state): Extension<Arc<AppState>>,
    session: Session,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let (mut session, current) = match require_login(session) {
        Ok(granted) => granted,
        Err(response) => return Ok(response),
    };
    if current != username {
        return Ok(refuse_foreign(session, &current, &username));
    }

    if !app_state.store.delete_user(&username).await? {
        return Err(AppError::NotFound);
    }

    info!("Deleted account {} and its feedback", username);
    session.log_out();
    session.flash(
        FlashCategory::Warning,
        "You deleted your account and all corresponding feedback for that account.",
    );
    Ok(redirect(session, "/login"))
}
