use axum::{
    extract::{Form, Path},
    http::StatusCode,
    response::Response,
    Extension,
};
use std::sync::Arc;
use tracing::info;

use super::{refuse_foreign, require_login};
use crate::{
    error::AppError,
    forms::{FeedbackForm, FieldErrors, FormView},
    models::{feedback::NewFeedback, user::Profile},
    session::{FlashCategory, Session},
    state::AppState,
    views::{redirect, render, user_path, EditFeedbackPage, FeedbackFormPage},
};

pub async fn new_form(
    Extension(app_state): Extension<Arc<AppState>>,
    session: Session,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let (session, current) = match require_login(session) {
        Ok(granted) => granted,
        Err(response) => return Ok(response),
    };
    if current != username {
        return Ok(refuse_foreign(session, &current, &username));
    }

    let user = app_state
        .store
        .find_user(&username)
        .await?
        .ok_or(AppError::NotFound)?;

    let page = FeedbackFormPage {
        user: Profile::from(&user),
        form: FormView::default(),
    };
    Ok(render(session, StatusCode::OK, "feedback_form", page))
}

pub async fn create(
    Extension(app_state): Extension<Arc<AppState>>,
    session: Session,
    Path(username): Path<String>,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    let (mut session, current) = match require_login(session) {
        Ok(granted) => granted,
        Err(response) => return Ok(response),
    };
    if current != username {
        return Ok(refuse_foreign(session, &current, &username));
    }

    let user = app_state
        .store
        .find_user(&username)
        .await?
        .ok_or(AppError::NotFound)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = FeedbackFormPage {
                user: Profile::from(&user),
                form: form.view(errors),
            };
            return Ok(render(session, StatusCode::UNPROCESSABLE_ENTITY, "feedback_form", page));
        }
    };

    let row = app_state
        .store
        .insert_feedback(NewFeedback {
            title: input.title,
            content: input.content,
            username: user.username,
        })
        .await?;

    info!("User {} added feedback {}", row.username, row.id);
    session.flash(FlashCategory::Success, "Thanks for adding your feedback!");
    Ok(redirect(session, &user_path(&row.username)))
}

pub async fn edit_form(
    Extension(app_state): Extension<Arc<AppState>>,
    session: Session,
    Path(feedback_id): Path<i32>,
) -> Result<Response, AppError> {
    let (session, current) = match require_login(session) {
        Ok(granted) => granted,
        Err(response) => return Ok(response),
    };

    let feedback = app_state
        .store
        .find_feedback(feedback_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if feedback.username != current {
        return Ok(refuse_foreign(session, &current, &feedback.username));
    }

    let user = app_state
        .store
        .find_user(&current)
        .await?
        .ok_or(AppError::NotFound)?;

    let form = FeedbackForm::prefilled(&feedback.title, &feedback.content).view(FieldErrors::new());
    let page = EditFeedbackPage {
        user: Profile::from(&user),
        feedback,
        form,
    };
    Ok(render(session, StatusCode::OK, "update_feedback", page))
}

pub async fn update(
    Extension(app_state): Extension<Arc<AppState>>,
    session: Session,
    Path(feedback_id): Path<i32>,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    let (mut session, current) = match require_login(session) {
        Ok(granted) => granted,
        Err(response) => return Ok(response),
    };

    let feedback = app_state
        .store
        .find_feedback(feedback_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if feedback.username != current {
        return Ok(refuse_foreign(session, &current, &feedback.username));
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let user = app_state
                .store
                .find_user(&current)
                .await?
                .ok_or(AppError::NotFound)?;
            let page = EditFeedbackPage {
                user: Profile::from(&user),
                feedback,
                form: form.view(errors),
            };
            return Ok(render(session, StatusCode::UNPROCESSABLE_ENTITY, "update_feedback", page));
        }
    };

    app_state
        .store
        .update_feedback(feedback.id, input.title, input.content)
        .await?
        .ok_or(AppError::NotFound)?;

    info!("User {} updated feedback {}", current, feedback.id);
    session.flash(FlashCategory::Success, "You've updated this feedback. Thank you.");
    Ok(redirect(session, &user_path(&current)))
}

pub async fn delete(
    Extension(app_state): Extension<Arc<AppState>>,
    session: Session,
    Path(feedback_id): Path<i32>,
) -> Result<Response, AppError> {
    let (mut session, current) = match require_login(session) {
        Ok(granted) => granted,
        Err(response) => return Ok(response),
    };

    let feedback = app_state
        .store
        .find_feedback(feedback_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if feedback.username != current {
        return Ok(refuse_foreign(session, &current, &feedback.username));
    }

    if !app_state.store.delete_feedback(feedback.id).await? {
        return Err(AppError::NotFound);
    }

    info!("User {} deleted feedback {}", current, feedback.id);
    session.flash(FlashCategory::Success, "You successfully deleted that feedback");
    Ok(redirect(session, &user_path(&feedback.username)))
}
