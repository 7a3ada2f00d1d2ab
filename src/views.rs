//! Page models. Handlers hand these to [`render`], which serializes them as
//! JSON alongside the flashes drained from the session.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::forms::FormView;
use crate::models::feedback::Feedback;
use crate::models::user::Profile;
use crate::session::{Flash, Session};

#[derive(Serialize)]
pub struct Page<T> {
    pub template: &'static str,
    pub flashes: Vec<Flash>,
    #[serde(flatten)]
    pub context: T,
}

#[derive(Serialize)]
pub struct FormPage {
    pub form: FormView,
}

#[derive(Serialize)]
pub struct UserPage {
    pub user: Profile,
    pub feedback: Vec<Feedback>,
}

#[derive(Serialize)]
pub struct FeedbackFormPage {
    pub user: Profile,
    pub form: FormView,
}

#[derive(Serialize)]
pub struct EditFeedbackPage {
    pub user: Profile,
    pub feedback: Feedback,
    pub form: FormView,
}

pub fn render<T: Serialize>(
    mut session: Session,
    status: StatusCode,
    template: &'static str,
    context: T,
) -> Response {
    let page = Page {
        template,
        flashes: session.take_flashes(),
        context,
    };
    (status, session, Json(page)).into_response()
}

pub fn redirect(session: Session, to: &str) -> Response {
    (session, Redirect::to(to)).into_response()
}

pub fn user_path(username: &str) -> String {
    format!("/users/{username}")
}
