// src/routes/auth.rs
use axum::{
    extract::Form,
    http::StatusCode,
    response::Response,
    Extension,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::AppError,
    forms::{FieldErrors, FormView, LoginForm, RegisterForm},
    models::user::NewUser,
    session::{FlashCategory, Session},
    state::AppState,
    store::{StoreError, UniqueField},
    views::{redirect, render, user_path, FormPage},
};

pub async fn home(mut session: Session) -> Response {
    session.flash(FlashCategory::Primary, "Welcome to the home page");
    redirect(session, "/register")
}

pub async fn register_form(session: Session) -> Response {
    if let Some(current) = session.username() {
        let to = user_path(current);
        return redirect(session, &to);
    }
    render(session, StatusCode::OK, "register", FormPage { form: FormView::default() })
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    mut session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Some(current) = session.username() {
        let to = user_path(current);
        return Ok(redirect(session, &to));
    }

    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => {
            let page = FormPage { form: form.view(errors) };
            return Ok(render(session, StatusCode::UNPROCESSABLE_ENTITY, "register", page));
        }
    };

    let password = app_state.auth.hash_password(&registration.password).await?;
    let new_user = NewUser {
        username: registration.username,
        password,
        email: registration.email,
        first_name: registration.first_name,
        last_name: registration.last_name,
    };

    let user = match app_state.store.insert_user(new_user).await {
        Ok(user) => user,
        Err(StoreError::Conflict(field)) => {
            warn!("Registration rejected: {} already in use", field);
            let view = form.view(FieldErrors::new());
            let view = match field {
                UniqueField::Username => view.with_error("username", "Username already taken."),
                UniqueField::Email => view.with_error("email", "Email already registered."),
            };
            let page = FormPage { form: view };
            return Ok(render(session, StatusCode::CONFLICT, "register", page));
        }
        Err(e) => return Err(e.into()),
    };

    info!("Registered user {}", user.username);
    session.log_in(user.username.as_str());
    session.flash(
        FlashCategory::Success,
        format!("Welcome, {}! Your account was created successfully!", user.username),
    );
    Ok(redirect(session, &user_path(&user.username)))
}

pub async fn login_form(mut session: Session) -> Response {
    if let Some(current) = session.username().map(str::to_owned) {
        session.flash(FlashCategory::Info, "You're already logged in! See below.");
        return redirect(session, &user_path(&current));
    }
    render(session, StatusCode::OK, "login", FormPage { form: FormView::default() })
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Some(current) = session.username().map(str::to_owned) {
        session.flash(FlashCategory::Info, "You're already logged in! See below.");
        return Ok(redirect(session, &user_path(&current)));
    }

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = FormPage { form: form.view(errors) };
            return Ok(render(session, StatusCode::UNPROCESSABLE_ENTITY, "login", page));
        }
    };

    let user = app_state
        .auth
        .authenticate(app_state.store.as_ref(), &credentials.username, &credentials.password)
        .await?;

    match user {
        Some(user) => {
            info!("User {} logged in", user.username);
            session.log_in(user.username.as_str());
            session.flash(FlashCategory::Success, format!("Welcome back, {}!", user.username));
            Ok(redirect(session, &user_path(&user.username)))
        }
        None => {
            warn!("Failed login attempt for {}", credentials.username);
            session.flash(FlashCategory::Danger, "Your username or password is incorrect!");
            Ok(redirect(session, "/login"))
        }
    }
}

pub async fn logout(mut session: Session) -> Response {
    match session.log_out() {
        Some(username) => {
            info!("User {} logged out", username);
            session.flash(
                FlashCategory::Success,
                format!("Good-bye {username}, you logged out successfully."),
            );
        }
        None => {
            session.flash(
                FlashCategory::Warning,
                "You can't logout, because you're not logged in!",
            );
        }
    }
    redirect(session, "/login")
}
