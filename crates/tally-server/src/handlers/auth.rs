//! Signup, login, and logout handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    clear_session_cookie, read_body, request_token, session_cookie, AppError, AppState,
    CurrentUser, Notice, DASHBOARD_PATH, LOGIN_PATH,
};
use tally_core::auth;
use tally_core::models::User;

/// Signup form fields
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of a successful login
#[derive(Serialize)]
pub struct LoginResponse {
    pub user: User,
    /// Send as `Authorization: Bearer <token>` when not using the cookie
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct FormDescription {
    pub form: &'static str,
    pub fields: &'static [&'static str],
}

/// GET / - Dashboard when logged in, login page otherwise
pub async fn home(user: Option<Extension<CurrentUser>>) -> Redirect {
    if user.is_some() {
        Redirect::to(DASHBOARD_PATH)
    } else {
        Redirect::to(LOGIN_PATH)
    }
}

/// GET /signup/
pub async fn signup_form(user: Option<Extension<CurrentUser>>) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    Json(FormDescription {
        form: "signup",
        fields: &["username", "password1", "password2"],
    })
    .into_response()
}

/// POST /signup/ - Create an account (does not log in)
pub async fn signup(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<CurrentUser>>,
    request: Request,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let form: SignupForm = read_body(request).await?;
    let created =
        auth::register_user(&state.db, &form.username, &form.password1, &form.password2)?;

    state.db.log_audit(
        &created.username,
        "signup",
        Some("user"),
        Some(created.id),
        None,
    )?;

    Ok(Json(Notice::new(
        "Account created successfully! You can now log in.",
        LOGIN_PATH,
        serde_json::json!({ "user": created }),
    ))
    .into_response())
}

/// GET /login/
pub async fn login_form(user: Option<Extension<CurrentUser>>) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    Json(FormDescription {
        form: "login",
        fields: &["username", "password"],
    })
    .into_response()
}

/// POST /login/ - Check credentials and open a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<CurrentUser>>,
    request: Request,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let form: LoginForm = read_body(request).await?;
    let ttl = state.settings.session_ttl();

    let issued = match auth::login(&state.db, &form.username, &form.password, ttl) {
        Ok(issued) => issued,
        Err(e) => {
            state.db.log_audit(
                form.username.trim(),
                "login_failed",
                Some("user"),
                None,
                None,
            )?;
            return Err(e.into());
        }
    };

    state.db.log_audit(
        &issued.user.username,
        "login",
        Some("user"),
        Some(issued.user.id),
        None,
    )?;
    info!(user_id = issued.user.id, "User logged in");

    let cookie = session_cookie(&issued.token, state.settings.session_ttl_secs);
    let message = format!("Welcome back, {}!", issued.user.username);

    let mut response = Json(Notice::new(
        message,
        DASHBOARD_PATH,
        LoginResponse {
            user: issued.user,
            token: issued.token,
            expires_at: issued.session.expires_at,
        },
    ))
    .into_response();

    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }

    Ok(response)
}

/// GET|POST /logout/ - End the session (if any) and clear the cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = request_token(&headers) {
        auth::logout(&state.db, &token)?;
    }

    if let Some(Extension(CurrentUser(user))) = user {
        state
            .db
            .log_audit(&user.username, "logout", Some("user"), Some(user.id), None)?;
        info!(user_id = user.id, "User logged out");
    }

    let mut response = Json(Notice::new(
        "You have been logged out successfully.",
        LOGIN_PATH,
        serde_json::json!({}),
    ))
    .into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, clear_session_cookie());

    Ok(response)
}
