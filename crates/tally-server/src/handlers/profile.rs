//! Profile handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Extension, Json,
};
use serde::Serialize;

use crate::{read_body, AppError, AppState, CurrentUser, Notice, PROFILE_PATH};
use tally_core::models::{ProfileUpdate, User};

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// GET /profile/
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    state
        .db
        .log_audit(&user.username, "view", Some("profile"), Some(user.id), None)?;

    Ok(Json(ProfileResponse { user }))
}

/// GET /profile/edit/ - Current values for the edit form
pub async fn profile_edit_form(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ProfileResponse> {
    Json(ProfileResponse { user })
}

/// POST /profile/edit/ - Update first name, last name, and email
pub async fn profile_edit(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<Notice<ProfileResponse>>, AppError> {
    let update: ProfileUpdate = read_body(request).await?;
    state.db.update_profile(user.id, &update)?;

    let updated = state
        .db
        .get_user(user.id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    state
        .db
        .log_audit(&user.username, "update", Some("profile"), Some(user.id), None)?;

    Ok(Json(Notice::new(
        "Profile updated successfully!",
        PROFILE_PATH,
        ProfileResponse { user: updated },
    )))
}
