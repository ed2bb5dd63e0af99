//! Dashboard handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{AppError, AppState, CurrentUser};
use tally_core::{ContextAssembler, DashboardContext};

/// GET /dashboard/ - Totals, series, and insight lines over every user's expenses
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<DashboardContext>, AppError> {
    let ctx = ContextAssembler::new(&state.db, &state.settings).dashboard()?;

    state.db.log_audit(
        &user.username,
        "view",
        Some("dashboard"),
        None,
        Some(&format!("transactions={}", ctx.transactions)),
    )?;

    Ok(Json(ctx))
}
