//! Expense handlers
//!
//! All lookups and writes are scoped to the logged-in user; someone else's
//! expense is a 404.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{read_body, AppError, AppState, CurrentUser, Notice, EXPENSE_LIST_PATH};
use tally_core::models::{
    normalize_category, parse_amount, validate_expense_fields, Expense, ExpenseUpdate, NewExpense,
};
use tally_core::{ContextAssembler, ExpenseListContext};

/// An amount as submitted: form fields arrive as text, JSON may send a number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Text(String),
    Number(serde_json::Number),
}

impl AmountField {
    fn as_text(&self) -> String {
        match self {
            AmountField::Text(s) => s.clone(),
            AmountField::Number(n) => n.to_string(),
        }
    }
}

fn amount_text(field: &Option<AmountField>) -> String {
    field.as_ref().map(AmountField::as_text).unwrap_or_default()
}

/// Fields for creating an expense
#[derive(Debug, Deserialize)]
pub struct AddExpenseForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: Option<AmountField>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// YYYY-MM-DD; today when absent or blank
    #[serde(default)]
    pub date: Option<String>,
}

/// Fields for editing an expense
#[derive(Debug, Deserialize)]
pub struct EditExpenseForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: Option<AmountField>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct ExpenseFormResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense: Option<Expense>,
    /// Existing category names, for suggestions
    pub categories: Vec<String>,
    pub today: NaiveDate,
}

#[derive(Serialize)]
pub struct ExpenseResponse {
    pub expense: Expense,
}

fn parse_date(input: Option<&str>) -> Result<NaiveDate, AppError> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Utc::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("Enter a valid date (YYYY-MM-DD).")),
    }
}

fn form_response(
    state: &AppState,
    expense: Option<Expense>,
) -> Result<ExpenseFormResponse, AppError> {
    let categories = state
        .db
        .list_categories()?
        .into_iter()
        .map(|c| c.name)
        .collect();

    Ok(ExpenseFormResponse {
        expense,
        categories,
        today: Utc::now().date_naive(),
    })
}

/// GET /add/ - Data for the add form
pub async fn add_expense_form(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExpenseFormResponse>, AppError> {
    Ok(Json(form_response(&state, None)?))
}

/// POST /add/ - Record an expense for the current user
pub async fn add_expense(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<Notice<ExpenseResponse>>, AppError> {
    let form: AddExpenseForm = read_body(request).await?;

    let category = normalize_category(form.category.as_deref());
    validate_expense_fields(&form.title, category.as_deref())?;
    let amount = parse_amount(&amount_text(&form.amount))?;
    let date = parse_date(form.date.as_deref())?;

    let new_expense = NewExpense {
        title: form.title.trim().to_string(),
        amount,
        category,
        date,
        description: form
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    };

    let expense = state.db.insert_expense(user.id, &new_expense)?;

    state.db.log_audit(
        &user.username,
        "create",
        Some("expense"),
        Some(expense.id),
        Some(&format!("amount={}", expense.amount)),
    )?;

    Ok(Json(Notice::new(
        "Expense added successfully!",
        EXPENSE_LIST_PATH,
        ExpenseResponse { expense },
    )))
}

/// GET /list/ - The current user's expenses with owner-scoped insights
pub async fn expense_list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ExpenseListContext>, AppError> {
    let ctx = ContextAssembler::new(&state.db, &state.settings).expense_list(user.id)?;

    state.db.log_audit(
        &user.username,
        "list",
        Some("expense"),
        None,
        Some(&format!("count={}", ctx.expenses.len())),
    )?;

    Ok(Json(ctx))
}

/// GET /edit/:id/ - Current values for the edit form
pub async fn edit_expense_form(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseFormResponse>, AppError> {
    let expense = state.db.get_expense(user.id, id)?;
    Ok(Json(form_response(&state, Some(expense))?))
}

/// POST /edit/:id/ - Change title, amount, and category
pub async fn edit_expense(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Notice<ExpenseResponse>>, AppError> {
    // Ownership before the body: someone else's expense is a 404 whatever was posted
    state.db.get_expense(user.id, id)?;

    let form: EditExpenseForm = read_body(request).await?;

    let category = normalize_category(form.category.as_deref());
    validate_expense_fields(&form.title, category.as_deref())?;
    let amount = parse_amount(&amount_text(&form.amount))?;

    let expense = state.db.update_expense(
        user.id,
        id,
        &ExpenseUpdate {
            title: form.title.trim().to_string(),
            amount,
            category,
        },
    )?;

    state.db.log_audit(
        &user.username,
        "update",
        Some("expense"),
        Some(id),
        Some(&format!("amount={}", expense.amount)),
    )?;

    Ok(Json(Notice::new(
        "Expense updated successfully!",
        EXPENSE_LIST_PATH,
        ExpenseResponse { expense },
    )))
}

/// POST /delete/:id/
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Notice<serde_json::Value>>, AppError> {
    state.db.delete_expense(user.id, id)?;

    state
        .db
        .log_audit(&user.username, "delete", Some("expense"), Some(id), None)?;

    Ok(Json(Notice::new(
        "Expense deleted successfully!",
        EXPENSE_LIST_PATH,
        serde_json::json!({ "id": id }),
    )))
}
