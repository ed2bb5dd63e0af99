//! Expense command implementations
//!
//! Every command names its owner with `--user`; one user's expenses are never
//! visible to or changeable through another.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tally_core::db::Database;
use tally_core::models::{normalize_category, parse_amount, validate_expense_fields, Expense, NewExpense};
use tracing::info;

use super::{find_user, truncate};

/// Raw expense fields as given on the command line
#[derive(Debug, Clone, Copy)]
pub struct ExpenseInput<'a> {
    pub title: &'a str,
    pub amount: &'a str,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub date: Option<&'a str>,
}

pub fn cmd_expenses_list(db: &Database, username: &str, limit: usize) -> Result<()> {
    let user = find_user(db, username)?;
    let expenses = db.list_expenses(Some(user.id))?;

    if expenses.is_empty() {
        println!("No expenses for {}. Add one with: tally expenses add", user.username);
        return Ok(());
    }

    println!();
    println!(
        "{:>5}  {:10}  {:30}  {:>12}  {}",
        "ID", "Date", "Title", "Amount", "Category"
    );
    println!("{}", "-".repeat(80));

    for e in expenses.iter().take(limit) {
        println!(
            "{:>5}  {:10}  {:30}  {:>12}  {}",
            e.id,
            e.date,
            truncate(&e.title, 30),
            e.amount,
            e.category_label()
        );
    }

    if expenses.len() > limit {
        println!();
        println!("   ... and {} more (use --limit)", expenses.len() - limit);
    }

    Ok(())
}

pub fn cmd_expenses_add(db: &Database, username: &str, input: &ExpenseInput<'_>) -> Result<Expense> {
    let user = find_user(db, username)?;

    let category = normalize_category(input.category);
    validate_expense_fields(input.title, category.as_deref())?;
    let amount = parse_amount(input.amount)?;
    let date = match input.date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => Utc::now().date_naive(),
    };

    let expense = db.insert_expense(
        user.id,
        &NewExpense {
            title: input.title.trim().to_string(),
            amount,
            category,
            date,
            description: input
                .description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        },
    )?;

    db.log_audit(
        &user.username,
        "create",
        Some("expense"),
        Some(expense.id),
        Some("via cli"),
    )?;

    info!(user_id = user.id, expense_id = expense.id, "Recorded expense from CLI");
    println!(
        "✓ Recorded expense #{}: {} {} ({})",
        expense.id,
        expense.title,
        expense.amount,
        expense.category_label()
    );

    Ok(expense)
}

pub fn cmd_expenses_delete(db: &Database, username: &str, id: i64) -> Result<()> {
    let user = find_user(db, username)?;

    db.delete_expense(user.id, id)
        .with_context(|| format!("Could not delete expense {} for {}", id, user.username))?;

    db.log_audit(&user.username, "delete", Some("expense"), Some(id), Some("via cli"))?;

    info!(user_id = user.id, expense_id = id, "Deleted expense from CLI");
    println!("✓ Deleted expense #{}", id);
    Ok(())
}
