//! Expense CRUD
//!
//! Every mutation is scoped by owner: an expense that belongs to someone
//! else is reported as not found, never as forbidden.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::categories::upsert_category;
use super::Database;
use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseUpdate, NewExpense};

const EXPENSE_SELECT: &str = r#"
    SELECT e.id, e.user_id, e.category_id, c.name, e.title, e.amount, e.date, e.description
    FROM expenses e
    LEFT JOIN categories c ON c.id = e.category_id
"#;

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let amount_str: String = row.get(5)?;
    let date_str: String = row.get(6)?;

    let amount = Decimal::from_str(&amount_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        category: row.get(3)?,
        title: row.get(4)?,
        amount,
        date,
        description: row.get(7)?,
    })
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Expense {}", id))
}

impl Database {
    /// Insert an expense for `user_id`, creating its category on first use
    pub fn insert_expense(&self, user_id: i64, expense: &NewExpense) -> Result<Expense> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let category_id = match expense.category.as_deref() {
            Some(name) => Some(upsert_category(&tx, name)?),
            None => None,
        };

        tx.execute(
            r#"
            INSERT INTO expenses (user_id, category_id, title, amount, date, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                category_id,
                expense.title,
                expense.amount.to_string(),
                expense.date.to_string(),
                expense.description,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Expense {
            id,
            user_id,
            category_id,
            category: expense.category.clone(),
            title: expense.title.clone(),
            amount: expense.amount,
            date: expense.date,
            description: expense.description.clone(),
        })
    }

    /// List expenses, optionally restricted to one owner, newest date first
    pub fn list_expenses(&self, owner: Option<i64>) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let expenses = match owner {
            Some(user_id) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE e.user_id = ? ORDER BY e.date DESC, e.id DESC",
                    EXPENSE_SELECT
                ))?;
                let rows = stmt
                    .query_map(params![user_id], row_to_expense)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("{} ORDER BY e.date DESC, e.id DESC", EXPENSE_SELECT))?;
                let rows = stmt
                    .query_map([], row_to_expense)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(expenses)
    }

    /// Most recent expenses across all users
    pub fn recent_expenses(&self, limit: usize) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY e.date DESC, e.id DESC LIMIT ?",
            EXPENSE_SELECT
        ))?;

        let expenses = stmt
            .query_map(params![limit as i64], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Count expenses, optionally for a single owner
    pub fn count_expenses(&self, owner: Option<i64>) -> Result<i64> {
        let conn = self.conn()?;
        let count = match owner {
            Some(user_id) => conn.query_row(
                "SELECT COUNT(*) FROM expenses WHERE user_id = ?",
                params![user_id],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Fetch one of `owner`'s expenses
    pub fn get_expense(&self, owner: i64, id: i64) -> Result<Expense> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE e.id = ? AND e.user_id = ?", EXPENSE_SELECT),
            params![id, owner],
            row_to_expense,
        )
        .optional()?
        .ok_or_else(|| not_found(id))
    }

    /// Replace title, amount, and category of one of `owner`'s expenses
    ///
    /// Last write wins; there is no version check.
    pub fn update_expense(&self, owner: i64, id: i64, update: &ExpenseUpdate) -> Result<Expense> {
        {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;

            let category_id = match update.category.as_deref() {
                Some(name) => Some(upsert_category(&tx, name)?),
                None => None,
            };

            let changed = tx.execute(
                "UPDATE expenses SET title = ?, amount = ?, category_id = ? WHERE id = ? AND user_id = ?",
                params![
                    update.title,
                    update.amount.to_string(),
                    category_id,
                    id,
                    owner
                ],
            )?;

            if changed == 0 {
                return Err(not_found(id));
            }
            tx.commit()?;
        }

        self.get_expense(owner, id)
    }

    /// Delete one of `owner`'s expenses
    pub fn delete_expense(&self, owner: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, owner],
        )?;

        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
