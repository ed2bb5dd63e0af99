//! View context assembler
//!
//! Builds the per-request data handed to the presentation layer:
//! - Dashboard: every user's expenses, aggregated, with insight lines
//! - Expense list: one owner's expenses with owner-scoped insight lines
//!
//! Nothing here is cached between requests; each call reads the store.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{self, CategoryTotal, MonthlyTotal, UserTotal};
use crate::db::Database;
use crate::error::Result;
use crate::insights::{InsightContext, InsightEngine, Suggestion};
use crate::models::Expense;
use crate::settings::Settings;

/// Everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardContext {
    pub total_expense: Decimal,
    /// Configured monthly income
    pub total_income: Decimal,
    /// `total_income - total_expense`; may be negative
    pub savings: Decimal,
    /// Number of expenses across all users
    pub transactions: i64,
    /// Chart labels and values, oldest month first
    pub months: Vec<String>,
    pub totals: Vec<f64>,
    /// Chart labels and values, largest category first
    pub categories: Vec<String>,
    pub amounts: Vec<f64>,
    pub monthly: Vec<MonthlyTotal>,
    pub by_category: Vec<CategoryTotal>,
    /// Spend per owner, ordered by user ID
    pub by_user: Vec<UserTotal>,
    pub suggestions: Vec<String>,
    pub insights: Vec<Suggestion>,
    /// Newest expenses across all users
    pub recent_expenses: Vec<Expense>,
}

/// One owner's expense list
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseListContext {
    /// Newest first
    pub expenses: Vec<Expense>,
    pub total: Decimal,
    pub category_data: Vec<CategoryTotal>,
    pub categories: Vec<String>,
    pub amounts: Vec<f64>,
    pub suggestions: Vec<String>,
    pub insights: Vec<Suggestion>,
}

/// Assembles view contexts from the store
pub struct ContextAssembler<'a> {
    db: &'a Database,
    settings: &'a Settings,
    engine: InsightEngine,
}

impl<'a> ContextAssembler<'a> {
    /// Create an assembler with the built-in insight rules
    pub fn new(db: &'a Database, settings: &'a Settings) -> Self {
        Self {
            db,
            settings,
            engine: InsightEngine::new(),
        }
    }

    /// Dashboard over all users' expenses
    pub fn dashboard(&self) -> Result<DashboardContext> {
        let expenses = self.db.list_expenses(None)?;
        let summary = aggregate::summarize(&expenses);

        let insights = self.engine.generate(
            &InsightContext::new(&summary.by_category, self.settings)
                .with_overall_total(summary.total),
        );

        let monthly_chart = summary.monthly_chart();
        let category_chart = summary.category_chart();
        let recent_expenses = self
            .db
            .recent_expenses(self.settings.recent_expenses_limit)?;

        tracing::debug!(
            expenses = expenses.len(),
            insights = insights.len(),
            "Assembled dashboard"
        );

        Ok(DashboardContext {
            total_expense: summary.total,
            total_income: self.settings.monthly_income,
            savings: self.settings.monthly_income - summary.total,
            transactions: expenses.len() as i64,
            months: monthly_chart.labels,
            totals: monthly_chart.values,
            categories: category_chart.labels,
            amounts: category_chart.values,
            monthly: summary.monthly,
            by_category: summary.by_category,
            by_user: aggregate::user_series(&expenses),
            suggestions: insights.iter().map(|s| s.message.clone()).collect(),
            insights,
            recent_expenses,
        })
    }

    /// Expense list for one owner
    pub fn expense_list(&self, owner: i64) -> Result<ExpenseListContext> {
        let expenses = self.db.list_expenses(Some(owner))?;
        let total = aggregate::total(&expenses);
        let category_data = aggregate::category_series(&expenses);

        let insights = self
            .engine
            .generate(&InsightContext::new(&category_data, self.settings));

        let (categories, amounts) = split_chart(&category_data);

        Ok(ExpenseListContext {
            expenses,
            total,
            categories,
            amounts,
            category_data,
            suggestions: insights.iter().map(|s| s.message.clone()).collect(),
            insights,
        })
    }
}

fn split_chart(series: &[CategoryTotal]) -> (Vec<String>, Vec<f64>) {
    use rust_decimal::prelude::ToPrimitive;

    series
        .iter()
        .map(|c| (c.category.clone(), c.total.to_f64().unwrap_or(0.0)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{SuggestionKind, NO_DATA_MESSAGE};
    use crate::models::NewExpense;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn add(db: &Database, user: i64, category: Option<&str>, amount: Decimal, date: &str) {
        db.insert_expense(
            user,
            &NewExpense {
                title: format!("{:?} {}", category, amount),
                amount,
                category: category.map(str::to_string),
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                description: None,
            },
        )
        .unwrap();
    }

    fn setup() -> (Database, i64, i64) {
        let db = Database::in_memory().unwrap();
        let alice = db.create_user("alice", "x").unwrap();
        let bob = db.create_user("bob", "x").unwrap();
        (db, alice, bob)
    }

    #[test]
    fn test_empty_dashboard() {
        let (db, _, _) = setup();
        let settings = Settings::default();

        let ctx = ContextAssembler::new(&db, &settings).dashboard().unwrap();
        assert_eq!(ctx.total_expense, Decimal::ZERO);
        assert_eq!(ctx.savings, dec!(25000));
        assert_eq!(ctx.transactions, 0);
        assert!(ctx.months.is_empty());
        assert_eq!(ctx.suggestions, vec![NO_DATA_MESSAGE.to_string()]);
        assert!(ctx.recent_expenses.is_empty());
    }

    #[test]
    fn test_dashboard_spans_all_users() {
        let (db, alice, bob) = setup();
        let settings = Settings::default();
        add(&db, alice, Some("Food"), dec!(1200.00), "2024-03-05");
        add(&db, alice, Some("Travel"), dec!(800.00), "2024-02-10");
        add(&db, bob, Some("Bills"), dec!(4500.00), "2024-03-01");

        let ctx = ContextAssembler::new(&db, &settings).dashboard().unwrap();
        assert_eq!(ctx.total_expense, dec!(6500.00));
        assert_eq!(ctx.savings, dec!(18500.00));
        assert_eq!(ctx.transactions, 3);
        assert_eq!(ctx.months, vec!["February", "March"]);
        assert_eq!(ctx.categories, vec!["Bills", "Food", "Travel"]);
        assert_eq!(
            ctx.by_user,
            vec![
                UserTotal {
                    user_id: alice,
                    total: dec!(2000.00)
                },
                UserTotal {
                    user_id: bob,
                    total: dec!(4500.00)
                },
            ]
        );

        let kinds: Vec<SuggestionKind> = ctx.insights.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SuggestionKind::HighestCategory,
                SuggestionKind::LowestCategory,
                SuggestionKind::AboveAverage,
            ]
        );

        // Newest first
        assert_eq!(ctx.recent_expenses[0].date.to_string(), "2024-03-05");
    }

    #[test]
    fn test_dashboard_high_spending_and_recent_limit() {
        let (db, alice, _) = setup();
        let settings = Settings {
            recent_expenses_limit: 2,
            monthly_income: dec!(10000),
            ..Settings::default()
        };
        add(&db, alice, Some("Rent"), dec!(9000.00), "2024-01-01");
        add(&db, alice, Some("Rent"), dec!(1500.00), "2024-02-01");
        add(&db, alice, None, dec!(10.00), "2024-02-02");

        let ctx = ContextAssembler::new(&db, &settings).dashboard().unwrap();
        assert_eq!(ctx.recent_expenses.len(), 2);
        assert_eq!(
            ctx.insights.last().map(|s| s.kind),
            Some(SuggestionKind::HighSpending)
        );
        assert_eq!(ctx.savings, dec!(-510.00));
        assert!(ctx.categories.contains(&"Uncategorized".to_string()));
    }

    #[test]
    fn test_expense_list_is_owner_scoped() {
        let (db, alice, bob) = setup();
        let settings = Settings::default();
        add(&db, alice, Some("Food"), dec!(20.00), "2024-03-05");
        add(&db, bob, Some("Rent"), dec!(15000.00), "2024-03-01");

        let ctx = ContextAssembler::new(&db, &settings)
            .expense_list(alice)
            .unwrap();
        assert_eq!(ctx.expenses.len(), 1);
        assert_eq!(ctx.total, dec!(20.00));
        assert_eq!(ctx.categories, vec!["Food"]);

        // Owner lists never carry the overall spending warning
        assert!(ctx
            .insights
            .iter()
            .all(|s| s.kind != SuggestionKind::HighSpending));
    }
}
