//! Spending aggregation
//!
//! Pure functions over a slice of expenses. All sums use exact decimal
//! arithmetic; conversion to `f64` only happens in [`ChartSeries`], which
//! exists for charting and nothing else.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Expense;

/// Spending in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    /// Full month name, e.g. "January"
    pub label: String,
    pub total: Decimal,
}

/// Spending in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// Category label ("Uncategorized" when the expense has none)
    pub category: String,
    pub total: Decimal,
}

/// Spending per owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserTotal {
    pub user_id: i64,
    pub total: Decimal,
}

/// The three derived views over a set of expenses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendingSummary {
    pub total: Decimal,
    pub monthly: Vec<MonthlyTotal>,
    pub by_category: Vec<CategoryTotal>,
}

/// Parallel label/value arrays for a chart
///
/// Values are lossy `f64` conversions of exact totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn push(&mut self, label: &str, value: Decimal) {
        self.labels.push(label.to_string());
        self.values.push(value.to_f64().unwrap_or(0.0));
    }
}

/// Sum of every amount; zero for an empty set
pub fn total(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

/// Sum per (year, month), oldest first. Months without expenses are omitted.
pub fn monthly_series(expenses: &[Expense]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for expense in expenses {
        *months
            .entry((expense.date.year(), expense.date.month()))
            .or_insert(Decimal::ZERO) += expense.amount;
    }

    months
        .into_iter()
        .map(|((year, month), total)| MonthlyTotal {
            year,
            month,
            label: month_name(month).to_string(),
            total,
        })
        .collect()
}

/// Sum per category label, largest first
///
/// Equal totals are ordered by label so the series is stable.
pub fn category_series(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut categories: HashMap<&str, Decimal> = HashMap::new();
    for expense in expenses {
        *categories
            .entry(expense.category_label())
            .or_insert(Decimal::ZERO) += expense.amount;
    }

    let mut series: Vec<CategoryTotal> = categories
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();

    series.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    series
}

/// Sum per owner, ordered by user ID
pub fn user_series(expenses: &[Expense]) -> Vec<UserTotal> {
    let mut users: BTreeMap<i64, Decimal> = BTreeMap::new();
    for expense in expenses {
        *users.entry(expense.user_id).or_insert(Decimal::ZERO) += expense.amount;
    }

    users
        .into_iter()
        .map(|(user_id, total)| UserTotal { user_id, total })
        .collect()
}

/// Compute total, monthly series, and category series in one pass over the input
pub fn summarize(expenses: &[Expense]) -> SpendingSummary {
    SpendingSummary {
        total: total(expenses),
        monthly: monthly_series(expenses),
        by_category: category_series(expenses),
    }
}

impl SpendingSummary {
    /// Month labels and totals for charting
    pub fn monthly_chart(&self) -> ChartSeries {
        let mut chart = ChartSeries::default();
        for m in &self.monthly {
            chart.push(&m.label, m.total);
        }
        chart
    }

    /// Category labels and totals for charting
    pub fn category_chart(&self) -> ChartSeries {
        let mut chart = ChartSeries::default();
        for c in &self.by_category {
            chart.push(&c.category, c.total);
        }
        chart
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}
