//! Domain models for Tally

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Label used for expenses whose category is missing
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Fractional digits kept for every stored amount
pub const AMOUNT_SCALE: u32 = 2;

/// Total digits an amount may have (integer + fractional)
pub const AMOUNT_MAX_DIGITS: u32 = 10;

/// A registered user
///
/// The password hash never leaves the store through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// A shared expense category, matched by exact name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    pub category_id: Option<i64>,
    /// Category name, joined from `categories` (None when uncategorized)
    pub category: Option<String>,
    pub title: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl Expense {
    /// Display label for this expense's category
    pub fn category_label(&self) -> &str {
        category_label(self.category.as_deref())
    }
}

/// Resolve an optional category name to its display label
pub fn category_label(name: Option<&str>) -> &str {
    match name {
        Some(n) if !n.is_empty() => n,
        _ => UNCATEGORIZED,
    }
}

/// Input for creating an expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount: Decimal,
    /// Category name; created on first use, None leaves the expense uncategorized
    pub category: Option<String>,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Editable fields of an existing expense
#[derive(Debug, Clone)]
pub struct ExpenseUpdate {
    pub title: String,
    pub amount: Decimal,
    pub category: Option<String>,
}

/// Normalize a submitted category name (blank means "no category")
pub fn normalize_category(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Parse a submitted amount into a two-place decimal
///
/// Rounds half away from zero and rejects values that do not fit
/// `AMOUNT_MAX_DIGITS` total digits.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(vec!["Amount is required.".to_string()]));
    }

    let parsed = Decimal::from_str(trimmed)
        .map_err(|_| Error::Validation(vec![format!("'{}' is not a valid amount.", trimmed)]))?;

    let mut amount =
        parsed.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(AMOUNT_SCALE);

    let limit = Decimal::from(10_i64.pow(AMOUNT_MAX_DIGITS - AMOUNT_SCALE));
    if amount.abs() >= limit {
        return Err(Error::Validation(vec![format!(
            "Ensure that there are no more than {} digits in total.",
            AMOUNT_MAX_DIGITS
        )]));
    }

    Ok(amount)
}

/// Longest accepted expense title
pub const TITLE_MAX_LENGTH: usize = 200;

/// Longest accepted category name
pub const CATEGORY_MAX_LENGTH: usize = 100;

/// Check the free-text fields of a submitted expense
pub fn validate_expense_fields(title: &str, category: Option<&str>) -> Result<()> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push("Title: This field is required.".to_string());
    } else if title.chars().count() > TITLE_MAX_LENGTH {
        errors.push(format!(
            "Title: Ensure this value has at most {} characters.",
            TITLE_MAX_LENGTH
        ));
    }

    if let Some(name) = category {
        if name.chars().count() > CATEGORY_MAX_LENGTH {
            errors.push(format!(
                "Category: Ensure this value has at most {} characters.",
                CATEGORY_MAX_LENGTH
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// An active login session
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_pads_scale() {
        let amount = parse_amount("12").unwrap();
        assert_eq!(amount, dec!(12.00));
        assert_eq!(amount.to_string(), "12.00");
    }

    #[test]
    fn test_parse_amount_rounds_half_away_from_zero() {
        assert_eq!(parse_amount("10.005").unwrap(), dec!(10.01));
        assert_eq!(parse_amount("-10.005").unwrap(), dec!(-10.01));
        assert_eq!(parse_amount(" 3.14159 ").unwrap(), dec!(3.14));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(parse_amount("abc"), Err(Error::Validation(_))));
        assert!(matches!(parse_amount(""), Err(Error::Validation(_))));
        assert!(matches!(parse_amount("   "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_amount_max_digits() {
        assert!(parse_amount("99999999.99").is_ok());
        assert!(matches!(
            parse_amount("100000000"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label(Some("Food")), "Food");
        assert_eq!(category_label(Some("")), UNCATEGORIZED);
        assert_eq!(category_label(None), UNCATEGORIZED);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some("  Bills ")), Some("Bills".to_string()));
        assert_eq!(normalize_category(Some("   ")), None);
        assert_eq!(normalize_category(None), None);
    }

    #[test]
    fn test_validate_expense_fields() {
        assert!(validate_expense_fields("Lunch", Some("Food")).is_ok());
        assert!(validate_expense_fields("Lunch", None).is_ok());

        match validate_expense_fields("  ", Some(&"x".repeat(CATEGORY_MAX_LENGTH + 1))) {
            Err(Error::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(validate_expense_fields(&"t".repeat(TITLE_MAX_LENGTH + 1), None).is_err());
    }
}
