//! Integration tests for tally-core
//!
//! These tests exercise the full signup -> record -> summarize workflow.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::{
    aggregate, auth,
    db::Database,
    insights::{InsightContext, InsightEngine, SuggestionKind, NO_DATA_MESSAGE},
    models::{normalize_category, parse_amount, NewExpense},
    ContextAssembler, Error, Settings,
};

fn record(db: &Database, user: i64, title: &str, amount: &str, category: &str, date: &str) {
    db.insert_expense(
        user,
        &NewExpense {
            title: title.to_string(),
            amount: parse_amount(amount).expect("valid amount"),
            category: normalize_category(Some(category)),
            date: chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date"),
            description: None,
        },
    )
    .expect("Failed to insert expense");
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[test]
fn test_signup_record_and_summarize() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let settings = Settings::default();

    let alice = auth::register_user(&db, "alice", "Xk9!mq2Lw", "Xk9!mq2Lw").unwrap();
    let issued = auth::login(&db, "alice", "Xk9!mq2Lw", settings.session_ttl()).unwrap();
    let current = auth::resume_session(&db, &issued.token, settings.session_ttl())
        .unwrap()
        .expect("session should be live");
    assert_eq!(current.id, alice.id);

    record(&db, alice.id, "Groceries", "1200", "Food", "2024-03-05");
    record(&db, alice.id, "Train", "800", "Travel", "2024-02-14");
    record(&db, alice.id, "Electricity", "4500", "Bills", "2024-03-01");

    let expenses = db.list_expenses(Some(alice.id)).unwrap();
    let summary = aggregate::summarize(&expenses);
    assert_eq!(summary.total, dec!(6500.00));

    let lines = InsightEngine::new().generate(&InsightContext::new(&summary.by_category, &settings));
    let above: Vec<&str> = lines
        .iter()
        .filter(|s| s.kind == SuggestionKind::AboveAverage)
        .filter_map(|s| s.category.as_deref())
        .collect();
    assert_eq!(above, vec!["Bills"]);
    assert_eq!(lines[0].category.as_deref(), Some("Bills"));
    assert_eq!(lines[1].category.as_deref(), Some("Travel"));
}

#[test]
fn test_new_user_sees_no_data_line() {
    let db = Database::in_memory().unwrap();
    let settings = Settings::default();
    let user = auth::register_user(&db, "newbie", "Xk9!mq2Lw", "Xk9!mq2Lw").unwrap();

    let list = ContextAssembler::new(&db, &settings)
        .expense_list(user.id)
        .unwrap();
    assert_eq!(list.total, Decimal::ZERO);
    assert_eq!(list.suggestions, vec![NO_DATA_MESSAGE.to_string()]);
}

#[test]
fn test_other_users_expense_cannot_be_deleted() {
    let db = Database::in_memory().unwrap();
    let alice = db.create_user("alice", "x").unwrap();
    let mallory = db.create_user("mallory", "x").unwrap();

    record(&db, alice, "Rent", "900", "Housing", "2024-03-01");
    let target = db.list_expenses(Some(alice)).unwrap()[0].clone();

    assert!(matches!(
        db.delete_expense(mallory, target.id),
        Err(Error::NotFound(_))
    ));
    assert_eq!(db.get_expense(alice, target.id).unwrap(), target);
}

#[test]
fn test_blank_category_is_uncategorized() {
    let db = Database::in_memory().unwrap();
    let settings = Settings::default();
    let user = db.create_user("alice", "x").unwrap();

    record(&db, user, "Something", "10", "   ", "2024-03-01");
    record(&db, user, "Other", "5", "Food", "2024-03-02");

    let dashboard = ContextAssembler::new(&db, &settings).dashboard().unwrap();
    assert_eq!(dashboard.categories, vec!["Uncategorized", "Food"]);
    assert_eq!(db.list_categories().unwrap().len(), 1);
}

#[test]
fn test_dashboard_matches_monthly_and_category_sums() {
    let db = Database::in_memory().unwrap();
    let settings = Settings::default();
    let a = db.create_user("a", "x").unwrap();
    let b = db.create_user("b", "x").unwrap();

    record(&db, a, "x", "0.10", "Food", "2023-12-31");
    record(&db, b, "y", "0.20", "Food", "2024-01-01");
    record(&db, a, "z", "99.99", "Fun", "2024-01-15");

    let dashboard = ContextAssembler::new(&db, &settings).dashboard().unwrap();
    let monthly: Decimal = dashboard.monthly.iter().map(|m| m.total).sum();
    let by_category: Decimal = dashboard.by_category.iter().map(|c| c.total).sum();

    assert_eq!(dashboard.total_expense, dec!(100.29));
    assert_eq!(monthly, dashboard.total_expense);
    assert_eq!(by_category, dashboard.total_expense);
    assert_eq!(dashboard.months, vec!["December", "January"]);
}
