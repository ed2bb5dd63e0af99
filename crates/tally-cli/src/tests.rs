//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use tally_core::db::Database;
use tally_core::Settings;

use crate::commands::{self, truncate, ExpenseInput};

const PASSWORD: &str = "Xk9!mq2Lw";

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn input<'a>(title: &'a str, amount: &'a str, category: Option<&'a str>) -> ExpenseInput<'a> {
    ExpenseInput {
        title,
        amount,
        category,
        description: None,
        date: Some("2024-03-10"),
    }
}

// ========== Init Tests ==========

#[test]
fn test_cmd_init_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    // Re-running is harmless
    commands::cmd_init(&path, true).unwrap();
}

// ========== Users Command Tests ==========

#[test]
fn test_cmd_users_add_and_list() {
    let db = setup_test_db();

    let user = commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();
    assert_eq!(user.username, "alice");
    assert!(commands::cmd_users_list(&db).is_ok());

    let entries = db.list_audit_log(5).unwrap();
    assert_eq!(entries[0].action, "signup");
    assert_eq!(entries[0].details.as_deref(), Some("via cli"));
}

#[test]
fn test_cmd_users_add_rejects_weak_password() {
    let db = setup_test_db();

    let result = commands::cmd_users_add(&db, "alice", "12345678");
    assert!(result.is_err());
    assert!(db.list_users().unwrap().is_empty());
}

#[test]
fn test_cmd_users_list_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_users_list(&db).is_ok());
}

// ========== Expenses Command Tests ==========

#[test]
fn test_cmd_expenses_add() {
    let db = setup_test_db();
    let user = commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();

    let expense = commands::cmd_expenses_add(&db, "alice", &input("Lunch", "120.5", Some("Food")))
        .unwrap();
    assert_eq!(expense.amount.to_string(), "120.50");
    assert_eq!(expense.category.as_deref(), Some("Food"));
    assert_eq!(expense.date.to_string(), "2024-03-10");

    assert_eq!(db.count_expenses(Some(user.id)).unwrap(), 1);
}

#[test]
fn test_cmd_expenses_add_uncategorized_default_date() {
    let db = setup_test_db();
    commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();

    let expense = commands::cmd_expenses_add(
        &db,
        "alice",
        &ExpenseInput {
            title: "Misc",
            amount: "5",
            category: Some("   "),
            description: Some("  "),
            date: None,
        },
    )
    .unwrap();

    assert!(expense.category.is_none());
    assert!(expense.description.is_none());
    assert_eq!(expense.date, chrono::Utc::now().date_naive());
}

#[test]
fn test_cmd_expenses_add_rejects_bad_input() {
    let db = setup_test_db();
    commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();

    assert!(commands::cmd_expenses_add(&db, "alice", &input("Lunch", "abc", None)).is_err());
    assert!(commands::cmd_expenses_add(&db, "alice", &input("", "10", None)).is_err());

    let mut bad_date = input("Lunch", "10", None);
    bad_date.date = Some("10/03/2024");
    assert!(commands::cmd_expenses_add(&db, "alice", &bad_date).is_err());

    assert_eq!(db.count_expenses(None).unwrap(), 0);
}

#[test]
fn test_cmd_expenses_unknown_user() {
    let db = setup_test_db();

    let result = commands::cmd_expenses_add(&db, "ghost", &input("Lunch", "10", None));
    assert!(result.is_err());
    assert!(commands::cmd_expenses_list(&db, "ghost", 10).is_err());
}

#[test]
fn test_cmd_expenses_list() {
    let db = setup_test_db();
    commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();
    commands::cmd_expenses_add(&db, "alice", &input("Lunch", "10", Some("Food"))).unwrap();

    assert!(commands::cmd_expenses_list(&db, "alice", 20).is_ok());
    assert!(commands::cmd_expenses_list(&db, "ALICE", 0).is_ok());
}

#[test]
fn test_cmd_expenses_delete_is_owner_scoped() {
    let db = setup_test_db();
    commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();
    commands::cmd_users_add(&db, "bob", PASSWORD).unwrap();

    let expense =
        commands::cmd_expenses_add(&db, "alice", &input("Rent", "900", Some("Home"))).unwrap();

    assert!(commands::cmd_expenses_delete(&db, "bob", expense.id).is_err());
    assert_eq!(db.count_expenses(None).unwrap(), 1);

    commands::cmd_expenses_delete(&db, "alice", expense.id).unwrap();
    assert_eq!(db.count_expenses(None).unwrap(), 0);
}

// ========== Summary / Audit Tests ==========

#[test]
fn test_cmd_summary_all_and_owner() {
    let db = setup_test_db();
    let settings = Settings::default();
    commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();
    commands::cmd_expenses_add(&db, "alice", &input("Groceries", "1200", Some("Food"))).unwrap();
    commands::cmd_expenses_add(&db, "alice", &input("Train", "800", Some("Travel"))).unwrap();

    assert!(commands::cmd_summary(&db, &settings, None, false).is_ok());
    assert!(commands::cmd_summary(&db, &settings, None, true).is_ok());
    assert!(commands::cmd_summary(&db, &settings, Some("alice"), false).is_ok());
    assert!(commands::cmd_summary(&db, &settings, Some("alice"), true).is_ok());
    assert!(commands::cmd_summary(&db, &settings, Some("ghost"), false).is_err());
}

#[test]
fn test_cmd_summary_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_summary(&db, &Settings::default(), None, false).is_ok());
}

#[test]
fn test_cmd_audit() {
    let db = setup_test_db();
    assert!(commands::cmd_audit(&db, 10).is_ok());

    commands::cmd_users_add(&db, "alice", PASSWORD).unwrap();
    commands::cmd_expenses_add(&db, "alice", &input("Lunch", "10", None)).unwrap();
    assert!(commands::cmd_audit(&db, 10).is_ok());
    assert_eq!(db.list_audit_log(10).unwrap().len(), 2);
}

#[test]
fn test_load_settings_missing_override() {
    let result = commands::load_settings(Some(std::path::Path::new("/nonexistent/settings.toml")));
    assert!(result.is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long title", 10), "this is...");
    assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
}
