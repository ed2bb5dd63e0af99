//! Account and audit log commands

use anyhow::Result;
use tally_core::auth;
use tally_core::db::Database;
use tally_core::models::User;

use super::truncate;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Create one with: tally users add <name> --password <password>");
        return Ok(());
    }

    println!();
    println!("{:>5}  {:20}  {:30}  {}", "ID", "Username", "Email", "Joined");
    println!("{}", "-".repeat(72));

    for user in &users {
        println!(
            "{:>5}  {:20}  {:30}  {}",
            user.id,
            truncate(&user.username, 20),
            truncate(&user.email, 30),
            user.date_joined.format("%Y-%m-%d")
        );
    }

    Ok(())
}

/// Create an account with the same checks as web signup
pub fn cmd_users_add(db: &Database, username: &str, password: &str) -> Result<User> {
    let user = auth::register_user(db, username, password, password)?;

    db.log_audit(&user.username, "signup", Some("user"), Some(user.id), Some("via cli"))?;

    println!("✓ Created user '{}' (id {})", user.username, user.id);
    Ok(user)
}

pub fn cmd_audit(db: &Database, limit: i64) -> Result<()> {
    let entries = db.list_audit_log(limit)?;

    if entries.is_empty() {
        println!("Audit log is empty.");
        return Ok(());
    }

    println!();
    println!(
        "{:19}  {:15}  {:12}  {:14}  {}",
        "Time", "Actor", "Action", "Entity", "Details"
    );
    println!("{}", "-".repeat(80));

    for entry in &entries {
        let entity = match (&entry.entity_type, entry.entity_id) {
            (Some(kind), Some(id)) => format!("{}#{}", kind, id),
            (Some(kind), None) => kind.clone(),
            _ => "-".to_string(),
        };
        println!(
            "{:19}  {:15}  {:12}  {:14}  {}",
            entry.timestamp,
            truncate(&entry.actor, 15),
            entry.action,
            entity,
            entry.details.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
