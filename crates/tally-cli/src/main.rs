//! Tally CLI - Self-hosted expense tracker
//!
//! Usage:
//!   tally init                          Initialize database
//!   tally users add alice --password …  Create an account
//!   tally expenses add -u alice -t Lunch -a 120 -c Food
//!   tally summary                       Totals and insights
//!   tally serve --port 8000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let settings = commands::load_settings(cli.config.as_deref())?;
            commands::cmd_serve(
                &cli.db,
                settings,
                &host,
                port,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Summary { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let settings = commands::load_settings(cli.config.as_deref())?;
            commands::cmd_summary(&db, &settings, user.as_deref(), json)
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                ExpensesAction::List { user, limit } => {
                    commands::cmd_expenses_list(&db, &user, limit)
                }
                ExpensesAction::Add {
                    user,
                    title,
                    amount,
                    category,
                    description,
                    date,
                } => commands::cmd_expenses_add(
                    &db,
                    &user,
                    &commands::ExpenseInput {
                        title: &title,
                        amount: &amount,
                        category: category.as_deref(),
                        description: description.as_deref(),
                        date: date.as_deref(),
                    },
                )
                .map(|_| ()),
                ExpensesAction::Delete { user, id } => {
                    commands::cmd_expenses_delete(&db, &user, id)
                }
            }
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add { username, password }) => {
                    commands::cmd_users_add(&db, &username, &password).map(|_| ())
                }
            }
        }
        Commands::Audit { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, limit)
        }
    }
}
