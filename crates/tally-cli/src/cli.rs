//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track expenses and see where the money goes
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted expense tracker with spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Settings file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory of static files to serve alongside the API
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show totals, monthly and category breakdowns, and insights
    Summary {
        /// Only this user's expenses (default: everyone, like the dashboard)
        #[arg(short, long)]
        user: Option<String>,

        /// Print the full view context as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage a user's expenses
    Expenses {
        #[command(subcommand)]
        action: ExpensesAction,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Show recent audit log entries
    Audit {
        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List a user's expenses, newest first
    List {
        /// Owner username
        #[arg(short, long)]
        user: String,

        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Record an expense
    Add {
        /// Owner username
        #[arg(short, long)]
        user: String,

        /// Short description, e.g. "Groceries"
        #[arg(short, long)]
        title: String,

        /// Amount, e.g. 249.50
        #[arg(short, long)]
        amount: String,

        /// Category name (created if new; omit for Uncategorized)
        #[arg(short, long)]
        category: Option<String>,

        /// Longer note
        #[arg(long)]
        description: Option<String>,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete one of a user's expenses
    Delete {
        /// Owner username
        #[arg(short, long)]
        user: String,

        /// Expense ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List accounts
    List,

    /// Create an account
    Add {
        /// Username
        username: String,

        /// Password (falls back to TALLY_PASSWORD)
        #[arg(long, env = "TALLY_PASSWORD", hide_env_values = true)]
        password: String,
    },
}
