//! Tally Core Library
//!
//! Shared functionality for the Tally expense tracker:
//! - Database access and migrations
//! - Spending aggregation (totals, monthly and category series)
//! - Rule-based insight generation
//! - Accounts, password hashing, and sessions
//! - Settings loading

pub mod aggregate;
pub mod auth;
pub mod context;
pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod settings;

pub use aggregate::{CategoryTotal, ChartSeries, MonthlyTotal, SpendingSummary, UserTotal};
pub use context::{ContextAssembler, DashboardContext, ExpenseListContext};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use insights::{InsightContext, InsightEngine, Suggestion, SuggestionKind};
pub use settings::Settings;
