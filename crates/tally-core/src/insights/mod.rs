//! Insight generator
//!
//! Turns a category series into an ordered list of advisory lines using
//! fixed threshold rules:
//!
//! 1. **No Data** - empty series yields exactly one "no data yet" line
//! 2. **Highest and Lowest** - names the largest and smallest categories
//! 3. **Above Average** - flags categories above `factor x mean`
//! 4. **High Spending** - warns when the all-users total crosses a threshold
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::insights::{InsightContext, InsightEngine};
//!
//! let engine = InsightEngine::new();
//! let ctx = InsightContext::new(&summary.by_category, &settings)
//!     .with_overall_total(summary.total);
//! let lines = engine.messages(&ctx);
//! ```

pub mod above_average;
pub mod engine;
pub mod extremes;
pub mod high_spending;
pub mod no_data;
pub mod types;

pub use above_average::AboveAverageRule;
pub use engine::{InsightContext, InsightEngine, InsightRule};
pub use extremes::ExtremesRule;
pub use high_spending::{HighSpendingRule, HIGH_SPENDING_MESSAGE};
pub use no_data::{NoDataRule, NO_DATA_MESSAGE};
pub use types::{Severity, Suggestion, SuggestionKind};
