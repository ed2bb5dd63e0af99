//! Highest and lowest category rule
//!
//! The category series is sorted largest first with ties broken by label,
//! so the first entry is the highest and the last entry is the lowest.

use super::engine::{InsightContext, InsightRule};
use super::types::{Suggestion, SuggestionKind};

/// Names the largest and smallest spending categories
pub struct ExtremesRule;

impl InsightRule for ExtremesRule {
    fn name(&self) -> &'static str {
        "Highest and Lowest"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Suggestion> {
        let (Some(highest), Some(lowest)) = (ctx.categories.first(), ctx.categories.last()) else {
            return vec![];
        };

        let settings = ctx.settings;
        vec![
            Suggestion::new(
                SuggestionKind::HighestCategory,
                format!(
                    "Your highest spending category is '{}' ({}). Try to reduce this by 10-15% next month.",
                    highest.category,
                    settings.format_amount(highest.total)
                ),
            )
            .with_category(&highest.category),
            Suggestion::new(
                SuggestionKind::LowestCategory,
                format!(
                    "You're managing '{}' expenses well, only {} spent. Keep it up!",
                    lowest.category,
                    settings.format_amount(lowest.total)
                ),
            )
            .with_category(&lowest.category),
        ]
    }
}
