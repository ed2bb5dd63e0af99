//! Above-average category rule

use rust_decimal::Decimal;

use super::engine::{InsightContext, InsightRule};
use super::types::{Suggestion, SuggestionKind};

/// Flags every category whose total strictly exceeds `factor x mean`
pub struct AboveAverageRule;

impl InsightRule for AboveAverageRule {
    fn name(&self) -> &'static str {
        "Above Average"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Suggestion> {
        if ctx.categories.is_empty() {
            return vec![];
        }

        // total > factor * (sum / n)  <=>  total * n > factor * sum, no division
        let count = Decimal::from(ctx.categories.len() as u64);
        let sum: Decimal = ctx.categories.iter().map(|c| c.total).sum();
        let limit = ctx.settings.above_average_factor * sum;

        ctx.categories
            .iter()
            .filter(|c| c.total * count > limit)
            .map(|c| {
                Suggestion::new(
                    SuggestionKind::AboveAverage,
                    format!(
                        "You're spending more than average on '{}'. Maybe set a smaller budget next time.",
                        c.category
                    ),
                )
                .with_category(&c.category)
            })
            .collect()
    }
}
