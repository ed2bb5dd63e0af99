//! Overall spending threshold rule

use super::engine::{InsightContext, InsightRule};
use super::types::{Suggestion, SuggestionKind};

pub const HIGH_SPENDING_MESSAGE: &str =
    "You're spending quite a lot, maybe review your monthly goals.";

/// Appends a generic warning when the all-users total crosses the threshold
pub struct HighSpendingRule;

impl InsightRule for HighSpendingRule {
    fn name(&self) -> &'static str {
        "High Spending"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Suggestion> {
        match ctx.overall_total {
            Some(total) if total > ctx.settings.high_spending_threshold => {
                vec![Suggestion::new(SuggestionKind::HighSpending, HIGH_SPENDING_MESSAGE)]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use rust_decimal_macros::dec;

    #[test]
    fn test_threshold_is_strict() {
        let settings = Settings::default();

        let at = InsightContext::new(&[], &settings).with_overall_total(dec!(10000.00));
        assert!(HighSpendingRule.evaluate(&at).is_empty());

        let above = InsightContext::new(&[], &settings).with_overall_total(dec!(10000.01));
        let lines = HighSpendingRule.evaluate(&above);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, HIGH_SPENDING_MESSAGE);
    }

    #[test]
    fn test_no_overall_total_is_silent() {
        let settings = Settings::default();
        assert!(HighSpendingRule
            .evaluate(&InsightContext::new(&[], &settings))
            .is_empty());
    }
}
