//! Empty-series rule

use super::engine::{InsightContext, InsightRule};
use super::types::{Suggestion, SuggestionKind};

pub const NO_DATA_MESSAGE: &str = "No expense data yet. Add some expenses to get insights!";

/// Emits the single "no data yet" line when there is nothing to analyze
pub struct NoDataRule;

impl InsightRule for NoDataRule {
    fn name(&self) -> &'static str {
        "No Data"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Suggestion> {
        if ctx.categories.is_empty() {
            vec![Suggestion::new(SuggestionKind::NoData, NO_DATA_MESSAGE)]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CategoryTotal;
    use crate::settings::Settings;
    use rust_decimal_macros::dec;

    #[test]
    fn test_only_fires_on_empty_series() {
        let settings = Settings::default();

        let lines = NoDataRule.evaluate(&InsightContext::new(&[], &settings));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, NO_DATA_MESSAGE);

        let categories = vec![CategoryTotal {
            category: "Food".to_string(),
            total: dec!(1.00),
        }];
        assert!(NoDataRule
            .evaluate(&InsightContext::new(&categories, &settings))
            .is_empty());
    }
}
