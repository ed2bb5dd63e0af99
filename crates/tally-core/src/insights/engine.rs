//! Insight engine - runs the registered rules in order

use rust_decimal::Decimal;

use crate::aggregate::CategoryTotal;
use crate::settings::Settings;

use super::types::Suggestion;
use super::{AboveAverageRule, ExtremesRule, HighSpendingRule, NoDataRule};

/// Inputs handed to every rule
pub struct InsightContext<'a> {
    /// Category series, largest total first
    pub categories: &'a [CategoryTotal],
    /// Unfiltered total across all users; only the dashboard sets this
    pub overall_total: Option<Decimal>,
    pub settings: &'a Settings,
}

impl<'a> InsightContext<'a> {
    /// Context for category-only rules (owner-scoped lists)
    pub fn new(categories: &'a [CategoryTotal], settings: &'a Settings) -> Self {
        Self {
            categories,
            overall_total: None,
            settings,
        }
    }

    /// Also evaluate the overall spending level
    pub fn with_overall_total(mut self, total: Decimal) -> Self {
        self.overall_total = Some(total);
        self
    }
}

/// A single suggestion rule
pub trait InsightRule: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Produce zero or more lines for this context
    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<Suggestion>;
}

/// Runs rules in registration order and concatenates their output
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(NoDataRule));
        engine.register(Box::new(ExtremesRule));
        engine.register(Box::new(AboveAverageRule));
        engine.register(Box::new(HighSpendingRule));

        engine
    }

    /// Append a rule; it runs after every rule registered before it
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule and collect the lines in order
    pub fn generate(&self, ctx: &InsightContext<'_>) -> Vec<Suggestion> {
        let mut suggestions = vec![];

        for rule in &self.rules {
            let lines = rule.evaluate(ctx);
            tracing::debug!(rule = rule.name(), count = lines.len(), "Insight rule evaluated");
            suggestions.extend(lines);
        }

        suggestions
    }

    /// Same as [`generate`](Self::generate), returning only the text
    pub fn messages(&self, ctx: &InsightContext<'_>) -> Vec<String> {
        self.generate(ctx).into_iter().map(|s| s.message).collect()
    }

    /// Names of registered rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}
