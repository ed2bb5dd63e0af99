//! Core types for the insight generator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which rule produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Nothing recorded yet
    NoData,
    /// Category with the largest total
    HighestCategory,
    /// Category with the smallest total
    LowestCategory,
    /// Category well above the mean category total
    AboveAverage,
    /// Overall spending crossed the configured threshold
    HighSpending,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::NoData => "no_data",
            SuggestionKind::HighestCategory => "highest_category",
            SuggestionKind::LowestCategory => "lowest_category",
            SuggestionKind::AboveAverage => "above_average",
            SuggestionKind::HighSpending => "high_spending",
        }
    }

    /// How the line should be presented
    pub fn severity(&self) -> Severity {
        match self {
            SuggestionKind::NoData | SuggestionKind::LowestCategory => Severity::Info,
            SuggestionKind::HighestCategory | SuggestionKind::AboveAverage => Severity::Attention,
            SuggestionKind::HighSpending => Severity::Warning,
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_data" => Ok(SuggestionKind::NoData),
            "highest_category" => Ok(SuggestionKind::HighestCategory),
            "lowest_category" => Ok(SuggestionKind::LowestCategory),
            "above_average" => Ok(SuggestionKind::AboveAverage),
            "high_spending" => Ok(SuggestionKind::HighSpending),
            _ => Err(format!("Unknown suggestion kind: {}", s)),
        }
    }
}

/// Severity level of a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Worth attention but not urgent
    Attention,
    /// Should be addressed soon
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Attention => "attention",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One generated advisory line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub severity: Severity,
    /// Category the line is about, if any
    pub category: Option<String>,
    pub message: String,
}

impl Suggestion {
    pub fn new(kind: SuggestionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            category: None,
            message: message.into(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
