//! Application settings
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config` path, else `<data dir>/tally/config/settings.toml`)
//! 3. Environment variables (`TALLY_MONTHLY_INCOME`, `TALLY_CURRENCY`,
//!    `TALLY_HIGH_SPENDING_THRESHOLD`, `TALLY_SESSION_TTL`)
//!
//! Example file:
//!
//! ```toml
//! [dashboard]
//! monthly_income = 25000
//! recent_expenses = 5
//!
//! [insights]
//! currency = "₹"
//! high_spending_threshold = 10000
//! above_average_factor = "1.2"
//!
//! [sessions]
//! ttl_secs = 300
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Runtime settings shared by the server, CLI, and report builders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Fixed monthly income shown on the dashboard
    pub monthly_income: Decimal,
    /// Symbol prefixed to amounts in insight lines
    pub currency_symbol: String,
    /// Overall spend above which the "spending is high" line is added
    pub high_spending_threshold: Decimal,
    /// A category is "above average" when its total exceeds this multiple of the mean
    pub above_average_factor: Decimal,
    /// Number of recent expenses on the dashboard
    pub recent_expenses_limit: usize,
    /// Sliding session lifetime
    pub session_ttl_secs: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            monthly_income: Decimal::from(25_000),
            currency_symbol: "₹".to_string(),
            high_spending_threshold: Decimal::from(10_000),
            above_average_factor: Decimal::new(12, 1),
            recent_expenses_limit: 5,
            session_ttl_secs: 300,
        }
    }
}

/// Default settings file location
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("settings.toml"))
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    dashboard: Option<RawDashboard>,
    insights: Option<RawInsights>,
    sessions: Option<RawSessions>,
}

#[derive(Debug, Deserialize)]
struct RawDashboard {
    monthly_income: Option<toml::Value>,
    recent_expenses: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    currency: Option<String>,
    high_spending_threshold: Option<toml::Value>,
    above_average_factor: Option<toml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawSessions {
    ttl_secs: Option<i64>,
}

/// Accept TOML integers, floats, or strings as decimals
fn decimal_value(key: &str, value: &toml::Value) -> Result<Decimal> {
    let parsed = match value {
        toml::Value::Integer(i) => Ok(Decimal::from(*i)),
        toml::Value::Float(f) => Decimal::from_str(&f.to_string()),
        toml::Value::String(s) => Decimal::from_str(s.trim()),
        other => {
            return Err(Error::Config(format!(
                "{} must be a number, got {}",
                key,
                other.type_str()
            )))
        }
    };
    parsed.map_err(|e| Error::Config(format!("{} is not a valid decimal: {}", key, e)))
}

impl Settings {
    /// Load settings from file (if present) and apply environment overrides
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Settings file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_settings_path().filter(|p| p.exists()),
        };

        let mut settings = match path {
            Some(p) => {
                debug!(path = %p.display(), "Loading settings file");
                let content = fs::read_to_string(&p)?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML content on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawSettings = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid settings TOML: {}", e)))?;

        let mut settings = Self::default();

        if let Some(dashboard) = raw.dashboard {
            if let Some(income) = dashboard.monthly_income {
                settings.monthly_income = decimal_value("dashboard.monthly_income", &income)?;
            }
            if let Some(limit) = dashboard.recent_expenses {
                settings.recent_expenses_limit = limit;
            }
        }

        if let Some(insights) = raw.insights {
            if let Some(currency) = insights.currency {
                settings.currency_symbol = currency;
            }
            if let Some(threshold) = insights.high_spending_threshold {
                settings.high_spending_threshold =
                    decimal_value("insights.high_spending_threshold", &threshold)?;
            }
            if let Some(factor) = insights.above_average_factor {
                settings.above_average_factor =
                    decimal_value("insights.above_average_factor", &factor)?;
            }
        }

        if let Some(sessions) = raw.sessions {
            if let Some(ttl) = sessions.ttl_secs {
                settings.session_ttl_secs = ttl;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Apply `TALLY_*` environment overrides; unparsable values are ignored with a warning
    pub fn apply_env(&mut self) {
        if let Some(income) = env_parse::<Decimal>("TALLY_MONTHLY_INCOME") {
            self.monthly_income = income;
        }
        if let Ok(currency) = std::env::var("TALLY_CURRENCY") {
            if !currency.is_empty() {
                self.currency_symbol = currency;
            }
        }
        if let Some(threshold) = env_parse::<Decimal>("TALLY_HIGH_SPENDING_THRESHOLD") {
            self.high_spending_threshold = threshold;
        }
        if let Some(ttl) = env_parse::<i64>("TALLY_SESSION_TTL") {
            self.session_ttl_secs = ttl;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.above_average_factor <= Decimal::ZERO {
            return Err(Error::Config(
                "insights.above_average_factor must be positive".to_string(),
            ));
        }
        if self.session_ttl_secs <= 0 {
            return Err(Error::Config(
                "sessions.ttl_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Session lifetime as a chrono duration
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs)
    }

    /// Format an amount with the configured currency symbol
    pub fn format_amount(&self, amount: Decimal) -> String {
        format!("{}{}", self.currency_symbol, amount)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %value, "Ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.monthly_income, dec!(25000));
        assert_eq!(settings.high_spending_threshold, dec!(10000));
        assert_eq!(settings.above_average_factor, dec!(1.2));
        assert_eq!(settings.recent_expenses_limit, 5);
        assert_eq!(settings.session_ttl_secs, 300);
        assert_eq!(settings.format_amount(dec!(4500.00)), "₹4500.00");
    }

    #[test]
    fn test_from_toml_partial() {
        let settings = Settings::from_toml(
            r#"
            [insights]
            currency = "$"
            above_average_factor = "1.5"
            "#,
        )
        .unwrap();

        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.above_average_factor, dec!(1.5));
        // Untouched sections keep defaults
        assert_eq!(settings.monthly_income, dec!(25000));
    }

    #[test]
    fn test_from_toml_numeric_forms() {
        let settings = Settings::from_toml(
            r#"
            [dashboard]
            monthly_income = 40000
            recent_expenses = 10

            [insights]
            high_spending_threshold = 12500.5

            [sessions]
            ttl_secs = 900
            "#,
        )
        .unwrap();

        assert_eq!(settings.monthly_income, dec!(40000));
        assert_eq!(settings.high_spending_threshold, dec!(12500.5));
        assert_eq!(settings.recent_expenses_limit, 10);
        assert_eq!(settings.session_ttl_secs, 900);
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        assert!(matches!(
            Settings::from_toml("[insights]\nabove_average_factor = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("[insights]\nhigh_spending_threshold = true"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("[sessions]\nttl_secs = -5"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("not toml ["),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\nmonthly_income = \"30000.50\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.monthly_income, dec!(30000.50));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = Settings::load(Some(Path::new("/nonexistent/tally/settings.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
