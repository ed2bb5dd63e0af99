//! Background task that sweeps expired login sessions
//!
//! Expired sessions are already rejected on use; the sweeper keeps the
//! table from growing with abandoned ones. Controlled by:
//!
//! - `TALLY_SESSION_SWEEP_SECS`: Interval in seconds (default: 3600, `0` disables)

use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use tally_core::Database;

/// Default sweep interval (one hour)
const DEFAULT_SWEEP_SECS: u64 = 3600;

/// Configuration for the session sweeper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSweepConfig {
    /// Interval between sweeps in seconds
    pub interval_secs: u64,
}

impl SessionSweepConfig {
    /// Parse configuration from `TALLY_SESSION_SWEEP_SECS`
    ///
    /// Returns None if sweeping is disabled.
    pub fn from_env() -> Option<Self> {
        Self::from_value(std::env::var("TALLY_SESSION_SWEEP_SECS").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Option<Self> {
        let interval_secs = match value {
            None => DEFAULT_SWEEP_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => secs,
                Err(_) => {
                    warn!(value = raw, "Invalid TALLY_SESSION_SWEEP_SECS, using default");
                    DEFAULT_SWEEP_SECS
                }
            },
        };

        if interval_secs == 0 {
            warn!("TALLY_SESSION_SWEEP_SECS is 0, session sweeping disabled");
            return None;
        }

        Some(Self { interval_secs })
    }
}

/// Start the session sweeper as a background task
pub fn start_session_sweeper(db: Database, config: SessionSweepConfig) {
    info!(
        "Starting session sweeper: every {} seconds",
        config.interval_secs
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.interval_secs));

        // First tick fires immediately; startup already purged
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match db.purge_expired_sessions() {
                Ok(0) => {}
                Ok(count) => info!("Swept {} expired session(s)", count),
                Err(e) => error!("Session sweep failed: {}", e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_when_unset() {
        assert_eq!(
            SessionSweepConfig::from_value(None),
            Some(SessionSweepConfig {
                interval_secs: DEFAULT_SWEEP_SECS
            })
        );
    }

    #[test]
    fn test_config_zero_disables() {
        assert!(SessionSweepConfig::from_value(Some("0")).is_none());
    }

    #[test]
    fn test_config_invalid_falls_back() {
        assert_eq!(
            SessionSweepConfig::from_value(Some("soon")).map(|c| c.interval_secs),
            Some(DEFAULT_SWEEP_SECS)
        );
        assert_eq!(
            SessionSweepConfig::from_value(Some(" 120 ")).map(|c| c.interval_secs),
            Some(120)
        );
    }
}
