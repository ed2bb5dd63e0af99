//! Login session operations
//!
//! Tokens are opaque to the store: callers pass the SHA-256 digest
//! produced by [`crate::auth::hash_token`].

use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::Session;

impl Database {
    /// Store a new session that expires `ttl` from now
    pub fn create_session(&self, token_hash: &str, user_id: i64, ttl: Duration) -> Result<Session> {
        let conn = self.conn()?;
        let expires_at = Utc::now() + ttl;

        conn.execute(
            "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)",
            params![token_hash, user_id, format_datetime(expires_at)],
        )?;

        Ok(Session {
            user_id,
            expires_at,
        })
    }

    /// Resolve a session and slide its expiry forward by `ttl`
    ///
    /// Expired sessions are deleted and reported as absent.
    pub fn touch_session(&self, token_hash: &str, ttl: Duration) -> Result<Option<Session>> {
        let conn = self.conn()?;

        let found: Option<(i64, String)> = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token_hash = ?",
                params![token_hash],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((user_id, expires_at)) = found else {
            return Ok(None);
        };

        let now = Utc::now();
        if parse_datetime(&expires_at) <= now {
            debug!(user_id, "Session expired");
            conn.execute(
                "DELETE FROM sessions WHERE token_hash = ?",
                params![token_hash],
            )?;
            return Ok(None);
        }

        let expires_at = now + ttl;
        conn.execute(
            "UPDATE sessions SET expires_at = ? WHERE token_hash = ?",
            params![format_datetime(expires_at), token_hash],
        )?;

        Ok(Some(Session {
            user_id,
            expires_at,
        }))
    }

    /// Remove a session (logout). Returns whether one existed.
    pub fn delete_session(&self, token_hash: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?",
            params![token_hash],
        )?;
        Ok(changed > 0)
    }

    /// Delete every expired session, returning how many were removed
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?",
            params![format_datetime(Utc::now())],
        )?;
        Ok(removed)
    }
}
