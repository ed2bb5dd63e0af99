//! User account operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ProfileUpdate, User};

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, date_joined";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let date_joined: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        date_joined: parse_datetime(&date_joined),
    })
}

impl Database {
    /// Create a user with an already-hashed password
    ///
    /// Fails with a validation error if the username is taken (case-insensitive).
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        let conn = self.conn()?;

        let result = conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?, ?)",
            params![username, password_hash],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Validation(vec![
                    "A user with that username already exists.".to_string(),
                ]))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by username (case-insensitive)
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS),
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user together with their stored password hash (for login)
    ///
    /// Matches the username exactly; only signup uniqueness ignores case.
    pub fn get_user_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                &format!(
                    "SELECT {}, password_hash FROM users WHERE username = ? COLLATE BINARY",
                    USER_COLUMNS
                ),
                params![username],
                |row| Ok((row_to_user(row)?, row.get::<_, String>(6)?)),
            )
            .optional()?;
        Ok(found)
    }

    /// List all users ordered by username
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Update first name, last name, and email
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET first_name = ?, last_name = ?, email = ? WHERE id = ?",
            params![
                update.first_name.trim(),
                update.last_name.trim(),
                update.email.trim(),
                user_id
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("User {}", user_id)));
        }
        Ok(())
    }

    /// Delete a user; their expenses and sessions go with them
    pub fn delete_user(&self, user_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM users WHERE id = ?", params![user_id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("User {}", user_id)));
        }
        Ok(())
    }
}
