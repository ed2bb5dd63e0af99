//! Category operations

use rusqlite::{params, Connection};

use super::Database;
use crate::error::{Error, Result};
use crate::models::Category;

/// Get-or-create a category by exact name on an existing connection
///
/// The insert is a single upsert statement so two writers racing on the
/// same new name still end up sharing one row.
pub(crate) fn upsert_category(conn: &Connection, name: &str) -> Result<i64> {
    if name.is_empty() {
        return Err(Error::InvalidData("Category name cannot be empty".to_string()));
    }

    conn.execute(
        "INSERT INTO categories (name) VALUES (?) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;

    let id = conn.query_row(
        "SELECT id FROM categories WHERE name = ?",
        params![name],
        |row| row.get(0),
    )?;

    Ok(id)
}

impl Database {
    /// Get or create a category by exact name
    pub fn get_or_create_category(&self, name: &str) -> Result<Category> {
        let conn = self.conn()?;
        let id = upsert_category(&conn, name)?;
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    /// List all categories ordered by name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;

        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Delete a category; expenses referencing it become uncategorized
    pub fn delete_category(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }
        Ok(())
    }
}
