//! Category metadata

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{CategoryInfo, DEFAULT_CATEGORIES};

impl Database {
    /// Create or recolor a category, returning its id
    pub fn upsert_category(&self, owner: &str, name: &str, color: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;
        let id = conn.query_row(
            r#"
            INSERT INTO categories (owner, name, color) VALUES (?, ?, ?)
            ON CONFLICT(owner, name) DO UPDATE SET color = COALESCE(excluded.color, categories.color)
            RETURNING id
            "#,
            params![owner, name, color],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn list_categories(&self, owner: &str) -> Result<Vec<CategoryInfo>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, color FROM categories WHERE owner = ? ORDER BY name")?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok(CategoryInfo {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Seed the default category names for an owner (existing ones untouched)
    pub fn seed_default_categories(&self, owner: &str) -> Result<usize> {
        let conn = self.conn()?;
        let mut created = 0;
        for name in DEFAULT_CATEGORIES {
            created += conn.execute(
                "INSERT OR IGNORE INTO categories (owner, name) VALUES (?, ?)",
                params![owner, name],
            )?;
        }
        Ok(created)
    }
}
