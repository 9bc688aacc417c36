//! Persisted list of loaded theme files.

use crate::{Database, DbError};

impl Database {
    /// Loaded theme paths in the order they were activated.
    pub fn loaded_theme_paths(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT path FROM loaded_themes ORDER BY position ASC, path ASC")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut paths = Vec::new();
            for row in rows {
                paths.push(row?);
            }
            Ok(paths)
        })
    }

    /// Replace the whole loaded-theme list in one transaction.
    pub fn replace_loaded_themes(&self, paths: &[String]) -> Result<(), DbError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM loaded_themes", [])?;
            {
                let mut stmt =
                    tx.prepare("INSERT OR IGNORE INTO loaded_themes (path, position) VALUES (?1, ?2)")?;
                for (position, path) in paths.iter().enumerate() {
                    let position = i64::try_from(position)
                        .map_err(|_| DbError::InvalidData(format!("position overflow: {path}")))?;
                    stmt.execute(rusqlite::params![path, position])?;
                }
            }
            tx.commit()?;
            tracing::debug!(count = paths.len(), "Saved loaded theme list");
            Ok(())
        })
    }
}
