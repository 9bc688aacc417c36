//! Raw `key -> value` settings rows. Validation and defaults live in the
//! application's settings manager.

use std::collections::BTreeMap;

use rusqlite::OptionalExtension;

use crate::{Database, DbError};

const UPSERT: &str = "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
     ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP";

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(UPSERT, rusqlite::params![key, value])?;
            Ok(())
        })
    }

    /// Every stored setting, ordered by key.
    pub fn get_all_settings(&self) -> Result<BTreeMap<String, String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
            let settings = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<_, _>>()?;
            Ok(settings)
        })
    }
}
