//! Per-event "show this notification" flags.

use std::collections::HashMap;

use rusqlite::OptionalExtension;

use crate::{Database, DbError};

impl Database {
    /// Stored flag for one event type, `None` if the user never changed it.
    pub fn event_enabled(&self, event_type: &str) -> Result<Option<bool>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT enabled FROM event_prefs WHERE event_type = ?1")?;
            let value = stmt
                .query_row([event_type], |row| row.get::<_, bool>(0))
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_event_enabled(&self, event_type: &str, enabled: bool) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO event_prefs (event_type, enabled, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(event_type) DO UPDATE SET enabled = ?2, updated_at = CURRENT_TIMESTAMP",
                rusqlite::params![event_type, enabled],
            )?;
            Ok(())
        })
    }

    pub fn event_prefs(&self) -> Result<HashMap<String, bool>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT event_type, enabled FROM event_prefs")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
            })?;
            let mut map = HashMap::new();
            for row in rows {
                let (k, v) = row?;
                map.insert(k, v);
            }
            Ok(map)
        })
    }
}
