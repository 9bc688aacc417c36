//! Versioned schema, tracked through `PRAGMA user_version`.

use rusqlite::Connection;

use crate::DbError;

/// Ordered migrations; index + 1 is the schema version each one produces.
const MIGRATIONS: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS loaded_themes (
    path TEXT PRIMARY KEY,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS event_prefs (
    event_type TEXT PRIMARY KEY,
    enabled BOOLEAN NOT NULL DEFAULT true,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#,
];

pub fn current_version() -> i64 {
    MIGRATIONS.len() as i64
}

pub fn schema_version(conn: &Connection) -> Result<i64, DbError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the schema up to [`current_version`].
pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    let found = schema_version(conn)?;
    let supported = current_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let applied = usize::try_from(found)
        .map_err(|_| DbError::InvalidData(format!("negative schema version {found}")))?;
    for (index, sql) in MIGRATIONS.iter().enumerate().skip(applied) {
        let version = index as i64 + 1;
        conn.execute_batch(sql)?;
        conn.pragma_update(None, "user_version", version)?;
        tracing::info!(version, "Applied schema migration");
    }
    Ok(())
}
