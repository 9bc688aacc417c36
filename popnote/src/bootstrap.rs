//! Process start-up: environment, data directory, database, settings.

use std::path::PathBuf;

use popnote_db::Database;

use crate::config::{PopupConfig, SettingsManager};

/// Open the database and load the popup configuration (fatal on error).
pub fn init_foundation() -> Result<(Database, PopupConfig, PathBuf), anyhow::Error> {
    load_dotenv();
    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let db_path = dir.join("popnote.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());
    match sm.migrate_from_env() {
        Ok(0) => {}
        Ok(count) => tracing::info!(count, "Migrated settings from environment"),
        Err(e) => tracing::error!("Failed to migrate from env: {e}"),
    }
    sm.initialize_defaults()?;

    let config = PopupConfig::load(&sm)?;
    tracing::info!(
        corner = ?config.corner,
        stack = ?config.stack,
        duration = config.duration_secs,
        throttle = config.throttle,
        "Settings loaded"
    );
    Ok((db, config, dir))
}

/// Data directory: `POPNOTE_DATA_DIR`, else `<data dir>/popnote`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("POPNOTE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("popnote")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}
