//! SettingsManager: DB-backed settings with defaults, validation and env migration.

use std::collections::BTreeMap;

use popnote_db::Database;

use super::SettingsError;
use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, SettingsError> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        Err(SettingsError::UnknownKey(key.to_string()))
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            return Err(SettingsError::UnknownKey(key.to_string()));
        }
        validate_setting(key, value).map_err(|message| SettingsError::Invalid {
            key: key.to_string(),
            message,
        })?;
        self.db.set_setting(key, value)?;
        Ok(())
    }

    /// Get all known settings, filling in defaults for missing keys.
    pub fn get_all_settings(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        let mut result = self.db.get_all_settings()?;
        result.retain(|key, _| DEFAULT_SETTINGS.contains_key(key.as_str()));
        for (key, def) in DEFAULT_SETTINGS.iter() {
            result
                .entry(key.to_string())
                .or_insert_with(|| def.default.to_string());
        }
        Ok(result)
    }

    /// Initialize default settings in DB (skip existing).
    pub fn initialize_defaults(&self) -> Result<(), SettingsError> {
        for (key, def) in DEFAULT_SETTINGS.iter() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            self.db.set_setting(key, def.default)?;
        }
        Ok(())
    }

    /// Copy settings present in the environment into the DB.
    ///
    /// Only keys not yet stored are migrated; invalid values are skipped.
    pub fn migrate_from_env(&self) -> Result<u32, SettingsError> {
        let mut migrated = 0u32;
        for key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            let Ok(env_val) = std::env::var(key) else {
                continue;
            };
            if env_val.is_empty() {
                continue;
            }
            if let Err(e) = validate_setting(key, &env_val) {
                tracing::warn!("Ignoring invalid env setting {key}: {e}");
                continue;
            }
            self.db.set_setting(key, &env_val)?;
            tracing::info!("Migrated setting from env: {key}");
            migrated += 1;
        }
        Ok(migrated)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::{POPUP_CORNER, POPUP_THROTTLE};

    fn manager() -> SettingsManager {
        SettingsManager::new(Database::open_in_memory().expect("Failed to create test DB"))
    }

    #[test]
    fn get_falls_back_to_default() {
        let sm = manager();
        assert_eq!(sm.get_setting(POPUP_CORNER).unwrap(), "bottom-right");
        assert!(matches!(
            sm.get_setting("NOT_A_KEY"),
            Err(SettingsError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_validates() {
        let sm = manager();
        sm.set_setting(POPUP_CORNER, "top-left").unwrap();
        assert_eq!(sm.get_setting(POPUP_CORNER).unwrap(), "top-left");

        let err = sm.set_setting(POPUP_THROTTLE, "-1").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
        assert!(sm.set_setting("NOT_A_KEY", "1").is_err());
    }

    #[test]
    fn initialize_defaults_keeps_existing_values() {
        let sm = manager();
        sm.set_setting(POPUP_THROTTLE, "2").unwrap();
        sm.initialize_defaults().unwrap();
        let all = sm.get_all_settings().unwrap();
        assert_eq!(all[POPUP_THROTTLE], "2");
        assert_eq!(all.len(), DEFAULT_SETTINGS.len());
    }
}
