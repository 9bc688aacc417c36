//! Probed and loaded themes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use popnote_db::{Database, DbError};

use super::{THEME_FILE_NAME, Theme, ThemeError};

/// Name of the directory whose theme is activated when nothing else is.
pub const DEFAULT_THEME_DIR: &str = "default";

/// Per-user theme root: `<config dir>/popnote/themes`.
pub fn user_theme_root() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("popnote").join("themes"))
}

/// Registry of discovered (probed) and active (loaded) themes.
#[derive(Debug, Default)]
pub struct ThemeRepository {
    probed: BTreeMap<PathBuf, bool>,
    loaded: Vec<Theme>,
}

impl ThemeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a theme file without activating it and remember the outcome.
    pub fn probe(&mut self, path: impl AsRef<Path>) -> Result<(), ThemeError> {
        let path = path.as_ref();
        match Theme::load(path) {
            Ok(theme) => {
                tracing::debug!(path = %path.display(), name = %theme.display_name(), "Probed theme");
                self.probed.insert(path.to_path_buf(), true);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Rejected theme");
                self.probed.insert(path.to_path_buf(), false);
                Err(e)
            }
        }
    }

    /// Parse and activate a theme. Loading an already loaded path returns
    /// the existing theme.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&Theme, ThemeError> {
        let path = path.as_ref();
        if let Some(index) = self.loaded.iter().position(|t| t.path == path) {
            return Ok(&self.loaded[index]);
        }
        let theme = match Theme::load(path) {
            Ok(theme) => theme,
            Err(e) => {
                self.probed.insert(path.to_path_buf(), false);
                return Err(e);
            }
        };
        self.probed.insert(path.to_path_buf(), true);
        tracing::info!(path = %path.display(), name = %theme.display_name(), "Loaded theme");
        self.loaded.push(theme);
        let index = self.loaded.len() - 1;
        Ok(&self.loaded[index])
    }

    /// Deactivate a theme. Returns whether it was loaded.
    pub fn unload(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let before = self.loaded.len();
        self.loaded.retain(|t| t.path != path);
        let removed = self.loaded.len() != before;
        if removed {
            tracing::info!(path = %path.display(), "Unloaded theme");
        } else {
            tracing::debug!(path = %path.display(), "Unload of a theme that is not loaded");
        }
        removed
    }

    pub fn is_loaded(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.loaded.iter().any(|t| t.path == path)
    }

    /// True only for paths whose last probe succeeded.
    pub fn is_probed(&self, path: impl AsRef<Path>) -> bool {
        self.probed.get(path.as_ref()).copied().unwrap_or(false)
    }

    pub fn loaded(&self) -> &[Theme] {
        &self.loaded
    }

    /// Successfully probed theme files, sorted by path.
    pub fn probed_paths(&self) -> impl Iterator<Item = &Path> {
        self.probed
            .iter()
            .filter(|(_, ok)| **ok)
            .map(|(path, _)| path.as_path())
    }

    /// Probe every `<root>/<subdir>/theme.xml` below the system and user
    /// roots. Returns the number of themes probed successfully.
    pub fn scan(&mut self, system_root: &Path, user_root: &Path) -> usize {
        if !user_root.exists() {
            match std::fs::create_dir_all(user_root) {
                Ok(()) => tracing::info!(path = %user_root.display(), "Created user theme directory"),
                Err(e) => {
                    tracing::warn!(path = %user_root.display(), error = %e, "Failed to create user theme directory")
                }
            }
        }
        [system_root, user_root]
            .into_iter()
            .map(|root| self.scan_root(root))
            .sum()
    }

    fn scan_root(&mut self, root: &Path) -> usize {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(path = %root.display(), error = %e, "Theme root not readable");
                return 0;
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| entry.path())
            .collect();
        dirs.sort();

        let mut found = 0;
        for dir in dirs {
            let file = dir.join(THEME_FILE_NAME);
            if !file.is_file() {
                continue;
            }
            if self.probe(&file).is_ok() {
                found += 1;
            }
        }
        tracing::debug!(path = %root.display(), found, "Scanned theme root");
        found
    }

    /// Persist the paths of the loaded themes.
    pub fn save_loaded_list(&self, db: &Database) -> Result<(), DbError> {
        let paths: Vec<String> = self
            .loaded
            .iter()
            .map(|t| t.path.to_string_lossy().into_owned())
            .collect();
        db.replace_loaded_themes(&paths)
    }

    /// Load the persisted themes that are currently probed. When none of
    /// them is available, a probed theme from a `default` directory is
    /// loaded instead. Returns the number of loaded themes.
    pub fn load_saved_list(&mut self, db: &Database) -> Result<usize, DbError> {
        for saved in db.loaded_theme_paths()? {
            let path = PathBuf::from(&saved);
            if !self.is_probed(&path) {
                tracing::debug!(path = %saved, "Skipping saved theme that was not probed");
                continue;
            }
            if let Err(e) = self.load(&path) {
                tracing::warn!(path = %saved, error = %e, "Failed to restore theme");
            }
        }

        if self.loaded.is_empty() {
            let fallback = self
                .probed_paths()
                .find(|path| {
                    path.parent()
                        .and_then(Path::file_name)
                        .is_some_and(|name| name == DEFAULT_THEME_DIR)
                })
                .map(Path::to_path_buf);
            if let Some(path) = fallback {
                if let Err(e) = self.load(&path) {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to load default theme");
                }
            }
        }
        Ok(self.loaded.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme_xml(api: u32, kind: &str) -> String {
        format!(
            r#"<popnote><theme api="{api}"><info><name>{kind} theme</name></info>
<notification type="{kind}" width="64" height="32">
<item type="text"><position value="c"/><text format="%r"/></item>
</notification></theme></popnote>"#
        )
    }

    fn write_theme(root: &Path, dir: &str, contents: &str) -> PathBuf {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(THEME_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn api_mismatch_is_rejected_but_scan_continues() {
        let system = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        let bad = write_theme(system.path(), "broken", &theme_xml(2, "info"));
        let good = write_theme(system.path(), "plain", &theme_xml(1, "info"));

        let mut repo = ThemeRepository::new();
        assert_eq!(repo.scan(system.path(), user.path()), 1);
        assert!(!repo.is_probed(&bad));
        assert!(repo.is_probed(&good));
        assert!(matches!(
            repo.load(&bad),
            Err(ThemeError::ApiMismatch { .. })
        ));
        assert!(repo.loaded().is_empty());
        assert!(!repo.is_loaded(&bad));
    }

    #[test]
    fn scan_skips_hidden_and_nested_and_creates_user_root() {
        let system = tempfile::tempdir().unwrap();
        let base = tempfile::tempdir().unwrap();
        let user = base.path().join("config").join("themes");
        let hidden = write_theme(system.path(), ".hidden", &theme_xml(1, "info"));
        let nested = write_theme(system.path(), "outer/inner", &theme_xml(1, "info"));
        let mine = write_theme(base.path(), "config/themes/mine", &theme_xml(1, "error"));
        std::fs::remove_dir_all(base.path().join("config")).unwrap();

        let mut repo = ThemeRepository::new();
        assert_eq!(repo.scan(system.path(), &user), 0);
        assert!(user.is_dir());
        assert!(!repo.is_probed(&hidden));
        assert!(!repo.is_probed(&nested));
        assert!(!repo.is_probed(&mine));
    }

    #[test]
    fn load_is_idempotent_and_unload_removes() {
        let root = tempfile::tempdir().unwrap();
        let path = write_theme(root.path(), "plain", &theme_xml(1, "info"));

        let mut repo = ThemeRepository::new();
        assert_eq!(repo.load(&path).unwrap().info.name, "info theme");
        repo.load(&path).unwrap();
        assert_eq!(repo.loaded().len(), 1);
        assert!(repo.is_loaded(&path));
        assert!(repo.is_probed(&path));

        assert!(repo.unload(&path));
        assert!(!repo.is_loaded(&path));
        assert!(!repo.unload(&path));
    }

    #[test]
    fn saved_list_is_intersected_with_probed() {
        let system = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        let a = write_theme(system.path(), "a", &theme_xml(1, "info"));
        let b = write_theme(system.path(), "b", &theme_xml(1, "error"));
        let db = Database::open_in_memory().unwrap();

        let mut repo = ThemeRepository::new();
        repo.scan(system.path(), user.path());
        repo.load(&a).unwrap();
        repo.load(&b).unwrap();
        repo.save_loaded_list(&db).unwrap();

        std::fs::remove_file(&b).unwrap();
        let mut restored = ThemeRepository::new();
        restored.scan(system.path(), user.path());
        assert_eq!(restored.load_saved_list(&db).unwrap(), 1);
        assert!(restored.is_loaded(&a));
        assert!(!restored.is_loaded(&b));
    }

    #[test]
    fn empty_saved_list_falls_back_to_default_dir() {
        let system = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        write_theme(system.path(), "fancy", &theme_xml(1, "info"));
        let default = write_theme(system.path(), DEFAULT_THEME_DIR, &theme_xml(1, "info"));
        let db = Database::open_in_memory().unwrap();

        let mut repo = ThemeRepository::new();
        repo.scan(system.path(), user.path());
        assert_eq!(repo.load_saved_list(&db).unwrap(), 1);
        assert!(repo.is_loaded(&default));
    }
}
