//! Themes: file-defined bundles of notification templates.
//!
//! A theme lives in its own directory next to the images it references and
//! is described by a `theme.xml` file (see [`xml`]).

pub mod item;
pub mod repository;
pub mod template;
pub mod xml;

pub use item::{
    Anchor, IconItem, IconSize, IconSource, ImageItem, Item, ItemKind, ItemOffset, TextItem,
    get_render_position,
};
pub use repository::ThemeRepository;
pub use template::{Background, MASTER_TYPE, NotificationTemplate};

use std::path::{Path, PathBuf};

/// Theme file API version this build understands.
pub const THEME_API_VERSION: u32 = 1;

/// File name of the theme descriptor inside a theme directory.
pub const THEME_FILE_NAME: &str = "theme.xml";

/// Theme metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeInfo {
    pub name: String,
    pub version: String,
    pub summary: String,
    pub description: String,
    pub author: String,
    pub website: String,
}

/// Formatting options shared by every template of a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeOptions {
    /// strftime string for the `%T` token.
    pub time_format: String,
    /// strftime string for the `%D` token.
    pub date_format: String,
    pub warning: String,
    pub ellipsis: String,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            time_format: "%X".into(),
            date_format: "%x".into(),
            warning: "!".into(),
            ellipsis: "...".into(),
        }
    }
}

/// A parsed theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub info: ThemeInfo,
    pub options: ThemeOptions,
    pub templates: Vec<NotificationTemplate>,
}

impl Theme {
    /// Empty theme rooted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path,
            dir,
            info: ThemeInfo::default(),
            options: ThemeOptions::default(),
            templates: Vec::new(),
        }
    }

    /// Read and validate a theme file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mut theme = xml::parse_theme(&source)?;
        theme.path = path.to_path_buf();
        theme.dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tracing::debug!(
            path = %path.display(),
            name = %theme.info.name,
            templates = theme.templates.len(),
            "Parsed theme"
        );
        Ok(theme)
    }

    /// Write the theme back to `self.path`.
    pub fn save(&self) -> Result<(), ThemeError> {
        self.save_to(&self.path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ThemeError> {
        let data = xml::write_theme(self)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }

    pub fn master(&self) -> Option<&NotificationTemplate> {
        self.templates.iter().find(|t| t.is_master())
    }

    pub fn templates_for<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a NotificationTemplate> + 'a {
        self.templates.iter().filter(move |t| t.kind == kind)
    }

    /// Check theme-wide invariants: valid templates and at most one master.
    pub fn validate(&self) -> Result<(), ThemeError> {
        for template in &self.templates {
            template.validate()?;
        }
        let masters = self.templates.iter().filter(|t| t.is_master()).count();
        if masters > 1 {
            return Err(ThemeError::MultipleMasters(masters));
        }
        Ok(())
    }

    pub fn display_name(&self) -> &str {
        if self.info.name.is_empty() {
            self.dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unnamed")
        } else {
            &self.info.name
        }
    }
}

/// Theme loading/saving error.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Unsupported theme API version {found} (expected {expected})")]
    ApiMismatch { found: String, expected: u32 },

    #[error("Missing element or attribute: {0}")]
    Missing(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid notification: {0}")]
    InvalidTemplate(String),

    #[error("Theme defines {0} master notifications")]
    MultipleMasters(usize),
}

impl From<quick_xml::Error> for ThemeError {
    fn from(e: quick_xml::Error) -> Self {
        ThemeError::Xml(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_theme_derives_directory() {
        let theme = Theme::new("/themes/sunny/theme.xml");
        assert_eq!(theme.dir, PathBuf::from("/themes/sunny"));
        assert_eq!(theme.display_name(), "sunny");
    }

    #[test]
    fn at_most_one_master() {
        let mut theme = Theme::new("/t/theme.xml");
        theme
            .templates
            .push(NotificationTemplate::themed(MASTER_TYPE, 20, 20));
        assert!(theme.validate().is_ok());
        assert!(theme.master().is_some());
        theme
            .templates
            .push(NotificationTemplate::themed(MASTER_TYPE, 20, 20));
        assert!(matches!(
            theme.validate(),
            Err(ThemeError::MultipleMasters(2))
        ));
    }

    #[test]
    fn templates_for_filters_by_type() {
        let mut theme = Theme::new("/t/theme.xml");
        theme.templates.push(NotificationTemplate::themed("info", 20, 20));
        theme.templates.push(NotificationTemplate::themed("error", 20, 20));
        theme.templates.push(NotificationTemplate::themed("info", 30, 30));
        assert_eq!(theme.templates_for("info").count(), 2);
        assert_eq!(theme.templates_for("fatal").count(), 0);
    }
}
