//! Notification templates: one renderable layout per event type.

use super::ThemeError;
use super::item::Item;

/// Type identifier of the distinguished master template.
pub const MASTER_TYPE: &str = "!master";

/// Smallest themed background edge, in pixels.
pub const MIN_THEMED_SIZE: u32 = 16;

/// Where a template's background comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// Host-themed fill of the template's width x height.
    Themed,
    /// Image file relative to the theme directory.
    Image(String),
}

/// One layout for a given notification type within a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub kind: String,
    pub background: Background,
    pub width: u32,
    pub height: u32,
    pub alias: Option<String>,
    pub items: Vec<Item>,
}

impl NotificationTemplate {
    pub fn themed(kind: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            kind: kind.into(),
            background: Background::Themed,
            width,
            height,
            alias: None,
            items: Vec::new(),
        }
    }

    pub fn with_image_background(kind: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            background: Background::Image(filename.into()),
            width: 0,
            height: 0,
            alias: None,
            items: Vec::new(),
        }
    }

    pub fn push_item(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn is_master(&self) -> bool {
        self.kind == MASTER_TYPE
    }

    /// Name shown to users: the alias when set, else the type.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.kind)
    }

    /// Check the background invariant.
    pub fn validate(&self) -> Result<(), ThemeError> {
        if self.kind.is_empty() {
            return Err(ThemeError::InvalidTemplate(
                "notification without a type".into(),
            ));
        }
        match &self.background {
            Background::Themed => {
                if self.width < MIN_THEMED_SIZE || self.height < MIN_THEMED_SIZE {
                    return Err(ThemeError::InvalidTemplate(format!(
                        "'{}' uses the themed background but is {}x{} (minimum {MIN_THEMED_SIZE}x{MIN_THEMED_SIZE})",
                        self.kind, self.width, self.height
                    )));
                }
            }
            Background::Image(filename) => {
                if filename.trim().is_empty() {
                    return Err(ThemeError::InvalidTemplate(format!(
                        "'{}' has an empty background filename",
                        self.kind
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themed_background_needs_minimum_size() {
        assert!(NotificationTemplate::themed("info", 16, 16).validate().is_ok());
        assert!(NotificationTemplate::themed("info", 15, 100).validate().is_err());
        assert!(NotificationTemplate::themed("info", 100, 0).validate().is_err());
    }

    #[test]
    fn image_background_needs_filename() {
        assert!(
            NotificationTemplate::with_image_background("info", "bg.png")
                .validate()
                .is_ok()
        );
        assert!(
            NotificationTemplate::with_image_background("info", "  ")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn display_name_prefers_alias() {
        let mut template = NotificationTemplate::themed(MASTER_TYPE, 20, 20);
        assert!(template.is_master());
        assert_eq!(template.display_name(), "!master");
        template.alias = Some("Master".into());
        assert_eq!(template.display_name(), "Master");
    }
}
