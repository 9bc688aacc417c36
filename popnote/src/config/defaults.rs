//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

pub const POPUP_CORNER: &str = "POPUP_CORNER";
pub const POPUP_STACK: &str = "POPUP_STACK";
pub const POPUP_ANIMATE: &str = "POPUP_ANIMATE";
pub const POPUP_DURATION_SECS: &str = "POPUP_DURATION_SECS";
pub const POPUP_THROTTLE: &str = "POPUP_THROTTLE";
pub const POPUP_SCREEN: &str = "POPUP_SCREEN";
pub const POPUP_ACTION_LEFT: &str = "POPUP_ACTION_LEFT";
pub const POPUP_ACTION_MIDDLE: &str = "POPUP_ACTION_MIDDLE";
pub const POPUP_ACTION_RIGHT: &str = "POPUP_ACTION_RIGHT";
pub const THEME_SYSTEM_DIR: &str = "THEME_SYSTEM_DIR";
pub const FONT_PATH: &str = "FONT_PATH";

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    (POPUP_CORNER, "bottom-right", "Screen corner popups grow from"),
    (POPUP_STACK, "vertical", "Stacking axis for concurrent popups"),
    (POPUP_ANIMATE, "true", "Animate popup reveal and hide"),
    (POPUP_DURATION_SECS, "6", "Total time a popup stays on screen"),
    (POPUP_THROTTLE, "6", "Maximum concurrent popups (0 = unlimited)"),
    (POPUP_SCREEN, "0", "Monitor index popups are placed on"),
    (POPUP_ACTION_LEFT, "open", "Action for the left mouse button"),
    (POPUP_ACTION_MIDDLE, "close", "Action for the middle mouse button"),
    (POPUP_ACTION_RIGHT, "context", "Action for the right mouse button"),
    (
        THEME_SYSTEM_DIR,
        "/usr/share/popnote/themes",
        "System-wide theme directory",
    ),
    (FONT_PATH, "", "TrueType/OpenType file used for text items"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_setting;

    #[test]
    fn defaults_pass_validation() {
        for def in DEFAULT_SETTINGS.values() {
            assert!(
                validate_setting(def.key, def.default).is_ok(),
                "default for {} is invalid",
                def.key
            );
        }
    }

    #[test]
    fn unknown_key_has_no_default() {
        assert_eq!(get_default("NOPE"), None);
        assert_eq!(get_default(POPUP_STACK), Some("vertical"));
    }
}
