//! Typed popup configuration snapshot loaded from the settings DB.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::defaults::*;
use super::manager::SettingsManager;
use super::{Corner, MouseAction, MouseButton, SettingsError, StackAxis};

/// Runtime popup configuration.
#[derive(Debug, Clone, Serialize)]
pub struct PopupConfig {
    pub corner: Corner,
    pub stack: StackAxis,
    pub animate: bool,
    pub duration_secs: u32,
    pub throttle: usize,
    pub screen: usize,
    pub action_left: MouseAction,
    pub action_middle: MouseAction,
    pub action_right: MouseAction,
    pub system_theme_dir: PathBuf,
    pub font_path: Option<PathBuf>,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            corner: Corner::BottomRight,
            stack: StackAxis::Vertical,
            animate: true,
            duration_secs: 6,
            throttle: 6,
            screen: 0,
            action_left: MouseAction::Open,
            action_middle: MouseAction::Close,
            action_right: MouseAction::Context,
            system_theme_dir: PathBuf::from("/usr/share/popnote/themes"),
            font_path: None,
        }
    }
}

impl PopupConfig {
    /// Load configuration from the settings manager.
    ///
    /// Unparseable stored values fall back to the built-in defaults.
    pub fn load(sm: &SettingsManager) -> Result<Self, SettingsError> {
        let g = |key: &str| -> Result<String, SettingsError> { sm.get_setting(key) };
        let fallback = Self::default();

        let font = g(FONT_PATH)?;
        Ok(Self {
            corner: g(POPUP_CORNER)?.parse().unwrap_or(fallback.corner),
            stack: g(POPUP_STACK)?.parse().unwrap_or(fallback.stack),
            animate: g(POPUP_ANIMATE)? == "true",
            duration_secs: parse_or(&g(POPUP_DURATION_SECS)?, fallback.duration_secs).max(1),
            throttle: parse_or(&g(POPUP_THROTTLE)?, fallback.throttle),
            screen: parse_or(&g(POPUP_SCREEN)?, fallback.screen),
            action_left: g(POPUP_ACTION_LEFT)?.parse().unwrap_or(fallback.action_left),
            action_middle: g(POPUP_ACTION_MIDDLE)?.parse().unwrap_or(fallback.action_middle),
            action_right: g(POPUP_ACTION_RIGHT)?.parse().unwrap_or(fallback.action_right),
            system_theme_dir: PathBuf::from(g(THEME_SYSTEM_DIR)?),
            font_path: if font.is_empty() {
                None
            } else {
                Some(PathBuf::from(font))
            },
        })
    }

    /// Reload config from the settings manager.
    pub fn reload(&mut self, sm: &SettingsManager) -> Result<(), SettingsError> {
        *self = Self::load(sm)?;
        Ok(())
    }

    /// Total on-screen time of one popup.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }

    pub fn action_for(&self, button: MouseButton) -> MouseAction {
        match button {
            MouseButton::Left => self.action_left,
            MouseButton::Middle => self.action_middle,
            MouseButton::Right => self.action_right,
        }
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    s.parse().unwrap_or(default)
}
