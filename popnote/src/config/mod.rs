//! Configuration management: defaults, validation, loading from DB + environment.

pub mod defaults;
pub mod manager;
pub mod popup_config;
pub mod validation;

pub use manager::SettingsManager;
pub use popup_config::PopupConfig;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Screen corner popups are anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Corner {
    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }
}

impl FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-left" => Ok(Corner::TopLeft),
            "top-right" => Ok(Corner::TopRight),
            "bottom-left" => Ok(Corner::BottomLeft),
            "bottom-right" => Ok(Corner::BottomRight),
            other => Err(format!("unknown corner '{other}'")),
        }
    }
}

/// Direction in which concurrent popups are stacked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackAxis {
    #[default]
    Vertical,
    Horizontal,
}

impl FromStr for StackAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vertical" => Ok(StackAxis::Vertical),
            "horizontal" => Ok(StackAxis::Horizontal),
            other => Err(format!("unknown stacking axis '{other}'")),
        }
    }
}

/// Mouse buttons a popup reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Action bound to a mouse button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseAction {
    #[default]
    None,
    Open,
    Close,
    Context,
}

impl MouseAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseAction::None => "none",
            MouseAction::Open => "open",
            MouseAction::Close => "close",
            MouseAction::Context => "context",
        }
    }
}

impl fmt::Display for MouseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MouseAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(MouseAction::None),
            "open" => Ok(MouseAction::Open),
            "close" => Ok(MouseAction::Close),
            "context" => Ok(MouseAction::Context),
            other => Err(format!("unknown mouse action '{other}'")),
        }
    }
}

/// Settings layer error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Db(#[from] popnote_db::DbError),

    #[error("Unknown setting key: {0}")]
    UnknownKey(String),

    #[error("Validation error for {key}: {message}")]
    Invalid { key: String, message: String },
}
