//! On-screen popups and their lifecycle.

pub mod animation;
pub mod manager;
pub mod position;

pub use animation::{AnimationPlan, DELTA, TICK};
pub use manager::DisplayManager;

use std::fmt;

use image::RgbaImage;
use serde::Serialize;

use crate::config::MouseButton;
use crate::event::EventInfo;
use crate::geometry::Rect;
use crate::host::PopupSurface;
use crate::timer::TimerHandle;

/// Identifier of one display, unique per manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DisplayId(pub(crate) u64);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    Showing,
    Shown,
    Hiding,
    Destroyed,
}

/// What a button release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Opened,
    Closed,
    /// The auto-hide timer is suspended; call
    /// [`DisplayManager::context_menu_closed`] when the menu goes away.
    ContextMenu,
}

/// Lifetime counters of a [`DisplayManager`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ManagerStats {
    pub created: u64,
    pub destroyed: u64,
    pub evicted: u64,
    pub reposition_passes: u64,
}

/// Serializable view of one display.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySnapshot {
    pub id: DisplayId,
    pub kind: String,
    pub state: DisplayState,
    pub bounds: Rect,
    pub full_size: (u32, u32),
}

/// One live popup.
pub struct Display {
    pub(crate) id: DisplayId,
    pub(crate) info: EventInfo,
    pub(crate) full: RgbaImage,
    pub(crate) visible: RgbaImage,
    pub(crate) has_alpha: bool,
    pub(crate) state: DisplayState,
    pub(crate) round: i32,
    pub(crate) position: (i32, i32),
    pub(crate) pressed: Option<MouseButton>,
    pub(crate) timer: Option<TimerHandle>,
    pub(crate) surface: Box<dyn PopupSurface>,
}

impl Display {
    pub fn id(&self) -> DisplayId {
        self.id
    }

    pub fn info(&self) -> &EventInfo {
        &self.info
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn round(&self) -> i32 {
        self.round
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Current (possibly partial) size.
    pub fn size(&self) -> (u32, u32) {
        self.visible.dimensions()
    }

    pub fn full_size(&self) -> (u32, u32) {
        self.full.dimensions()
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Screen rectangle currently covered.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(self.position.0, self.position.1, w, h)
    }

    pub fn visible_image(&self) -> &RgbaImage {
        &self.visible
    }

    pub fn full_image(&self) -> &RgbaImage {
        &self.full
    }

    /// Whether an auto-hide/animation timer is armed.
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            id: self.id,
            kind: self.info.kind().to_string(),
            state: self.state,
            bounds: self.bounds(),
            full_size: self.full_size(),
        }
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("id", &self.id)
            .field("kind", &self.info.kind())
            .field("state", &self.state)
            .field("round", &self.round)
            .field("bounds", &self.bounds())
            .finish()
    }
}
