//! Seam to the hosting window system.
//!
//! The engine never talks to a toolkit directly. Everything it needs from
//! the desktop (monitor geometry, screen-saver state, default colours and
//! font, popup windows) comes through [`PopupHost`].

pub mod headless;

pub use headless::{FixedAdvanceShaper, HeadlessHost, SurfaceLog};

use image::{GrayImage, Rgba, RgbaImage};
use popnote_image::TextShaper;

use crate::geometry::Monitor;

/// Colours and background pixmap of the host's current desktop theme.
#[derive(Debug, Clone)]
pub struct HostStyle {
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
    pub background_pixmap: Option<RgbaImage>,
}

impl Default for HostStyle {
    fn default() -> Self {
        Self {
            foreground: Rgba([0, 0, 0, 255]),
            background: Rgba([237, 237, 237, 255]),
            background_pixmap: None,
        }
    }
}

/// Services the hosting desktop provides to the engine.
pub trait PopupHost {
    /// Connected monitors, in the host's index order.
    fn monitors(&self) -> Vec<Monitor>;

    /// Whether a screen saver or lock screen is currently active.
    fn screensaver_active(&self) -> bool;

    fn style(&self) -> HostStyle;

    /// Shaper used for text items, with the host's default font as fallback.
    fn shaper(&self) -> &dyn TextShaper;

    /// Symbolic stock icon (coverage mask) for a notification type.
    fn stock_icon(&self, _kind: &str, _size: u32) -> Option<GrayImage> {
        None
    }

    /// Create an undecorated popup window of the given size.
    fn create_surface(&self, width: u32, height: u32) -> Box<dyn PopupSurface>;
}

/// One popup window. Dropping it destroys the window.
pub trait PopupSurface {
    fn set_image(&mut self, image: &RgbaImage);

    /// Input/visual shape; `None` makes the whole window rectangle opaque.
    fn set_shape(&mut self, mask: Option<&GrayImage>);

    fn move_to(&mut self, x: i32, y: i32);

    fn queue_redraw(&mut self);
}
