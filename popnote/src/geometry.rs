//! Screen rectangles and monitor descriptions.

use serde::Serialize;

/// Axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Overlap of two rectangles, `None` when they do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }
}

/// One connected monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Monitor {
    pub geometry: Rect,
    /// Usable area reported by the window manager (excludes panels/docks).
    pub work_area: Option<Rect>,
}

impl Monitor {
    pub fn new(geometry: Rect) -> Self {
        Self {
            geometry,
            work_area: None,
        }
    }

    /// Area popups may occupy: the monitor clipped to its work area.
    ///
    /// Falls back to the full geometry when no work area is known or the
    /// work area lies entirely elsewhere.
    pub fn usable_area(&self) -> Rect {
        self.work_area
            .and_then(|work| self.geometry.intersect(&work))
            .unwrap_or(self.geometry)
    }
}

/// Usable area of monitor `index`, clamped to the last available monitor.
pub fn usable_area(monitors: &[Monitor], index: usize) -> Option<Rect> {
    let last = monitors.len().checked_sub(1)?;
    if index > last {
        tracing::debug!(index, available = monitors.len(), "Configured screen missing, using last");
    }
    Some(monitors[index.min(last)].usable_area())
}
