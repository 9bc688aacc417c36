//! Off-screen host that records popup activity.
//!
//! Used by the CLI to render previews without a window system and by the
//! tests to observe what the display manager does to its windows.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use image::{GrayImage, Luma, RgbaImage};
use popnote_image::{FontDesc, TextShaper};
use serde::Serialize;

use super::{HostStyle, PopupHost, PopupSurface};
use crate::geometry::{Monitor, Rect};

/// Shaper drawing every visible glyph as a solid cell.
///
/// Widths are proportional to the font size, which keeps layout and
/// clipping deterministic when no font file is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAdvanceShaper;

impl FixedAdvanceShaper {
    fn cell(font: &FontDesc) -> (u32, u32) {
        let px = font.pixel_size();
        ((px * 0.6).ceil().max(1.0) as u32, (px * 1.25).ceil().max(1.0) as u32)
    }
}

impl TextShaper for FixedAdvanceShaper {
    fn measure(&self, text: &str, font: &FontDesc) -> (u32, u32) {
        let (advance, height) = Self::cell(font);
        (text.chars().count() as u32 * advance, height)
    }

    fn rasterize(&self, text: &str, font: &FontDesc) -> GrayImage {
        let (advance, height) = Self::cell(font);
        let (width, _) = self.measure(text, font);
        let mut coverage = GrayImage::new(width, height);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = i as u32 * advance;
            for x in x0..x0 + advance.saturating_sub(1).max(1) {
                for y in height / 5..height - height / 5 {
                    coverage.put_pixel(x, y, Luma([255]));
                }
            }
        }
        coverage
    }
}

/// What happened to one surface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SurfaceRecord {
    pub width: u32,
    pub height: u32,
    pub position: Option<(i32, i32)>,
    pub image_size: Option<(u32, u32)>,
    pub shaped: bool,
    pub moves: u32,
    pub redraws: u32,
    pub alive: bool,
    #[serde(skip)]
    pub last_image: Option<RgbaImage>,
}

/// Shared journal of all surfaces a [`HeadlessHost`] created.
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub surfaces: BTreeMap<u64, SurfaceRecord>,
}

impl SurfaceLog {
    pub fn alive(&self) -> usize {
        self.surfaces.values().filter(|s| s.alive).count()
    }

    pub fn created(&self) -> usize {
        self.surfaces.len()
    }
}

struct HeadlessSurface {
    id: u64,
    log: Rc<RefCell<SurfaceLog>>,
}

impl HeadlessSurface {
    fn with_record(&self, f: impl FnOnce(&mut SurfaceRecord)) {
        if let Some(record) = self.log.borrow_mut().surfaces.get_mut(&self.id) {
            f(record);
        }
    }
}

impl PopupSurface for HeadlessSurface {
    fn set_image(&mut self, image: &RgbaImage) {
        self.with_record(|r| {
            r.image_size = Some(image.dimensions());
            r.last_image = Some(image.clone());
        });
    }

    fn set_shape(&mut self, mask: Option<&GrayImage>) {
        self.with_record(|r| r.shaped = mask.is_some());
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.with_record(|r| {
            r.position = Some((x, y));
            r.moves += 1;
        });
    }

    fn queue_redraw(&mut self) {
        self.with_record(|r| r.redraws += 1);
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.with_record(|r| r.alive = false);
    }
}

/// [`PopupHost`] without a window system.
pub struct HeadlessHost {
    monitors: Vec<Monitor>,
    screensaver: Cell<bool>,
    style: HostStyle,
    shaper: Box<dyn TextShaper>,
    log: Rc<RefCell<SurfaceLog>>,
    next_id: Cell<u64>,
}

impl HeadlessHost {
    pub fn new(monitors: Vec<Monitor>) -> Self {
        Self {
            monitors,
            screensaver: Cell::new(false),
            style: HostStyle::default(),
            shaper: Box::new(FixedAdvanceShaper),
            log: Rc::new(RefCell::new(SurfaceLog::default())),
            next_id: Cell::new(1),
        }
    }

    /// Single 1920x1080 monitor with a 32px top panel.
    pub fn single_monitor() -> Self {
        let mut monitor = Monitor::new(Rect::new(0, 0, 1920, 1080));
        monitor.work_area = Some(Rect::new(0, 32, 1920, 1048));
        Self::new(vec![monitor])
    }

    pub fn with_shaper(mut self, shaper: Box<dyn TextShaper>) -> Self {
        self.shaper = shaper;
        self
    }

    pub fn with_style(mut self, style: HostStyle) -> Self {
        self.style = style;
        self
    }

    pub fn set_screensaver(&self, active: bool) {
        self.screensaver.set(active);
    }

    pub fn log(&self) -> Rc<RefCell<SurfaceLog>> {
        Rc::clone(&self.log)
    }
}

impl PopupHost for HeadlessHost {
    fn monitors(&self) -> Vec<Monitor> {
        self.monitors.clone()
    }

    fn screensaver_active(&self) -> bool {
        self.screensaver.get()
    }

    fn style(&self) -> HostStyle {
        self.style.clone()
    }

    fn shaper(&self) -> &dyn TextShaper {
        self.shaper.as_ref()
    }

    fn create_surface(&self, width: u32, height: u32) -> Box<dyn PopupSurface> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.log.borrow_mut().surfaces.insert(
            id,
            SurfaceRecord {
                width,
                height,
                alive: true,
                ..SurfaceRecord::default()
            },
        );
        tracing::debug!(surface = id, width, height, "Created headless surface");
        Box::new(HeadlessSurface {
            id,
            log: Rc::clone(&self.log),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_shaper_is_proportional() {
        let font = FontDesc::parse("Sans 12");
        let (w1, h) = FixedAdvanceShaper.measure("ab", &font);
        let (w2, _) = FixedAdvanceShaper.measure("abcd", &font);
        assert_eq!(w2, w1 * 2);
        assert!(h > 0);
        let coverage = FixedAdvanceShaper.rasterize("a b", &font);
        assert_eq!(coverage.width(), FixedAdvanceShaper.measure("a b", &font).0);
        assert!(coverage.pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn surfaces_are_journaled() {
        let host = HeadlessHost::single_monitor();
        let log = host.log();
        {
            let mut surface = host.create_surface(10, 20);
            surface.move_to(5, 6);
            surface.set_image(&RgbaImage::new(10, 20));
            surface.queue_redraw();
            assert_eq!(log.borrow().alive(), 1);
        }
        let log = log.borrow();
        let record = &log.surfaces[&1];
        assert_eq!(record.position, Some((5, 6)));
        assert_eq!(record.image_size, Some((10, 20)));
        assert_eq!(record.redraws, 1);
        assert!(!record.alive);
    }
}
