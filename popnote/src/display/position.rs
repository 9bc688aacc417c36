//! Where popups go on screen and which slice of them is visible.

use crate::config::{Corner, StackAxis};
use crate::geometry::Rect;

/// Extent of a `width` x `height` popup along the stacking axis.
pub fn stack_extent(axis: StackAxis, width: u32, height: u32) -> u32 {
    match axis {
        StackAxis::Vertical => height,
        StackAxis::Horizontal => width,
    }
}

/// Top-left screen position of a `width` x `height` popup placed `offset`
/// pixels away from `corner` along `axis`, flush with the corner on the
/// other axis.
pub fn place(
    area: Rect,
    corner: Corner,
    axis: StackAxis,
    offset: u32,
    width: u32,
    height: u32,
) -> (i32, i32) {
    let offset = offset as i32;
    let (w, h) = (width as i32, height as i32);
    let left = area.x;
    let right = area.right() - w;
    let top = area.y;
    let bottom = area.bottom() - h;

    match axis {
        StackAxis::Vertical => {
            let x = if corner.is_left() { left } else { right };
            let y = if corner.is_top() { top + offset } else { bottom - offset };
            (x, y)
        }
        StackAxis::Horizontal => {
            let x = if corner.is_left() { left + offset } else { right - offset };
            let y = if corner.is_top() { top } else { bottom };
            (x, y)
        }
    }
}

/// Origin of the visible `width` x `height` slice of a `full_width` x
/// `full_height` popup, so that it seems to grow out of `corner`.
pub fn crop_origin(
    corner: Corner,
    axis: StackAxis,
    full_width: u32,
    full_height: u32,
    width: u32,
    height: u32,
) -> (u32, u32) {
    match axis {
        StackAxis::Vertical if corner.is_top() => (0, full_height.saturating_sub(height)),
        StackAxis::Horizontal if corner.is_left() => (full_width.saturating_sub(width), 0),
        _ => (0, 0),
    }
}
