//! Image composition utilities: overlay, tile, crop and alpha handling.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use tracing::debug;

/// Alpha value at or above which a mask pixel counts as opaque.
pub const MASK_THRESHOLD: u8 = 128;

/// Overlay `top` onto `base` with its top-left corner at (`x`, `y`).
///
/// Uses source-over alpha compositing. Parts of `top` falling outside
/// `base` (including negative offsets) are clipped.
pub fn overlay(base: &mut RgbaImage, top: &RgbaImage, x: i32, y: i32) {
    let (base_w, base_h) = (base.width() as i64, base.height() as i64);
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let target_x = x as i64 + dx as i64;
        let target_y = y as i64 + dy as i64;
        if target_x < 0 || target_y < 0 || target_x >= base_w || target_y >= base_h {
            continue;
        }
        let (tx, ty) = (target_x as u32, target_y as u32);
        match pixel[3] {
            0 => {}
            255 => base.put_pixel(tx, ty, *pixel),
            _ => {
                let bg = *base.get_pixel(tx, ty);
                base.put_pixel(tx, ty, blend_over(&bg, pixel));
            }
        }
    }
}

fn blend_over(bg: &Rgba<u8>, fg: &Rgba<u8>) -> Rgba<u8> {
    let src_a = fg[3] as f32 / 255.0;
    let dst_a = bg[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let c = (fg[i] as f32 * src_a + bg[i] as f32 * dst_a * (1.0 - src_a)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Repeat `background` across a new `width` x `height` image.
pub fn tile(background: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (bw, bh) = background.dimensions();
    if bw == 0 || bh == 0 {
        return RgbaImage::new(width, height);
    }
    debug!(width, height, bw, bh, "Tiling background");
    RgbaImage::from_fn(width, height, |x, y| *background.get_pixel(x % bw, y % bh))
}

/// Flat `width` x `height` image of a single colour.
pub fn fill(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// Scale every pixel's alpha by `factor` (clamped to 0.0..=1.0).
pub fn reduce_alpha(img: &mut RgbaImage, factor: f32) {
    let factor = factor.clamp(0.0, 1.0);
    for pixel in img.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * factor).round() as u8;
    }
}

/// Copy a sub-region out of `img`.
///
/// The region is clamped to the image bounds and to at least 1x1.
pub fn crop(img: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let x = x.min(w.saturating_sub(1));
    let y = y.min(h.saturating_sub(1));
    let width = width.clamp(1, (w - x).max(1));
    let height = height.clamp(1, (h - y).max(1));
    image::imageops::crop_imm(img, x, y, width, height).to_image()
}

/// Whether any pixel is not fully opaque.
pub fn has_alpha(img: &RgbaImage) -> bool {
    img.pixels().any(|p| p[3] < 255)
}

/// Binary shape mask derived from the alpha channel.
///
/// Opaque pixels map to 255, the rest to 0.
pub fn alpha_mask(img: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        if img.get_pixel(x, y)[3] >= MASK_THRESHOLD {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a colour.
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        3 => {
            let expand = |i| digit(i, 1).map(|v| v * 17);
            Some(Rgba([expand(0)?, expand(1)?, expand(2)?, 255]))
        }
        6 => Some(Rgba([digit(0, 2)?, digit(2, 2)?, digit(4, 2)?, 255])),
        8 => Some(Rgba([digit(0, 2)?, digit(2, 2)?, digit(4, 2)?, digit(6, 2)?])),
        _ => None,
    }
}
