//! Icon and image items.

use std::path::Path;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use popnote_image::{overlay, tint};

use super::RenderContext;
use crate::theme::{IconItem, IconSource, ImageItem, Item, NotificationTemplate};

fn load_rgba(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Skipping item image");
            None
        }
    }
}

fn scale_to(img: RgbaImage, size: u32) -> RgbaImage {
    if img.dimensions() == (size, size) {
        img
    } else {
        imageops::resize(&img, size, size, FilterType::Lanczos3)
    }
}

/// Picture for an icon item at its size class, or `None` if no source
/// yields one.
pub fn icon_image(
    icon: &IconItem,
    template: &NotificationTemplate,
    ctx: &RenderContext<'_>,
) -> Option<RgbaImage> {
    let size = icon.size.pixels();
    // The master template stands in for other types, so name the icon after
    // the event that fired.
    let kind = if template.is_master() {
        ctx.info.kind()
    } else {
        template.kind.as_str()
    };

    if icon.source == IconSource::System {
        if let Some(coverage) = ctx.host.stock_icon(kind, size) {
            return Some(scale_to(tint(&coverage, ctx.style.foreground, true), size));
        }
        tracing::debug!(kind, "No stock icon, trying theme file");
    }

    let path = ctx.theme.dir.join(format!("{kind}.png"));
    load_rgba(&path).map(|img| scale_to(img, size))
}

pub fn render_icon(
    buffer: &mut RgbaImage,
    item: &Item,
    icon: &IconItem,
    template: &NotificationTemplate,
    ctx: &RenderContext<'_>,
) {
    let Some(picture) = icon_image(icon, template, ctx) else {
        return;
    };
    let (img_w, img_h) = buffer.dimensions();
    let (x, y) = item.render_position(picture.width(), picture.height(), img_w, img_h);
    overlay(buffer, &picture, x, y);
}

pub fn render_image(buffer: &mut RgbaImage, item: &Item, image: &ImageItem, ctx: &RenderContext<'_>) {
    let Some(picture) = load_rgba(&ctx.theme.dir.join(&image.filename)) else {
        return;
    };
    let (img_w, img_h) = buffer.dimensions();
    let (x, y) = item.render_position(picture.width(), picture.height(), img_w, img_h);
    overlay(buffer, &picture, x, y);
}
