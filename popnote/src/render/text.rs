//! Text items: expand, shape, clip, tint and composite.

use image::RgbaImage;
use popnote_image::{FontDesc, clip_text, overlay, parse_color, tint};

use super::RenderContext;
use super::format::expand_format;
use crate::theme::{Item, TextItem};

/// Font for a text item, the host default when none is set.
pub fn item_font(text: &TextItem) -> FontDesc {
    text.font.as_deref().map(FontDesc::parse).unwrap_or_default()
}

/// Expanded and clipped text of `text` inside an image `image_width` wide.
///
/// A fixed item width replaces the image width as the budget and makes the
/// horizontal offset irrelevant to clipping.
pub fn layout_text(item: &Item, text: &TextItem, ctx: &RenderContext<'_>, image_width: u32) -> String {
    let expanded = expand_format(&text.format, ctx.info, &ctx.theme.options, &ctx.now);
    let font = item_font(text);
    let shaper = ctx.host.shaper();
    let (budget, offset) = if text.width > 0 {
        (text.width, 0)
    } else {
        (image_width, item.h_offset.resolve(image_width).unsigned_abs())
    };
    clip_text(
        &expanded,
        text.clipping,
        budget,
        offset,
        &ctx.theme.options.ellipsis,
        |s| shaper.measure(s, &font).0,
    )
}

pub fn render_text(buffer: &mut RgbaImage, item: &Item, text: &TextItem, ctx: &RenderContext<'_>) {
    let (img_w, img_h) = buffer.dimensions();
    let clipped = layout_text(item, text, ctx, img_w);
    if clipped.is_empty() {
        return;
    }

    let font = item_font(text);
    let coverage = ctx.host.shaper().rasterize(&clipped, &font);
    if coverage.width() == 0 || coverage.height() == 0 {
        return;
    }

    let color = match text.color.as_deref() {
        Some(value) => parse_color(value).unwrap_or_else(|| {
            tracing::debug!(color = value, "Unparseable text colour, using foreground");
            ctx.style.foreground
        }),
        None => ctx.style.foreground,
    };
    let rendered = tint(&coverage, color, false);
    let (x, y) = item.render_position(rendered.width(), rendered.height(), img_w, img_h);
    tracing::trace!(text = %clipped, x, y, "Rendering text item");
    overlay(buffer, &rendered, x, y);
}
