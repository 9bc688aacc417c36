//! Template rendering: background first, then every item in order.

pub mod format;
pub mod icon;
pub mod text;

pub use format::expand_format;

use std::path::PathBuf;

use chrono::{DateTime, Local};
use image::RgbaImage;
use popnote_image::{fill, tile};

use crate::event::EventInfo;
use crate::host::{HostStyle, PopupHost};
use crate::theme::{Background, ItemKind, NotificationTemplate, Theme};

/// Render failure. Item problems never surface here; they skip the item.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load background {path}: {source}")]
    Background {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Background image {0} is empty")]
    EmptyBackground(PathBuf),
}

/// Everything an item renderer may look at.
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub info: &'a EventInfo,
    pub host: &'a dyn PopupHost,
    pub style: HostStyle,
    pub now: DateTime<Local>,
}

impl<'a> RenderContext<'a> {
    pub fn new(theme: &'a Theme, info: &'a EventInfo, host: &'a dyn PopupHost) -> Self {
        Self {
            theme,
            info,
            host,
            style: host.style(),
            now: Local::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }
}

/// Render `template` for `info` at the current time.
pub fn render_template(
    template: &NotificationTemplate,
    theme: &Theme,
    info: &EventInfo,
    host: &dyn PopupHost,
) -> Result<RgbaImage, RenderError> {
    render_with(template, &RenderContext::new(theme, info, host))
}

pub fn render_with(
    template: &NotificationTemplate,
    ctx: &RenderContext<'_>,
) -> Result<RgbaImage, RenderError> {
    let mut buffer = background(template, ctx)?;

    for item in &template.items {
        match &item.kind {
            ItemKind::Icon(icon) => icon::render_icon(&mut buffer, item, icon, template, ctx),
            ItemKind::Image(image) => icon::render_image(&mut buffer, item, image, ctx),
            ItemKind::Text(text) => text::render_text(&mut buffer, item, text, ctx),
        }
    }

    tracing::debug!(
        kind = %template.kind,
        theme = %ctx.theme.display_name(),
        width = buffer.width(),
        height = buffer.height(),
        "Rendered notification"
    );
    Ok(buffer)
}

fn background(template: &NotificationTemplate, ctx: &RenderContext<'_>) -> Result<RgbaImage, RenderError> {
    match &template.background {
        Background::Image(filename) => {
            let path = ctx.theme.dir.join(filename);
            let img = image::open(&path)
                .map_err(|source| RenderError::Background {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            if img.width() == 0 || img.height() == 0 {
                return Err(RenderError::EmptyBackground(path));
            }
            Ok(img)
        }
        Background::Themed => {
            let (w, h) = (template.width, template.height);
            Ok(match &ctx.style.background_pixmap {
                Some(pixmap) => tile(pixmap, w, h),
                None => fill(w, h, ctx.style.background),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::host::HeadlessHost;
    use crate::theme::{
        Anchor, IconItem, IconSize, IconSource, ImageItem, Item, ItemOffset, TextItem,
    };
    use image::Rgba;
    use popnote_image::ClipMode;

    const BG: Rgba<u8> = Rgba([237, 237, 237, 255]);
    const FG: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn text_item(format: &str, width: u32, clipping: ClipMode) -> Item {
        Item::new(ItemKind::Text(TextItem {
            format: format.into(),
            clipping,
            width,
            ..TextItem::default()
        }))
        .at(Anchor::Center, ItemOffset::default(), ItemOffset::default())
    }

    fn info_event(title: &str, content: &str) -> EventInfo {
        EventInfo::new(Event::new("info", "Information"))
            .title(title)
            .content(content)
    }

    #[test]
    fn info_scenario_renders_centered_text() {
        let host = HeadlessHost::single_monitor();
        let theme = Theme::new("/nowhere/theme.xml");
        let mut template = NotificationTemplate::themed("info", 120, 140);
        template.push_item(text_item("%R: %r", 100, ClipMode::Truncate));
        let info = info_event("Hi", "there");

        let buffer = render_template(&template, &theme, &info, &host).unwrap();
        assert_eq!(buffer.dimensions(), (120, 140));

        let ctx = RenderContext::new(&theme, &info, &host);
        let ItemKind::Text(text) = &template.items[0].kind else {
            unreachable!()
        };
        assert_eq!(layout_for(&template, &ctx, text), "Hi: there");

        let (tw, th) = host.shaper().measure("Hi: there", &text::item_font(text));
        let (x, y) = ((120 - tw) / 2, (140 - th) / 2);
        assert_eq!(*buffer.get_pixel(0, 0), BG);
        assert_eq!(*buffer.get_pixel(x + 1, y + th / 2), FG);
        assert_eq!(*buffer.get_pixel(x + tw + 1, y + th / 2), BG);
    }

    fn layout_for(template: &NotificationTemplate, ctx: &RenderContext<'_>, text: &TextItem) -> String {
        text::layout_text(&template.items[0], text, ctx, template.width)
    }

    #[test]
    fn long_text_is_clipped_to_item_width() {
        let host = HeadlessHost::single_monitor();
        let theme = Theme::new("/nowhere/theme.xml");
        let info = info_event("A fairly long title", "and even more content");
        let ctx = RenderContext::new(&theme, &info, &host);
        let font = popnote_image::FontDesc::default();

        for clipping in [
            ClipMode::Truncate,
            ClipMode::EllipsisStart,
            ClipMode::EllipsisMiddle,
            ClipMode::EllipsisEnd,
        ] {
            let item = text_item("%R: %r", 100, clipping);
            let ItemKind::Text(text) = &item.kind else {
                unreachable!()
            };
            let clipped = text::layout_text(&item, text, &ctx, 120);
            assert!(host.shaper().measure(&clipped, &font).0 <= 100, "{clipping}");
            assert!(!clipped.is_empty());
        }
    }

    #[test]
    fn offset_counts_only_without_fixed_width() {
        let host = HeadlessHost::single_monitor();
        let theme = Theme::new("/nowhere/theme.xml");
        let info = info_event("0123456789", "0123456789");
        let ctx = RenderContext::new(&theme, &info, &host);
        let font = popnote_image::FontDesc::default();
        let (advance, _) = host.shaper().measure("x", &font);

        let mut item = text_item("%r", 0, ClipMode::Truncate);
        item.h_offset = ItemOffset::pixels(-(advance as i32) * 4);
        let ItemKind::Text(text) = item.kind.clone() else {
            unreachable!()
        };
        let free = text::layout_text(&item, &text, &ctx, advance * 10);
        assert_eq!(free.chars().count(), 6);

        let fixed = TextItem {
            width: advance * 10,
            ..text
        };
        assert_eq!(text::layout_text(&item, &fixed, &ctx, advance * 10), "0123456789");
    }

    #[test]
    fn text_colour_overrides_foreground() {
        let host = HeadlessHost::single_monitor();
        let theme = Theme::new("/nowhere/theme.xml");
        let mut template = NotificationTemplate::themed("info", 64, 32);
        let mut item = text_item("%R", 0, ClipMode::Truncate);
        if let ItemKind::Text(text) = &mut item.kind {
            text.color = Some("#ff0000".into());
        }
        item.anchor = Anchor::NorthWest;
        template.push_item(item);
        let info = info_event("W", "");

        let buffer = render_template(&template, &theme, &info, &host).unwrap();
        assert_eq!(*buffer.get_pixel(1, 8), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn missing_background_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let host = HeadlessHost::single_monitor();
        let theme = Theme::new(dir.path().join("theme.xml"));
        let template = NotificationTemplate::with_image_background("info", "missing.png");
        let info = info_event("a", "b");
        assert!(matches!(
            render_template(&template, &theme, &info, &host),
            Err(RenderError::Background { .. })
        ));
    }

    #[test]
    fn background_image_sets_buffer_size_and_items_composite() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(50, 30, Rgba([0, 0, 255, 255]))
            .save(dir.path().join("bg.png"))
            .unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]))
            .save(dir.path().join("dot.png"))
            .unwrap();
        RgbaImage::from_pixel(16, 16, Rgba([255, 255, 0, 255]))
            .save(dir.path().join("info.png"))
            .unwrap();

        let host = HeadlessHost::single_monitor();
        let theme = Theme::new(dir.path().join("theme.xml"));
        let mut template = NotificationTemplate::with_image_background("info", "bg.png");
        template.push_item(
            Item::new(ItemKind::Image(ImageItem {
                filename: "dot.png".into(),
            }))
            .at(Anchor::SouthEast, ItemOffset::default(), ItemOffset::default()),
        );
        template.push_item(
            Item::new(ItemKind::Image(ImageItem {
                filename: "absent.png".into(),
            }))
            .at(Anchor::Center, ItemOffset::default(), ItemOffset::default()),
        );
        template.push_item(
            Item::new(ItemKind::Icon(IconItem {
                size: IconSize::Tiny,
                source: IconSource::System,
            }))
            .at(Anchor::NorthWest, ItemOffset::default(), ItemOffset::default()),
        );
        let info = info_event("a", "b");

        let buffer = render_template(&template, &theme, &info, &host).unwrap();
        assert_eq!(buffer.dimensions(), (50, 30));
        assert_eq!(*buffer.get_pixel(49, 29), Rgba([0, 255, 0, 255]));
        assert_eq!(*buffer.get_pixel(25, 15), Rgba([0, 0, 255, 255]));
        assert_eq!(*buffer.get_pixel(8, 8), Rgba([255, 255, 0, 255]));
        assert_eq!(*buffer.get_pixel(20, 20), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn themed_background_tiles_host_pixmap() {
        let mut pixmap = RgbaImage::from_pixel(2, 1, Rgba([10, 10, 10, 255]));
        pixmap.put_pixel(1, 0, Rgba([20, 20, 20, 255]));
        let host = HeadlessHost::single_monitor().with_style(HostStyle {
            background_pixmap: Some(pixmap),
            ..HostStyle::default()
        });
        let theme = Theme::new("/nowhere/theme.xml");
        let template = NotificationTemplate::themed("info", 16, 16);
        let info = info_event("a", "b");
        let buffer = render_template(&template, &theme, &info, &host).unwrap();
        assert_eq!(*buffer.get_pixel(4, 7), Rgba([10, 10, 10, 255]));
        assert_eq!(*buffer.get_pixel(5, 7), Rgba([20, 20, 20, 255]));
    }
}
