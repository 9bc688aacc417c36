//! `theme.xml` reading and writing.
//!
//! Layout:
//!
//! ```xml
//! <popnote>
//!   <theme api="1">
//!     <info><name>Sunny</name>...</info>
//!     <options><time_format>%X</time_format>...</options>
//!     <notification type="info" use_default_bg="true" width="120" height="140">
//!       <item type="text">
//!         <position value="c"/>
//!         <h_offset value="0"/>
//!         <v_offset value="10%"/>
//!         <text format="%R: %r" clipping="truncate" width="100"/>
//!       </item>
//!     </notification>
//!   </theme>
//! </popnote>
//! ```

use std::str::FromStr;

use popnote_image::ClipMode;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::item::{IconItem, ImageItem, Item, ItemKind, ItemOffset, TextItem};
use super::template::{Background, NotificationTemplate};
use super::{THEME_API_VERSION, Theme, ThemeError, ThemeInfo, ThemeOptions};

const ROOT: &str = "popnote";

/// Minimal element tree built from the reader's event stream.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ThemeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            ..Self::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required_attr(&self, key: &str) -> Result<&str, ThemeError> {
        self.attr(key)
            .ok_or_else(|| ThemeError::Missing(format!("{}@{key}", self.name)))
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.trim().to_string())
    }

    /// Text of a child element exactly as written, surrounding whitespace
    /// included.
    fn child_raw_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }
}

fn parse_tree(source: &str) -> Result<Element, ThemeError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => stack.push(Element::from_start(e)?),
            Event::Empty(ref e) => {
                let element = Element::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(ThemeError::Xml("unbalanced end tag".into()));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(ref e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ThemeError::Xml("unexpected end of document".into()));
    }
    root.ok_or_else(|| ThemeError::Missing(ROOT.into()))
}

fn parse_value<T>(field: &str, value: &str) -> Result<T, ThemeError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ThemeError::InvalidValue {
        field: field.to_string(),
        message: e.to_string(),
    })
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ThemeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(ThemeError::InvalidValue {
            field: field.to_string(),
            message: format!("'{other}' is not a boolean"),
        }),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse and validate a theme document. The returned theme has no path yet.
pub fn parse_theme(source: &str) -> Result<Theme, ThemeError> {
    let root = parse_tree(source)?;
    let theme_el = if root.name == "theme" {
        &root
    } else if root.name == ROOT {
        root.child("theme")
            .ok_or_else(|| ThemeError::Missing("theme".into()))?
    } else {
        return Err(ThemeError::Missing(ROOT.into()));
    };

    let api = theme_el.required_attr("api")?;
    if api.trim().parse::<u32>().ok() != Some(THEME_API_VERSION) {
        return Err(ThemeError::ApiMismatch {
            found: api.to_string(),
            expected: THEME_API_VERSION,
        });
    }

    let mut theme = Theme::new("");
    if let Some(info) = theme_el.child("info") {
        theme.info = parse_info(info);
    }
    if let Some(options) = theme_el.child("options") {
        theme.options = parse_options(options);
    }
    for notification in theme_el.children_named("notification") {
        theme.templates.push(parse_notification(notification)?);
    }
    theme.validate()?;
    Ok(theme)
}

fn parse_info(el: &Element) -> ThemeInfo {
    let field = |name: &str| el.child_text(name).unwrap_or_default();
    ThemeInfo {
        name: field("name"),
        version: field("version"),
        summary: field("summary"),
        description: field("description"),
        author: field("author"),
        website: field("website"),
    }
}

fn parse_options(el: &Element) -> ThemeOptions {
    let defaults = ThemeOptions::default();
    let field = |name: &str, fallback: String| {
        el.child_raw_text(name).map(str::to_string).unwrap_or(fallback)
    };
    ThemeOptions {
        time_format: field("time_format", defaults.time_format),
        date_format: field("date_format", defaults.date_format),
        warning: field("warning", defaults.warning),
        ellipsis: field("ellipsis", defaults.ellipsis),
    }
}

fn parse_notification(el: &Element) -> Result<NotificationTemplate, ThemeError> {
    let kind = el.required_attr("type")?.trim().to_string();
    let use_default_bg = match el.attr("use_default_bg") {
        Some(v) => parse_bool("notification@use_default_bg", v)?,
        None => el.attr("background").is_none(),
    };
    let width = match el.attr("width") {
        Some(v) => parse_value::<u32>("notification@width", v)?,
        None => 0,
    };
    let height = match el.attr("height") {
        Some(v) => parse_value::<u32>("notification@height", v)?,
        None => 0,
    };
    let background = if use_default_bg {
        Background::Themed
    } else {
        Background::Image(el.required_attr("background")?.trim().to_string())
    };

    let mut items = Vec::new();
    for item in el.children_named("item") {
        items.push(parse_item(item)?);
    }

    let template = NotificationTemplate {
        kind,
        background,
        width,
        height,
        alias: non_empty(el.attr("alias")),
        items,
    };
    template.validate()?;
    Ok(template)
}

fn parse_item(el: &Element) -> Result<Item, ThemeError> {
    let declared = el.required_attr("type")?.trim();

    let payloads: Vec<&Element> = el
        .children
        .iter()
        .filter(|c| matches!(c.name.as_str(), "icon" | "image" | "text"))
        .collect();
    let [payload] = payloads.as_slice() else {
        return Err(ThemeError::InvalidTemplate(format!(
            "item must contain exactly one icon, image or text element (found {})",
            payloads.len()
        )));
    };
    if payload.name != declared {
        return Err(ThemeError::InvalidTemplate(format!(
            "item declared as '{declared}' contains '{}'",
            payload.name
        )));
    }

    let kind = match payload.name.as_str() {
        "icon" => ItemKind::Icon(IconItem {
            size: match payload.attr("size") {
                Some(v) => parse_value("icon@size", v)?,
                None => Default::default(),
            },
            source: match payload.attr("type") {
                Some(v) => parse_value("icon@type", v)?,
                None => Default::default(),
            },
        }),
        "image" => ItemKind::Image(ImageItem {
            filename: payload.required_attr("filename")?.trim().to_string(),
        }),
        _ => ItemKind::Text(TextItem {
            format: payload.attr("format").unwrap_or_default().to_string(),
            font: non_empty(payload.attr("font")),
            color: non_empty(payload.attr("color")),
            clipping: match payload.attr("clipping") {
                Some(v) => parse_value::<ClipMode>("text@clipping", v)?,
                None => ClipMode::default(),
            },
            width: match payload.attr("width") {
                Some(v) => parse_value("text@width", v)?,
                None => 0,
            },
        }),
    };

    let position = el
        .child("position")
        .ok_or_else(|| ThemeError::Missing("item/position".into()))?;
    let anchor = parse_value("position@value", position.required_attr("value")?)?;
    let offset = |name: &str| -> Result<ItemOffset, ThemeError> {
        match el.child(name) {
            Some(off) => parse_value(&format!("{name}@value"), off.required_attr("value")?),
            None => Ok(ItemOffset::default()),
        }
    };

    Ok(Item {
        anchor,
        h_offset: offset("h_offset")?,
        v_offset: offset("v_offset")?,
        kind,
    })
}

/// Serialize a theme into the `theme.xml` layout.
pub fn write_theme(theme: &Theme) -> Result<Vec<u8>, ThemeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

    let api = THEME_API_VERSION.to_string();
    let mut theme_start = BytesStart::new("theme");
    theme_start.push_attribute(("api", api.as_str()));
    writer.write_event(Event::Start(theme_start))?;

    let info = &theme.info;
    write_section(
        &mut writer,
        "info",
        &[
            ("name", &info.name),
            ("version", &info.version),
            ("summary", &info.summary),
            ("description", &info.description),
            ("author", &info.author),
            ("website", &info.website),
        ],
    )?;
    let options = &theme.options;
    write_section(
        &mut writer,
        "options",
        &[
            ("time_format", &options.time_format),
            ("date_format", &options.date_format),
            ("warning", &options.warning),
            ("ellipsis", &options.ellipsis),
        ],
    )?;

    for template in &theme.templates {
        write_notification(&mut writer, template)?;
    }

    writer.write_event(Event::End(BytesEnd::new("theme")))?;
    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;

    let mut data = writer.into_inner();
    data.push(b'\n');
    Ok(data)
}

fn write_section(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    fields: &[(&str, &String)],
) -> Result<(), ThemeError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    for (field, value) in fields {
        writer.write_event(Event::Start(BytesStart::new(*field)))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new(*field)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_notification(
    writer: &mut Writer<Vec<u8>>,
    template: &NotificationTemplate,
) -> Result<(), ThemeError> {
    let width = template.width.to_string();
    let height = template.height.to_string();
    let mut start = BytesStart::new("notification");
    start.push_attribute(("type", template.kind.as_str()));
    match &template.background {
        Background::Themed => start.push_attribute(("use_default_bg", "true")),
        Background::Image(filename) => {
            start.push_attribute(("use_default_bg", "false"));
            start.push_attribute(("background", filename.as_str()));
        }
    }
    start.push_attribute(("width", width.as_str()));
    start.push_attribute(("height", height.as_str()));
    if let Some(alias) = &template.alias {
        start.push_attribute(("alias", alias.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    for item in &template.items {
        write_item(writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("notification")))?;
    Ok(())
}

fn write_item(writer: &mut Writer<Vec<u8>>, item: &Item) -> Result<(), ThemeError> {
    let mut start = BytesStart::new("item");
    start.push_attribute(("type", item.kind.type_name()));
    writer.write_event(Event::Start(start))?;

    let values = [
        ("position", item.anchor.to_string()),
        ("h_offset", item.h_offset.to_string()),
        ("v_offset", item.v_offset.to_string()),
    ];
    for (name, value) in &values {
        let mut el = BytesStart::new(*name);
        el.push_attribute(("value", value.as_str()));
        writer.write_event(Event::Empty(el))?;
    }

    let mut payload = BytesStart::new(item.kind.type_name());
    match &item.kind {
        ItemKind::Icon(icon) => {
            payload.push_attribute(("type", icon.source.as_str()));
            payload.push_attribute(("size", icon.size.as_str()));
        }
        ItemKind::Image(image) => {
            payload.push_attribute(("filename", image.filename.as_str()));
        }
        ItemKind::Text(text) => {
            let width = text.width.to_string();
            payload.push_attribute(("format", text.format.as_str()));
            if let Some(font) = &text.font {
                payload.push_attribute(("font", font.as_str()));
            }
            if let Some(color) = &text.color {
                payload.push_attribute(("color", color.as_str()));
            }
            payload.push_attribute(("clipping", text.clipping.as_str()));
            payload.push_attribute(("width", width.as_str()));
        }
    }
    writer.write_event(Event::Empty(payload))?;

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}
