//! Positioned elements of a notification template.

use std::fmt;
use std::str::FromStr;

use popnote_image::ClipMode;

/// Compass position an item is anchored to inside the popup image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    NorthWest,
    North,
    NorthEast,
    West,
    #[default]
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::NorthWest,
        Anchor::North,
        Anchor::NorthEast,
        Anchor::West,
        Anchor::Center,
        Anchor::East,
        Anchor::SouthWest,
        Anchor::South,
        Anchor::SouthEast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::NorthWest => "nw",
            Anchor::North => "n",
            Anchor::NorthEast => "ne",
            Anchor::West => "w",
            Anchor::Center => "c",
            Anchor::East => "e",
            Anchor::SouthWest => "sw",
            Anchor::South => "s",
            Anchor::SouthEast => "se",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown position '{s}'"))
    }
}

/// Signed offset, absolute or relative to the popup image's extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ItemOffset {
    pub value: i32,
    pub percentage: bool,
}

impl ItemOffset {
    pub const fn pixels(value: i32) -> Self {
        Self {
            value,
            percentage: false,
        }
    }

    pub const fn percent(value: i32) -> Self {
        Self {
            value,
            percentage: true,
        }
    }

    /// Offset in pixels against an image extent of `extent`.
    pub fn resolve(&self, extent: u32) -> i32 {
        if !self.percentage {
            return self.value;
        }
        (f64::from(extent) * f64::from(self.value) / 100.0).round() as i32
    }
}

impl fmt::Display for ItemOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.percentage {
            write!(f, "{}%", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl FromStr for ItemOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, percentage) = match s.strip_suffix('%') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let value = digits
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid offset '{s}'"))?;
        Ok(Self { value, percentage })
    }
}

/// Discrete icon size classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IconSize {
    Tiny,
    Small,
    Little,
    #[default]
    Normal,
    Big,
    Large,
    Huge,
}

impl IconSize {
    pub const ALL: [IconSize; 7] = [
        IconSize::Tiny,
        IconSize::Small,
        IconSize::Little,
        IconSize::Normal,
        IconSize::Big,
        IconSize::Large,
        IconSize::Huge,
    ];

    pub fn pixels(self) -> u32 {
        match self {
            IconSize::Tiny => 16,
            IconSize::Small => 24,
            IconSize::Little => 32,
            IconSize::Normal => 48,
            IconSize::Big => 64,
            IconSize::Large => 96,
            IconSize::Huge => 144,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IconSize::Tiny => "tiny",
            IconSize::Small => "small",
            IconSize::Little => "little",
            IconSize::Normal => "normal",
            IconSize::Big => "big",
            IconSize::Large => "large",
            IconSize::Huge => "huge",
        }
    }
}

impl FromStr for IconSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IconSize::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| format!("unknown icon size '{s}'"))
    }
}

/// Where an icon item gets its picture from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IconSource {
    /// `<notification type>.png` in the theme directory.
    #[default]
    Theme,
    /// The host's stock icon, falling back to the theme file.
    System,
}

impl IconSource {
    pub fn as_str(self) -> &'static str {
        match self {
            IconSource::Theme => "theme",
            IconSource::System => "system",
        }
    }
}

impl FromStr for IconSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "theme" => Ok(IconSource::Theme),
            "system" => Ok(IconSource::System),
            other => Err(format!("unknown icon type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconItem {
    pub size: IconSize,
    pub source: IconSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageItem {
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextItem {
    pub format: String,
    pub font: Option<String>,
    pub color: Option<String>,
    pub clipping: ClipMode,
    /// Fixed clipping width in pixels; 0 means "the popup image width".
    pub width: u32,
}

/// Type-specific payload of an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Icon(IconItem),
    Image(ImageItem),
    Text(TextItem),
}

impl ItemKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::Icon(_) => "icon",
            ItemKind::Image(_) => "image",
            ItemKind::Text(_) => "text",
        }
    }
}

/// A positioned element of a notification template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub anchor: Anchor,
    pub h_offset: ItemOffset,
    pub v_offset: ItemOffset,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            anchor: Anchor::default(),
            h_offset: ItemOffset::default(),
            v_offset: ItemOffset::default(),
            kind,
        }
    }

    pub fn at(mut self, anchor: Anchor, h_offset: ItemOffset, v_offset: ItemOffset) -> Self {
        self.anchor = anchor;
        self.h_offset = h_offset;
        self.v_offset = v_offset;
        self
    }

    /// Top-left corner for a `width` x `height` rendering of this item inside
    /// an `image_width` x `image_height` popup.
    pub fn render_position(
        &self,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    ) -> (i32, i32) {
        get_render_position(
            width,
            height,
            image_width,
            image_height,
            self.anchor,
            self.h_offset,
            self.v_offset,
        )
    }
}

/// Resolve an anchor plus offsets into a top-left position.
pub fn get_render_position(
    width: u32,
    height: u32,
    image_width: u32,
    image_height: u32,
    anchor: Anchor,
    h_offset: ItemOffset,
    v_offset: ItemOffset,
) -> (i32, i32) {
    let (w, h) = (width as i32, height as i32);
    let (img_w, img_h) = (image_width as i32, image_height as i32);
    let h_off = h_offset.resolve(image_width);
    let v_off = v_offset.resolve(image_height);

    let north = v_off;
    let south = img_h - h + v_off;
    let center_y = (img_h - h) / 2 + v_off;
    let west = h_off;
    let east = img_w - w + h_off;
    let center_x = (img_w - w) / 2 + h_off;

    match anchor {
        Anchor::NorthWest => (west, north),
        Anchor::North => (center_x, north),
        Anchor::NorthEast => (east, north),
        Anchor::West => (west, center_y),
        Anchor::Center => (center_x, center_y),
        Anchor::East => (east, center_y),
        Anchor::SouthWest => (west, south),
        Anchor::South => (center_x, south),
        Anchor::SouthEast => (east, south),
    }
}
