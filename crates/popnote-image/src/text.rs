//! Text shaping into coverage bitmaps.
//!
//! A [`TextShaper`] turns a string and a [`FontDesc`] into an 8-bit coverage
//! bitmap; [`tint`] turns that coverage into an RGBA image.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::debug;

use crate::ImageError;
use crate::compose::reduce_alpha;

/// Default font size in points.
pub const DEFAULT_FONT_POINTS: f32 = 10.0;

/// Font description in the usual "Family [Style...] Size" form.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDesc {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    pub points: f32,
}

impl Default for FontDesc {
    fn default() -> Self {
        Self {
            family: "Sans".into(),
            bold: false,
            italic: false,
            points: DEFAULT_FONT_POINTS,
        }
    }
}

impl FontDesc {
    /// Parse a description such as `"Sans Bold 12"`.
    ///
    /// A trailing number is the size; `Bold`/`Italic`/`Oblique` words set
    /// the style. Everything else forms the family name.
    pub fn parse(desc: &str) -> Self {
        let mut font = FontDesc::default();
        let mut family = Vec::new();
        let mut words: Vec<&str> = desc.split_whitespace().collect();

        if let Some(size) = words.last().and_then(|w| w.parse::<f32>().ok()) {
            if size > 0.0 {
                font.points = size;
            }
            words.pop();
        }

        for word in words {
            match word.to_ascii_lowercase().as_str() {
                "bold" => font.bold = true,
                "italic" | "oblique" => font.italic = true,
                _ => family.push(word),
            }
        }
        if !family.is_empty() {
            font.family = family.join(" ");
        }
        font
    }

    /// Pixel size at 96 DPI.
    pub fn pixel_size(&self) -> f32 {
        self.points * 96.0 / 72.0
    }
}

/// Turns text into coverage bitmaps.
pub trait TextShaper {
    /// Pixel (width, height) the text would occupy.
    fn measure(&self, text: &str, font: &FontDesc) -> (u32, u32);

    /// Coverage bitmap of the text, sized as [`TextShaper::measure`] reports.
    fn rasterize(&self, text: &str, font: &FontDesc) -> GrayImage;
}

/// [`TextShaper`] backed by a single TrueType/OpenType face.
///
/// The face is used for every family; only the size of the description is
/// honoured.
pub struct GlyphShaper {
    font: FontVec,
}

impl GlyphShaper {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        let font = FontVec::try_from_vec(data).map_err(|e| ImageError::InvalidFont(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = data.len(), "Loading font");
        Self::from_bytes(data)
    }

    fn scale(font: &FontDesc) -> PxScale {
        PxScale::from(font.pixel_size())
    }
}

impl TextShaper for GlyphShaper {
    fn measure(&self, text: &str, font: &FontDesc) -> (u32, u32) {
        let scale = Self::scale(font);
        (
            measure_text_width(&self.font, scale, text),
            line_height(&self.font, scale),
        )
    }

    fn rasterize(&self, text: &str, font: &FontDesc) -> GrayImage {
        let (width, height) = self.measure(text, font);
        let mut coverage = GrayImage::new(width, height);
        if width > 0 && height > 0 {
            draw_text_mut(
                &mut coverage,
                Luma([255]),
                0,
                0,
                Self::scale(font),
                &self.font,
                text,
            );
        }
        coverage
    }
}

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width(font: &impl Font, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil().max(0.0) as u32
}

/// Compute the line height for the given font and scale.
pub fn line_height(font: &impl Font, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent() + scaled.line_gap()).ceil() as u32
}

/// Colour a coverage bitmap.
///
/// Every pixel takes `color`'s RGB; alpha is the coverage value scaled by
/// `color`'s own alpha. `translucent` halves the result.
pub fn tint(coverage: &GrayImage, color: Rgba<u8>, translucent: bool) -> RgbaImage {
    let mut out = RgbaImage::from_fn(coverage.width(), coverage.height(), |x, y| {
        let cov = coverage.get_pixel(x, y)[0] as u32;
        let alpha = (cov * color[3] as u32 + 127) / 255;
        Rgba([color[0], color[1], color[2], alpha as u8])
    });
    if translucent {
        reduce_alpha(&mut out, 0.5);
    }
    out
}
