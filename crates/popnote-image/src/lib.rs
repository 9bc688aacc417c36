//! Pixel and text primitives for popup rendering.
//!
//! Provides alpha compositing, background tiling, cropping, colour
//! handling, font shaping into coverage bitmaps and text clipping.

pub mod clip;
pub mod compose;
pub mod text;

// Re-exports for convenience
pub use clip::{ClipMode, clip_text};
pub use compose::{alpha_mask, crop, fill, has_alpha, overlay, parse_color, reduce_alpha, tile};
pub use text::{FontDesc, GlyphShaper, TextShaper, tint};

/// Error type for image helpers that touch the filesystem.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid font file: {0}")]
    InvalidFont(String),
}
