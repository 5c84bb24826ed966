//! The seam between the atlas builder and whatever turns font files into pixels.
//!
//! The builder only needs a handful of queries: vertical metrics, codepoint to
//! glyph lookup, the integer bitmap box of a glyph and a way to draw that bitmap
//! into the atlas. A [`FontRasterizer`] opens font bytes into a [`FontFace`]
//! answering them. The built-in bitmap face lives in this crate; outline fonts are
//! handled by an external implementation (see the `anchor-text` crate).

use crate::error::AtlasError;

/// Vertical metrics in pixels for a given size. `descent` is negative.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

/// Integer bitmap bounds of a glyph relative to its pen position (y down).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl GlyphBox {
    pub fn width(&self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Horizontal and vertical oversampling factors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Oversample {
    pub h: u32,
    pub v: u32,
}

impl Oversample {
    pub const NONE: Self = Self { h: 1, v: 1 };

    pub const fn new(h: u32, v: u32) -> Self {
        Self { h, v }
    }
}

/// Destination for one glyph: a window into the 8-bit atlas.
pub struct GlyphTarget<'a> {
    /// Starts at the top-left pixel of the window.
    pub pixels: &'a mut [u8],
    /// Bytes between rows of `pixels`.
    pub stride: usize,
    pub width: usize,
    pub height: usize,
}

impl GlyphTarget<'_> {
    #[inline]
    pub fn put(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.stride + x] = value;
        }
    }
}

/// Opens font data into faces.
pub trait FontRasterizer: Send + Sync {
    fn name(&self) -> &str;

    /// Open face number `font_no` of `data` (collections hold several).
    fn open<'a>(&self, data: &'a [u8], font_no: u32) -> Result<Box<dyn FontFace + 'a>, AtlasError>;
}

/// One opened face. Sizes are pixel heights (ascent minus descent).
pub trait FontFace {
    fn v_metrics(&self, size_px: f32) -> VMetrics;

    /// Glyph for a codepoint, `None` when the face lacks it.
    fn glyph_index(&self, codepoint: u32) -> Option<u32>;

    fn advance(&self, glyph: u32, size_px: f32) -> f32;

    /// Bitmap box at `size_px` scaled by the oversampling factors.
    fn bitmap_box(&mut self, glyph: u32, size_px: f32, oversample: Oversample) -> GlyphBox;

    /// Draw the glyph's bitmap (as sized by [`FontFace::bitmap_box`]) into `target`.
    fn render(&mut self, glyph: u32, size_px: f32, oversample: Oversample, target: GlyphTarget<'_>);
}
