//! Tiny built-in bitmap font, used when no font file is supplied.
//!
//! Monospaced 5x7 glyphs in a 7x13 cell covering printable ASCII plus the
//! horizontal ellipsis. Larger sizes scale the bitmap with nearest sampling.

use crate::error::AtlasError;
use crate::font_rasterizer::{FontFace, FontRasterizer, GlyphBox, GlyphTarget, Oversample, VMetrics};

/// Native pixel height of the face.
pub const BUILTIN_FONT_SIZE: f32 = 13.0;
pub const BUILTIN_FONT_NAME: &str = "Anchor Mono, 13px";

const CELL_ADVANCE: f32 = 7.0;
const ASCENT: f32 = 10.0;
const DESCENT: f32 = -3.0;
const GLYPH_W: i32 = 5;
const GLYPH_H: i32 = 7;
/// Left bearing of the 5x7 box inside the cell.
const GLYPH_X: i32 = 1;
const FIRST: u32 = 0x20;
const LAST: u32 = 0x7e;
const ELLIPSIS: u32 = 0x2026;

/// Columns left to right, bit 0 is the top row.
#[rustfmt::skip]
const GLYPHS: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5f, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00],
    [0x14, 0x7f, 0x14, 0x7f, 0x14], [0x24, 0x2a, 0x7f, 0x2a, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62],
    [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00], [0x00, 0x1c, 0x22, 0x41, 0x00],
    [0x00, 0x41, 0x22, 0x1c, 0x00], [0x08, 0x2a, 0x1c, 0x2a, 0x08], [0x08, 0x08, 0x3e, 0x08, 0x08],
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00],
    [0x20, 0x10, 0x08, 0x04, 0x02], [0x3e, 0x51, 0x49, 0x45, 0x3e], [0x00, 0x42, 0x7f, 0x40, 0x00],
    [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4b, 0x31], [0x18, 0x14, 0x12, 0x7f, 0x10],
    [0x27, 0x45, 0x45, 0x45, 0x39], [0x3c, 0x4a, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03],
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1e], [0x00, 0x36, 0x36, 0x00, 0x00],
    [0x00, 0x56, 0x36, 0x00, 0x00], [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14],
    [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06], [0x32, 0x49, 0x79, 0x41, 0x3e],
    [0x7e, 0x11, 0x11, 0x11, 0x7e], [0x7f, 0x49, 0x49, 0x49, 0x36], [0x3e, 0x41, 0x41, 0x41, 0x22],
    [0x7f, 0x41, 0x41, 0x22, 0x1c], [0x7f, 0x49, 0x49, 0x49, 0x41], [0x7f, 0x09, 0x09, 0x01, 0x01],
    [0x3e, 0x41, 0x41, 0x51, 0x32], [0x7f, 0x08, 0x08, 0x08, 0x7f], [0x00, 0x41, 0x7f, 0x41, 0x00],
    [0x20, 0x40, 0x41, 0x3f, 0x01], [0x7f, 0x08, 0x14, 0x22, 0x41], [0x7f, 0x40, 0x40, 0x40, 0x40],
    [0x7f, 0x02, 0x04, 0x02, 0x7f], [0x7f, 0x04, 0x08, 0x10, 0x7f], [0x3e, 0x41, 0x41, 0x41, 0x3e],
    [0x7f, 0x09, 0x09, 0x09, 0x06], [0x3e, 0x41, 0x51, 0x21, 0x5e], [0x7f, 0x09, 0x19, 0x29, 0x46],
    [0x46, 0x49, 0x49, 0x49, 0x31], [0x01, 0x01, 0x7f, 0x01, 0x01], [0x3f, 0x40, 0x40, 0x40, 0x3f],
    [0x1f, 0x20, 0x40, 0x20, 0x1f], [0x7f, 0x20, 0x18, 0x20, 0x7f], [0x63, 0x14, 0x08, 0x14, 0x63],
    [0x03, 0x04, 0x78, 0x04, 0x03], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x00, 0x7f, 0x41, 0x41],
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x41, 0x41, 0x7f, 0x00, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04],
    [0x40, 0x40, 0x40, 0x40, 0x40], [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78],
    [0x7f, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20], [0x38, 0x44, 0x44, 0x48, 0x7f],
    [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7e, 0x09, 0x01, 0x02], [0x08, 0x14, 0x54, 0x54, 0x3c],
    [0x7f, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7d, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3d, 0x00],
    [0x00, 0x7f, 0x10, 0x28, 0x44], [0x00, 0x41, 0x7f, 0x40, 0x00], [0x7c, 0x04, 0x18, 0x04, 0x78],
    [0x7c, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38], [0x7c, 0x14, 0x14, 0x14, 0x08],
    [0x08, 0x14, 0x14, 0x18, 0x7c], [0x7c, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20],
    [0x04, 0x3f, 0x44, 0x40, 0x20], [0x3c, 0x40, 0x40, 0x20, 0x7c], [0x1c, 0x20, 0x40, 0x20, 0x1c],
    [0x3c, 0x40, 0x30, 0x40, 0x3c], [0x44, 0x28, 0x10, 0x28, 0x44], [0x0c, 0x50, 0x50, 0x50, 0x3c],
    [0x44, 0x64, 0x54, 0x4c, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00], [0x00, 0x00, 0x7f, 0x00, 0x00],
    [0x00, 0x41, 0x36, 0x08, 0x00], [0x08, 0x04, 0x08, 0x10, 0x08],
    // U+2026
    [0x40, 0x00, 0x40, 0x00, 0x40],
];

fn glyph_columns(glyph: u32) -> Option<&'static [u8; 5]> {
    GLYPHS.get(glyph.checked_sub(1)? as usize)
}

fn is_blank(glyph: u32) -> bool {
    glyph_columns(glyph).map_or(true, |cols| cols.iter().all(|&c| c == 0))
}

/// Rasterizer for [`crate::FontData::Builtin`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinRasterizer;

impl FontRasterizer for BuiltinRasterizer {
    fn name(&self) -> &str {
        "builtin"
    }

    fn open<'a>(&self, _data: &'a [u8], font_no: u32) -> Result<Box<dyn FontFace + 'a>, AtlasError> {
        if font_no != 0 {
            return Err(AtlasError::InvalidFontData {
                name: BUILTIN_FONT_NAME.to_string(),
                reason: format!("built-in font has a single face, asked for #{font_no}"),
            });
        }
        Ok(Box::new(BuiltinFace))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinFace;

impl BuiltinFace {
    fn pixel_scale(size_px: f32, oversample: Oversample) -> (f32, f32) {
        let s = size_px / BUILTIN_FONT_SIZE;
        (s * oversample.h as f32, s * oversample.v as f32)
    }
}

impl FontFace for BuiltinFace {
    fn v_metrics(&self, size_px: f32) -> VMetrics {
        let s = size_px / BUILTIN_FONT_SIZE;
        VMetrics {
            ascent: ASCENT * s,
            descent: DESCENT * s,
            line_gap: 0.0,
        }
    }

    fn glyph_index(&self, codepoint: u32) -> Option<u32> {
        match codepoint {
            FIRST..=LAST => Some(codepoint - FIRST + 1),
            ELLIPSIS => Some(GLYPHS.len() as u32),
            _ => None,
        }
    }

    fn advance(&self, _glyph: u32, size_px: f32) -> f32 {
        CELL_ADVANCE * size_px / BUILTIN_FONT_SIZE
    }

    fn bitmap_box(&mut self, glyph: u32, size_px: f32, oversample: Oversample) -> GlyphBox {
        if is_blank(glyph) {
            return GlyphBox::default();
        }
        let (sx, sy) = Self::pixel_scale(size_px, oversample);
        GlyphBox {
            x0: (GLYPH_X as f32 * sx).floor() as i32,
            y0: (-GLYPH_H as f32 * sy).floor() as i32,
            x1: ((GLYPH_X + GLYPH_W) as f32 * sx).ceil() as i32,
            y1: 0,
        }
    }

    fn render(&mut self, glyph: u32, size_px: f32, oversample: Oversample, mut target: GlyphTarget<'_>) {
        let Some(cols) = glyph_columns(glyph) else {
            return;
        };
        let bbox = self.bitmap_box(glyph, size_px, oversample);
        let (sx, sy) = Self::pixel_scale(size_px, oversample);
        for py in 0..bbox.height() as usize {
            let gy = (((bbox.y0 + py as i32) as f32 + 0.5) / sy).floor() as i32 + GLYPH_H;
            if !(0..GLYPH_H).contains(&gy) {
                continue;
            }
            for px in 0..bbox.width() as usize {
                let gx = (((bbox.x0 + px as i32) as f32 + 0.5) / sx).floor() as i32 - GLYPH_X;
                if !(0..GLYPH_W).contains(&gx) {
                    continue;
                }
                if cols[gx as usize] & (1 << gy) != 0 {
                    target.put(px, py, 0xff);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_vec(face: &mut BuiltinFace, ch: char, size: f32) -> (GlyphBox, Vec<u8>) {
        let g = face.glyph_index(ch as u32).unwrap();
        let bbox = face.bitmap_box(g, size, Oversample::NONE);
        let (w, h) = (bbox.width() as usize, bbox.height() as usize);
        let mut pixels = vec![0u8; w * h];
        face.render(
            g,
            size,
            Oversample::NONE,
            GlyphTarget {
                pixels: &mut pixels,
                stride: w,
                width: w,
                height: h,
            },
        );
        (bbox, pixels)
    }

    #[test]
    fn test_covers_printable_ascii() {
        let face = BuiltinFace;
        for c in 0x20..=0x7e {
            assert!(face.glyph_index(c).is_some(), "missing {c:#x}");
        }
        assert!(face.glyph_index(0x2026).is_some());
        assert!(face.glyph_index(0x1f).is_none());
        assert!(face.glyph_index(0xe9).is_none());
    }

    #[test]
    fn test_space_is_blank() {
        let mut face = BuiltinFace;
        let g = face.glyph_index(' ' as u32).unwrap();
        assert!(face.bitmap_box(g, 13.0, Oversample::NONE).is_empty());
    }

    #[test]
    fn test_native_size_matches_table() {
        let mut face = BuiltinFace;
        let (bbox, pixels) = render_to_vec(&mut face, 'I', 13.0);
        assert_eq!((bbox.width(), bbox.height()), (5, 7));
        // 'I' is a vertical bar in the middle column with serifs top and bottom.
        let w = 5;
        for y in 0..7 {
            assert_eq!(pixels[y * w + 2], 0xff);
        }
        assert_eq!(pixels[3 * w], 0);
        assert_eq!(pixels[w + 1], 0);
    }

    #[test]
    fn test_scaled_glyph_doubles() {
        let mut face = BuiltinFace;
        let (bbox, pixels) = render_to_vec(&mut face, '|', 26.0);
        assert_eq!((bbox.width(), bbox.height()), (10, 14));
        let lit = pixels.iter().filter(|&&p| p == 0xff).count();
        assert_eq!(lit, 2 * 14);
        assert_eq!(face.advance(0, 26.0), 14.0);
        assert_eq!(face.v_metrics(26.0).ascent - face.v_metrics(26.0).descent, 26.0);
    }
}
