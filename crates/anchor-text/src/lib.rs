//! TrueType/OpenType rasterization for the `anchor` font atlas.
//!
//! [`SwashRasterizer`] plugs into [`anchor::FontAtlas::set_rasterizer`] and handles
//! every non-built-in font source. Outlines are scaled and rendered with `swash`
//! straight into the atlas window the builder hands out.
//!
//! Sizes follow the atlas convention: a font "size" is the pixel distance from
//! ascender to descender, not the em size.

use anchor::{AtlasError, FontFace, FontRasterizer, GlyphBox, GlyphTarget, Oversample, VMetrics};
use swash::scale::image::{Content, Image};
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Format, Transform};
use swash::FontRef;

/// Outline fonts via `swash`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwashRasterizer;

impl SwashRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl FontRasterizer for SwashRasterizer {
    fn name(&self) -> &str {
        "swash"
    }

    fn open<'a>(&self, data: &'a [u8], font_no: u32) -> Result<Box<dyn FontFace + 'a>, AtlasError> {
        let font = FontRef::from_index(data, font_no as usize).ok_or_else(|| AtlasError::InvalidFontData {
            name: self.name().to_string(),
            reason: format!("no parsable face #{font_no} in {} bytes", data.len()),
        })?;
        let metrics = font.metrics(&[]);
        let height_units = metrics.ascent + metrics.descent;
        if metrics.units_per_em == 0 || height_units <= 0.0 {
            return Err(AtlasError::InvalidFontData {
                name: self.name().to_string(),
                reason: "face has no usable vertical metrics".to_string(),
            });
        }
        log::debug!(
            "opened face #{font_no}: {} units/em, {} glyphs",
            metrics.units_per_em,
            metrics.glyph_count
        );
        Ok(Box::new(SwashFace {
            font,
            units_per_em: metrics.units_per_em as f32,
            height_units,
            context: ScaleContext::new(),
            last: None,
        }))
    }
}

#[derive(Clone, Copy, PartialEq)]
struct RenderKey {
    glyph: u32,
    size_bits: u32,
    oversample: Oversample,
}

/// A parsed face borrowing the font bytes.
pub struct SwashFace<'a> {
    font: FontRef<'a>,
    units_per_em: f32,
    /// Ascender to descender, in font units.
    height_units: f32,
    context: ScaleContext,
    // The builder asks for a box and then renders the same glyph.
    last: Option<(RenderKey, Option<Image>)>,
}

impl SwashFace<'_> {
    /// Pixels per font unit for a size in atlas convention.
    fn scale(&self, size_px: f32) -> f32 {
        size_px / self.height_units
    }

    fn image(&mut self, glyph: u32, size_px: f32, oversample: Oversample) -> Option<&Image> {
        let key = RenderKey {
            glyph,
            size_bits: size_px.to_bits(),
            oversample,
        };
        if !matches!(&self.last, Some((k, _)) if *k == key) {
            let ppem = self.scale(size_px) * self.units_per_em;
            let mut scaler = self.context.builder(self.font).size(ppem).hint(false).build();
            let transform = (oversample != Oversample::NONE)
                .then(|| Transform::scale(oversample.h as f32, oversample.v as f32));
            let image = u16::try_from(glyph).ok().and_then(|id| {
                Render::new(&[Source::Outline])
                    .format(Format::Alpha)
                    .transform(transform)
                    .render(&mut scaler, id)
            });
            let image = image.filter(|img| matches!(img.content, Content::Mask));
            self.last = Some((key, image));
        }
        self.last.as_ref().and_then(|(_, image)| image.as_ref())
    }
}

impl FontFace for SwashFace<'_> {
    fn v_metrics(&self, size_px: f32) -> VMetrics {
        let metrics = self.font.metrics(&[]);
        let scale = self.scale(size_px);
        VMetrics {
            ascent: metrics.ascent * scale,
            descent: -metrics.descent * scale,
            line_gap: metrics.leading * scale,
        }
    }

    fn glyph_index(&self, codepoint: u32) -> Option<u32> {
        match self.font.charmap().map(codepoint) {
            0 => None,
            id => Some(u32::from(id)),
        }
    }

    fn advance(&self, glyph: u32, size_px: f32) -> f32 {
        let Ok(id) = u16::try_from(glyph) else {
            return 0.0;
        };
        self.font.glyph_metrics(&[]).advance_width(id) * self.scale(size_px)
    }

    fn bitmap_box(&mut self, glyph: u32, size_px: f32, oversample: Oversample) -> GlyphBox {
        match self.image(glyph, size_px, oversample) {
            Some(img) if img.placement.width > 0 && img.placement.height > 0 => {
                let p = img.placement;
                GlyphBox {
                    x0: p.left,
                    y0: -p.top,
                    x1: p.left + p.width as i32,
                    y1: -p.top + p.height as i32,
                }
            }
            _ => GlyphBox::default(),
        }
    }

    fn render(&mut self, glyph: u32, size_px: f32, oversample: Oversample, mut target: GlyphTarget<'_>) {
        let Some(img) = self.image(glyph, size_px, oversample) else {
            return;
        };
        let w = img.placement.width as usize;
        for (y, row) in img.data.chunks_exact(w.max(1)).enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value != 0 {
                    target.put(x, y, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor::{FontAtlas, FontConfig, FontData};
    use std::sync::Arc;

    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    fn system_font() -> Option<Vec<u8>> {
        let found = CANDIDATES.iter().find_map(|p| std::fs::read(p).ok());
        if found.is_none() {
            eprintln!("no system TTF found, skipping");
        }
        found
    }

    #[test]
    fn test_rejects_garbage() {
        let data = [0u8; 64];
        assert!(matches!(
            SwashRasterizer.open(&data, 0),
            Err(AtlasError::InvalidFontData { .. })
        ));
    }

    #[test]
    fn test_metrics_follow_pixel_height() {
        let Some(data) = system_font() else { return };
        let face = SwashRasterizer.open(&data, 0).unwrap();
        let m = face.v_metrics(20.0);
        assert!((m.ascent - m.descent - 20.0).abs() < 1e-3);
        assert!(m.descent < 0.0);
        let a = face.glyph_index('A' as u32).unwrap();
        assert!(face.advance(a, 20.0) > 0.0);
        assert!(face.glyph_index(0x10FFFD).is_none());
    }

    #[test]
    fn test_render_fills_box() {
        let Some(data) = system_font() else { return };
        let mut face = SwashRasterizer.open(&data, 0).unwrap();
        let g = face.glyph_index('H' as u32).unwrap();
        let bbox = face.bitmap_box(g, 24.0, Oversample::NONE);
        assert!(!bbox.is_empty());
        assert!(bbox.y0 < 0 && bbox.y1 <= 1, "{bbox:?}");

        let (w, h) = (bbox.width() as usize, bbox.height() as usize);
        let mut pixels = vec![0u8; w * h];
        face.render(
            g,
            24.0,
            Oversample::NONE,
            GlyphTarget {
                pixels: &mut pixels,
                stride: w,
                width: w,
                height: h,
            },
        );
        assert!(pixels.iter().any(|&p| p == 0xff));

        let wide = face.bitmap_box(g, 24.0, Oversample::new(3, 1));
        assert!(wide.width() > bbox.width() * 2);
        assert_eq!(wide.height(), bbox.height());

        let space = face.glyph_index(' ' as u32).unwrap();
        assert!(face.bitmap_box(space, 24.0, Oversample::NONE).is_empty());
    }

    #[test]
    fn test_atlas_build_with_ttf() {
        let Some(data) = system_font() else { return };
        let mut atlas = FontAtlas::new().with_rasterizer(Arc::new(SwashRasterizer));
        let font = atlas
            .add_font_from_memory_ttf(FontData::Owned(data.into()), 18.0, None)
            .unwrap();
        atlas.add_font_default(None).unwrap();
        atlas.build().unwrap();

        let font = atlas.font(font).unwrap();
        let glyph = font.find_glyph_no_fallback('g' as u32).unwrap();
        assert!(glyph.visible);
        assert!(glyph.u0 < glyph.u1 && glyph.v0 < glyph.v1);
        // Default font still goes through the built-in face.
        assert!(atlas.font(1).unwrap().find_glyph_no_fallback('A' as u32).is_some());
    }

    #[test]
    fn test_atlas_reports_bad_ttf() {
        let mut atlas = FontAtlas::new().with_rasterizer(Arc::new(SwashRasterizer));
        let cfg = FontConfig::new(FontData::Owned(Arc::from(&b"not a font"[..])), 13.0);
        atlas.add_font(cfg).unwrap();
        assert!(matches!(atlas.build(), Err(AtlasError::InvalidFontData { .. })));
    }
}
