//! Font atlas: packs every glyph of every font, the mouse cursor art and the
//! anti-aliased line strips into one texture.
//!
//! Fonts are added as [`FontConfig`]s and only become usable after [`FontAtlas::build`]
//! (or the first `get_tex_data_*` call). Building again after adding fonts rebuilds
//! everything; previously handed out `Arc<Font>`s keep their old data.

use std::path::Path;
use std::sync::Arc;

use crate::builtin_font::{BuiltinRasterizer, BUILTIN_FONT_NAME, BUILTIN_FONT_SIZE};
use crate::color::col32;
use crate::compression::{decode_base85, stb_decompress};
use crate::cursor_art::{cursor_art, cursor_layout, CURSOR_ART_H, CURSOR_ART_W};
use crate::diagnostics::Diagnostics;
use crate::error::AtlasError;
use crate::flags::FontAtlasFlags;
use crate::font::Font;
use crate::font_rasterizer::{FontFace, FontRasterizer, GlyphBox, GlyphTarget, Oversample};
use crate::glyph_ranges::{unpack_ranges, GlyphRange, GLYPH_RANGES_DEFAULT};
use crate::io::MouseCursor;
use crate::primitives::{Vec2, Vec4};
use crate::rect_pack::{PackRect, SkylinePacker};
use crate::shared::TEX_LINES_WIDTH_MAX;
use crate::vertex::TextureId;

/// Packing area height; the texture is cropped to what was used.
const TEX_HEIGHT_MAX: u32 = 1024 * 32;

/// Where a font's bytes come from.
#[derive(Clone, Debug, Default)]
pub enum FontData {
    /// The built-in bitmap face.
    #[default]
    Builtin,
    /// Caller-owned bytes that outlive the atlas.
    Borrowed(&'static [u8]),
    /// Bytes owned by the atlas and dropped with it.
    Owned(Arc<[u8]>),
}

impl FontData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FontData::Builtin => &[],
            FontData::Borrowed(data) => data,
            FontData::Owned(data) => data,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontData::Builtin)
    }
}

/// How one font source is baked.
#[derive(Clone, Debug)]
pub struct FontConfig {
    pub font_data: FontData,
    /// Face index inside a font collection.
    pub font_no: u32,
    /// Pixel height (ascent minus descent).
    pub size_pixels: f32,
    pub oversample_h: u32,
    pub oversample_v: u32,
    /// Round advances to whole pixels. Implies no horizontal oversampling.
    pub pixel_snap_h: bool,
    /// Extra spacing between glyphs; only `x` is used.
    pub glyph_extra_spacing: Vec2,
    pub glyph_offset: Vec2,
    pub glyph_ranges: Vec<GlyphRange>,
    pub glyph_min_advance_x: f32,
    pub glyph_max_advance_x: f32,
    /// Add glyphs to the previous font instead of starting a new one.
    pub merge_mode: bool,
    /// Brightness multiplier applied to rasterized pixels.
    pub rasterizer_multiply: f32,
    pub ellipsis_char: Option<u32>,
    pub name: String,
    pub(crate) dst_font: usize,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_data: FontData::Builtin,
            font_no: 0,
            size_pixels: 0.0,
            oversample_h: 3,
            oversample_v: 1,
            pixel_snap_h: false,
            glyph_extra_spacing: Vec2::ZERO,
            glyph_offset: Vec2::ZERO,
            glyph_ranges: GLYPH_RANGES_DEFAULT.to_vec(),
            glyph_min_advance_x: 0.0,
            glyph_max_advance_x: f32::MAX,
            merge_mode: false,
            rasterizer_multiply: 1.0,
            ellipsis_char: None,
            name: String::new(),
            dst_font: 0,
        }
    }
}

impl FontConfig {
    pub fn new(font_data: FontData, size_pixels: f32) -> Self {
        Self {
            font_data,
            size_pixels,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size_pixels: f32) -> Self {
        self.size_pixels = size_pixels;
        self
    }

    pub fn with_oversample(mut self, h: u32, v: u32) -> Self {
        self.oversample_h = h;
        self.oversample_v = v;
        self
    }

    pub fn with_pixel_snap_h(mut self, snap: bool) -> Self {
        self.pixel_snap_h = snap;
        self
    }

    pub fn with_glyph_ranges(mut self, ranges: &[GlyphRange]) -> Self {
        self.glyph_ranges = ranges.to_vec();
        self
    }

    pub fn with_glyph_offset(mut self, offset: Vec2) -> Self {
        self.glyph_offset = offset;
        self
    }

    pub fn with_glyph_extra_spacing(mut self, spacing: Vec2) -> Self {
        self.glyph_extra_spacing = spacing;
        self
    }

    pub fn with_advance_range(mut self, min: f32, max: f32) -> Self {
        self.glyph_min_advance_x = min;
        self.glyph_max_advance_x = max;
        self
    }

    pub fn with_merge_mode(mut self, merge: bool) -> Self {
        self.merge_mode = merge;
        self
    }

    pub fn with_rasterizer_multiply(mut self, multiply: f32) -> Self {
        self.rasterizer_multiply = multiply;
        self
    }

    pub fn with_ellipsis_char(mut self, c: u32) -> Self {
        self.ellipsis_char = Some(c);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn oversample(&self) -> Oversample {
        let h = if self.pixel_snap_h { 1 } else { self.oversample_h.max(1) };
        Oversample::new(h, self.oversample_v.max(1))
    }
}

/// A reserved block of atlas pixels, optionally mapped to a glyph of a font.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomRect {
    pub width: u16,
    pub height: u16,
    /// Position once packed.
    pub x: u16,
    pub y: u16,
    /// Codepoint this rect renders as, for font glyph rects.
    pub glyph_id: Option<u32>,
    pub glyph_advance_x: f32,
    pub glyph_offset: Vec2,
    pub font: Option<usize>,
}

impl CustomRect {
    const UNPACKED: u16 = u16::MAX;

    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            x: Self::UNPACKED,
            y: Self::UNPACKED,
            glyph_id: None,
            glyph_advance_x: 0.0,
            glyph_offset: Vec2::ZERO,
            font: None,
        }
    }

    pub fn is_packed(&self) -> bool {
        self.x != Self::UNPACKED
    }
}

/// Cursor art placement in atlas UVs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorTexData {
    /// Hot spot relative to the top-left corner.
    pub offset: Vec2,
    pub size: Vec2,
    /// UV min/max of the interior layer.
    pub uv_fill: [Vec2; 2],
    /// UV min/max of the outline layer.
    pub uv_border: [Vec2; 2],
}

/// Packed glyph texture plus the fonts that index into it.
pub struct FontAtlas {
    pub flags: FontAtlasFlags,
    /// Handle the backend assigned to the uploaded texture.
    tex_id: TextureId,
    /// Texture width, or 0 to pick one from the glyph surface.
    pub tex_desired_width: u32,
    /// Pixels between packed glyphs.
    pub tex_glyph_padding: u32,
    pub diagnostics: Diagnostics,
    locked: bool,
    tex_pixels_alpha8: Option<Vec<u8>>,
    tex_pixels_rgba32: Option<Vec<u32>>,
    tex_width: u32,
    tex_height: u32,
    tex_uv_scale: Vec2,
    tex_uv_white_pixel: Vec2,
    tex_uv_lines: Vec<Vec4>,
    fonts: Vec<Arc<Font>>,
    custom_rects: Vec<CustomRect>,
    config_data: Vec<FontConfig>,
    rasterizer: Option<Arc<dyn FontRasterizer>>,
    pack_id_mouse_cursors: Option<usize>,
    pack_id_lines: Option<usize>,
}

impl std::fmt::Debug for FontAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAtlas")
            .field("flags", &self.flags)
            .field("tex_id", &self.tex_id)
            .field("tex_size", &(self.tex_width, self.tex_height))
            .field("fonts", &self.fonts.len())
            .field("custom_rects", &self.custom_rects.len())
            .field("rasterizer", &self.rasterizer.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}

impl Default for FontAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl FontAtlas {
    pub fn new() -> Self {
        Self {
            flags: FontAtlasFlags::empty(),
            tex_id: TextureId::default(),
            tex_desired_width: 0,
            tex_glyph_padding: 1,
            diagnostics: Diagnostics::default(),
            locked: false,
            tex_pixels_alpha8: None,
            tex_pixels_rgba32: None,
            tex_width: 0,
            tex_height: 0,
            tex_uv_scale: Vec2::ZERO,
            tex_uv_white_pixel: Vec2::ZERO,
            tex_uv_lines: Vec::new(),
            fonts: Vec::new(),
            custom_rects: Vec::new(),
            config_data: Vec::new(),
            rasterizer: None,
            pack_id_mouse_cursors: None,
            pack_id_lines: None,
        }
    }

    /// Install the rasterizer used for TTF/OTF data.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn FontRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn set_rasterizer(&mut self, rasterizer: Arc<dyn FontRasterizer>) {
        self.rasterizer = Some(rasterizer);
    }

    // Locking

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn check_unlocked(&self) -> Result<(), AtlasError> {
        if !self.locked {
            return Ok(());
        }
        if self.diagnostics.assert_atlas_unlocked {
            log::warn!("font atlas modified between new_frame() and render()");
            debug_assert!(!self.locked, "cannot modify a locked font atlas");
        }
        Err(AtlasError::Locked)
    }

    // Adding fonts

    /// Queue a font source. Returns the index of the font it bakes into.
    pub fn add_font(&mut self, mut cfg: FontConfig) -> Result<usize, AtlasError> {
        self.check_unlocked()?;
        if !(cfg.size_pixels > 0.0) {
            return Err(AtlasError::InvalidSize(cfg.size_pixels));
        }
        if !cfg.font_data.is_builtin() && cfg.font_data.as_bytes().is_empty() {
            return Err(AtlasError::EmptyFontData);
        }
        if let Some(&bad) = cfg.glyph_ranges.iter().find(|(a, b)| a > b) {
            return Err(AtlasError::InvalidGlyphRange(bad));
        }

        if cfg.merge_mode {
            if self.fonts.is_empty() {
                return Err(AtlasError::MergeWithoutFont);
            }
        } else {
            let mut font = Font::new();
            font.name = cfg.name.clone();
            font.font_size = cfg.size_pixels;
            self.fonts.push(Arc::new(font));
        }
        cfg.dst_font = self.fonts.len() - 1;
        let dst = cfg.dst_font;
        log::debug!("queued font '{}' ({} px) into font #{}", cfg.name, cfg.size_pixels, dst);
        self.config_data.push(cfg);

        // Invalidate the texture; fonts get rebuilt from their configs.
        self.clear_tex_data();
        Ok(dst)
    }

    /// The built-in 13 px bitmap font.
    pub fn add_font_default(&mut self, cfg: Option<FontConfig>) -> Result<usize, AtlasError> {
        let mut cfg = cfg.unwrap_or_default();
        cfg.font_data = FontData::Builtin;
        cfg.oversample_h = 1;
        cfg.oversample_v = 1;
        cfg.pixel_snap_h = true;
        if cfg.size_pixels <= 0.0 {
            cfg.size_pixels = BUILTIN_FONT_SIZE;
        }
        if cfg.name.is_empty() {
            cfg.name = BUILTIN_FONT_NAME.to_string();
        }
        if cfg.glyph_ranges == GLYPH_RANGES_DEFAULT {
            // The face carries an ellipsis outside Latin-1.
            cfg.glyph_ranges.push((0x2026, 0x2026));
        }
        self.add_font(cfg)
    }

    pub fn add_font_from_file(
        &mut self,
        path: impl AsRef<Path>,
        size_pixels: f32,
        cfg: Option<FontConfig>,
    ) -> Result<usize, AtlasError> {
        self.check_unlocked()?;
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut cfg = cfg.unwrap_or_default();
        if cfg.name.is_empty() {
            cfg.name = format!(
                "{}, {:.0}px",
                path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
                size_pixels
            );
        }
        self.add_font_from_memory_ttf(FontData::Owned(data.into()), size_pixels, Some(cfg))
    }

    pub fn add_font_from_memory_ttf(
        &mut self,
        data: FontData,
        size_pixels: f32,
        cfg: Option<FontConfig>,
    ) -> Result<usize, AtlasError> {
        let mut cfg = cfg.unwrap_or_default();
        cfg.font_data = data;
        cfg.size_pixels = size_pixels;
        self.add_font(cfg)
    }

    /// TTF data compressed with [`crate::compression::stb_compress`].
    pub fn add_font_from_memory_compressed_ttf(
        &mut self,
        compressed: &[u8],
        size_pixels: f32,
        cfg: Option<FontConfig>,
    ) -> Result<usize, AtlasError> {
        let data = stb_decompress(compressed)?;
        self.add_font_from_memory_ttf(FontData::Owned(data.into()), size_pixels, cfg)
    }

    /// Base85 text of compressed TTF data.
    pub fn add_font_from_memory_compressed_base85_ttf(
        &mut self,
        base85: &str,
        size_pixels: f32,
        cfg: Option<FontConfig>,
    ) -> Result<usize, AtlasError> {
        let compressed = decode_base85(base85)?;
        self.add_font_from_memory_compressed_ttf(&compressed, size_pixels, cfg)
    }

    // Custom rects

    /// Reserve `width x height` pixels. Returns the rect index.
    pub fn add_custom_rect_regular(&mut self, width: u16, height: u16) -> usize {
        debug_assert!(width > 0 && height > 0);
        self.custom_rects.push(CustomRect::new(width, height));
        self.custom_rects.len() - 1
    }

    /// Reserve pixels that `font` renders as codepoint `id`.
    pub fn add_custom_rect_font_glyph(
        &mut self,
        font: usize,
        id: u32,
        width: u16,
        height: u16,
        advance_x: f32,
        offset: Vec2,
    ) -> Result<usize, AtlasError> {
        if font >= self.fonts.len() {
            return Err(AtlasError::UnknownFont(font));
        }
        let mut rect = CustomRect::new(width, height);
        rect.glyph_id = Some(id);
        rect.glyph_advance_x = advance_x;
        rect.glyph_offset = offset;
        rect.font = Some(font);
        self.custom_rects.push(rect);
        Ok(self.custom_rects.len() - 1)
    }

    pub fn custom_rect(&self, index: usize) -> Option<&CustomRect> {
        self.custom_rects.get(index)
    }

    pub fn calc_custom_rect_uv(&self, rect: &CustomRect) -> (Vec2, Vec2) {
        debug_assert!(self.tex_width > 0 && self.tex_height > 0, "atlas not built");
        debug_assert!(rect.is_packed());
        let min = Vec2::new(rect.x as f32, rect.y as f32);
        let max = min + Vec2::new(rect.width as f32, rect.height as f32);
        (min * self.tex_uv_scale, max * self.tex_uv_scale)
    }

    // Clearing

    /// Drop the font sources; built fonts stay usable until cleared.
    pub fn clear_input_data(&mut self) {
        if self.check_unlocked().is_err() {
            return;
        }
        self.config_data.clear();
        self.custom_rects.clear();
        self.pack_id_mouse_cursors = None;
        self.pack_id_lines = None;
    }

    pub fn clear_tex_data(&mut self) {
        if self.check_unlocked().is_err() {
            return;
        }
        self.tex_pixels_alpha8 = None;
        self.tex_pixels_rgba32 = None;
    }

    /// Drop the built fonts along with the sources that bake into them.
    pub fn clear_fonts(&mut self) {
        if self.check_unlocked().is_err() {
            return;
        }
        self.fonts.clear();
        self.config_data.clear();
        self.tex_pixels_alpha8 = None;
        self.tex_pixels_rgba32 = None;
    }

    pub fn clear(&mut self) {
        self.clear_input_data();
        self.clear_tex_data();
        self.clear_fonts();
    }

    // Output

    pub fn is_built(&self) -> bool {
        !self.fonts.is_empty() && self.tex_pixels_alpha8.is_some()
    }

    pub fn fonts(&self) -> &[Arc<Font>] {
        &self.fonts
    }

    pub fn font(&self, index: usize) -> Option<&Arc<Font>> {
        self.fonts.get(index)
    }

    pub fn tex_id(&self) -> TextureId {
        self.tex_id
    }

    /// Record the backend handle and point every font at it.
    pub fn set_tex_id(&mut self, id: TextureId) {
        self.tex_id = id;
        for font in &mut self.fonts {
            Arc::make_mut(font).tex_id = id;
        }
    }

    pub fn tex_size(&self) -> (u32, u32) {
        (self.tex_width, self.tex_height)
    }

    pub fn tex_uv_scale(&self) -> Vec2 {
        self.tex_uv_scale
    }

    pub fn tex_uv_white_pixel(&self) -> Vec2 {
        self.tex_uv_white_pixel
    }

    pub fn tex_uv_lines(&self) -> &[Vec4] {
        &self.tex_uv_lines
    }

    fn ensure_built(&mut self) -> Result<(), AtlasError> {
        if self.tex_pixels_alpha8.is_some() {
            return Ok(());
        }
        if self.config_data.is_empty() {
            self.add_font_default(None)?;
        }
        self.build()
    }

    /// 8-bit coverage pixels, building the atlas first if needed.
    pub fn get_tex_data_as_alpha8(&mut self) -> Result<(&[u8], u32, u32), AtlasError> {
        self.ensure_built()?;
        let pixels = self.tex_pixels_alpha8.as_deref().ok_or(AtlasError::NoFonts)?;
        Ok((pixels, self.tex_width, self.tex_height))
    }

    /// White pixels with the coverage as alpha, packed like vertex colors.
    pub fn get_tex_data_as_rgba32(&mut self) -> Result<(&[u32], u32, u32), AtlasError> {
        self.ensure_built()?;
        if self.tex_pixels_rgba32.is_none() {
            let alpha = self.tex_pixels_alpha8.as_deref().ok_or(AtlasError::NoFonts)?;
            self.tex_pixels_rgba32 = Some(alpha.iter().map(|&a| col32(255, 255, 255, a)).collect());
        }
        let pixels = self.tex_pixels_rgba32.as_deref().ok_or(AtlasError::NoFonts)?;
        Ok((pixels, self.tex_width, self.tex_height))
    }

    /// Write access to the coverage pixels, e.g. to fill custom rects after a build.
    pub fn tex_data_alpha8_mut(&mut self) -> Option<&mut [u8]> {
        self.tex_pixels_rgba32 = None;
        self.tex_pixels_alpha8.as_deref_mut()
    }

    pub fn get_mouse_cursor_tex_data(&self, cursor: MouseCursor) -> Option<CursorTexData> {
        if self.flags.contains(FontAtlasFlags::NO_MOUSE_CURSORS) {
            return None;
        }
        let rect = self.custom_rects.get(self.pack_id_mouse_cursors?)?;
        if !rect.is_packed() {
            return None;
        }
        let layout = cursor_layout(cursor)?;
        let pos = layout.pos + Vec2::new(rect.x as f32, rect.y as f32);
        let border_pos = pos + Vec2::new(CURSOR_ART_W as f32 + 1.0, 0.0);
        Some(CursorTexData {
            offset: layout.offset,
            size: layout.size,
            uv_fill: [pos * self.tex_uv_scale, (pos + layout.size) * self.tex_uv_scale],
            uv_border: [border_pos * self.tex_uv_scale, (border_pos + layout.size) * self.tex_uv_scale],
        })
    }

    // Building

    /// Rasterize and pack every queued font.
    pub fn build(&mut self) -> Result<(), AtlasError> {
        self.check_unlocked()?;
        if self.config_data.is_empty() {
            return Err(AtlasError::NoFonts);
        }
        let configs = std::mem::take(&mut self.config_data);
        let result = self.build_from(&configs);
        self.config_data = configs;
        if result.is_err() {
            self.tex_pixels_alpha8 = None;
            self.tex_pixels_rgba32 = None;
        }
        result
    }

    fn register_default_rects(&mut self) {
        if self.pack_id_mouse_cursors.is_none() {
            let (w, h) = if self.flags.contains(FontAtlasFlags::NO_MOUSE_CURSORS) {
                (2, 2)
            } else {
                (CURSOR_ART_W as u16 * 2 + 1, CURSOR_ART_H as u16)
            };
            self.pack_id_mouse_cursors = Some(self.add_custom_rect_regular(w, h));
        }
        if self.pack_id_lines.is_none() && !self.flags.contains(FontAtlasFlags::NO_BAKED_LINES) {
            let max = TEX_LINES_WIDTH_MAX as u16;
            self.pack_id_lines = Some(self.add_custom_rect_regular(max + 2, max + 1));
        }
    }

    fn build_from(&mut self, configs: &[FontConfig]) -> Result<(), AtlasError> {
        self.register_default_rects();
        self.tex_pixels_alpha8 = None;
        self.tex_pixels_rgba32 = None;
        self.tex_width = 0;
        self.tex_height = 0;

        let builtin = BuiltinRasterizer;
        let padding = self.tex_glyph_padding;

        // Gather: each codepoint belongs to the first source of its font that has it.
        let mut sources = Vec::with_capacity(configs.len());
        let mut owned: Vec<Vec<bool>> = vec![Vec::new(); self.fonts.len()];
        if let Some(cfg) = configs.iter().find(|cfg| cfg.dst_font >= self.fonts.len()) {
            return Err(AtlasError::UnknownFont(cfg.dst_font));
        }
        for cfg in configs {
            let rasterizer: &dyn FontRasterizer = if cfg.font_data.is_builtin() {
                &builtin
            } else {
                self.rasterizer
                    .as_deref()
                    .ok_or_else(|| AtlasError::NoRasterizer(cfg.name.clone()))?
            };
            let face = rasterizer
                .open(cfg.font_data.as_bytes(), cfg.font_no)
                .map_err(|err| match err {
                    AtlasError::InvalidFontData { reason, .. } => AtlasError::InvalidFontData {
                        name: cfg.name.clone(),
                        reason,
                    },
                    other => other,
                })?;
            let taken = &mut owned[cfg.dst_font];

            let mut glyphs = Vec::new();
            let mut missing = 0usize;
            for codepoint in unpack_ranges(&cfg.glyph_ranges) {
                let c = codepoint as usize;
                if taken.get(c).copied().unwrap_or(false) {
                    continue;
                }
                let Some(glyph_index) = face.glyph_index(codepoint) else {
                    missing += 1;
                    continue;
                };
                if taken.len() <= c {
                    taken.resize(c + 1, false);
                }
                taken[c] = true;
                glyphs.push(SourceGlyph {
                    codepoint,
                    glyph_index,
                    bbox: GlyphBox::default(),
                    rect: PackRect::default(),
                });
            }
            if missing > 0 && self.diagnostics.log_missing_glyphs {
                log::debug!("font '{}': {missing} requested codepoints not in the face", cfg.name);
            }
            sources.push(Source { cfg, face, glyphs });
        }

        // Measure.
        let mut total_surface = 0u64;
        for src in &mut sources {
            let oversample = src.cfg.oversample();
            for g in &mut src.glyphs {
                g.bbox = src.face.bitmap_box(g.glyph_index, src.cfg.size_pixels, oversample);
                g.rect = if g.bbox.is_empty() {
                    PackRect::new(0, 0)
                } else {
                    PackRect::new(g.bbox.width() + padding, g.bbox.height() + padding)
                };
                total_surface += u64::from(g.rect.w) * u64::from(g.rect.h);
            }
        }

        // Size.
        let surface_sqrt = (total_surface as f64).sqrt() as u32 + 1;
        self.tex_width = if self.tex_desired_width > 0 {
            self.tex_desired_width
        } else if surface_sqrt as f32 >= 4096.0 * 0.7 {
            4096
        } else if surface_sqrt as f32 >= 2048.0 * 0.7 {
            2048
        } else if surface_sqrt as f32 >= 1024.0 * 0.7 {
            1024
        } else {
            512
        };

        // Pack custom rects first, then glyphs.
        let mut packer = SkylinePacker::new(self.tex_width.saturating_sub(padding), TEX_HEIGHT_MAX - padding);
        let mut custom: Vec<PackRect> = self
            .custom_rects
            .iter()
            .map(|r| PackRect::new(u32::from(r.width) + padding, u32::from(r.height) + padding))
            .collect();
        packer.pack(&mut custom);
        let mut used_height = 0;
        for (rect, packed) in self.custom_rects.iter_mut().zip(&custom) {
            if packed.was_packed && packed.w > 0 {
                rect.x = packed.x as u16;
                rect.y = packed.y as u16;
                used_height = used_height.max(packed.y + packed.h);
            } else {
                rect.x = CustomRect::UNPACKED;
                rect.y = CustomRect::UNPACKED;
            }
        }

        let mut packed_glyphs = 0usize;
        for src in &mut sources {
            let mut rects: Vec<PackRect> = src.glyphs.iter().map(|g| g.rect).collect();
            packer.pack(&mut rects);
            let mut failed = Vec::new();
            for (g, rect) in src.glyphs.iter_mut().zip(rects) {
                g.rect = rect;
                if rect.was_packed {
                    packed_glyphs += 1;
                    used_height = used_height.max(rect.y + rect.h);
                } else {
                    failed.push(g.codepoint);
                }
            }
            if !failed.is_empty() && self.diagnostics.log_missing_glyphs {
                log::warn!(
                    "font '{}': {} glyphs did not fit the atlas, first {:#x}",
                    src.cfg.name,
                    failed.len(),
                    failed[0]
                );
            }
        }
        if packed_glyphs == 0 {
            return Err(AtlasError::NoGlyphs);
        }

        self.tex_height = if self.flags.contains(FontAtlasFlags::NO_POWER_OF_TWO_HEIGHT) {
            used_height.max(1)
        } else {
            used_height.max(1).next_power_of_two()
        };
        self.tex_uv_scale = Vec2::new(1.0 / self.tex_width as f32, 1.0 / self.tex_height as f32);
        let stride = self.tex_width as usize;
        let mut pixels = vec![0u8; stride * self.tex_height as usize];

        // Rasterize.
        for src in &mut sources {
            let oversample = src.cfg.oversample();
            let multiply = (src.cfg.rasterizer_multiply != 1.0).then(|| multiply_table(src.cfg.rasterizer_multiply));
            for g in src.glyphs.iter().filter(|g| g.rect.was_packed && !g.bbox.is_empty()) {
                let (x, y) = (g.rect.x as usize, g.rect.y as usize);
                let (w, h) = (g.bbox.width() as usize, g.bbox.height() as usize);
                let start = y * stride + x;
                src.face.render(
                    g.glyph_index,
                    src.cfg.size_pixels,
                    oversample,
                    GlyphTarget {
                        pixels: &mut pixels[start..],
                        stride,
                        width: w,
                        height: h,
                    },
                );
                if let Some(table) = &multiply {
                    for row in 0..h {
                        let line = &mut pixels[start + row * stride..start + row * stride + w];
                        for p in line {
                            *p = table[*p as usize];
                        }
                    }
                }
            }
        }
        self.tex_pixels_alpha8 = Some(pixels);

        // Fill font tables.
        let tex_size = [self.tex_width, self.tex_height];
        let mut seen = vec![false; self.fonts.len()];
        for src in &sources {
            let cfg = src.cfg;
            let font = Arc::make_mut(&mut self.fonts[cfg.dst_font]);
            if !seen[cfg.dst_font] {
                seen[cfg.dst_font] = true;
                font.clear_output_data();
                let metrics = src.face.v_metrics(cfg.size_pixels);
                font.font_size = cfg.size_pixels;
                font.ascent = (metrics.ascent + if metrics.ascent > 0.0 { 1.0 } else { -1.0 }).floor();
                font.descent = (metrics.descent + if metrics.descent > 0.0 { 1.0 } else { -1.0 }).floor();
                font.name = cfg.name.clone();
                font.ellipsis_char = cfg.ellipsis_char;
                font.atlas_tex_size = tex_size;
                font.atlas_glyph_padding = padding;
                font.tex_id = self.tex_id;
            }
            font.config_data_count += 1;

            let oversample = cfg.oversample();
            let (oh, ov) = (oversample.h as f32, oversample.v as f32);
            let off_x = cfg.glyph_offset.x;
            let off_y = cfg.glyph_offset.y + font.ascent.round();
            for g in src.glyphs.iter().filter(|g| g.rect.was_packed) {
                let advance = src.face.advance(g.glyph_index, cfg.size_pixels);
                let (x0, y0) = (g.bbox.x0 as f32 / oh, g.bbox.y0 as f32 / ov);
                let (x1, y1) = (g.bbox.x1 as f32 / oh, g.bbox.y1 as f32 / ov);
                let (u0, v0) = (g.rect.x as f32 / tex_size[0] as f32, g.rect.y as f32 / tex_size[1] as f32);
                let u1 = (g.rect.x + g.bbox.width()) as f32 / tex_size[0] as f32;
                let v1 = (g.rect.y + g.bbox.height()) as f32 / tex_size[1] as f32;
                font.add_glyph(
                    Some(cfg),
                    g.codepoint,
                    x0 + off_x,
                    y0 + off_y,
                    x1 + off_x,
                    y1 + off_y,
                    u0,
                    v0,
                    u1,
                    v1,
                    advance,
                );
            }
        }

        self.finish();
        log::info!(
            "font atlas built: {}x{}, {} fonts, {} glyphs",
            self.tex_width,
            self.tex_height,
            self.fonts.len(),
            packed_glyphs
        );
        Ok(())
    }

    /// Bake the cursor art and line strips, register custom glyphs and build the lookup tables.
    fn finish(&mut self) {
        self.render_default_tex_data();
        self.render_lines_tex_data();

        for i in 0..self.custom_rects.len() {
            let rect = &self.custom_rects[i];
            let (Some(id), Some(font_index)) = (rect.glyph_id, rect.font) else {
                continue;
            };
            if !rect.is_packed() || font_index >= self.fonts.len() {
                continue;
            }
            let (uv0, uv1) = self.calc_custom_rect_uv(rect);
            let (w, h) = (rect.width as f32, rect.height as f32);
            let (offset, advance) = (rect.glyph_offset, rect.glyph_advance_x);
            let font = Arc::make_mut(&mut self.fonts[font_index]);
            font.add_glyph(None, id, offset.x, offset.y, offset.x + w, offset.y + h, uv0.x, uv0.y, uv1.x, uv1.y, advance);
        }

        for font in &mut self.fonts {
            let font = Arc::make_mut(font);
            if font.dirty_lookup_tables {
                font.build_lookup_table();
            }
        }
    }

    fn render_default_tex_data(&mut self) {
        let Some(rect) = self.pack_id_mouse_cursors.and_then(|id| self.custom_rects.get(id)).cloned() else {
            return;
        };
        if !rect.is_packed() {
            return;
        }
        let stride = self.tex_width as usize;
        let (rx, ry) = (rect.x as usize, rect.y as usize);
        let Some(pixels) = self.tex_pixels_alpha8.as_mut() else {
            return;
        };

        if self.flags.contains(FontAtlasFlags::NO_MOUSE_CURSORS) {
            for y in 0..2 {
                pixels[(ry + y) * stride + rx..(ry + y) * stride + rx + 2].fill(0xFF);
            }
        } else {
            // Fill layer, then the border layer one column right of it.
            let art = cursor_art();
            let border_x = rx + CURSOR_ART_W + 1;
            for y in 0..CURSOR_ART_H {
                let row = (ry + y) * stride;
                for x in 0..CURSOR_ART_W {
                    match art[y * CURSOR_ART_W + x] {
                        b'.' => pixels[row + rx + x] = 0xFF,
                        b'X' => pixels[row + border_x + x] = 0xFF,
                        _ => {}
                    }
                }
            }
            // Unused corner of the fill layer doubles as the white pixel.
            for y in 0..2 {
                pixels[(ry + y) * stride + rx..(ry + y) * stride + rx + 2].fill(0xFF);
            }
        }
        self.tex_uv_white_pixel = (Vec2::new(rx as f32, ry as f32) + Vec2::splat(0.5)) * self.tex_uv_scale;
    }

    fn render_lines_tex_data(&mut self) {
        self.tex_uv_lines.clear();
        let Some(rect) = self.pack_id_lines.and_then(|id| self.custom_rects.get(id)).cloned() else {
            return;
        };
        if !rect.is_packed() {
            return;
        }
        let stride = self.tex_width as usize;
        let scale = self.tex_uv_scale;
        let Some(pixels) = self.tex_pixels_alpha8.as_mut() else {
            return;
        };
        let (rx, ry, rw) = (rect.x as usize, rect.y as usize, rect.width as usize);

        // Row n holds a centered opaque run n pixels wide.
        for n in 0..=TEX_LINES_WIDTH_MAX {
            let pad_left = (rw - n) / 2;
            let row = (ry + n) * stride + rx;
            pixels[row..row + rw].fill(0);
            pixels[row + pad_left..row + pad_left + n].fill(0xFF);

            let uv0 = Vec2::new((rx + pad_left) as f32 - 1.0, (ry + n) as f32) * scale;
            let uv1 = Vec2::new((rx + pad_left + n) as f32 + 1.0, (ry + n + 1) as f32) * scale;
            let half_v = (uv0.y + uv1.y) * 0.5;
            self.tex_uv_lines.push(Vec4::new(uv0.x, half_v, uv1.x, half_v));
        }
    }
}

struct SourceGlyph {
    codepoint: u32,
    glyph_index: u32,
    bbox: GlyphBox,
    rect: PackRect,
}

struct Source<'a> {
    cfg: &'a FontConfig,
    face: Box<dyn FontFace + 'a>,
    glyphs: Vec<SourceGlyph>,
}

/// Brightness lookup for `rasterizer_multiply`.
fn multiply_table(factor: f32) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, v) in table.iter_mut().enumerate() {
        *v = ((i as f32 * factor) as u32).min(255) as u8;
    }
    table
}
