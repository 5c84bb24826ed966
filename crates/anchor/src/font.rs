//! Runtime fonts: glyph tables, text measurement, word wrapping and text tessellation.

use crate::color::COL32_A_MASK;
use crate::draw_list::DrawList;
use crate::font_atlas::FontConfig;
use crate::primitives::{Vec2, Vec4};
use crate::vertex::{TextureId, DRAW_IDX_LIMIT};

/// Highest codepoint a font can map.
pub const UNICODE_CODEPOINT_MAX: u32 = 0x10FFFF;
pub const UNICODE_CODEPOINT_INVALID: u32 = 0xFFFD;
/// One bit per 4096-codepoint page.
pub const USED_4K_PAGES_MAP_SIZE: usize = (UNICODE_CODEPOINT_MAX as usize + 1) / 4096 / 8;
/// Tab advance in spaces.
pub const TAB_SIZE: f32 = 4.0;

const NO_GLYPH: u16 = u16::MAX;
/// Most glyph quads one reservation covers; keeps every batch within one vertex offset.
const GLYPHS_PER_BATCH: usize = (DRAW_IDX_LIMIT - 1) / 4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontGlyph {
    pub codepoint: u32,
    /// Zero-area glyphs (spaces) are skipped when rendering.
    pub visible: bool,
    /// Rendered with its own colors; only the tint's alpha applies.
    pub colored: bool,
    pub advance_x: f32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

#[inline]
pub(crate) fn is_blank_ascii(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

#[inline]
pub(crate) fn is_blank(c: u32) -> bool {
    c == ' ' as u32 || c == '\t' as u32 || c == 0x3000
}

/// Decode one UTF-8 sequence. Returns `(codepoint, bytes consumed)`; the codepoint
/// is 0 for malformed input, which callers treat as the end of the text.
pub fn decode_utf8_char(text: &[u8]) -> (u32, usize) {
    let Some(&lead) = text.first() else {
        return (0, 0);
    };
    if lead < 0x80 {
        return (u32::from(lead), 1);
    }
    let len = match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return (0, 1),
    };
    match text.get(..len).and_then(|b| std::str::from_utf8(b).ok()) {
        Some(s) => (s.chars().next().map_or(0, u32::from), len),
        None => (0, len.min(text.len())),
    }
}

#[derive(Clone, Debug)]
pub struct Font {
    /// Advance per codepoint, filled with the fallback advance for gaps.
    pub index_advance_x: Vec<f32>,
    pub fallback_advance_x: f32,
    /// Height in pixels the font was baked at.
    pub font_size: f32,
    /// Codepoint to index into `glyphs`, `u16::MAX` for none.
    pub index_lookup: Vec<u16>,
    pub glyphs: Vec<FontGlyph>,
    fallback_glyph: Option<usize>,
    /// Texture of the atlas that baked this font.
    pub tex_id: TextureId,
    /// Number of configs merged into this font.
    pub config_data_count: u32,
    pub name: String,
    pub fallback_char: u32,
    pub ellipsis_char: Option<u32>,
    pub dirty_lookup_tables: bool,
    /// Extra scale applied on top of `font_size`.
    pub scale: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Rough atlas area used by the glyphs, in pixels.
    pub metrics_total_surface: u32,
    pub used_4k_pages_map: [u8; USED_4K_PAGES_MAP_SIZE],
    pub(crate) atlas_tex_size: [u32; 2],
    pub(crate) atlas_glyph_padding: u32,
}

impl Default for Font {
    fn default() -> Self {
        Self::new()
    }
}

impl Font {
    pub fn new() -> Self {
        Self {
            index_advance_x: Vec::new(),
            fallback_advance_x: 0.0,
            font_size: 0.0,
            index_lookup: Vec::new(),
            glyphs: Vec::new(),
            fallback_glyph: None,
            tex_id: TextureId::default(),
            config_data_count: 0,
            name: String::new(),
            fallback_char: '?' as u32,
            ellipsis_char: None,
            dirty_lookup_tables: true,
            scale: 1.0,
            ascent: 0.0,
            descent: 0.0,
            metrics_total_surface: 0,
            used_4k_pages_map: [0; USED_4K_PAGES_MAP_SIZE],
            atlas_tex_size: [0, 0],
            atlas_glyph_padding: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.config_data_count > 0
    }

    pub fn debug_name(&self) -> &str {
        if self.name.is_empty() {
            "<unknown>"
        } else {
            &self.name
        }
    }

    pub fn clear_output_data(&mut self) {
        self.font_size = 0.0;
        self.fallback_advance_x = 0.0;
        self.glyphs.clear();
        self.index_advance_x.clear();
        self.index_lookup.clear();
        self.fallback_glyph = None;
        self.config_data_count = 0;
        self.dirty_lookup_tables = true;
        self.ascent = 0.0;
        self.descent = 0.0;
        self.metrics_total_surface = 0;
        self.used_4k_pages_map = [0; USED_4K_PAGES_MAP_SIZE];
    }

    fn grow_index(&mut self, new_size: usize) {
        if new_size <= self.index_lookup.len() {
            return;
        }
        self.index_advance_x.resize(new_size, -1.0);
        self.index_lookup.resize(new_size, NO_GLYPH);
    }

    /// Rebuild the codepoint tables after glyphs were added.
    pub fn build_lookup_table(&mut self) {
        let max_codepoint = self.glyphs.iter().map(|g| g.codepoint).max().unwrap_or(0) as usize;
        debug_assert!(self.glyphs.len() < NO_GLYPH as usize);

        self.index_advance_x.clear();
        self.index_lookup.clear();
        self.dirty_lookup_tables = false;
        self.used_4k_pages_map = [0; USED_4K_PAGES_MAP_SIZE];
        self.grow_index(max_codepoint + 1);
        for (i, g) in self.glyphs.iter().enumerate() {
            let c = g.codepoint as usize;
            self.index_advance_x[c] = g.advance_x;
            self.index_lookup[c] = i as u16;
            let page = c / 4096;
            self.used_4k_pages_map[page >> 3] |= 1 << (page & 7);
        }

        // Tab is a wide space.
        if let Some(space) = self.find_glyph_no_fallback(' ' as u32).copied() {
            if self.glyphs.last().map(|g| g.codepoint) != Some('\t' as u32) {
                self.glyphs.push(FontGlyph::default());
            }
            let tab_index = self.glyphs.len() - 1;
            let tab = &mut self.glyphs[tab_index];
            *tab = space;
            tab.codepoint = '\t' as u32;
            tab.advance_x *= TAB_SIZE;
            let advance = tab.advance_x;
            self.index_advance_x['\t' as usize] = advance;
            self.index_lookup['\t' as usize] = tab_index as u16;
        }

        self.set_glyph_visible(' ' as u32, false);
        self.set_glyph_visible('\t' as u32, false);

        if self.ellipsis_char.is_none() {
            self.ellipsis_char = [0x2026, 0x0085]
                .into_iter()
                .find(|&c| self.find_glyph_no_fallback(c).is_some());
        }

        self.fallback_glyph = self.glyph_slot(self.fallback_char);
        if self.fallback_glyph.is_none() {
            if let Some(c) = [UNICODE_CODEPOINT_INVALID, '?' as u32, ' ' as u32]
                .into_iter()
                .find(|&c| self.glyph_slot(c).is_some())
            {
                self.fallback_char = c;
                self.fallback_glyph = self.glyph_slot(c);
            } else if let Some(last) = self.glyphs.last() {
                self.fallback_char = last.codepoint;
                self.fallback_glyph = Some(self.glyphs.len() - 1);
            }
        }

        self.fallback_advance_x = self
            .fallback_glyph
            .map_or(0.0, |i| self.glyphs[i].advance_x);
        let fallback = self.fallback_advance_x;
        for a in self.index_advance_x.iter_mut().filter(|a| **a < 0.0) {
            *a = fallback;
        }
    }

    fn glyph_slot(&self, c: u32) -> Option<usize> {
        match self.index_lookup.get(c as usize) {
            Some(&i) if i != NO_GLYPH => Some(i as usize),
            _ => None,
        }
    }

    /// Glyph for `c`, or the fallback glyph.
    pub fn find_glyph(&self, c: u32) -> Option<&FontGlyph> {
        self.glyph_slot(c)
            .or(self.fallback_glyph)
            .map(|i| &self.glyphs[i])
    }

    pub fn find_glyph_no_fallback(&self, c: u32) -> Option<&FontGlyph> {
        self.glyph_slot(c).map(|i| &self.glyphs[i])
    }

    pub fn fallback_glyph(&self) -> Option<&FontGlyph> {
        self.fallback_glyph.map(|i| &self.glyphs[i])
    }

    #[inline]
    pub fn get_char_advance(&self, c: u32) -> f32 {
        self.index_advance_x
            .get(c as usize)
            .copied()
            .unwrap_or(self.fallback_advance_x)
    }

    pub fn set_glyph_visible(&mut self, c: u32, visible: bool) {
        if let Some(i) = self.glyph_slot(c) {
            self.glyphs[i].visible = visible;
        }
    }

    /// Change the fallback character and rebuild the tables.
    pub fn set_fallback_char(&mut self, c: u32) {
        self.fallback_char = c;
        self.build_lookup_table();
    }

    /// `true` when no glyph lives in any 4K page touched by `[c_begin, c_last]`.
    pub fn is_glyph_range_unused(&self, c_begin: u32, c_last: u32) -> bool {
        let (first, last) = (c_begin as usize / 4096, c_last as usize / 4096);
        (first..=last).all(|page| {
            self.used_4k_pages_map
                .get(page >> 3)
                .map_or(true, |bits| bits & (1 << (page & 7)) == 0)
        })
    }

    /// Append a glyph. With a config, the advance is clamped, snapped and spaced per its options.
    #[allow(clippy::too_many_arguments)]
    pub fn add_glyph(
        &mut self,
        cfg: Option<&FontConfig>,
        codepoint: u32,
        mut x0: f32,
        y0: f32,
        mut x1: f32,
        y1: f32,
        u0: f32,
        v0: f32,
        u1: f32,
        v1: f32,
        mut advance_x: f32,
    ) {
        if let Some(cfg) = cfg {
            let original = advance_x;
            advance_x = advance_x.clamp(cfg.glyph_min_advance_x, cfg.glyph_max_advance_x);
            if advance_x != original {
                let shift = (advance_x - original) * 0.5;
                let off = if cfg.pixel_snap_h { shift.floor() } else { shift };
                x0 += off;
                x1 += off;
            }
            if cfg.pixel_snap_h {
                advance_x = advance_x.round();
            }
            advance_x += cfg.glyph_extra_spacing.x;
        }

        self.glyphs.push(FontGlyph {
            codepoint,
            visible: x0 != x1 && y0 != y1,
            colored: false,
            advance_x,
            x0,
            y0,
            x1,
            y1,
            u0,
            v0,
            u1,
            v1,
        });

        // +0.99 rounds up, padding counted once per glyph.
        let pad = self.atlas_glyph_padding as f32 + 0.99;
        let [tw, th] = self.atlas_tex_size;
        let w = ((u1 - u0) * tw as f32 + pad) as u32;
        let h = ((v1 - v0) * th as f32 + pad) as u32;
        self.metrics_total_surface += w * h;
        self.dirty_lookup_tables = true;
    }

    /// Make `dst` render as `src`. Only valid once the lookup tables exist.
    pub fn add_remap_char(&mut self, dst: u32, src: u32, overwrite_dst: bool) {
        debug_assert!(!self.index_lookup.is_empty(), "remap before the font was built");
        let index_size = self.index_lookup.len();
        let (d, s) = (dst as usize, src as usize);
        if d < index_size && self.index_lookup[d] == NO_GLYPH && !overwrite_dst {
            return;
        }
        if s >= index_size && d >= index_size {
            return;
        }
        self.grow_index(d + 1);
        self.index_lookup[d] = if s < index_size { self.index_lookup[s] } else { NO_GLYPH };
        self.index_advance_x[d] = if s < index_size { self.index_advance_x[s] } else { 1.0 };
    }

    /// Byte offset where a line starting at `text[0]` must wrap to fit `wrap_width` pixels.
    ///
    /// Wraps at blanks and after `. , ; ! ? "`; words wider than the whole line are cut
    /// anywhere.
    pub fn calc_word_wrap_position_a(&self, scale: f32, text: &[u8], wrap_width: f32) -> usize {
        let mut line_width = 0.0;
        let mut word_width = 0.0;
        let mut blank_width = 0.0;
        // Work unscaled.
        let wrap_width = wrap_width / scale;

        let mut word_end = 0;
        let mut prev_word_end: Option<usize> = None;
        let mut inside_word = true;

        let mut s = 0;
        while s < text.len() {
            let (c, len) = decode_utf8_char(&text[s..]);
            let next_s = s + len.max(1);
            if c == 0 {
                break;
            }

            if c < 32 {
                if c == '\n' as u32 {
                    line_width = 0.0;
                    word_width = 0.0;
                    blank_width = 0.0;
                    inside_word = true;
                    s = next_s;
                    continue;
                }
                if c == '\r' as u32 {
                    s = next_s;
                    continue;
                }
            }

            let char_width = self.get_char_advance(c);
            if is_blank(c) {
                if inside_word {
                    line_width += blank_width;
                    blank_width = 0.0;
                    word_end = s;
                }
                blank_width += char_width;
                inside_word = false;
            } else {
                word_width += char_width;
                if inside_word {
                    word_end = next_s;
                } else {
                    prev_word_end = Some(word_end);
                    line_width += word_width + blank_width;
                    word_width = 0.0;
                    blank_width = 0.0;
                }
                inside_word = !matches!(char::from_u32(c), Some('.' | ',' | ';' | '!' | '?' | '"'));
            }

            // Trailing blanks don't count.
            if line_width + word_width > wrap_width {
                if word_width < wrap_width {
                    s = prev_word_end.unwrap_or(word_end);
                }
                break;
            }

            s = next_s;
        }
        s
    }

    /// Size of `text` rendered at `size` pixels.
    ///
    /// Stops early once a line would exceed `max_width`. Returns the size and the
    /// number of bytes measured.
    pub fn calc_text_size_a(&self, size: f32, max_width: f32, wrap_width: f32, text: &[u8]) -> (Vec2, usize) {
        let line_height = size;
        let scale = size / self.font_size;

        let mut text_size = Vec2::ZERO;
        let mut line_width = 0.0f32;

        let word_wrap_enabled = wrap_width > 0.0;
        let mut word_wrap_eol: Option<usize> = None;

        let mut s = 0;
        while s < text.len() {
            if word_wrap_enabled {
                let eol = *word_wrap_eol.get_or_insert_with(|| {
                    let eol = s + self.calc_word_wrap_position_a(scale, &text[s..], wrap_width - line_width);
                    // Always make progress, even if nothing fits.
                    if eol == s {
                        eol + 1
                    } else {
                        eol
                    }
                });

                if s >= eol {
                    text_size.x = text_size.x.max(line_width);
                    text_size.y += line_height;
                    line_width = 0.0;
                    word_wrap_eol = None;

                    while s < text.len() {
                        let c = text[s];
                        if is_blank_ascii(c) {
                            s += 1;
                        } else if c == b'\n' {
                            s += 1;
                            break;
                        } else {
                            break;
                        }
                    }
                    continue;
                }
            }

            let prev_s = s;
            let (c, len) = decode_utf8_char(&text[s..]);
            if c == 0 {
                break;
            }
            s += len;

            if c < 32 {
                if c == '\n' as u32 {
                    text_size.x = text_size.x.max(line_width);
                    text_size.y += line_height;
                    line_width = 0.0;
                    continue;
                }
                if c == '\r' as u32 {
                    continue;
                }
            }

            let char_width = self.get_char_advance(c) * scale;
            if line_width + char_width >= max_width {
                s = prev_s;
                break;
            }
            line_width += char_width;
        }

        text_size.x = text_size.x.max(line_width);
        if line_width > 0.0 || text_size.y == 0.0 {
            text_size.y += line_height;
        }
        (text_size, s)
    }

    /// Draw a single glyph at `pos`.
    pub fn render_char(&self, draw_list: &mut DrawList, size: f32, pos: Vec2, mut col: u32, c: u32) {
        let Some(glyph) = self.find_glyph(c) else {
            return;
        };
        if !glyph.visible {
            return;
        }
        if glyph.colored {
            col |= !COL32_A_MASK;
        }
        let scale = if size >= 0.0 { size / self.font_size } else { 1.0 };
        let pos = pos.floor();
        if !draw_list.prim_reserve(6, 4) {
            return;
        }
        draw_list.prim_rect_uv(
            Vec2::new(pos.x + glyph.x0 * scale, pos.y + glyph.y0 * scale),
            Vec2::new(pos.x + glyph.x1 * scale, pos.y + glyph.y1 * scale),
            Vec2::new(glyph.u0, glyph.v0),
            Vec2::new(glyph.u1, glyph.v1),
            col,
        );
    }

    /// Tessellate `text` into `draw_list`, one textured quad per visible glyph.
    ///
    /// `clip_rect` culls whole lines and glyphs; with `cpu_fine_clip` glyphs straddling
    /// it are cut and their UVs adjusted.
    #[allow(clippy::too_many_arguments)]
    pub fn render_text(
        &self,
        draw_list: &mut DrawList,
        size: f32,
        pos: Vec2,
        col: u32,
        clip_rect: Vec4,
        text: &[u8],
        wrap_width: f32,
        cpu_fine_clip: bool,
    ) {
        // Pixel-align the pen.
        let pos = pos.floor();
        let mut x = pos.x;
        let mut y = pos.y;
        if y > clip_rect.w {
            return;
        }

        let scale = size / self.font_size;
        let line_height = self.font_size * scale;
        let word_wrap_enabled = wrap_width > 0.0;
        let mut word_wrap_eol: Option<usize> = None;

        // Skip lines above the clip rect.
        let mut s = 0;
        let mut text_end = text.len();
        if !word_wrap_enabled {
            while y + line_height < clip_rect.y && s < text_end {
                s = match text[s..].iter().position(|&b| b == b'\n') {
                    Some(n) => s + n + 1,
                    None => text_end,
                };
                y += line_height;
            }

            // And everything below it, so the reservation stays small.
            let mut s_end = s;
            let mut y_end = y;
            while y_end < clip_rect.w && s_end < text_end {
                s_end = match text[s_end..].iter().position(|&b| b == b'\n') {
                    Some(n) => s_end + n + 1,
                    None => text_end,
                };
                y_end += line_height;
            }
            text_end = s_end;
        }
        if s == text_end {
            return;
        }

        // Quads are reserved in batches, worst case one per remaining byte. Quads
        // reserved but not yet written are given back at the end.
        let mut quads_left = 0usize;

        let col_untinted = col | !COL32_A_MASK;

        while s < text_end {
            if word_wrap_enabled {
                let eol = *word_wrap_eol.get_or_insert_with(|| {
                    let eol = s + self.calc_word_wrap_position_a(scale, &text[s..text_end], wrap_width - (x - pos.x));
                    if eol == s {
                        eol + 1
                    } else {
                        eol
                    }
                });

                if s >= eol {
                    x = pos.x;
                    y += line_height;
                    word_wrap_eol = None;

                    while s < text_end {
                        let c = text[s];
                        if is_blank_ascii(c) {
                            s += 1;
                        } else if c == b'\n' {
                            s += 1;
                            break;
                        } else {
                            break;
                        }
                    }
                    continue;
                }
            }

            let char_start = s;
            let (c, len) = decode_utf8_char(&text[s..text_end]);
            if c == 0 {
                break;
            }
            s += len;

            if c < 32 {
                if c == '\n' as u32 {
                    x = pos.x;
                    y += line_height;
                    if y > clip_rect.w {
                        break;
                    }
                    continue;
                }
                if c == '\r' as u32 {
                    continue;
                }
            }

            let Some(glyph) = self.find_glyph(c) else {
                continue;
            };

            let char_width = glyph.advance_x * scale;
            if glyph.visible {
                let mut x1 = x + glyph.x0 * scale;
                let mut x2 = x + glyph.x1 * scale;
                let mut y1 = y + glyph.y0 * scale;
                let mut y2 = y + glyph.y1 * scale;
                if x1 <= clip_rect.z && x2 >= clip_rect.x {
                    let (mut u1, mut v1, mut u2, mut v2) = (glyph.u0, glyph.v0, glyph.u1, glyph.v1);

                    if cpu_fine_clip {
                        if x1 < clip_rect.x {
                            u1 += (1.0 - (x2 - clip_rect.x) / (x2 - x1)) * (u2 - u1);
                            x1 = clip_rect.x;
                        }
                        if y1 < clip_rect.y {
                            v1 += (1.0 - (y2 - clip_rect.y) / (y2 - y1)) * (v2 - v1);
                            y1 = clip_rect.y;
                        }
                        if x2 > clip_rect.z {
                            u2 = u1 + ((clip_rect.z - x1) / (x2 - x1)) * (u2 - u1);
                            x2 = clip_rect.z;
                        }
                        if y2 > clip_rect.w {
                            v2 = v1 + ((clip_rect.w - y1) / (y2 - y1)) * (v2 - v1);
                            y2 = clip_rect.w;
                        }
                        if y1 >= y2 {
                            x += char_width;
                            continue;
                        }
                    }

                    if quads_left == 0 {
                        let batch = (text_end - char_start).min(GLYPHS_PER_BATCH);
                        if !draw_list.prim_reserve(batch * 6, batch * 4) {
                            return;
                        }
                        quads_left = batch;
                    }
                    quads_left -= 1;

                    let glyph_col = if glyph.colored { col_untinted } else { col };
                    draw_list.prim_rect_uv(
                        Vec2::new(x1, y1),
                        Vec2::new(x2, y2),
                        Vec2::new(u1, v1),
                        Vec2::new(u2, v2),
                        glyph_col,
                    );
                }
            }
            x += char_width;
        }

        // Give back what clipped glyphs and blanks didn't use.
        draw_list.prim_unreserve(quads_left * 6, quads_left * 4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{col32, COL32_WHITE};
    use crate::flags::DrawListFlags;
    use crate::shared::SharedData;
    use std::sync::Arc;

    fn mono_font(advance: f32) -> Font {
        let mut font = Font::new();
        font.font_size = 13.0;
        for c in 0x20..0x7f {
            let (x0, x1) = if c == 0x20 { (0.0, 0.0) } else { (1.0, 6.0) };
            font.add_glyph(None, c, x0, 3.0, x1, 10.0, 0.0, 0.0, 0.1, 0.1, advance);
        }
        font.config_data_count = 1;
        font.build_lookup_table();
        font
    }

    const NO_CLIP: Vec4 = Vec4::new(-1.0e6, -1.0e6, 1.0e6, 1.0e6);

    fn list(flags: DrawListFlags) -> DrawList {
        let mut data = SharedData::new();
        data.initial_flags = flags;
        DrawList::new(Arc::new(data))
    }

    fn assert_near(a: [f32; 2], b: [f32; 2]) {
        assert!((a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn test_render_text_one_quad_per_visible_glyph() {
        let font = mono_font(7.0);
        let mut dl = list(DrawListFlags::empty());
        font.render_text(&mut dl, 13.0, Vec2::new(10.5, 20.2), COL32_WHITE, NO_CLIP, b"ab c", 0.0, false);

        // The space is invisible; the pen is floored to whole pixels.
        assert_eq!(dl.vtx_buffer.len(), 12);
        assert_eq!(dl.idx_buffer.len(), 18);
        assert_eq!(dl.cmd_buffer[0].elem_count, 18);
        assert_eq!(dl.vtx_buffer[0].pos, [11.0, 23.0]);
        assert_eq!(dl.vtx_buffer[0].uv, [0.0, 0.0]);
        assert_eq!(dl.vtx_buffer[2].pos, [16.0, 30.0]);
        assert_eq!(dl.vtx_buffer[2].uv, [0.1, 0.1]);
        assert_eq!(dl.vtx_buffer[8].pos, [32.0, 23.0]);
        assert_eq!(&dl.idx_buffer[12..], &[8, 9, 10, 8, 10, 11]);
    }

    #[test]
    fn test_render_text_culls_lines_and_glyphs() {
        let font = mono_font(7.0);

        // Only the lines overlapping y 14..27 are emitted.
        let mut dl = list(DrawListFlags::empty());
        let clip = Vec4::new(-100.0, 14.0, 100.0, 27.0);
        font.render_text(&mut dl, 13.0, Vec2::ZERO, COL32_WHITE, clip, b"a\nb\nc\nd", 0.0, false);
        assert_eq!(dl.vtx_buffer.len(), 8);
        assert_eq!(dl.vtx_buffer[0].pos[1], 16.0);
        assert_eq!(dl.vtx_buffer[4].pos[1], 29.0);

        // Glyphs starting past the right edge are skipped.
        let mut dl = list(DrawListFlags::empty());
        let clip = Vec4::new(0.0, 0.0, 20.0, 100.0);
        font.render_text(&mut dl, 13.0, Vec2::ZERO, COL32_WHITE, clip, b"abcd", 0.0, false);
        assert_eq!(dl.vtx_buffer.len(), 12);
        assert_eq!(dl.idx_buffer.len(), 18);
    }

    #[test]
    fn test_render_text_wraps_words() {
        let font = mono_font(7.0);
        let mut dl = list(DrawListFlags::empty());
        font.render_text(&mut dl, 13.0, Vec2::ZERO, COL32_WHITE, NO_CLIP, b"abcd efgh", 35.0, false);
        assert_eq!(dl.vtx_buffer.len(), 32);
        // "efgh" starts a new line at the left edge.
        assert_eq!(dl.vtx_buffer[16].pos, [1.0, 16.0]);
        assert_eq!(dl.vtx_buffer[28].pos, [22.0, 16.0]);
    }

    #[test]
    fn test_render_text_fine_clip_adjusts_uvs() {
        let font = mono_font(7.0);
        let mut dl = list(DrawListFlags::empty());
        let clip = Vec4::new(3.0, 0.0, 100.0, 8.0);
        font.render_text(&mut dl, 13.0, Vec2::ZERO, COL32_WHITE, clip, b"a", 0.0, true);
        assert_eq!(dl.vtx_buffer.len(), 4);
        assert_near(dl.vtx_buffer[0].pos, [3.0, 3.0]);
        assert_near(dl.vtx_buffer[0].uv, [0.04, 0.0]);
        assert_near(dl.vtx_buffer[2].pos, [6.0, 8.0]);
        assert_near(dl.vtx_buffer[2].uv, [0.1, 0.1 * 5.0 / 7.0]);

        // Clipped away vertically: nothing left, nothing reserved.
        let mut dl = list(DrawListFlags::empty());
        let clip = Vec4::new(0.0, 0.0, 100.0, 2.0);
        font.render_text(&mut dl, 13.0, Vec2::ZERO, COL32_WHITE, clip, b"a", 0.0, true);
        assert!(dl.vtx_buffer.is_empty());
        assert!(dl.idx_buffer.is_empty());
        assert_eq!(dl.cmd_buffer[0].elem_count, 0);
    }

    #[test]
    fn test_colored_glyph_keeps_only_tint_alpha() {
        let mut font = mono_font(7.0);
        for g in font.glyphs.iter_mut().filter(|g| g.codepoint == 'a' as u32) {
            g.colored = true;
        }
        let tint = col32(255, 0, 0, 128);
        let mut dl = list(DrawListFlags::empty());
        font.render_text(&mut dl, 13.0, Vec2::ZERO, tint, NO_CLIP, b"ab", 0.0, false);
        assert_eq!(dl.vtx_buffer[0].col, col32(255, 255, 255, 128));
        assert_eq!(dl.vtx_buffer[4].col, tint);

        let mut dl = list(DrawListFlags::empty());
        font.render_char(&mut dl, 13.0, Vec2::ZERO, tint, 'a' as u32);
        assert_eq!(dl.vtx_buffer[0].col, col32(255, 255, 255, 128));
    }

    #[test]
    fn test_long_text_moves_vertex_offset() {
        let font = mono_font(7.0);
        let text = vec![b'a'; 20_000];
        let mut dl = list(DrawListFlags::ALLOW_VTX_OFFSET);
        font.render_text(&mut dl, 13.0, Vec2::ZERO, COL32_WHITE, NO_CLIP, &text, 0.0, false);

        assert_eq!(dl.vtx_buffer.len(), 80_000);
        assert_eq!(dl.idx_buffer.len(), 120_000);
        let total: u32 = dl.cmd_buffer.iter().map(|c| c.elem_count).sum();
        assert_eq!(total, 120_000);
        for cmd in &dl.cmd_buffer {
            let start = cmd.idx_offset as usize;
            let end = start + cmd.elem_count as usize;
            for &i in &dl.idx_buffer[start..end] {
                assert!((cmd.vtx_offset as usize + i as usize) < dl.vtx_buffer.len());
                assert!((i as usize) < DRAW_IDX_LIMIT);
            }
        }
        if std::mem::size_of::<crate::vertex::DrawIdx>() == 2 {
            assert_eq!(dl.cmd_buffer.len(), 2);
            assert_eq!(dl.cmd_buffer[1].vtx_offset as usize, GLYPHS_PER_BATCH * 4);
        }
    }

    #[test]
    fn test_long_text_without_vtx_offset_truncates() {
        let font = mono_font(7.0);
        let text = vec![b'a'; 20_000];
        let mut dl = list(DrawListFlags::empty());
        font.render_text(&mut dl, 13.0, Vec2::ZERO, COL32_WHITE, NO_CLIP, &text, 0.0, false);

        let quads = if std::mem::size_of::<crate::vertex::DrawIdx>() == 2 { GLYPHS_PER_BATCH } else { 20_000 };
        assert_eq!(dl.vtx_buffer.len(), quads * 4);
        assert_eq!(dl.idx_buffer.len(), quads * 6);
        assert_eq!(dl.cmd_buffer.len(), 1);
        assert_eq!(dl.cmd_buffer[0].elem_count as usize, quads * 6);
    }

    #[test]
    fn test_utf8_decoding() {
        assert_eq!(decode_utf8_char(b"A"), ('A' as u32, 1));
        assert_eq!(decode_utf8_char("é".as_bytes()), (0xE9, 2));
        assert_eq!(decode_utf8_char("€".as_bytes()), (0x20AC, 3));
        assert_eq!(decode_utf8_char("😀".as_bytes()), (0x1F600, 4));
        assert_eq!(decode_utf8_char(&[0xC3]).0, 0);
        assert_eq!(decode_utf8_char(&[0xFF, 0x41]).0, 0);
        assert_eq!(decode_utf8_char(&[0xED, 0xA0, 0x80]).0, 0);
    }

    #[test]
    fn test_lookup_tables_agree_with_glyphs() {
        let font = mono_font(7.0);
        for (c, &i) in font.index_lookup.iter().enumerate() {
            if i != NO_GLYPH {
                assert_eq!(font.index_advance_x[c], font.glyphs[i as usize].advance_x);
            }
        }
        assert!(font.fallback_glyph().is_some());
        assert_eq!(font.fallback_char, '?' as u32);
    }

    #[test]
    fn test_tab_is_four_spaces_and_invisible() {
        let font = mono_font(7.0);
        let tab = font.find_glyph_no_fallback('\t' as u32).unwrap();
        assert_eq!(tab.advance_x, 28.0);
        assert!(!tab.visible);
        assert!(!font.find_glyph_no_fallback(' ' as u32).unwrap().visible);
        // Rebuilding doesn't add a second tab.
        let mut again = font.clone();
        again.build_lookup_table();
        assert_eq!(again.glyphs.len(), font.glyphs.len());
    }

    #[test]
    fn test_missing_codepoint_uses_fallback() {
        let font = mono_font(7.0);
        let g = font.find_glyph(0x4E00).unwrap();
        assert_eq!(g.codepoint, '?' as u32);
        assert!(font.find_glyph_no_fallback(0x4E00).is_none());
        assert_eq!(font.get_char_advance(0x4E00), 7.0);
    }

    #[test]
    fn test_used_pages() {
        let font = mono_font(7.0);
        assert!(!font.is_glyph_range_unused(0x20, 0x7e));
        assert!(font.is_glyph_range_unused(0x3000, 0x30ff));
    }

    #[test]
    fn test_config_clamps_and_snaps_advance() {
        let mut cfg = FontConfig::default();
        cfg.glyph_min_advance_x = 10.0;
        cfg.pixel_snap_h = true;
        cfg.glyph_extra_spacing.x = 1.0;
        let mut font = Font::new();
        font.add_glyph(Some(&cfg), 'a' as u32, 0.0, 0.0, 4.0, 4.0, 0.0, 0.0, 0.0, 0.0, 6.0);
        let g = font.glyphs[0];
        assert_eq!(g.advance_x, 11.0);
        // Centered in the wider cell.
        assert_eq!(g.x0, 2.0);
    }

    #[test]
    fn test_remap_char() {
        let mut font = mono_font(7.0);
        font.add_remap_char('x' as u32, 'y' as u32, true);
        assert_eq!(font.index_lookup['x' as usize], font.index_lookup['y' as usize]);
    }

    #[test]
    fn test_text_size_counts_lines() {
        let font = mono_font(7.0);
        let (size, consumed) = font.calc_text_size_a(13.0, f32::MAX, 0.0, b"abc\nde");
        assert_eq!(size, Vec2::new(21.0, 26.0));
        assert_eq!(consumed, 6);
        let (empty, _) = font.calc_text_size_a(13.0, f32::MAX, 0.0, b"");
        assert_eq!(empty, Vec2::new(0.0, 13.0));
    }

    #[test]
    fn test_text_size_stops_at_max_width() {
        let font = mono_font(7.0);
        let (size, consumed) = font.calc_text_size_a(13.0, 20.0, 0.0, b"abcdef");
        assert_eq!(consumed, 2);
        assert_eq!(size.x, 14.0);
    }

    #[test]
    fn test_text_size_is_deterministic() {
        let font = mono_font(7.0);
        let text = "Hello, wrapped world! ".repeat(5);
        let a = font.calc_text_size_a(13.0, f32::MAX, 60.0, text.as_bytes());
        let b = font.calc_text_size_a(13.0, f32::MAX, 60.0, text.as_bytes());
        assert_eq!(a, b);
    }

    #[test]
    fn test_word_wrap_forty_chars() {
        let font = mono_font(7.0);
        let text = b"abcd efgh ijkl mnop qrst uvwx yzab cdefg";
        assert_eq!(text.len(), 40);
        let (size, _) = font.calc_text_size_a(13.0, f32::MAX, 5.0 * 7.0, text);
        assert_eq!(size.y, 8.0 * 13.0);
        assert!(size.x <= 35.0);
    }

    #[test]
    fn test_wrap_position_breaks_after_punctuation() {
        let font = mono_font(7.0);
        let text = b"ab,cdefgh";
        // Room for 4 characters: "ab," fits, "cdefgh" is too long for what's left.
        assert_eq!(font.calc_word_wrap_position_a(1.0, text, 28.0), 3);
    }

    #[test]
    fn test_malformed_utf8_halts_measurement() {
        let font = mono_font(7.0);
        let (size, consumed) = font.calc_text_size_a(13.0, f32::MAX, 0.0, &[b'a', b'b', 0xFF, b'c']);
        assert_eq!(consumed, 2);
        assert_eq!(size.x, 14.0);
    }
}
