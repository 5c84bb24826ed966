//! Codepoint ranges to bake, as inclusive `(first, last)` pairs.

use crate::font::{decode_utf8_char, UNICODE_CODEPOINT_MAX};

pub type GlyphRange = (u32, u32);

/// Basic Latin and Latin-1 Supplement.
pub const GLYPH_RANGES_DEFAULT: &[GlyphRange] = &[(0x0020, 0x00FF)];

pub const GLYPH_RANGES_GREEK: &[GlyphRange] = &[(0x0020, 0x00FF), (0x0370, 0x03FF)];

pub const GLYPH_RANGES_KOREAN: &[GlyphRange] = &[
    (0x0020, 0x00FF),
    (0x3131, 0x3163), // Korean alphabets
    (0xAC00, 0xD7A3), // Korean characters
    (0xFFFD, 0xFFFD),
];

/// Kana, half-width forms and the CJK Unified Ideographs block.
pub const GLYPH_RANGES_JAPANESE: &[GlyphRange] = &[
    (0x0020, 0x00FF),
    (0x3000, 0x30FF), // CJK Symbols and Punctuations, Hiragana, Katakana
    (0x31F0, 0x31FF), // Katakana Phonetic Extensions
    (0xFF00, 0xFFEF), // Half-width characters
    (0xFFFD, 0xFFFD),
    (0x4E00, 0x9FAF), // CJK Ideograms
];

pub const GLYPH_RANGES_CHINESE_FULL: &[GlyphRange] = &[
    (0x0020, 0x00FF),
    (0x2000, 0x206F), // General Punctuation
    (0x3000, 0x30FF),
    (0x31F0, 0x31FF),
    (0xFF00, 0xFFEF),
    (0xFFFD, 0xFFFD),
    (0x4E00, 0x9FAF),
];

pub const GLYPH_RANGES_CYRILLIC: &[GlyphRange] = &[
    (0x0020, 0x00FF),
    (0x0400, 0x052F), // Cyrillic + Cyrillic Supplement
    (0x2DE0, 0x2DFF), // Cyrillic Extended-A
    (0xA640, 0xA69F), // Cyrillic Extended-B
];

pub const GLYPH_RANGES_THAI: &[GlyphRange] = &[
    (0x0020, 0x00FF),
    (0x2010, 0x205E), // Punctuations
    (0x0E00, 0x0E7F), // Thai
];

pub const GLYPH_RANGES_VIETNAMESE: &[GlyphRange] = &[
    (0x0020, 0x00FF),
    (0x0102, 0x0103),
    (0x0110, 0x0111),
    (0x0128, 0x0129),
    (0x0168, 0x0169),
    (0x01A0, 0x01A1),
    (0x01AF, 0x01B0),
    (0x1EA0, 0x1EF9),
];

/// Collects codepoints into a bitset and turns them back into ranges.
#[derive(Clone, Debug)]
pub struct GlyphRangesBuilder {
    used: Vec<u32>,
}

impl Default for GlyphRangesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRangesBuilder {
    pub fn new() -> Self {
        Self {
            used: vec![0; (UNICODE_CODEPOINT_MAX as usize + 1).div_ceil(32)],
        }
    }

    pub fn clear(&mut self) {
        self.used.fill(0);
    }

    #[inline]
    pub fn get_bit(&self, c: u32) -> bool {
        self.used
            .get(c as usize / 32)
            .is_some_and(|word| word & (1 << (c % 32)) != 0)
    }

    #[inline]
    pub fn set_bit(&mut self, c: u32) {
        if let Some(word) = self.used.get_mut(c as usize / 32) {
            *word |= 1 << (c % 32);
        }
    }

    pub fn add_char(&mut self, c: u32) {
        self.set_bit(c);
    }

    /// Add every codepoint of `text`, stopping at the first malformed sequence.
    pub fn add_text(&mut self, text: &[u8]) {
        let mut rest = text;
        while !rest.is_empty() {
            let (c, len) = decode_utf8_char(rest);
            if c == 0 {
                return;
            }
            self.add_char(c);
            rest = &rest[len..];
        }
    }

    pub fn add_ranges(&mut self, ranges: &[GlyphRange]) {
        for &(first, last) in ranges {
            for c in first..=last.min(UNICODE_CODEPOINT_MAX) {
                self.add_char(c);
            }
        }
    }

    /// Minimal sorted list of ranges covering every set codepoint.
    pub fn build_ranges(&self) -> Vec<GlyphRange> {
        let mut out = Vec::new();
        let mut n = 0;
        let max = UNICODE_CODEPOINT_MAX;
        while n <= max {
            if self.used[n as usize / 32] == 0 {
                n = (n / 32 + 1) * 32;
                continue;
            }
            if self.get_bit(n) {
                let first = n;
                while n < max && self.get_bit(n + 1) {
                    n += 1;
                }
                out.push((first, n));
            }
            n += 1;
        }
        out
    }
}

/// Every codepoint of `ranges`, in order, without duplicates.
pub fn unpack_ranges(ranges: &[GlyphRange]) -> Vec<u32> {
    let mut builder = GlyphRangesBuilder::new();
    builder.add_ranges(ranges);
    builder
        .build_ranges()
        .into_iter()
        .flat_map(|(first, last)| first..=last)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_merges_adjacent() {
        let mut b = GlyphRangesBuilder::new();
        b.add_text("abcxyz".as_bytes());
        b.add_char('d' as u32);
        assert_eq!(b.build_ranges(), vec![('a' as u32, 'd' as u32), ('x' as u32, 'z' as u32)]);
    }

    #[test]
    fn test_builder_handles_word_boundaries_and_max() {
        let mut b = GlyphRangesBuilder::new();
        b.add_ranges(&[(30, 70), (UNICODE_CODEPOINT_MAX, UNICODE_CODEPOINT_MAX)]);
        assert_eq!(b.build_ranges(), vec![(30, 70), (UNICODE_CODEPOINT_MAX, UNICODE_CODEPOINT_MAX)]);
    }

    #[test]
    fn test_add_text_stops_on_malformed() {
        let mut b = GlyphRangesBuilder::new();
        b.add_text(&[b'a', 0xFF, b'b']);
        assert!(b.get_bit('a' as u32));
        assert!(!b.get_bit('b' as u32));
    }

    #[test]
    fn test_unpack_overlapping_ranges() {
        let cps = unpack_ranges(&[(0x41, 0x43), (0x42, 0x44)]);
        assert_eq!(cps, vec![0x41, 0x42, 0x43, 0x44]);
    }

    #[test]
    fn test_tables_are_well_formed() {
        for table in [
            GLYPH_RANGES_DEFAULT,
            GLYPH_RANGES_GREEK,
            GLYPH_RANGES_KOREAN,
            GLYPH_RANGES_JAPANESE,
            GLYPH_RANGES_CHINESE_FULL,
            GLYPH_RANGES_CYRILLIC,
            GLYPH_RANGES_THAI,
            GLYPH_RANGES_VIETNAMESE,
        ] {
            assert!(table.iter().all(|&(a, b)| a <= b && b <= UNICODE_CODEPOINT_MAX));
        }
    }
}
