//! Tools for fonts embedded in source code.
//!
//! Embedded fonts go through two layers: an LZ-style compressed stream (magic
//! `57 BC 00 00`, big-endian length, tokens, `05 FA` terminator and an Adler-32
//! checksum) and an optional base85 text encoding that survives as a string literal.
//! Both directions are provided so that font blobs can be produced and checked
//! from Rust.

use crate::error::DecompressError;

const MAGIC: u32 = 0x57bC_0000;
const HEADER_LEN: usize = 16;
const ADLER_MOD: u32 = 65521;

/// Largest back-reference distance the encoder emits.
const ENCODE_WINDOW: usize = 0x8_0000;
const ENCODE_MAX_MATCH: usize = 0x1_0000;
const ENCODE_MIN_MATCH: usize = 4;

pub fn adler32(seed: u32, data: &[u8]) -> u32 {
    let mut s1 = seed & 0xffff;
    let mut s2 = seed >> 16;
    // 5552 is the longest run before s2 could overflow u32.
    for block in data.chunks(5552) {
        for &b in block {
            s1 += u32::from(b);
            s2 += s1;
        }
        s1 %= ADLER_MOD;
        s2 %= ADLER_MOD;
    }
    (s2 << 16) | s1
}

/// Output size declared in a compressed stream's header.
pub fn stb_decompress_length(input: &[u8]) -> Option<usize> {
    let b = input.get(8..12)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize)
}

struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    out: Vec<u8>,
    out_len: usize,
}

impl Decoder<'_> {
    #[inline]
    fn byte(&self, at: usize) -> Result<u32, DecompressError> {
        self.input
            .get(self.pos + at)
            .map(|&b| u32::from(b))
            .ok_or(DecompressError::Truncated(self.pos))
    }

    fn in2(&self, at: usize) -> Result<u32, DecompressError> {
        Ok((self.byte(at)? << 8) | self.byte(at + 1)?)
    }

    fn in3(&self, at: usize) -> Result<u32, DecompressError> {
        Ok((self.byte(at)? << 16) | self.in2(at + 1)?)
    }

    fn copy_match(&mut self, dist: u32, len: u32) -> Result<(), DecompressError> {
        let (dist, len) = (dist as usize, len as usize);
        if self.out.len() + len > self.out_len {
            return Err(DecompressError::Overrun(self.out_len));
        }
        if dist > self.out.len() {
            return Err(DecompressError::MatchOutOfRange);
        }
        // Byte at a time: the source may overlap what is being written.
        let start = self.out.len() - dist;
        for k in 0..len {
            let b = self.out[start + k];
            self.out.push(b);
        }
        Ok(())
    }

    fn copy_literal(&mut self, from: usize, len: u32) -> Result<usize, DecompressError> {
        let len = len as usize;
        if self.out.len() + len > self.out_len {
            return Err(DecompressError::Overrun(self.out_len));
        }
        let start = self.pos + from;
        let bytes = self
            .input
            .get(start..start + len)
            .ok_or(DecompressError::Truncated(self.pos))?;
        self.out.extend_from_slice(bytes);
        Ok(from + len)
    }

    /// Decode one token. Returns `false` on the end marker.
    fn token(&mut self) -> Result<bool, DecompressError> {
        let t = self.byte(0)?;
        let consumed = match t {
            0x80..=0xff => {
                self.copy_match(self.byte(1)? + 1, t - 0x80 + 1)?;
                2
            }
            0x40..=0x7f => {
                self.copy_match(self.in2(0)? - 0x4000 + 1, self.byte(2)? + 1)?;
                3
            }
            0x20..=0x3f => self.copy_literal(1, t - 0x20 + 1)?,
            0x18..=0x1f => {
                self.copy_match(self.in3(0)? - 0x18_0000 + 1, self.byte(3)? + 1)?;
                4
            }
            0x10..=0x17 => {
                self.copy_match(self.in3(0)? - 0x10_0000 + 1, self.in2(3)? + 1)?;
                5
            }
            0x08..=0x0f => self.copy_literal(2, self.in2(0)? - 0x0800 + 1)?,
            0x07 => self.copy_literal(3, self.in2(1)? + 1)?,
            0x06 => {
                self.copy_match(self.in3(1)? + 1, self.byte(4)? + 1)?;
                5
            }
            0x04 => {
                self.copy_match(self.in3(1)? + 1, self.in2(4)? + 1)?;
                6
            }
            0x05 if self.byte(1)? == 0xfa => return Ok(false),
            _ => {
                return Err(DecompressError::UnknownToken {
                    token: t as u8,
                    offset: self.pos,
                })
            }
        };
        self.pos += consumed;
        Ok(true)
    }
}

/// Decompress a stream produced by [`stb_compress`] (or the C `binary_to_compressed` tool).
pub fn stb_decompress(input: &[u8]) -> Result<Vec<u8>, DecompressError> {
    let header = input
        .get(..HEADER_LEN)
        .ok_or(DecompressError::Truncated(0))?;
    if u32::from_be_bytes([header[0], header[1], header[2], header[3]]) != MAGIC {
        return Err(DecompressError::BadMagic);
    }
    if header[4..8] != [0, 0, 0, 0] {
        return Err(DecompressError::TooLarge);
    }
    let out_len = stb_decompress_length(input).ok_or(DecompressError::Truncated(8))?;

    let mut d = Decoder {
        input,
        pos: HEADER_LEN,
        out: Vec::with_capacity(out_len),
        out_len,
    };
    while d.token()? {}

    if d.out.len() != out_len {
        return Err(DecompressError::LengthMismatch {
            expected: out_len,
            actual: d.out.len(),
        });
    }
    let sum = input
        .get(d.pos + 2..d.pos + 6)
        .ok_or(DecompressError::Truncated(d.pos))?;
    let expected = u32::from_be_bytes([sum[0], sum[1], sum[2], sum[3]]);
    let actual = adler32(1, &d.out);
    if expected != actual {
        return Err(DecompressError::ChecksumMismatch { expected, actual });
    }
    Ok(d.out)
}

fn emit_literals(out: &mut Vec<u8>, mut lit: &[u8]) {
    while !lit.is_empty() {
        let n = lit.len().min(0x1_0000);
        let l = (n - 1) as u32;
        if n <= 32 {
            out.push(0x20 + l as u8);
        } else if n <= 0x800 {
            out.extend_from_slice(&(0x0800 + l as u16).to_be_bytes());
        } else {
            out.push(0x07);
            out.extend_from_slice(&(l as u16).to_be_bytes());
        }
        out.extend_from_slice(&lit[..n]);
        lit = &lit[n..];
    }
}

fn emit_match(out: &mut Vec<u8>, dist: usize, len: usize) {
    let d = (dist - 1) as u32;
    let l = (len - 1) as u32;
    if len <= 128 && dist <= 256 {
        out.push(0x80 + l as u8);
        out.push(d as u8);
    } else if len <= 256 && dist <= 0x4000 {
        out.extend_from_slice(&(0x4000 + d as u16).to_be_bytes());
        out.push(l as u8);
    } else if len <= 256 {
        out.extend_from_slice(&(0x18_0000 + d).to_be_bytes()[1..]);
        out.push(l as u8);
    } else {
        out.extend_from_slice(&(0x10_0000 + d).to_be_bytes()[1..]);
        out.extend_from_slice(&(l as u16).to_be_bytes());
    }
}

/// Greedy compressor producing streams [`stb_decompress`] accepts.
pub fn stb_compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + data.len() + data.len() / 16 + 8);
    out.extend_from_slice(&MAGIC.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&(ENCODE_WINDOW as u32).to_be_bytes());

    // Most recent position of every 3-byte prefix.
    let mut last_seen: std::collections::HashMap<[u8; 3], usize> = std::collections::HashMap::new();
    let mut lit_start = 0;
    let mut i = 0;
    while i < data.len() {
        let mut best = (0, 0);
        if i + 3 <= data.len() {
            let key = [data[i], data[i + 1], data[i + 2]];
            if let Some(&cand) = last_seen.get(&key) {
                if i - cand <= ENCODE_WINDOW {
                    let max = (data.len() - i).min(ENCODE_MAX_MATCH);
                    let len = (0..max).take_while(|&k| data[cand + k] == data[i + k]).count();
                    best = (i - cand, len);
                }
            }
            last_seen.insert(key, i);
        }

        let (dist, len) = best;
        if len >= ENCODE_MIN_MATCH {
            emit_literals(&mut out, &data[lit_start..i]);
            emit_match(&mut out, dist, len);
            for j in i + 1..(i + len).min(data.len().saturating_sub(2)) {
                last_seen.insert([data[j], data[j + 1], data[j + 2]], j);
            }
            i += len;
            lit_start = i;
        } else {
            i += 1;
        }
    }
    emit_literals(&mut out, &data[lit_start..]);

    out.extend_from_slice(&[0x05, 0xfa]);
    out.extend_from_slice(&adler32(1, data).to_be_bytes());
    out
}

#[inline]
fn decode85_byte(c: u8) -> Result<u32, DecompressError> {
    match c {
        b'#'..=b'[' => Ok(u32::from(c) - 35),
        b']'..=b'x' => Ok(u32::from(c) - 36),
        _ => Err(DecompressError::Base85Char(char::from(c))),
    }
}

#[inline]
fn encode85_byte(x: u32) -> u8 {
    let x = (x % 85) as u8 + 35;
    if x >= b'\\' {
        x + 1
    } else {
        x
    }
}

/// Decode base85 text: every 5 characters give 4 little-endian bytes.
pub fn decode_base85(text: &str) -> Result<Vec<u8>, DecompressError> {
    let src = text.as_bytes();
    if src.len() % 5 != 0 {
        return Err(DecompressError::Base85Length(src.len()));
    }
    let mut out = Vec::with_capacity(src.len() / 5 * 4);
    for chunk in src.chunks_exact(5) {
        let mut value = 0u64;
        for &c in chunk.iter().rev() {
            value = value * 85 + u64::from(decode85_byte(c)?);
        }
        let value = u32::try_from(value).map_err(|_| DecompressError::Base85Char(char::from(chunk[4])))?;
        out.extend_from_slice(&value.to_le_bytes());
    }
    Ok(out)
}

/// Encode bytes as base85, zero-padding the input to a multiple of 4.
pub fn encode_base85(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() + 3) / 4 * 5);
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        let mut d = u32::from_le_bytes(word);
        for _ in 0..5 {
            out.push(char::from(encode85_byte(d)));
            d /= 85;
        }
    }
    out
}

/// Compress then base85-encode, ready to paste into source.
pub fn compress_to_base85(data: &[u8]) -> String {
    encode_base85(&stb_compress(data))
}

/// Undo [`compress_to_base85`].
pub fn decompress_base85(text: &str) -> Result<Vec<u8>, DecompressError> {
    stb_decompress(&decode_base85(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stream(len: u32, body: &[u8], expected: &[u8]) -> Vec<u8> {
        let mut s = vec![0x57, 0xbc, 0, 0, 0, 0, 0, 0];
        s.extend_from_slice(&len.to_be_bytes());
        s.extend_from_slice(&[0, 0, 0, 0]);
        s.extend_from_slice(body);
        s.extend_from_slice(&[0x05, 0xfa]);
        s.extend_from_slice(&adler32(1, expected).to_be_bytes());
        s
    }

    #[test]
    fn test_adler32_known_value() {
        assert_eq!(adler32(1, b"Wikipedia"), 0x11E6_0398);
        assert_eq!(adler32(1, &[]), 1);
    }

    #[test]
    fn test_short_literal_and_near_match() {
        // literal "ab", then copy 4 bytes from distance 2
        let s = stream(6, &[0x21, b'a', b'b', 0x83, 0x01], b"ababab");
        assert_eq!(stb_decompress(&s).unwrap(), b"ababab");
    }

    #[test]
    fn test_long_form_tokens() {
        let mut expected = b"xyz".to_vec();
        expected.extend_from_slice(b"xyzxyz");
        expected.extend_from_slice(b"xyzx");
        // 0x07 literal (3 bytes), 0x06 match (dist 3, len 6), 0x04 match (dist 3, len 4)
        let body = [0x07, 0x00, 0x02, b'x', b'y', b'z', 0x06, 0, 0, 2, 5, 0x04, 0, 0, 2, 0, 3];
        let s = stream(expected.len() as u32, &body, &expected);
        assert_eq!(stb_decompress(&s).unwrap(), expected);
    }

    #[test]
    fn test_bad_magic_and_checksum() {
        let mut s = stream(2, &[0x21, b'h', b'i'], b"hi");
        assert!(stb_decompress(&s).is_ok());
        let n = s.len();
        s[n - 1] ^= 0xff;
        assert!(matches!(stb_decompress(&s), Err(DecompressError::ChecksumMismatch { .. })));
        s[0] = 0;
        assert_eq!(stb_decompress(&s), Err(DecompressError::BadMagic));
    }

    #[test]
    fn test_match_before_start_is_rejected() {
        let s = stream(4, &[0x83, 0x05], b"aaaa");
        assert_eq!(stb_decompress(&s), Err(DecompressError::MatchOutOfRange));
    }

    #[test]
    fn test_output_overrun_is_rejected() {
        let s = stream(1, &[0x21, b'h', b'i'], b"h");
        assert_eq!(stb_decompress(&s), Err(DecompressError::Overrun(1)));
    }

    #[test]
    fn test_truncated_stream() {
        let s = stream(2, &[0x21, b'h', b'i'], b"hi");
        assert!(matches!(stb_decompress(&s[..18]), Err(DecompressError::Truncated(_))));
    }

    #[test]
    fn test_base85_alphabet_skips_backslash() {
        for x in 0..85 {
            let c = encode85_byte(x);
            assert_ne!(c, b'\\');
            assert_eq!(decode85_byte(c).unwrap(), x);
        }
        assert!(decode_base85("\\\\\\\\\\").is_err());
        assert_eq!(decode_base85("abcd"), Err(DecompressError::Base85Length(4)));
    }

    #[test]
    fn test_compressor_finds_repeats() {
        let data = b"the quick brown fox ".repeat(50);
        let packed = stb_compress(&data);
        assert!(packed.len() < data.len() / 4);
        assert_eq!(stb_decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_long_literal_runs() {
        // Bytes with no 3-byte repeats force the long literal forms.
        let data: Vec<u8> = (0..5000u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
        assert_eq!(stb_decompress(&stb_compress(&data)).unwrap(), data);
    }

    proptest! {
        #[test]
        fn prop_base85_compressed_round_trip(data in prop::collection::vec(0u8..4, 0..3000)) {
            let text = compress_to_base85(&data);
            prop_assert_eq!(decompress_base85(&text).unwrap(), data);
        }
    }
}
