//! Packed `u32` colors and their float counterparts.
//!
//! Draw lists store colors as a single `u32` per vertex. The default byte order is
//! `R | G << 8 | B << 16 | A << 24`; the `bgra` feature swaps the red and blue
//! channels so backends that expect BGRA vertex colors can read them directly.

#[cfg(not(feature = "bgra"))]
pub const COL32_R_SHIFT: u32 = 0;
#[cfg(not(feature = "bgra"))]
pub const COL32_B_SHIFT: u32 = 16;

#[cfg(feature = "bgra")]
pub const COL32_R_SHIFT: u32 = 16;
#[cfg(feature = "bgra")]
pub const COL32_B_SHIFT: u32 = 0;

pub const COL32_G_SHIFT: u32 = 8;
pub const COL32_A_SHIFT: u32 = 24;
pub const COL32_A_MASK: u32 = 0xFF00_0000;

/// Pack four 8-bit channels according to the configured byte order.
#[inline]
pub const fn col32(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << COL32_A_SHIFT)
        | ((b as u32) << COL32_B_SHIFT)
        | ((g as u32) << COL32_G_SHIFT)
        | ((r as u32) << COL32_R_SHIFT)
}

pub const COL32_WHITE: u32 = col32(255, 255, 255, 255);
pub const COL32_BLACK: u32 = col32(0, 0, 0, 255);
pub const COL32_BLACK_TRANS: u32 = col32(0, 0, 0, 0);

/// Alpha channel of a packed color.
#[inline]
pub const fn col32_alpha(col: u32) -> u32 {
    (col >> COL32_A_SHIFT) & 0xFF
}

/// Same color with the alpha channel zeroed; used for anti-aliased fringes.
#[inline]
pub const fn col32_transparent(col: u32) -> u32 {
    col & !COL32_A_MASK
}

/// RGBA color with straight (non-premultiplied) channels in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Build from 8-bit channels.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Unpack a color produced by [`col32`].
    pub fn from_u32(col: u32) -> Self {
        color_convert_u32_to_float4(col)
    }

    /// Pack into the vertex color format.
    pub fn to_u32(self) -> u32 {
        color_convert_float4_to_u32(self)
    }

    /// Build from hue/saturation/value, all in [0, 1].
    pub fn from_hsv(h: f32, s: f32, v: f32, a: f32) -> Self {
        let (r, g, b) = color_convert_hsv_to_rgb(h, s, v);
        Self::new(r, g, b, a)
    }

    /// Hue/saturation/value of the RGB channels.
    pub fn to_hsv(self) -> (f32, f32, f32) {
        color_convert_rgb_to_hsv(self.r, self.g, self.b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Scale alpha by `factor`, as done for style alpha and disabled widgets.
    pub fn mul_alpha(mut self, factor: f32) -> Self {
        self.a *= factor;
        self
    }
}

impl From<u32> for Color {
    fn from(col: u32) -> Self {
        Self::from_u32(col)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_u32()
    }
}

#[inline]
fn f32_to_u8_sat(v: f32) -> u32 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32
}

pub fn color_convert_u32_to_float4(col: u32) -> Color {
    let s = 1.0 / 255.0;
    Color::new(
        ((col >> COL32_R_SHIFT) & 0xFF) as f32 * s,
        ((col >> COL32_G_SHIFT) & 0xFF) as f32 * s,
        ((col >> COL32_B_SHIFT) & 0xFF) as f32 * s,
        ((col >> COL32_A_SHIFT) & 0xFF) as f32 * s,
    )
}

pub fn color_convert_float4_to_u32(color: Color) -> u32 {
    (f32_to_u8_sat(color.r) << COL32_R_SHIFT)
        | (f32_to_u8_sat(color.g) << COL32_G_SHIFT)
        | (f32_to_u8_sat(color.b) << COL32_B_SHIFT)
        | (f32_to_u8_sat(color.a) << COL32_A_SHIFT)
}

/// RGB in [0, 1] to HSV in [0, 1].
pub fn color_convert_rgb_to_hsv(mut r: f32, mut g: f32, mut b: f32) -> (f32, f32, f32) {
    let mut k = 0.0;
    if g < b {
        std::mem::swap(&mut g, &mut b);
        k = -1.0;
    }
    if r < g {
        std::mem::swap(&mut r, &mut g);
        k = -2.0 / 6.0 - k;
    }
    let chroma = r - g.min(b);
    let h = (k + (g - b) / (6.0 * chroma + 1e-20)).abs();
    let s = chroma / (r + 1e-20);
    (h, s, r)
}

/// HSV in [0, 1] to RGB in [0, 1]. Hue wraps.
pub fn color_convert_hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (v, v, v);
    }
    let h = (h % 1.0) / (60.0 / 360.0);
    let i = h as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Composite `col_b` over `col_a` using `col_b`'s alpha. The result is opaque.
pub fn color_alpha_blend(col_a: u32, col_b: u32) -> u32 {
    let t = col32_alpha(col_b) as f32 / 255.0;
    let lerp = |shift: u32| -> u8 {
        let a = ((col_a >> shift) & 0xFF) as i32;
        let b = ((col_b >> shift) & 0xFF) as i32;
        (a as f32 + (b - a) as f32 * t) as i32 as u8
    };
    let r = lerp(COL32_R_SHIFT);
    let g = lerp(COL32_G_SHIFT);
    let b = lerp(COL32_B_SHIFT);
    col32(r, g, b, 0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constants_follow_byte_order() {
        assert_eq!(col32_alpha(COL32_WHITE), 0xFF);
        assert_eq!(col32_alpha(COL32_BLACK_TRANS), 0);
        assert_eq!(COL32_BLACK, COL32_A_MASK);
        #[cfg(not(feature = "bgra"))]
        assert_eq!(col32(0x11, 0x22, 0x33, 0x44), 0x4433_2211);
        #[cfg(feature = "bgra")]
        assert_eq!(col32(0x11, 0x22, 0x33, 0x44), 0x4411_2233);
    }

    #[test]
    fn test_transparent_keeps_rgb() {
        let c = col32(10, 20, 30, 200);
        assert_eq!(col32_transparent(c), col32(10, 20, 30, 0));
    }

    #[test]
    fn test_hsv_primaries() {
        let (h, s, v) = color_convert_rgb_to_hsv(1.0, 0.0, 0.0);
        assert!(h.abs() < 1e-5);
        assert!((s - 1.0).abs() < 1e-5);
        assert!((v - 1.0).abs() < 1e-5);

        let (r, g, b) = color_convert_hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(r.abs() < 1e-4 && (g - 1.0).abs() < 1e-4 && b.abs() < 1e-4);
    }

    #[test]
    fn test_alpha_blend_endpoints() {
        let red = col32(255, 0, 0, 255);
        let blue = col32(0, 0, 255, 255);
        assert_eq!(color_alpha_blend(red, blue), blue);
        assert_eq!(color_alpha_blend(red, col32(0, 0, 255, 0)), red);
    }

    proptest! {
        #[test]
        fn prop_float4_u32_round_trip(
            r in 0.0f32..=1.0,
            g in 0.0f32..=1.0,
            b in 0.0f32..=1.0,
            a in 0.0f32..=1.0,
        ) {
            let v = Color::new(r, g, b, a);
            let back = Color::from_u32(v.to_u32());
            let eps = 1.0 / 255.0 + 1e-6;
            prop_assert!((back.r - v.r).abs() <= eps);
            prop_assert!((back.g - v.g).abs() <= eps);
            prop_assert!((back.b - v.b).abs() <= eps);
            prop_assert!((back.a - v.a).abs() <= eps);
        }

        #[test]
        fn prop_u32_float4_exact(col in any::<u32>()) {
            prop_assert_eq!(Color::from_u32(col).to_u32(), col);
        }
    }
}
