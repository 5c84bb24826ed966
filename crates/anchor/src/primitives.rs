pub use glam::{Vec2, Vec4};

/// Axis-aligned rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Build from an `(x1, y1, x2, y2)` clip rectangle.
    pub fn from_vec4(v: Vec4) -> Self {
        Self::new(Vec2::new(v.x, v.y), Vec2::new(v.z, v.w))
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.min.x, self.min.y, self.max.x, self.max.y)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x < self.max.x && p.y < self.max.y
    }

    pub fn contains_rect(&self, r: &Rect) -> bool {
        r.min.x >= self.min.x && r.min.y >= self.min.y && r.max.x <= self.max.x && r.max.y <= self.max.y
    }

    pub fn overlaps(&self, r: &Rect) -> bool {
        r.min.y < self.max.y && r.max.y > self.min.y && r.min.x < self.max.x && r.max.x > self.min.x
    }

    pub fn expand(&self, amount: f32) -> Self {
        Self::new(self.min - Vec2::splat(amount), self.max + Vec2::splat(amount))
    }

    pub fn translate(&self, d: Vec2) -> Self {
        Self::new(self.min + d, self.max + d)
    }

    /// Intersection; the result may be inverted when the rects don't overlap.
    pub fn clip_with(&self, r: &Rect) -> Self {
        Self::new(self.min.max(r.min), self.max.min(r.max))
    }

    /// Intersection that never inverts: `max` is pulled up to `min`.
    pub fn clip_with_full(&self, r: &Rect) -> Self {
        let min = self.min.max(r.min);
        let max = self.max.min(r.max).max(min);
        Self::new(min, max)
    }

    /// Rect with zero area on either axis.
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    pub fn floor(&self) -> Self {
        Self::new(self.min.floor(), self.max.floor())
    }
}

#[inline]
pub(crate) fn inv_length(v: Vec2, fail_value: f32) -> f32 {
    let d = v.length_squared();
    if d > 0.0 {
        1.0 / d.sqrt()
    } else {
        fail_value
    }
}

/// Normalize in place unless the vector has zero length.
#[inline]
pub(crate) fn normalize_over_zero(v: Vec2) -> Vec2 {
    let d2 = v.length_squared();
    if d2 > 0.0 {
        v / d2.sqrt()
    } else {
        v
    }
}

pub(crate) const FIX_NORMAL_MAX_INV_LEN2: f32 = 100.0;

/// Scale an averaged joint normal by `1/len²` (clamped), leaving tiny ones alone.
#[inline]
pub(crate) fn fix_normal(n: Vec2) -> Vec2 {
    let d2 = n.length_squared();
    if d2 > 0.000001 {
        let inv_len2 = (1.0 / d2).min(FIX_NORMAL_MAX_INV_LEN2);
        n * inv_len2
    } else {
        n
    }
}

pub fn bezier_cubic_calc(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    let w1 = u * u * u;
    let w2 = 3.0 * u * u * t;
    let w3 = 3.0 * u * t * t;
    let w4 = t * t * t;
    p1 * w1 + p2 * w2 + p3 * w3 + p4 * w4
}

pub fn bezier_quadratic_calc(p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    let w1 = u * u;
    let w2 = 2.0 * u * t;
    let w3 = t * t;
    p1 * w1 + p2 * w2 + p3 * w3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_with_full_never_inverts() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Rect::new(Vec2::new(20.0, 20.0), Vec2::new(30.0, 30.0));
        let c = a.clip_with_full(&b);
        assert!(c.max.x >= c.min.x && c.max.y >= c.min.y);
        assert!(c.is_empty());
    }

    #[test]
    fn test_fix_normal_clamps_sharp_joints() {
        let n = fix_normal(Vec2::new(0.01, 0.0));
        assert!((n.x - 1.0).abs() < 1e-6);
        let tiny = Vec2::new(0.0001, 0.0);
        assert_eq!(fix_normal(tiny), tiny);
    }

    #[test]
    fn test_bezier_endpoints() {
        let p1 = Vec2::new(0.0, 0.0);
        let p4 = Vec2::new(10.0, 5.0);
        let c = bezier_cubic_calc(p1, Vec2::new(3.0, 9.0), Vec2::new(7.0, -4.0), p4, 1.0);
        assert!((c - p4).length() < 1e-5);
        let q = bezier_quadratic_calc(p1, Vec2::new(5.0, 5.0), p4, 0.0);
        assert_eq!(q, p1);
    }
}
