//! Data shared by every draw list of a context.
//!
//! Read-only while a frame is being drawn. The owning context rebuilds it between
//! frames and hands each draw list a fresh `Arc` on reset.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::flags::DrawListFlags;
use crate::font::Font;
use crate::primitives::{Vec2, Vec4};

/// Samples in the precomputed unit circle used by the fast arc path.
pub const ARC_FAST_TABLE_SIZE: usize = 48;
pub const ARC_FAST_SAMPLE_MAX: usize = ARC_FAST_TABLE_SIZE;

pub const CIRCLE_AUTO_SEGMENT_MIN: u32 = 3;
/// Upper clamp for both automatic and explicit circle segment counts.
pub const CIRCLE_AUTO_SEGMENT_MAX: u32 = 512;
/// Radii below this read their segment count from the cache.
pub const CIRCLE_SEGMENT_CACHE_SIZE: usize = 64;

/// Widest line that can use the baked anti-aliased line strips.
pub const TEX_LINES_WIDTH_MAX: usize = 63;

pub const DEFAULT_CURVE_TESSELLATION_TOL: f32 = 1.25;
pub const DEFAULT_CIRCLE_SEGMENT_MAX_ERROR: f32 = 1.60;

/// Segment count that keeps a circle of `radius` within `max_error` pixels of the true curve.
pub fn circle_auto_segment_calc(radius: f32, max_error: f32) -> u32 {
    if radius <= 0.0 {
        return CIRCLE_AUTO_SEGMENT_MIN;
    }
    let n = (PI / (1.0 - max_error.min(radius) / radius).acos()).ceil();
    (n as u32).clamp(CIRCLE_AUTO_SEGMENT_MIN, CIRCLE_AUTO_SEGMENT_MAX)
}

/// Radius at which `segments` samples are just enough for `max_error`.
pub fn circle_auto_segment_calc_radius(segments: usize, max_error: f32) -> f32 {
    max_error / (1.0 - (PI / (segments as f32).max(PI)).cos())
}

#[derive(Clone, Debug)]
pub struct SharedData {
    /// UV of a fully opaque white texel in the font atlas.
    pub tex_uv_white_pixel: Vec2,
    /// UVs of the baked line strips, indexed by integer thickness.
    pub tex_uv_lines: Vec<Vec4>,
    pub font: Option<Arc<Font>>,
    pub font_size: f32,
    pub curve_tessellation_tol: f32,
    pub(crate) circle_segment_max_error: f32,
    /// `(x1, y1, x2, y2)` covering the whole display.
    pub clip_rect_fullscreen: Vec4,
    /// Flags every draw list starts a frame with.
    pub initial_flags: DrawListFlags,
    pub diagnostics: Diagnostics,
    pub(crate) arc_fast_vtx: [Vec2; ARC_FAST_TABLE_SIZE],
    pub(crate) arc_fast_radius_cutoff: f32,
    pub(crate) circle_segment_counts: [u8; CIRCLE_SEGMENT_CACHE_SIZE],
}

impl Default for SharedData {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedData {
    pub fn new() -> Self {
        let mut arc_fast_vtx = [Vec2::ZERO; ARC_FAST_TABLE_SIZE];
        for (i, v) in arc_fast_vtx.iter_mut().enumerate() {
            let a = i as f32 * 2.0 * PI / ARC_FAST_TABLE_SIZE as f32;
            *v = Vec2::new(a.cos(), a.sin());
        }
        let mut data = Self {
            tex_uv_white_pixel: Vec2::ZERO,
            tex_uv_lines: Vec::new(),
            font: None,
            font_size: 0.0,
            curve_tessellation_tol: DEFAULT_CURVE_TESSELLATION_TOL,
            circle_segment_max_error: 0.0,
            clip_rect_fullscreen: Vec4::new(-8192.0, -8192.0, 8192.0, 8192.0),
            initial_flags: DrawListFlags::empty(),
            diagnostics: Diagnostics::default(),
            arc_fast_vtx,
            arc_fast_radius_cutoff: 0.0,
            circle_segment_counts: [0; CIRCLE_SEGMENT_CACHE_SIZE],
        };
        data.set_circle_tessellation_max_error(DEFAULT_CIRCLE_SEGMENT_MAX_ERROR);
        data
    }

    pub fn circle_segment_max_error(&self) -> f32 {
        self.circle_segment_max_error
    }

    pub fn arc_fast_radius_cutoff(&self) -> f32 {
        self.arc_fast_radius_cutoff
    }

    pub fn circle_segment_counts(&self) -> &[u8; CIRCLE_SEGMENT_CACHE_SIZE] {
        &self.circle_segment_counts
    }

    pub fn arc_fast_vtx(&self) -> &[Vec2; ARC_FAST_TABLE_SIZE] {
        &self.arc_fast_vtx
    }

    /// Change the tolerated circle error and rebuild everything derived from it.
    pub fn set_circle_tessellation_max_error(&mut self, max_error: f32) {
        if self.circle_segment_max_error == max_error {
            return;
        }
        debug_assert!(max_error > 0.0);
        self.circle_segment_max_error = max_error;
        for (i, count) in self.circle_segment_counts.iter_mut().enumerate() {
            *count = if i > 0 {
                circle_auto_segment_calc(i as f32, max_error).min(u8::MAX as u32) as u8
            } else {
                0
            };
        }
        self.arc_fast_radius_cutoff = circle_auto_segment_calc_radius(ARC_FAST_SAMPLE_MAX, max_error);
    }

    /// Automatic segment count for a circle of `radius`.
    pub fn calc_circle_auto_segment_count(&self, radius: f32) -> u32 {
        // Round up so the cache never reduces accuracy.
        let radius_idx = (radius + 0.999999) as usize;
        if radius_idx < CIRCLE_SEGMENT_CACHE_SIZE {
            self.circle_segment_counts[radius_idx] as u32
        } else {
            circle_auto_segment_calc(radius, self.circle_segment_max_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_formula_matches_cache() {
        let data = SharedData::new();
        for r in 1..CIRCLE_SEGMENT_CACHE_SIZE {
            let expected = circle_auto_segment_calc(r as f32, DEFAULT_CIRCLE_SEGMENT_MAX_ERROR);
            assert_eq!(data.circle_segment_counts()[r] as u32, expected);
            assert!(expected >= 3);
        }
        assert_eq!(data.circle_segment_counts()[0], 0);
    }

    #[test]
    fn test_segment_count_grows_with_radius() {
        let data = SharedData::new();
        let small = data.calc_circle_auto_segment_count(4.0);
        let large = data.calc_circle_auto_segment_count(200.0);
        assert!(small < large);
        assert_eq!(large, circle_auto_segment_calc(200.0, DEFAULT_CIRCLE_SEGMENT_MAX_ERROR));
    }

    #[test]
    fn test_max_error_rebuilds_cache_and_cutoff() {
        let mut data = SharedData::new();
        let before = data.circle_segment_counts()[30];
        let cutoff_before = data.arc_fast_radius_cutoff();
        data.set_circle_tessellation_max_error(0.3);
        assert!(data.circle_segment_counts()[30] > before);
        assert!(data.arc_fast_radius_cutoff() < cutoff_before);
        // 48 samples suffice at the cutoff radius, up to float rounding in ceil()
        let at_cutoff = circle_auto_segment_calc(data.arc_fast_radius_cutoff(), 0.3);
        assert!(at_cutoff <= ARC_FAST_SAMPLE_MAX as u32 + 1);
        let inside = circle_auto_segment_calc(data.arc_fast_radius_cutoff() * 0.9, 0.3);
        assert!(inside <= ARC_FAST_SAMPLE_MAX as u32);
    }

    #[test]
    fn test_unit_circle_table() {
        let data = SharedData::new();
        assert!((data.arc_fast_vtx()[0] - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert!((data.arc_fast_vtx()[12] - Vec2::new(0.0, 1.0)).length() < 1e-5);
        for v in data.arc_fast_vtx() {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }
}
