//! Shape tessellation on top of the [`DrawList`] writers.
//!
//! Strokes and fills are built from a point path. Anti-aliasing adds a one pixel
//! (times the fringe scale) band whose outer vertices have zero alpha.

use std::f32::consts::PI;
use std::ops::Range;

use crate::color::{COL32_A_MASK, COL32_B_SHIFT, COL32_G_SHIFT, COL32_R_SHIFT};
use crate::draw_list::DrawList;
use crate::flags::{DrawFlags, DrawListFlags};
use crate::primitives::{fix_normal, normalize_over_zero, Vec2};
use crate::shared::{ARC_FAST_SAMPLE_MAX, ARC_FAST_TABLE_SIZE, CIRCLE_AUTO_SEGMENT_MAX, TEX_LINES_WIDTH_MAX};
use crate::vertex::{DrawIdx, DRAW_IDX_LIMIT};

const BEZIER_MAX_LEVEL: u32 = 10;

impl DrawList {
    // Path

    #[inline]
    pub fn path_clear(&mut self) {
        self.path.clear();
    }

    #[inline]
    pub fn path_line_to(&mut self, pos: Vec2) {
        self.path.push(pos);
    }

    pub fn path_line_to_merge_duplicate(&mut self, pos: Vec2) {
        if self.path.last() != Some(&pos) {
            self.path.push(pos);
        }
    }

    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    /// Fill the path as a convex polygon and clear it.
    pub fn path_fill_convex(&mut self, col: u32) {
        let path = std::mem::take(&mut self.path);
        self.add_convex_poly_filled(&path, col);
        self.path = path;
        self.path.clear();
    }

    /// Stroke the path and clear it.
    pub fn path_stroke(&mut self, col: u32, flags: DrawFlags, thickness: f32) {
        let path = std::mem::take(&mut self.path);
        self.add_polyline(&path, col, flags, thickness);
        self.path = path;
        self.path.clear();
    }

    /// Arc around `center` from `a_min` to `a_max` radians.
    ///
    /// With `num_segments == 0` small radii sample the precomputed circle table and
    /// larger ones pick a segment count from the circle tolerance.
    pub fn path_arc_to(&mut self, center: Vec2, radius: f32, a_min: f32, a_max: f32, num_segments: u32) {
        if radius <= 0.0 {
            self.path.push(center);
            return;
        }
        if num_segments > 0 {
            self.path_arc_to_n(center, radius, a_min, a_max, num_segments);
            return;
        }

        if radius <= self.data.arc_fast_radius_cutoff {
            let reverse = a_max < a_min;
            let sample_max = ARC_FAST_SAMPLE_MAX as f32;
            let a_min_sample_f = sample_max * a_min / (PI * 2.0);
            let a_max_sample_f = sample_max * a_max / (PI * 2.0);

            let a_min_sample = if reverse { a_min_sample_f.floor() } else { a_min_sample_f.ceil() } as i32;
            let a_max_sample = if reverse { a_max_sample_f.ceil() } else { a_max_sample_f.floor() } as i32;
            let a_mid_samples = if reverse {
                (a_min_sample - a_max_sample).max(0)
            } else {
                (a_max_sample - a_min_sample).max(0)
            };

            let a_min_segment_angle = a_min_sample as f32 * PI * 2.0 / sample_max;
            let a_max_segment_angle = a_max_sample as f32 * PI * 2.0 / sample_max;
            let emit_start = a_min_segment_angle - a_min != 0.0;
            let emit_end = a_max - a_max_segment_angle != 0.0;

            if emit_start {
                self.path.push(center + Vec2::new(a_min.cos(), a_min.sin()) * radius);
            }
            if a_mid_samples > 0 {
                self.path_arc_to_fast_ex(center, radius, a_min_sample, a_max_sample, 0);
            }
            if emit_end {
                self.path.push(center + Vec2::new(a_max.cos(), a_max.sin()) * radius);
            }
        } else {
            let arc_length = (a_max - a_min).abs();
            let circle_segments = self.data.calc_circle_auto_segment_count(radius) as f32;
            let arc_segments = ((circle_segments * arc_length / (PI * 2.0)).ceil() as u32)
                .max((2.0 * PI / arc_length) as u32)
                .min(CIRCLE_AUTO_SEGMENT_MAX);
            self.path_arc_to_n(center, radius, a_min, a_max, arc_segments);
        }
    }

    /// Arc in twelfths of a turn (0 = +x, 3 = +y), sampled from the circle table.
    pub fn path_arc_to_fast(&mut self, center: Vec2, radius: f32, a_min_of_12: i32, a_max_of_12: i32) {
        if radius <= 0.0 {
            self.path.push(center);
            return;
        }
        let per_12 = ARC_FAST_SAMPLE_MAX as i32 / 12;
        self.path_arc_to_fast_ex(center, radius, a_min_of_12 * per_12, a_max_of_12 * per_12, 0);
    }

    /// Emit table samples `a_min_sample..=a_max_sample` (either direction, wrapping).
    ///
    /// `a_step == 0` picks the stride from the radius. When the range isn't a multiple
    /// of the stride the end sample is emitted anyway and the first step is shortened.
    pub(crate) fn path_arc_to_fast_ex(
        &mut self,
        center: Vec2,
        radius: f32,
        a_min_sample: i32,
        a_max_sample: i32,
        a_step: i32,
    ) {
        if radius <= 0.0 {
            self.path.push(center);
            return;
        }
        let table_max = ARC_FAST_SAMPLE_MAX as i32;

        let mut a_step = if a_step <= 0 {
            table_max / self.data.calc_circle_auto_segment_count(radius).max(1) as i32
        } else {
            a_step
        };
        a_step = a_step.clamp(1, ARC_FAST_TABLE_SIZE as i32 / 4);

        let sample_range = (a_max_sample - a_min_sample).abs();
        let a_next_step = a_step;
        let mut extra_max_sample = false;
        if a_step > 1 {
            let overstep = sample_range % a_step;
            if overstep > 0 {
                extra_max_sample = true;
                // Split the shortfall between the first and last steps.
                if sample_range > 0 {
                    a_step -= (a_step - overstep) / 2;
                }
            }
        }

        let mut sample_index = a_min_sample.rem_euclid(table_max);
        let table = self.data.arc_fast_vtx;
        if a_max_sample >= a_min_sample {
            let mut a = a_min_sample;
            while a <= a_max_sample {
                if sample_index >= table_max {
                    sample_index -= table_max;
                }
                self.path.push(center + table[sample_index as usize] * radius);
                a += a_step;
                sample_index += a_step;
                a_step = a_next_step;
            }
        } else {
            let mut a = a_min_sample;
            while a >= a_max_sample {
                if sample_index < 0 {
                    sample_index += table_max;
                }
                self.path.push(center + table[sample_index as usize] * radius);
                a -= a_step;
                sample_index -= a_step;
                a_step = a_next_step;
            }
        }

        if extra_max_sample {
            let normalized = a_max_sample.rem_euclid(table_max);
            self.path.push(center + table[normalized as usize] * radius);
        }
    }

    fn path_arc_to_n(&mut self, center: Vec2, radius: f32, a_min: f32, a_max: f32, num_segments: u32) {
        if radius <= 0.0 {
            self.path.push(center);
            return;
        }
        self.path.reserve(num_segments as usize + 1);
        for i in 0..=num_segments {
            let a = a_min + (i as f32 / num_segments as f32) * (a_max - a_min);
            self.path.push(center + Vec2::new(a.cos(), a.sin()) * radius);
        }
    }

    /// Cubic Bézier from the last path point. `num_segments == 0` subdivides adaptively.
    pub fn path_bezier_cubic_curve_to(&mut self, p2: Vec2, p3: Vec2, p4: Vec2, num_segments: u32) {
        let Some(&p1) = self.path.last() else {
            return;
        };
        if num_segments == 0 {
            let tol = self.data.curve_tessellation_tol;
            bezier_cubic_casteljau(&mut self.path, p1, p2, p3, p4, tol, 0);
        } else {
            let t_step = 1.0 / num_segments as f32;
            for i in 1..=num_segments {
                self.path
                    .push(crate::primitives::bezier_cubic_calc(p1, p2, p3, p4, t_step * i as f32));
            }
        }
    }

    pub fn path_bezier_quadratic_curve_to(&mut self, p2: Vec2, p3: Vec2, num_segments: u32) {
        let Some(&p1) = self.path.last() else {
            return;
        };
        if num_segments == 0 {
            let tol = self.data.curve_tessellation_tol;
            bezier_quadratic_casteljau(&mut self.path, p1, p2, p3, tol, 0);
        } else {
            let t_step = 1.0 / num_segments as f32;
            for i in 1..=num_segments {
                self.path
                    .push(crate::primitives::bezier_quadratic_calc(p1, p2, p3, t_step * i as f32));
            }
        }
    }

    /// Rectangle outline, with rounded corners per `flags`.
    ///
    /// Rounding is clamped so opposite arcs never overlap.
    pub fn path_rect(&mut self, a: Vec2, b: Vec2, rounding: f32, flags: DrawFlags) {
        let flags = flags.fix_rect_corner_flags();
        let halve_x = flags.contains(DrawFlags::ROUND_CORNERS_TOP) || flags.contains(DrawFlags::ROUND_CORNERS_BOTTOM);
        let halve_y = flags.contains(DrawFlags::ROUND_CORNERS_LEFT) || flags.contains(DrawFlags::ROUND_CORNERS_RIGHT);
        let mut rounding = rounding.min((b.x - a.x).abs() * if halve_x { 0.5 } else { 1.0 } - 1.0);
        rounding = rounding.min((b.y - a.y).abs() * if halve_y { 0.5 } else { 1.0 } - 1.0);

        if rounding <= 0.0 || flags & DrawFlags::ROUND_CORNERS_MASK == DrawFlags::ROUND_CORNERS_NONE {
            self.path.push(a);
            self.path.push(Vec2::new(b.x, a.y));
            self.path.push(b);
            self.path.push(Vec2::new(a.x, b.y));
            return;
        }

        let corner = |bit: DrawFlags| if flags.contains(bit) { rounding } else { 0.0 };
        let tl = corner(DrawFlags::ROUND_CORNERS_TOP_LEFT);
        let tr = corner(DrawFlags::ROUND_CORNERS_TOP_RIGHT);
        let br = corner(DrawFlags::ROUND_CORNERS_BOTTOM_RIGHT);
        let bl = corner(DrawFlags::ROUND_CORNERS_BOTTOM_LEFT);
        self.path_arc_to_fast(Vec2::new(a.x + tl, a.y + tl), tl, 6, 9);
        self.path_arc_to_fast(Vec2::new(b.x - tr, a.y + tr), tr, 9, 12);
        self.path_arc_to_fast(Vec2::new(b.x - br, b.y - br), br, 0, 3);
        self.path_arc_to_fast(Vec2::new(a.x + bl, b.y - bl), bl, 3, 6);
    }

    // Polylines and fills

    fn polyline_vtx_per_point(&self, thickness: f32) -> usize {
        if !self.flags.contains(DrawListFlags::ANTI_ALIASED_LINES) {
            return 4;
        }
        if self.polyline_uses_texture(thickness) {
            2
        } else if thickness.max(1.0) > self.fringe_scale {
            4
        } else {
            3
        }
    }

    fn polyline_uses_texture(&self, thickness: f32) -> bool {
        let thickness = thickness.max(1.0);
        let integer = thickness as usize;
        self.flags.contains(DrawListFlags::ANTI_ALIASED_LINES_USE_TEX)
            && integer < TEX_LINES_WIDTH_MAX
            && integer < self.data.tex_uv_lines.len()
            && thickness - integer as f32 <= 0.00001
            && self.fringe_scale == 1.0
    }

    /// Stroke a polyline. `DrawFlags::CLOSED` joins the last point back to the first.
    ///
    /// Lines too long for one 16-bit index range are stroked in chunks that share
    /// their end points, so only the range that doesn't fit is lost when vertex
    /// offsets are unavailable. Chunk ends are mitered against the neighbouring
    /// segments; a closed line is unrolled with its first point repeated at the end.
    pub fn add_polyline(&mut self, points: &[Vec2], col: u32, flags: DrawFlags, thickness: f32) {
        if points.len() < 2 || col & COL32_A_MASK == 0 {
            return;
        }
        let closed = flags.contains(DrawFlags::CLOSED);
        let vtx_per_point = self.polyline_vtx_per_point(thickness);
        if std::mem::size_of::<DrawIdx>() > 2 || points.len() * vtx_per_point < DRAW_IDX_LIMIT {
            self.stroke_polyline(points, col, closed, thickness, None, None);
            return;
        }

        let unrolled: Vec<Vec2>;
        let points = if closed {
            unrolled = points.iter().copied().chain(std::iter::once(points[0])).collect();
            &unrolled[..]
        } else {
            points
        };
        let segments = points.len() - 1;
        let segment_normal = |i: usize| {
            let d = normalize_over_zero(points[i + 1] - points[i]);
            Vec2::new(d.y, -d.x)
        };

        let chunk = ((DRAW_IDX_LIMIT - 1) / vtx_per_point).max(2);
        let mut start = 0;
        while start + 1 < points.len() {
            let end = (start + chunk).min(points.len());
            let before = if start > 0 {
                Some(segment_normal(start - 1))
            } else {
                closed.then(|| segment_normal(segments - 1))
            };
            let after = if end < points.len() {
                Some(segment_normal(end - 1))
            } else {
                closed.then(|| segment_normal(0))
            };
            self.stroke_polyline(&points[start..end], col, false, thickness, before, after);
            start = end - 1;
        }
    }

    /// `before`/`after` are the normals of the segments leading into the first point
    /// and out of the last one, for open strokes that continue another stroke.
    fn stroke_polyline(
        &mut self,
        points: &[Vec2],
        col: u32,
        closed: bool,
        thickness: f32,
        before: Option<Vec2>,
        after: Option<Vec2>,
    ) {
        let points_count = points.len();
        let count = if closed { points_count } else { points_count - 1 };
        let opaque_uv = self.data.tex_uv_white_pixel;

        if !self.flags.contains(DrawListFlags::ANTI_ALIASED_LINES) {
            if !self.prim_reserve(count * 6, count * 4) {
                return;
            }
            for i1 in 0..count {
                let i2 = if i1 + 1 == points_count { 0 } else { i1 + 1 };
                let (p1, p2) = (points[i1], points[i2]);
                let d = normalize_over_zero(p2 - p1) * (thickness * 0.5);
                let idx = self.vtx_current_idx;
                for i in [0, 1, 2, 0, 2, 3] {
                    self.put_idx(idx + i);
                }
                self.put_vtx(Vec2::new(p1.x + d.y, p1.y - d.x), opaque_uv, col);
                self.put_vtx(Vec2::new(p2.x + d.y, p2.y - d.x), opaque_uv, col);
                self.put_vtx(Vec2::new(p2.x - d.y, p2.y + d.x), opaque_uv, col);
                self.put_vtx(Vec2::new(p1.x - d.y, p1.y + d.x), opaque_uv, col);
                self.vtx_current_idx += 4;
            }
            return;
        }

        let aa_size = self.fringe_scale;
        let col_trans = col & !COL32_A_MASK;
        let use_texture = self.polyline_uses_texture(thickness);
        let thickness = thickness.max(1.0);
        let thick_line = thickness > aa_size;

        let (idx_count, vtx_count) = if use_texture {
            (count * 6, points_count * 2)
        } else if thick_line {
            (count * 18, points_count * 4)
        } else {
            (count * 12, points_count * 3)
        };
        if !self.prim_reserve(idx_count, vtx_count) {
            return;
        }

        let mut normals = std::mem::take(&mut self.temp_normals);
        let mut temp = std::mem::take(&mut self.temp_points);
        normals.clear();
        normals.resize(points_count, Vec2::ZERO);
        for i1 in 0..count {
            let i2 = if i1 + 1 == points_count { 0 } else { i1 + 1 };
            let d = normalize_over_zero(points[i2] - points[i1]);
            normals[i1] = Vec2::new(d.y, -d.x);
        }
        if !closed {
            normals[points_count - 1] = after.unwrap_or(normals[points_count - 2]);
        }
        // The end point is written by the segment loop; only the start needs a cap.
        let start_normal = match before {
            Some(n) => fix_normal((n + normals[0]) * 0.5),
            None => normals[0],
        };

        let base = self.vtx_current_idx;
        if use_texture || !thick_line {
            // Two edge vertices per point; the thin path adds the center.
            let half_draw_size = if use_texture { thickness * 0.5 + 1.0 } else { aa_size };
            temp.clear();
            temp.resize(points_count * 2, Vec2::ZERO);
            if !closed {
                temp[0] = points[0] + start_normal * half_draw_size;
                temp[1] = points[0] - start_normal * half_draw_size;
            }

            let stride = if use_texture { 2 } else { 3 };
            let mut idx1 = base;
            for i1 in 0..count {
                let i2 = if i1 + 1 == points_count { 0 } else { i1 + 1 };
                let idx2 = if i1 + 1 == points_count { base } else { idx1 + stride };

                let dm = fix_normal((normals[i1] + normals[i2]) * 0.5) * half_draw_size;
                temp[i2 * 2] = points[i2] + dm;
                temp[i2 * 2 + 1] = points[i2] - dm;

                let indices: &[u32] = if use_texture {
                    &[idx2, idx1, idx1 + 1, idx2 + 1, idx1 + 1, idx2]
                } else {
                    &[
                        idx2,
                        idx1,
                        idx1 + 2,
                        idx1 + 2,
                        idx2 + 2,
                        idx2,
                        idx2 + 1,
                        idx1 + 1,
                        idx1,
                        idx1,
                        idx2,
                        idx2 + 1,
                    ]
                };
                for &i in indices {
                    self.put_idx(i);
                }
                idx1 = idx2;
            }

            if use_texture {
                let uvs = self.data.tex_uv_lines[thickness as usize];
                let (uv0, uv1) = (Vec2::new(uvs.x, uvs.y), Vec2::new(uvs.z, uvs.w));
                for i in 0..points_count {
                    self.put_vtx(temp[i * 2], uv0, col);
                    self.put_vtx(temp[i * 2 + 1], uv1, col);
                }
            } else {
                for (i, &p) in points.iter().enumerate() {
                    self.put_vtx(p, opaque_uv, col);
                    self.put_vtx(temp[i * 2], opaque_uv, col_trans);
                    self.put_vtx(temp[i * 2 + 1], opaque_uv, col_trans);
                }
            }
        } else {
            // Outer fringe, inner edge, inner edge, outer fringe.
            let half_inner = (thickness - aa_size) * 0.5;
            temp.clear();
            temp.resize(points_count * 4, Vec2::ZERO);
            if !closed {
                temp[0] = points[0] + start_normal * (half_inner + aa_size);
                temp[1] = points[0] + start_normal * half_inner;
                temp[2] = points[0] - start_normal * half_inner;
                temp[3] = points[0] - start_normal * (half_inner + aa_size);
            }

            let mut idx1 = base;
            for i1 in 0..count {
                let i2 = if i1 + 1 == points_count { 0 } else { i1 + 1 };
                let idx2 = if i1 + 1 == points_count { base } else { idx1 + 4 };

                let dm = fix_normal((normals[i1] + normals[i2]) * 0.5);
                let dm_out = dm * (half_inner + aa_size);
                let dm_in = dm * half_inner;
                temp[i2 * 4] = points[i2] + dm_out;
                temp[i2 * 4 + 1] = points[i2] + dm_in;
                temp[i2 * 4 + 2] = points[i2] - dm_in;
                temp[i2 * 4 + 3] = points[i2] - dm_out;

                for i in [
                    idx2 + 1,
                    idx1 + 1,
                    idx1 + 2,
                    idx1 + 2,
                    idx2 + 2,
                    idx2 + 1,
                    idx2 + 1,
                    idx1 + 1,
                    idx1,
                    idx1,
                    idx2,
                    idx2 + 1,
                    idx2 + 2,
                    idx1 + 2,
                    idx1 + 3,
                    idx1 + 3,
                    idx2 + 3,
                    idx2 + 2,
                ] {
                    self.put_idx(i);
                }
                idx1 = idx2;
            }

            for i in 0..points_count {
                self.put_vtx(temp[i * 4], opaque_uv, col_trans);
                self.put_vtx(temp[i * 4 + 1], opaque_uv, col);
                self.put_vtx(temp[i * 4 + 2], opaque_uv, col);
                self.put_vtx(temp[i * 4 + 3], opaque_uv, col_trans);
            }
        }
        self.vtx_current_idx += vtx_count as u32;

        self.temp_normals = normals;
        self.temp_points = temp;
    }

    /// Fill a convex polygon. Points must be in clockwise order for the fringe to face out.
    pub fn add_convex_poly_filled(&mut self, points: &[Vec2], col: u32) {
        let points_count = points.len();
        if points_count < 3 || col & COL32_A_MASK == 0 {
            return;
        }
        let uv = self.data.tex_uv_white_pixel;

        if !self.flags.contains(DrawListFlags::ANTI_ALIASED_FILL) {
            if !self.prim_reserve((points_count - 2) * 3, points_count) {
                return;
            }
            for &p in points {
                self.put_vtx(p, uv, col);
            }
            let base = self.vtx_current_idx;
            for i in 2..points_count as u32 {
                self.put_idx(base);
                self.put_idx(base + i - 1);
                self.put_idx(base + i);
            }
            self.vtx_current_idx += points_count as u32;
            return;
        }

        let aa_size = self.fringe_scale;
        let col_trans = col & !COL32_A_MASK;
        let idx_count = (points_count - 2) * 3 + points_count * 6;
        let vtx_count = points_count * 2;
        if !self.prim_reserve(idx_count, vtx_count) {
            return;
        }

        let inner = self.vtx_current_idx;
        let outer = inner + 1;
        for i in 2..points_count as u32 {
            self.put_idx(inner);
            self.put_idx(inner + ((i - 1) << 1));
            self.put_idx(inner + (i << 1));
        }

        let mut normals = std::mem::take(&mut self.temp_normals);
        normals.clear();
        normals.resize(points_count, Vec2::ZERO);
        let mut i0 = points_count - 1;
        for i1 in 0..points_count {
            let d = normalize_over_zero(points[i1] - points[i0]);
            normals[i0] = Vec2::new(d.y, -d.x);
            i0 = i1;
        }

        let mut i0 = points_count - 1;
        for i1 in 0..points_count {
            let dm = fix_normal((normals[i0] + normals[i1]) * 0.5) * (aa_size * 0.5);
            self.put_vtx(points[i1] - dm, uv, col);
            self.put_vtx(points[i1] + dm, uv, col_trans);

            let (a, b) = ((i0 as u32) << 1, (i1 as u32) << 1);
            for i in [inner + b, inner + a, outer + a, outer + a, outer + b, inner + b] {
                self.put_idx(i);
            }
            i0 = i1;
        }
        self.vtx_current_idx += vtx_count as u32;
        self.temp_normals = normals;
    }

    // Shapes

    pub fn add_line(&mut self, p1: Vec2, p2: Vec2, col: u32, thickness: f32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        // Pixel centers.
        self.path_line_to(p1 + Vec2::splat(0.5));
        self.path_line_to(p2 + Vec2::splat(0.5));
        self.path_stroke(col, DrawFlags::empty(), thickness);
    }

    pub fn add_rect(&mut self, p_min: Vec2, p_max: Vec2, col: u32, rounding: f32, flags: DrawFlags, thickness: f32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        let inset = if self.flags.contains(DrawListFlags::ANTI_ALIASED_LINES) { 0.5 } else { 0.49 };
        self.path_rect(p_min + Vec2::splat(0.5), p_max - Vec2::splat(inset), rounding, flags);
        self.path_stroke(col, DrawFlags::CLOSED, thickness);
    }

    pub fn add_rect_filled(&mut self, p_min: Vec2, p_max: Vec2, col: u32, rounding: f32, flags: DrawFlags) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        if rounding <= 0.0 || flags & DrawFlags::ROUND_CORNERS_MASK == DrawFlags::ROUND_CORNERS_NONE {
            if self.prim_reserve(6, 4) {
                self.prim_rect(p_min, p_max, col);
            }
        } else {
            self.path_rect(p_min, p_max, rounding, flags);
            self.path_fill_convex(col);
        }
    }

    /// Rect with one color per corner, interpolated by the GPU.
    pub fn add_rect_filled_multi_color(
        &mut self,
        p_min: Vec2,
        p_max: Vec2,
        col_upr_left: u32,
        col_upr_right: u32,
        col_bot_right: u32,
        col_bot_left: u32,
    ) {
        if (col_upr_left | col_upr_right | col_bot_right | col_bot_left) & COL32_A_MASK == 0 {
            return;
        }
        let uv = self.data.tex_uv_white_pixel;
        if !self.prim_reserve(6, 4) {
            return;
        }
        let idx = self.vtx_current_idx;
        for i in [0, 1, 2, 0, 2, 3] {
            self.put_idx(idx + i);
        }
        self.prim_write_vtx(p_min, uv, col_upr_left);
        self.prim_write_vtx(Vec2::new(p_max.x, p_min.y), uv, col_upr_right);
        self.prim_write_vtx(p_max, uv, col_bot_right);
        self.prim_write_vtx(Vec2::new(p_min.x, p_max.y), uv, col_bot_left);
    }

    pub fn add_quad(&mut self, p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2, col: u32, thickness: f32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        self.path.extend_from_slice(&[p1, p2, p3, p4]);
        self.path_stroke(col, DrawFlags::CLOSED, thickness);
    }

    pub fn add_quad_filled(&mut self, p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2, col: u32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        self.path.extend_from_slice(&[p1, p2, p3, p4]);
        self.path_fill_convex(col);
    }

    pub fn add_triangle(&mut self, p1: Vec2, p2: Vec2, p3: Vec2, col: u32, thickness: f32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        self.path.extend_from_slice(&[p1, p2, p3]);
        self.path_stroke(col, DrawFlags::CLOSED, thickness);
    }

    pub fn add_triangle_filled(&mut self, p1: Vec2, p2: Vec2, p3: Vec2, col: u32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        self.path.extend_from_slice(&[p1, p2, p3]);
        self.path_fill_convex(col);
    }

    /// Circle outline. `num_segments == 0` picks a count from the radius.
    pub fn add_circle(&mut self, center: Vec2, radius: f32, col: u32, num_segments: u32, thickness: f32) {
        if col & COL32_A_MASK == 0 || radius <= 0.0 {
            return;
        }
        self.path_circle(center, radius - 0.5, num_segments);
        self.path_stroke(col, DrawFlags::CLOSED, thickness);
    }

    pub fn add_circle_filled(&mut self, center: Vec2, radius: f32, col: u32, num_segments: u32) {
        if col & COL32_A_MASK == 0 || radius <= 0.0 {
            return;
        }
        self.path_circle(center, radius, num_segments);
        self.path_fill_convex(col);
    }

    fn path_circle(&mut self, center: Vec2, radius: f32, num_segments: u32) {
        if num_segments == 0 {
            self.path_arc_to_fast_ex(center, radius, 0, ARC_FAST_SAMPLE_MAX as i32, 0);
            // The last sample repeats the first.
            self.path.pop();
        } else {
            let n = num_segments.clamp(3, CIRCLE_AUTO_SEGMENT_MAX);
            let a_max = PI * 2.0 * (n as f32 - 1.0) / n as f32;
            self.path_arc_to(center, radius, 0.0, a_max, n - 1);
        }
    }

    /// Regular polygon outline with exactly `num_segments` sides.
    pub fn add_ngon(&mut self, center: Vec2, radius: f32, col: u32, num_segments: u32, thickness: f32) {
        if col & COL32_A_MASK == 0 || num_segments <= 2 {
            return;
        }
        let a_max = PI * 2.0 * (num_segments as f32 - 1.0) / num_segments as f32;
        self.path_arc_to(center, radius - 0.5, 0.0, a_max, num_segments - 1);
        self.path_stroke(col, DrawFlags::CLOSED, thickness);
    }

    pub fn add_ngon_filled(&mut self, center: Vec2, radius: f32, col: u32, num_segments: u32) {
        if col & COL32_A_MASK == 0 || num_segments <= 2 {
            return;
        }
        let a_max = PI * 2.0 * (num_segments as f32 - 1.0) / num_segments as f32;
        self.path_arc_to(center, radius, 0.0, a_max, num_segments - 1);
        self.path_fill_convex(col);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_bezier_cubic(
        &mut self,
        p1: Vec2,
        p2: Vec2,
        p3: Vec2,
        p4: Vec2,
        col: u32,
        thickness: f32,
        num_segments: u32,
    ) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        self.path_line_to(p1);
        self.path_bezier_cubic_curve_to(p2, p3, p4, num_segments);
        self.path_stroke(col, DrawFlags::empty(), thickness);
    }

    pub fn add_bezier_quadratic(&mut self, p1: Vec2, p2: Vec2, p3: Vec2, col: u32, thickness: f32, num_segments: u32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        self.path_line_to(p1);
        self.path_bezier_quadratic_curve_to(p2, p3, num_segments);
        self.path_stroke(col, DrawFlags::empty(), thickness);
    }

    /// Image clipped to a rounded rect. UVs are derived from vertex positions.
    #[allow(clippy::too_many_arguments)]
    pub fn add_image_rounded(
        &mut self,
        texture_id: crate::vertex::TextureId,
        p_min: Vec2,
        p_max: Vec2,
        uv_min: Vec2,
        uv_max: Vec2,
        col: u32,
        rounding: f32,
        flags: DrawFlags,
    ) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        let flags = flags.fix_rect_corner_flags();
        if rounding <= 0.0 || flags & DrawFlags::ROUND_CORNERS_MASK == DrawFlags::ROUND_CORNERS_NONE {
            self.add_image(texture_id, p_min, p_max, uv_min, uv_max, col);
            return;
        }

        let push_texture = texture_id != self.cmd_header.texture_id;
        if push_texture {
            self.push_texture_id(texture_id);
        }
        let vtx_start = self.vtx_buffer.len();
        self.path_rect(p_min, p_max, rounding, flags);
        self.path_fill_convex(col);
        let vtx_end = self.vtx_buffer.len();
        shade_verts_linear_uv(self, vtx_start..vtx_end, p_min, p_max, uv_min, uv_max, true);
        if push_texture {
            self.pop_texture_id();
        }
    }
}

fn bezier_cubic_casteljau(path: &mut Vec<Vec2>, p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2, tess_tol: f32, level: u32) {
    let d = p4 - p1;
    let d2 = ((p2.x - p4.x) * d.y - (p2.y - p4.y) * d.x).abs();
    let d3 = ((p3.x - p4.x) * d.y - (p3.y - p4.y) * d.x).abs();
    if (d2 + d3) * (d2 + d3) < tess_tol * d.length_squared() {
        path.push(p4);
    } else if level < BEZIER_MAX_LEVEL {
        let p12 = (p1 + p2) * 0.5;
        let p23 = (p2 + p3) * 0.5;
        let p34 = (p3 + p4) * 0.5;
        let p123 = (p12 + p23) * 0.5;
        let p234 = (p23 + p34) * 0.5;
        let p1234 = (p123 + p234) * 0.5;
        bezier_cubic_casteljau(path, p1, p12, p123, p1234, tess_tol, level + 1);
        bezier_cubic_casteljau(path, p1234, p234, p34, p4, tess_tol, level + 1);
    }
}

fn bezier_quadratic_casteljau(path: &mut Vec<Vec2>, p1: Vec2, p2: Vec2, p3: Vec2, tess_tol: f32, level: u32) {
    let d = p3 - p1;
    let det = (p2.x - p3.x) * d.y - (p2.y - p3.y) * d.x;
    if det * det * 4.0 < tess_tol * d.length_squared() {
        path.push(p3);
    } else if level < BEZIER_MAX_LEVEL {
        let p12 = (p1 + p2) * 0.5;
        let p23 = (p2 + p3) * 0.5;
        let p123 = (p12 + p23) * 0.5;
        bezier_quadratic_casteljau(path, p1, p12, p123, tess_tol, level + 1);
        bezier_quadratic_casteljau(path, p123, p23, p3, tess_tol, level + 1);
    }
}

/// Recolor vertices along a gradient from `p0` (`col0`) to `p1` (`col1`), keeping their alpha.
pub fn shade_verts_linear_color_gradient_keep_alpha(
    draw_list: &mut DrawList,
    vertices: Range<usize>,
    p0: Vec2,
    p1: Vec2,
    col0: u32,
    col1: u32,
) {
    let extent = p1 - p0;
    let inv_length2 = 1.0 / extent.length_squared();
    let channel = |col: u32, shift: u32| ((col >> shift) & 0xFF) as i32;
    let (r0, g0, b0) = (channel(col0, COL32_R_SHIFT), channel(col0, COL32_G_SHIFT), channel(col0, COL32_B_SHIFT));
    let (dr, dg, db) = (
        channel(col1, COL32_R_SHIFT) - r0,
        channel(col1, COL32_G_SHIFT) - g0,
        channel(col1, COL32_B_SHIFT) - b0,
    );
    for vert in &mut draw_list.vtx_buffer[vertices] {
        let d = (vert.pos() - p0).dot(extent);
        let t = (d * inv_length2).clamp(0.0, 1.0);
        let r = (r0 as f32 + dr as f32 * t) as u32;
        let g = (g0 as f32 + dg as f32 * t) as u32;
        let b = (b0 as f32 + db as f32 * t) as u32;
        vert.col = (r << COL32_R_SHIFT) | (g << COL32_G_SHIFT) | (b << COL32_B_SHIFT) | (vert.col & COL32_A_MASK);
    }
}

/// Map vertex positions inside `a..b` linearly onto `uv_a..uv_b`.
pub fn shade_verts_linear_uv(
    draw_list: &mut DrawList,
    vertices: Range<usize>,
    a: Vec2,
    b: Vec2,
    uv_a: Vec2,
    uv_b: Vec2,
    clamp: bool,
) {
    let size = b - a;
    let uv_size = uv_b - uv_a;
    let scale = Vec2::new(
        if size.x != 0.0 { uv_size.x / size.x } else { 0.0 },
        if size.y != 0.0 { uv_size.y / size.y } else { 0.0 },
    );
    let (min, max) = (uv_a.min(uv_b), uv_a.max(uv_b));
    for vert in &mut draw_list.vtx_buffer[vertices] {
        let uv = uv_a + (vert.pos() - a) * scale;
        vert.uv = if clamp { uv.clamp(min, max) } else { uv }.to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::COL32_WHITE;
    use crate::primitives::Vec4;
    use crate::shared::SharedData;
    use std::sync::Arc;

    fn list_with(flags: DrawListFlags) -> DrawList {
        let mut data = SharedData::new();
        data.initial_flags = flags;
        data.clip_rect_fullscreen = Vec4::new(0.0, 0.0, 100.0, 100.0);
        DrawList::new(Arc::new(data))
    }

    fn assert_indices_in_range(list: &DrawList) {
        for cmd in &list.cmd_buffer {
            let start = cmd.idx_offset as usize;
            let end = start + cmd.elem_count as usize;
            for &i in &list.idx_buffer[start..end] {
                assert!((i as usize) < list.vtx_buffer.len() - cmd.vtx_offset as usize);
            }
        }
    }

    #[test]
    fn test_thin_aa_line() {
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_LINES);
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), 0xFFFF_FFFF, 1.0);
        assert_eq!(list.cmd_buffer.len(), 1);
        assert_eq!(list.vtx_buffer.len(), 6);
        assert_eq!(list.idx_buffer.len(), 12);
        assert_eq!(list.cmd_buffer[0].elem_count, 12);
        // Edge vertices fade out.
        assert_eq!(list.vtx_buffer[1].col & COL32_A_MASK, 0);
        assert_eq!(list.vtx_buffer[0].col, 0xFFFF_FFFF);
        assert_indices_in_range(&list);
    }

    #[test]
    fn test_thick_aa_line_vertex_layout() {
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_LINES);
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), COL32_WHITE, 4.0);
        assert_eq!(list.vtx_buffer.len(), 8);
        assert_eq!(list.idx_buffer.len(), 18);
        let alphas: Vec<bool> = list.vtx_buffer[..4].iter().map(|v| v.col & COL32_A_MASK != 0).collect();
        assert_eq!(alphas, vec![false, true, true, false]);
    }

    #[test]
    fn test_textured_line_uses_baked_uvs() {
        let mut data = SharedData::new();
        data.initial_flags = DrawListFlags::ANTI_ALIASED_LINES | DrawListFlags::ANTI_ALIASED_LINES_USE_TEX;
        data.tex_uv_lines = (0..=TEX_LINES_WIDTH_MAX)
            .map(|n| Vec4::new(n as f32, 0.5, n as f32 + 0.25, 0.5))
            .collect();
        let mut list = DrawList::new(Arc::new(data));
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), COL32_WHITE, 2.0);
        assert_eq!(list.vtx_buffer.len(), 4);
        assert_eq!(list.idx_buffer.len(), 6);
        assert_eq!(list.vtx_buffer[0].uv, [2.0, 0.5]);
        assert_eq!(list.vtx_buffer[1].uv, [2.25, 0.5]);
    }

    #[test]
    fn test_non_aa_closed_polyline() {
        let mut list = list_with(DrawListFlags::empty());
        let pts = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        list.add_polyline(&pts, COL32_WHITE, DrawFlags::CLOSED, 1.0);
        assert_eq!(list.vtx_buffer.len(), 12);
        assert_eq!(list.idx_buffer.len(), 18);
        assert_indices_in_range(&list);
    }

    #[test]
    fn test_aa_convex_fill_counts() {
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_FILL);
        let pts = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0), Vec2::new(0.0, 10.0)];
        list.add_convex_poly_filled(&pts, COL32_WHITE);
        assert_eq!(list.vtx_buffer.len(), 8);
        assert_eq!(list.idx_buffer.len(), 2 * 3 + 4 * 6);
        assert_indices_in_range(&list);
    }

    #[test]
    fn test_too_few_points_is_noop() {
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_FILL | DrawListFlags::ANTI_ALIASED_LINES);
        list.add_convex_poly_filled(&[Vec2::ZERO, Vec2::ONE], COL32_WHITE);
        list.add_polyline(&[Vec2::ZERO], COL32_WHITE, DrawFlags::empty(), 1.0);
        assert!(list.vtx_buffer.is_empty());
    }

    #[test]
    fn test_small_circle_uses_cached_segment_count() {
        let mut list = list_with(DrawListFlags::empty());
        let segments = list.shared_data().circle_segment_counts()[4] as usize;
        list.add_circle_filled(Vec2::splat(50.0), 4.0, 0xFFFF_FFFF, 0);
        assert_eq!(list.vtx_buffer.len(), segments);
        assert_eq!(list.idx_buffer.len(), (segments - 2) * 3);
        for v in &list.vtx_buffer {
            assert!((v.pos() - Vec2::splat(50.0)).length() - 4.0 < 1e-4);
        }
    }

    #[test]
    fn test_explicit_segments_clamp() {
        let mut list = list_with(DrawListFlags::empty());
        list.add_circle_filled(Vec2::splat(50.0), 20.0, COL32_WHITE, 1);
        assert_eq!(list.vtx_buffer.len(), 3);
        list.reset_for_new_frame();
        list.add_circle_filled(Vec2::splat(50.0), 20.0, COL32_WHITE, 10_000);
        assert_eq!(list.vtx_buffer.len(), CIRCLE_AUTO_SEGMENT_MAX as usize);
    }

    #[test]
    fn test_explicit_circle_points_are_unique() {
        let mut list = list_with(DrawListFlags::empty());
        list.path_circle(Vec2::ZERO, 10.0, 8);
        assert_eq!(list.path().len(), 8);
        let first = list.path()[0];
        assert!(list.path()[1..].iter().all(|p| (*p - first).length() > 1.0));
    }

    #[test]
    fn test_ngon_needs_three_sides() {
        let mut list = list_with(DrawListFlags::empty());
        list.add_ngon_filled(Vec2::ZERO, 10.0, COL32_WHITE, 2);
        assert!(list.vtx_buffer.is_empty());
        list.add_ngon_filled(Vec2::ZERO, 10.0, COL32_WHITE, 6);
        assert_eq!(list.vtx_buffer.len(), 6);
    }

    #[test]
    fn test_arc_fast_quadrant() {
        let mut list = list_with(DrawListFlags::empty());
        list.path_arc_to_fast(Vec2::ZERO, 10.0, 0, 3);
        let path = list.path();
        assert!((path[0] - Vec2::new(10.0, 0.0)).length() < 1e-4);
        assert!((*path.last().unwrap() - Vec2::new(0.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_arc_emits_off_table_endpoints() {
        let mut list = list_with(DrawListFlags::empty());
        let (a_min, a_max) = (0.1, 1.3);
        list.path_arc_to(Vec2::ZERO, 5.0, a_min, a_max, 0);
        let path = list.path();
        assert!((path[0] - Vec2::new(a_min.cos(), a_min.sin()) * 5.0).length() < 1e-4);
        assert!((*path.last().unwrap() - Vec2::new(a_max.cos(), a_max.sin()) * 5.0).length() < 1e-4);
    }

    #[test]
    fn test_rounded_rect_path_clamps_radius() {
        let mut list = list_with(DrawListFlags::empty());
        list.path_rect(Vec2::ZERO, Vec2::new(10.0, 10.0), 50.0, DrawFlags::empty());
        for p in list.path() {
            assert!(p.x >= -1e-4 && p.x <= 10.0 + 1e-4);
            assert!(p.y >= -1e-4 && p.y <= 10.0 + 1e-4);
        }
        list.path_clear();
        list.path_rect(Vec2::ZERO, Vec2::new(10.0, 10.0), 3.0, DrawFlags::ROUND_CORNERS_NONE);
        assert_eq!(list.path().len(), 4);
    }

    #[test]
    fn test_single_corner_keeps_sharp_corners() {
        let mut list = list_with(DrawListFlags::empty());
        list.path_rect(Vec2::ZERO, Vec2::new(20.0, 20.0), 4.0, DrawFlags::ROUND_CORNERS_TOP_LEFT);
        assert!(list.path().contains(&Vec2::new(20.0, 0.0)));
        assert!(list.path().contains(&Vec2::new(20.0, 20.0)));
        assert!(!list.path().contains(&Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn test_bezier_ends_at_last_point() {
        let mut list = list_with(DrawListFlags::empty());
        let p4 = Vec2::new(100.0, 0.0);
        list.path_line_to(Vec2::ZERO);
        list.path_bezier_cubic_curve_to(Vec2::new(30.0, 80.0), Vec2::new(70.0, -80.0), p4, 0);
        assert!(list.path().len() > 3);
        assert_eq!(*list.path().last().unwrap(), p4);

        list.path_clear();
        list.path_line_to(Vec2::ZERO);
        list.path_bezier_quadratic_curve_to(Vec2::new(50.0, 50.0), p4, 5);
        assert_eq!(list.path().len(), 6);
    }

    #[test]
    fn test_straight_bezier_is_one_segment() {
        let mut list = list_with(DrawListFlags::empty());
        list.path_line_to(Vec2::ZERO);
        list.path_bezier_cubic_curve_to(Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(3.0, 0.0), 0);
        assert_eq!(list.path().len(), 2);
    }

    #[test]
    fn test_multi_color_rect() {
        let mut list = list_with(DrawListFlags::empty());
        list.add_rect_filled_multi_color(Vec2::ZERO, Vec2::ONE, 1 << 24, 2 << 24, 3 << 24, 4 << 24);
        let cols: Vec<u32> = list.vtx_buffer.iter().map(|v| v.col >> 24).collect();
        assert_eq!(cols, vec![1, 2, 3, 4]);
        assert_eq!(list.vtx_current_idx(), 4);
    }

    #[test]
    fn test_polyline_overflow_bumps_vtx_offset_once() {
        if std::mem::size_of::<DrawIdx>() != 2 {
            return;
        }
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_LINES | DrawListFlags::ALLOW_VTX_OFFSET);
        let points: Vec<Vec2> = (0..20_000).map(|i| Vec2::new(i as f32 * 0.01, (i % 7) as f32)).collect();
        list.add_polyline(&points, COL32_WHITE, DrawFlags::empty(), 4.0);

        assert_eq!(list.cmd_buffer.len(), 2);
        let offsets: Vec<u32> = list.cmd_buffer.iter().map(|c| c.vtx_offset).collect();
        assert_eq!(offsets[0], 0);
        assert!(offsets[1] > 0);
        for cmd in &list.cmd_buffer {
            let start = cmd.idx_offset as usize;
            for &i in &list.idx_buffer[start..start + cmd.elem_count as usize] {
                assert!((i as usize) < DRAW_IDX_LIMIT);
                assert!((cmd.vtx_offset as usize + i as usize) < list.vtx_buffer.len());
            }
        }
    }

    #[test]
    fn test_polyline_overflow_without_vtx_offset_keeps_first_range() {
        if std::mem::size_of::<DrawIdx>() != 2 {
            return;
        }
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_LINES);
        let points: Vec<Vec2> = (0..20_000).map(|i| Vec2::new(i as f32, 0.0)).collect();
        list.add_polyline(&points, COL32_WHITE, DrawFlags::empty(), 4.0);
        assert_eq!(list.cmd_buffer.len(), 1);
        assert!(list.vtx_buffer.len() < DRAW_IDX_LIMIT);
        assert!(!list.vtx_buffer.is_empty());
    }

    #[test]
    fn test_polyline_chunks_share_mitered_joins() {
        if std::mem::size_of::<DrawIdx>() != 2 {
            return;
        }
        let zigzag: Vec<Vec2> = (0..20_000).map(|i| Vec2::new(i as f32 * 0.5, (i % 2) as f32 * 10.0)).collect();
        let chunk = (DRAW_IDX_LIMIT - 1) / 4;

        let mut list = list_with(DrawListFlags::ANTI_ALIASED_LINES | DrawListFlags::ALLOW_VTX_OFFSET);
        list.add_polyline(&zigzag, COL32_WHITE, DrawFlags::empty(), 3.0);
        assert_eq!(list.vtx_buffer.len(), (chunk + zigzag.len() - (chunk - 1)) * 4);

        // The shared point is emitted by both chunks with the same miter.
        let seam = chunk * 4;
        assert_eq!(list.vtx_buffer[seam - 4..seam], list.vtx_buffer[seam..seam + 4]);
        // A miter at a sharp corner reaches further than the inner half width.
        let inner = Vec2::from(list.vtx_buffer[seam + 1].pos);
        assert!((inner - zigzag[chunk - 1]).length() > 1.0 + 1e-3);
    }

    #[test]
    fn test_closed_chunked_polyline_joins_its_ends() {
        if std::mem::size_of::<DrawIdx>() != 2 {
            return;
        }
        let ring: Vec<Vec2> = (0..20_000)
            .map(|i| {
                let a = i as f32 / 20_000.0 * PI * 2.0;
                Vec2::new(a.cos(), a.sin()) * 3000.0
            })
            .collect();
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_LINES | DrawListFlags::ALLOW_VTX_OFFSET);
        list.add_polyline(&ring, COL32_WHITE, DrawFlags::CLOSED, 3.0);

        // The first point comes back at the end with the same join.
        let n = list.vtx_buffer.len();
        assert_eq!(list.vtx_buffer[0..4], list.vtx_buffer[n - 4..n]);
        let total: u32 = list.cmd_buffer.iter().map(|c| c.elem_count).sum();
        assert_eq!(total as usize, ring.len() * 18);
    }

    #[test]
    fn test_gradient_keeps_alpha() {
        let mut list = list_with(DrawListFlags::empty());
        list.add_rect_filled(Vec2::ZERO, Vec2::new(10.0, 10.0), 0x80FF_FFFF, 0.0, DrawFlags::empty());
        let n = list.vtx_buffer.len();
        shade_verts_linear_color_gradient_keep_alpha(
            &mut list,
            0..n,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            crate::color::col32(0, 0, 0, 255),
            crate::color::col32(255, 0, 0, 255),
        );
        assert_eq!(list.vtx_buffer[0].col, crate::color::col32(0, 0, 0, 0x80));
        assert_eq!(list.vtx_buffer[1].col, crate::color::col32(255, 0, 0, 0x80));
    }

    #[test]
    fn test_rounded_image_uvs_stay_in_range() {
        let mut list = list_with(DrawListFlags::ANTI_ALIASED_FILL);
        list.add_image_rounded(
            crate::vertex::TextureId(3),
            Vec2::ZERO,
            Vec2::splat(20.0),
            Vec2::ZERO,
            Vec2::ONE,
            COL32_WHITE,
            5.0,
            DrawFlags::empty(),
        );
        assert!(list.cmd_buffer.iter().any(|c| c.texture_id.0 == 3 && c.elem_count > 0));
        for v in &list.vtx_buffer {
            assert!((0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1]));
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Line(f32, f32, f32, f32, f32),
            Rect(f32, f32, f32, f32, f32),
            RectFilled(f32, f32, f32, f32, f32),
            Circle(f32, f32, f32, u32),
            Clip(f32, f32, f32, f32),
            Unclip,
            Texture(usize),
        }

        fn coord() -> impl Strategy<Value = f32> {
            -50.0f32..150.0
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (coord(), coord(), coord(), coord(), 0.5f32..6.0).prop_map(|(a, b, c, d, t)| Op::Line(a, b, c, d, t)),
                (coord(), coord(), coord(), coord(), 0.0f32..12.0).prop_map(|(a, b, c, d, r)| Op::Rect(a, b, c, d, r)),
                (coord(), coord(), coord(), coord(), 0.0f32..12.0)
                    .prop_map(|(a, b, c, d, r)| Op::RectFilled(a, b, c, d, r)),
                (coord(), coord(), 0.0f32..80.0, 0u32..40).prop_map(|(x, y, r, n)| Op::Circle(x, y, r, n)),
                (coord(), coord(), coord(), coord()).prop_map(|(a, b, c, d)| Op::Clip(a, b, c, d)),
                Just(Op::Unclip),
                (0usize..3).prop_map(Op::Texture),
            ]
        }

        proptest! {
            #[test]
            fn indices_stay_within_their_command(ops in prop::collection::vec(op(), 1..40), aa in any::<bool>()) {
                let flags = if aa {
                    DrawListFlags::ANTI_ALIASED_LINES | DrawListFlags::ANTI_ALIASED_FILL
                } else {
                    DrawListFlags::empty()
                };
                let mut list = list_with(flags | DrawListFlags::ALLOW_VTX_OFFSET);
                let mut clips = 0;
                let mut textures = 0;
                for op in ops {
                    match op {
                        Op::Line(a, b, c, d, t) => list.add_line(Vec2::new(a, b), Vec2::new(c, d), COL32_WHITE, t),
                        Op::Rect(a, b, c, d, r) => list.add_rect(Vec2::new(a, b), Vec2::new(c, d), COL32_WHITE, r, DrawFlags::empty(), 1.0),
                        Op::RectFilled(a, b, c, d, r) => list.add_rect_filled(Vec2::new(a, b), Vec2::new(c, d), COL32_WHITE, r, DrawFlags::empty()),
                        Op::Circle(x, y, r, n) => list.add_circle(Vec2::new(x, y), r, COL32_WHITE, n, 1.5),
                        Op::Clip(a, b, c, d) => {
                            list.push_clip_rect(Vec2::new(a, b), Vec2::new(c, d), true);
                            clips += 1;
                        }
                        Op::Unclip => {
                            if clips > 0 {
                                list.pop_clip_rect();
                                clips -= 1;
                            } else if textures > 0 {
                                list.pop_texture_id();
                                textures -= 1;
                            }
                        }
                        Op::Texture(t) => {
                            list.push_texture_id(crate::vertex::TextureId(t));
                            textures += 1;
                        }
                    }
                }
                let total: u32 = list.cmd_buffer.iter().map(|c| c.elem_count).sum();
                prop_assert_eq!(total as usize, list.idx_buffer.len());
                for cmd in &list.cmd_buffer {
                    let start = cmd.idx_offset as usize;
                    for &i in &list.idx_buffer[start..start + cmd.elem_count as usize] {
                        prop_assert!((i as usize) < list.vtx_buffer.len() - cmd.vtx_offset as usize);
                    }
                }
            }
        }
    }
}
