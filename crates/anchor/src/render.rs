//! Small shapes widgets draw over and over: arrows, bullets, check marks,
//! partially filled bars, the software mouse cursor.

use std::f32::consts::PI;

use crate::color::{col32, col32_alpha, color_alpha_blend};
use crate::draw_list::DrawList;
use crate::flags::DrawFlags;
use crate::font_atlas::FontAtlas;
use crate::io::MouseCursor;
use crate::primitives::{Rect, Vec2};

/// Cardinal direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

/// Filled triangle arrow inside a `font_size` square at `pos`.
pub fn render_arrow(draw_list: &mut DrawList, pos: Vec2, col: u32, dir: Dir, scale: f32) {
    let h = draw_list.shared_data().font_size;
    let mut r = h * 0.40 * scale;
    let center = pos + Vec2::new(h * 0.50, h * 0.50 * scale);

    let (a, b, c) = match dir {
        Dir::Up | Dir::Down => {
            if dir == Dir::Up {
                r = -r;
            }
            (
                Vec2::new(0.000, 0.750) * r,
                Vec2::new(-0.866, -0.750) * r,
                Vec2::new(0.866, -0.750) * r,
            )
        }
        Dir::Left | Dir::Right => {
            if dir == Dir::Left {
                r = -r;
            }
            (
                Vec2::new(0.750, 0.000) * r,
                Vec2::new(-0.750, 0.866) * r,
                Vec2::new(-0.750, -0.866) * r,
            )
        }
    };
    draw_list.add_triangle_filled(center + a, center + b, center + c, col);
}

pub fn render_bullet(draw_list: &mut DrawList, pos: Vec2, col: u32) {
    let radius = draw_list.shared_data().font_size * 0.20;
    draw_list.add_circle_filled(pos, radius, col, 8);
}

/// Check mark fitting a `sz` square at `pos`.
pub fn render_check_mark(draw_list: &mut DrawList, pos: Vec2, col: u32, sz: f32) {
    let thickness = (sz / 5.0).max(1.0);
    let sz = sz - thickness * 0.5;
    let pos = pos + Vec2::splat(thickness * 0.25);

    let third = sz / 3.0;
    let bx = pos.x + third;
    let by = pos.y + sz - third * 0.5;
    draw_list.path_line_to(Vec2::new(bx - third, by - third));
    draw_list.path_line_to(Vec2::new(bx, by));
    draw_list.path_line_to(Vec2::new(bx + third * 2.0, by - third * 2.0));
    draw_list.path_stroke(col, DrawFlags::empty(), thickness);
}

/// Triangle with its tip at `pos`, pointing in `dir`.
pub fn render_arrow_pointing_at(draw_list: &mut DrawList, pos: Vec2, half_sz: Vec2, dir: Dir, col: u32) {
    let (a, b) = match dir {
        Dir::Left => (
            Vec2::new(pos.x + half_sz.x, pos.y - half_sz.y),
            Vec2::new(pos.x + half_sz.x, pos.y + half_sz.y),
        ),
        Dir::Right => (
            Vec2::new(pos.x - half_sz.x, pos.y + half_sz.y),
            Vec2::new(pos.x - half_sz.x, pos.y - half_sz.y),
        ),
        Dir::Up => (
            Vec2::new(pos.x + half_sz.x, pos.y + half_sz.y),
            Vec2::new(pos.x - half_sz.x, pos.y + half_sz.y),
        ),
        Dir::Down => (
            Vec2::new(pos.x - half_sz.x, pos.y - half_sz.y),
            Vec2::new(pos.x + half_sz.x, pos.y - half_sz.y),
        ),
    };
    draw_list.add_triangle_filled(a, b, pos, col);
}

/// Software cursor from the atlas art: two shadow passes, the outline, then the fill.
#[allow(clippy::too_many_arguments)]
pub fn render_mouse_cursor(
    draw_list: &mut DrawList,
    atlas: &FontAtlas,
    pos: Vec2,
    scale: f32,
    cursor: MouseCursor,
    col_fill: u32,
    col_border: u32,
    col_shadow: u32,
) {
    if cursor == MouseCursor::None {
        return;
    }
    let Some(data) = atlas.get_mouse_cursor_tex_data(cursor) else {
        return;
    };
    let pos = pos - data.offset;
    let size = data.size * scale;
    let tex_id = atlas.tex_id();
    let [border_min, border_max] = data.uv_border;
    let [fill_min, fill_max] = data.uv_fill;

    draw_list.push_texture_id(tex_id);
    for shadow_dx in [1.0, 2.0] {
        let p = pos + Vec2::new(shadow_dx, 0.0) * scale;
        draw_list.add_image(tex_id, p, p + size, border_min, border_max, col_shadow);
    }
    draw_list.add_image(tex_id, pos, pos + size, border_min, border_max, col_border);
    draw_list.add_image(tex_id, pos, pos + size, fill_min, fill_max, col_fill);
    draw_list.pop_texture_id();
}

/// `acos` of a value clamped to `[0, 1]`.
fn acos01(x: f32) -> f32 {
    if x <= 0.0 {
        PI * 0.5
    } else if x >= 1.0 {
        0.0
    } else {
        x.acos()
    }
}

/// Fill the horizontal slice `[x_start_norm, x_end_norm]` of a rounded rect.
///
/// Ends that fall inside a rounded corner follow the corner's curve, so a
/// progress bar keeps its silhouette while it fills.
pub fn render_rect_filled_range_h(
    draw_list: &mut DrawList,
    rect: &Rect,
    col: u32,
    mut x_start_norm: f32,
    mut x_end_norm: f32,
    rounding: f32,
) {
    if x_end_norm == x_start_norm {
        return;
    }
    if x_start_norm > x_end_norm {
        std::mem::swap(&mut x_start_norm, &mut x_end_norm);
    }

    let lerp = |t: f32| rect.min.x + (rect.max.x - rect.min.x) * t;
    let p0 = Vec2::new(lerp(x_start_norm), rect.min.y);
    let p1 = Vec2::new(lerp(x_end_norm), rect.max.y);
    if rounding == 0.0 {
        draw_list.add_rect_filled(p0, p1, col, 0.0, DrawFlags::empty());
        return;
    }

    let rounding = ((rect.width() * 0.5).min(rect.height() * 0.5) - 1.0).clamp(0.0, rounding);
    if rounding <= 0.0 {
        draw_list.add_rect_filled(p0, p1, col, 0.0, DrawFlags::empty());
        return;
    }
    let inv_rounding = 1.0 / rounding;
    let half_pi = PI * 0.5;

    let arc0_b = acos01(1.0 - (p0.x - rect.min.x) * inv_rounding);
    let arc0_e = acos01(1.0 - (p1.x - rect.min.x) * inv_rounding);
    let x0 = p0.x.max(rect.min.x + rounding);
    if arc0_b == arc0_e {
        draw_list.path_line_to(Vec2::new(x0, p1.y));
        draw_list.path_line_to(Vec2::new(x0, p0.y));
    } else if arc0_b == 0.0 && arc0_e == half_pi {
        draw_list.path_arc_to_fast(Vec2::new(x0, p1.y - rounding), rounding, 3, 6);
        draw_list.path_arc_to_fast(Vec2::new(x0, p0.y + rounding), rounding, 6, 9);
    } else {
        draw_list.path_arc_to(Vec2::new(x0, p1.y - rounding), rounding, PI - arc0_e, PI - arc0_b, 3);
        draw_list.path_arc_to(Vec2::new(x0, p0.y + rounding), rounding, PI + arc0_b, PI + arc0_e, 3);
    }

    if p1.x > rect.min.x + rounding {
        let arc1_b = acos01(1.0 - (rect.max.x - p1.x) * inv_rounding);
        let arc1_e = acos01(1.0 - (rect.max.x - p0.x) * inv_rounding);
        let x1 = p1.x.min(rect.max.x - rounding);
        if arc1_b == arc1_e {
            draw_list.path_line_to(Vec2::new(x1, p0.y));
            draw_list.path_line_to(Vec2::new(x1, p1.y));
        } else if arc1_b == 0.0 && arc1_e == half_pi {
            draw_list.path_arc_to_fast(Vec2::new(x1, p0.y + rounding), rounding, 9, 12);
            draw_list.path_arc_to_fast(Vec2::new(x1, p1.y - rounding), rounding, 0, 3);
        } else {
            draw_list.path_arc_to(Vec2::new(x1, p0.y + rounding), rounding, -arc1_e, -arc1_b, 3);
            draw_list.path_arc_to(Vec2::new(x1, p1.y - rounding), rounding, arc1_b, arc1_e, 3);
        }
    }
    draw_list.path_fill_convex(col);
}

/// Fill `outer` minus `inner`; corners touching `outer` are rounded.
pub fn render_rect_filled_with_hole(draw_list: &mut DrawList, outer: &Rect, inner: &Rect, col: u32, rounding: f32) {
    let fill_l = inner.min.x > outer.min.x;
    let fill_r = inner.max.x < outer.max.x;
    let fill_u = inner.min.y > outer.min.y;
    let fill_d = inner.max.y < outer.max.y;
    let corners = |round: &[(bool, DrawFlags)]| {
        let flags = round
            .iter()
            .filter(|(on, _)| *on)
            .fold(DrawFlags::empty(), |acc, (_, f)| acc | *f);
        if flags.is_empty() {
            DrawFlags::ROUND_CORNERS_NONE
        } else {
            flags
        }
    };
    use DrawFlags as F;

    if fill_l {
        let flags = corners(&[(!fill_u, F::ROUND_CORNERS_TOP_LEFT), (!fill_d, F::ROUND_CORNERS_BOTTOM_LEFT)]);
        draw_list.add_rect_filled(
            Vec2::new(outer.min.x, inner.min.y),
            Vec2::new(inner.min.x, inner.max.y),
            col,
            rounding,
            flags,
        );
    }
    if fill_r {
        let flags = corners(&[(!fill_u, F::ROUND_CORNERS_TOP_RIGHT), (!fill_d, F::ROUND_CORNERS_BOTTOM_RIGHT)]);
        draw_list.add_rect_filled(
            Vec2::new(inner.max.x, inner.min.y),
            Vec2::new(outer.max.x, inner.max.y),
            col,
            rounding,
            flags,
        );
    }
    if fill_u {
        let flags = corners(&[(!fill_l, F::ROUND_CORNERS_TOP_LEFT), (!fill_r, F::ROUND_CORNERS_TOP_RIGHT)]);
        draw_list.add_rect_filled(
            Vec2::new(inner.min.x, outer.min.y),
            Vec2::new(inner.max.x, inner.min.y),
            col,
            rounding,
            flags,
        );
    }
    if fill_d {
        let flags = corners(&[(!fill_l, F::ROUND_CORNERS_BOTTOM_LEFT), (!fill_r, F::ROUND_CORNERS_BOTTOM_RIGHT)]);
        draw_list.add_rect_filled(
            Vec2::new(inner.min.x, inner.max.y),
            Vec2::new(inner.max.x, outer.max.y),
            col,
            rounding,
            flags,
        );
    }
    if fill_l && fill_u {
        draw_list.add_rect_filled(outer.min, inner.min, col, rounding, F::ROUND_CORNERS_TOP_LEFT);
    }
    if fill_r && fill_u {
        draw_list.add_rect_filled(
            Vec2::new(inner.max.x, outer.min.y),
            Vec2::new(outer.max.x, inner.min.y),
            col,
            rounding,
            F::ROUND_CORNERS_TOP_RIGHT,
        );
    }
    if fill_l && fill_d {
        draw_list.add_rect_filled(
            Vec2::new(outer.min.x, inner.max.y),
            Vec2::new(inner.min.x, outer.max.y),
            col,
            rounding,
            F::ROUND_CORNERS_BOTTOM_LEFT,
        );
    }
    if fill_r && fill_d {
        draw_list.add_rect_filled(inner.max, outer.max, col, rounding, F::ROUND_CORNERS_BOTTOM_RIGHT);
    }
}

/// Color swatch; translucent colors are blended over a two-tone checkerboard.
#[allow(clippy::too_many_arguments)]
pub fn render_color_rect_with_alpha_checkerboard(
    draw_list: &mut DrawList,
    p_min: Vec2,
    p_max: Vec2,
    col: u32,
    grid_step: f32,
    grid_off: Vec2,
    rounding: f32,
    flags: DrawFlags,
) {
    let flags = if flags & DrawFlags::ROUND_CORNERS_MASK == DrawFlags::empty() {
        flags | DrawFlags::ROUND_CORNERS_ALL
    } else {
        flags
    };
    if col32_alpha(col) >= 0xFF || grid_step <= 0.0 {
        draw_list.add_rect_filled(p_min, p_max, col, rounding, flags);
        return;
    }

    let col_bg1 = color_alpha_blend(col32(204, 204, 204, 255), col);
    let col_bg2 = color_alpha_blend(col32(128, 128, 128, 255), col);
    draw_list.add_rect_filled(p_min, p_max, col_bg1, rounding, flags);

    let mut yi = 0;
    let mut y = p_min.y + grid_off.y;
    while y < p_max.y {
        let y1 = y.clamp(p_min.y, p_max.y);
        let y2 = (y + grid_step).min(p_max.y);
        if y2 > y1 {
            let mut x = p_min.x + grid_off.x + (yi & 1) as f32 * grid_step;
            while x < p_max.x {
                let x1 = x.clamp(p_min.x, p_max.x);
                let x2 = (x + grid_step).min(p_max.x);
                x += grid_step * 2.0;
                if x2 <= x1 {
                    continue;
                }
                let mut cell = DrawFlags::empty();
                if y1 <= p_min.y {
                    if x1 <= p_min.x {
                        cell |= DrawFlags::ROUND_CORNERS_TOP_LEFT;
                    }
                    if x2 >= p_max.x {
                        cell |= DrawFlags::ROUND_CORNERS_TOP_RIGHT;
                    }
                }
                if y2 >= p_max.y {
                    if x1 <= p_min.x {
                        cell |= DrawFlags::ROUND_CORNERS_BOTTOM_LEFT;
                    }
                    if x2 >= p_max.x {
                        cell |= DrawFlags::ROUND_CORNERS_BOTTOM_RIGHT;
                    }
                }
                let cell = cell & flags;
                let cell = if cell.is_empty() { DrawFlags::ROUND_CORNERS_NONE } else { cell };
                draw_list.add_rect_filled(Vec2::new(x1, y1), Vec2::new(x2, y2), col_bg2, rounding, cell);
            }
        }
        y += grid_step;
        yi += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{COL32_A_MASK, COL32_WHITE};
    use crate::flags::DrawListFlags;
    use crate::shared::SharedData;
    use std::sync::Arc;

    fn list() -> DrawList {
        let mut data = SharedData::new();
        data.initial_flags = DrawListFlags::empty();
        data.font_size = 13.0;
        DrawList::new(Arc::new(data))
    }

    fn bounds(list: &DrawList) -> Rect {
        let mut r = Rect::new(Vec2::splat(f32::MAX), Vec2::splat(f32::MIN));
        for v in &list.vtx_buffer {
            r.min = r.min.min(v.pos());
            r.max = r.max.max(v.pos());
        }
        r
    }

    #[test]
    fn test_arrow_fits_font_square() {
        for dir in [Dir::Left, Dir::Right, Dir::Up, Dir::Down] {
            let mut l = list();
            render_arrow(&mut l, Vec2::ZERO, COL32_WHITE, dir, 1.0);
            assert_eq!(l.vtx_buffer.len(), 3);
            let b = bounds(&l);
            assert!(b.min.x >= 0.0 && b.min.y >= 0.0, "{dir:?} {b:?}");
            assert!(b.max.x <= 13.0 && b.max.y <= 13.0, "{dir:?} {b:?}");
        }
    }

    #[test]
    fn test_arrow_pointing_at_has_tip_at_pos() {
        let mut l = list();
        let tip = Vec2::new(20.0, 20.0);
        render_arrow_pointing_at(&mut l, tip, Vec2::splat(4.0), Dir::Down, COL32_WHITE);
        assert_eq!(l.vtx_buffer[2].pos(), tip);
        assert!(l.vtx_buffer[0].pos().y < tip.y);
    }

    #[test]
    fn test_bullet_and_check_mark() {
        let mut l = list();
        render_bullet(&mut l, Vec2::splat(10.0), COL32_WHITE);
        assert_eq!(l.vtx_buffer.len(), 8);
        l.reset_for_new_frame();
        render_check_mark(&mut l, Vec2::ZERO, COL32_WHITE, 10.0);
        // Two segments, non-AA.
        assert_eq!(l.vtx_buffer.len(), 8);
        assert!(bounds(&l).max.x <= 10.0);
    }

    #[test]
    fn test_range_h_stays_inside_rect() {
        let rect = Rect::new(Vec2::ZERO, Vec2::new(100.0, 20.0));
        for (a, b) in [(0.0, 0.02), (0.0, 0.5), (0.3, 1.0), (0.97, 1.0), (0.0, 1.0)] {
            let mut l = list();
            render_rect_filled_range_h(&mut l, &rect, COL32_WHITE, a, b, 8.0);
            assert!(!l.vtx_buffer.is_empty(), "{a}..{b}");
            let bb = bounds(&l);
            assert!(bb.min.x >= -1e-3 && bb.max.x <= 100.0 + 1e-3, "{a}..{b} {bb:?}");
            assert!(bb.min.y >= -1e-3 && bb.max.y <= 20.0 + 1e-3, "{a}..{b} {bb:?}");
        }
        let mut l = list();
        render_rect_filled_range_h(&mut l, &rect, COL32_WHITE, 0.4, 0.4, 8.0);
        assert!(l.vtx_buffer.is_empty());
    }

    #[test]
    fn test_hole_covers_frame_only() {
        let mut l = list();
        let outer = Rect::new(Vec2::ZERO, Vec2::splat(30.0));
        let inner = Rect::new(Vec2::splat(10.0), Vec2::splat(20.0));
        render_rect_filled_with_hole(&mut l, &outer, &inner, COL32_WHITE, 0.0);
        // Four sides and four corners.
        assert_eq!(l.vtx_buffer.len(), 8 * 4);
        for tri in l.idx_buffer.chunks(3) {
            let c = tri.iter().map(|&i| l.vtx_buffer[i as usize].pos()).sum::<Vec2>() / 3.0;
            assert!(!inner.contains(c), "triangle inside the hole at {c:?}");
        }
    }

    #[test]
    fn test_hole_rounds_only_open_outer_corners() {
        let outer = Rect::new(Vec2::ZERO, Vec2::splat(30.0));
        let vertex_count = |rounding: f32, inner: &Rect| {
            let mut l = list();
            render_rect_filled_with_hole(&mut l, &outer, inner, COL32_WHITE, rounding);
            l.vtx_buffer.len()
        };

        // Hole closed on every side: the corner pieces carry the rounding.
        let centered = Rect::new(Vec2::splat(10.0), Vec2::splat(20.0));
        assert!(vertex_count(4.0, &centered) > vertex_count(0.0, &centered));

        // Hole open at the top: the side bands own the top corners and round them.
        let open_top = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 20.0));
        assert!(vertex_count(4.0, &open_top) > vertex_count(0.0, &open_top));
    }

    #[test]
    fn test_checkerboard_only_for_translucent() {
        let mut l = list();
        render_color_rect_with_alpha_checkerboard(
            &mut l,
            Vec2::ZERO,
            Vec2::splat(20.0),
            COL32_WHITE,
            5.0,
            Vec2::ZERO,
            0.0,
            DrawFlags::empty(),
        );
        assert_eq!(l.vtx_buffer.len(), 4);

        l.reset_for_new_frame();
        render_color_rect_with_alpha_checkerboard(
            &mut l,
            Vec2::ZERO,
            Vec2::splat(20.0),
            col32(255, 0, 0, 128),
            5.0,
            Vec2::ZERO,
            0.0,
            DrawFlags::empty(),
        );
        // Background plus 2 dark cells per 4-cell row.
        assert_eq!(l.vtx_buffer.len(), 4 + 8 * 4);
        assert!(l.vtx_buffer.iter().all(|v| v.col & COL32_A_MASK != 0));
    }

    #[test]
    fn test_mouse_cursor_layers() {
        let mut atlas = FontAtlas::new();
        atlas.add_font_default(None).unwrap();
        atlas.build().unwrap();
        let mut l = list();
        render_mouse_cursor(
            &mut l,
            &atlas,
            Vec2::splat(50.0),
            1.0,
            MouseCursor::Arrow,
            COL32_WHITE,
            col32(0, 0, 0, 255),
            col32(0, 0, 0, 48),
        );
        assert_eq!(l.vtx_buffer.len(), 16);
        render_mouse_cursor(&mut l, &atlas, Vec2::ZERO, 1.0, MouseCursor::None, COL32_WHITE, 0, 0);
        assert_eq!(l.vtx_buffer.len(), 16);
    }
}
