//! Frame output handed to a renderer backend.

use crate::draw_list::DrawList;
use crate::primitives::{Vec2, Vec4};
use crate::vertex::DrawVert;

/// All draw lists of a frame, in back-to-front order.
///
/// Borrowed from the [`crate::Context`] until the next frame starts.
#[derive(Debug, Default)]
pub struct DrawData<'a> {
    /// Only `true` between `render()` and the next `new_frame()`.
    pub valid: bool,
    pub cmd_lists: Vec<&'a mut DrawList>,
    pub total_idx_count: usize,
    pub total_vtx_count: usize,
    /// Top-left of the viewport in UI coordinates.
    pub display_pos: Vec2,
    pub display_size: Vec2,
    /// Pixels per UI unit, usually `(1, 1)` or `(2, 2)` on high-DPI displays.
    pub framebuffer_scale: Vec2,
}

impl<'a> DrawData<'a> {
    pub fn new(display_pos: Vec2, display_size: Vec2, framebuffer_scale: Vec2) -> Self {
        Self {
            valid: false,
            cmd_lists: Vec::new(),
            total_idx_count: 0,
            total_vtx_count: 0,
            display_pos,
            display_size,
            framebuffer_scale,
        }
    }

    /// Append a list, dropping its trailing empty command. Empty lists are skipped.
    pub fn add_draw_list(&mut self, draw_list: &'a mut DrawList) {
        draw_list.pop_unused_draw_cmd();
        if draw_list.cmd_buffer.is_empty() {
            return;
        }
        self.total_vtx_count += draw_list.vtx_buffer.len();
        self.total_idx_count += draw_list.idx_buffer.len();
        self.cmd_lists.push(draw_list);
    }

    #[inline]
    pub fn cmd_lists_count(&self) -> usize {
        self.cmd_lists.len()
    }

    pub fn clear(&mut self) {
        self.valid = false;
        self.cmd_lists.clear();
        self.total_idx_count = 0;
        self.total_vtx_count = 0;
        self.display_pos = Vec2::ZERO;
        self.display_size = Vec2::ZERO;
        self.framebuffer_scale = Vec2::ZERO;
    }

    /// Multiply every clip rect by `scale`, for backends that work in framebuffer pixels.
    pub fn scale_clip_rects(&mut self, scale: Vec2) {
        let factor = Vec4::new(scale.x, scale.y, scale.x, scale.y);
        for list in &mut self.cmd_lists {
            for cmd in &mut list.cmd_buffer {
                cmd.clip_rect *= factor;
            }
        }
    }

    /// Expand every list to non-indexed triangles, for backends without index buffers.
    ///
    /// Commands keep their `idx_offset`/`elem_count`, which now address vertices directly.
    pub fn de_index_all_buffers(&mut self) {
        self.total_vtx_count = 0;
        for list in &mut self.cmd_lists {
            if list.idx_buffer.is_empty() {
                continue;
            }
            let mut expanded: Vec<DrawVert> = Vec::with_capacity(list.idx_buffer.len());
            for cmd in &list.cmd_buffer {
                let start = cmd.idx_offset as usize;
                let end = start + cmd.elem_count as usize;
                for &idx in &list.idx_buffer[start..end] {
                    expanded.push(list.vtx_buffer[cmd.vtx_offset as usize + idx as usize]);
                }
            }
            for cmd in &mut list.cmd_buffer {
                cmd.vtx_offset = 0;
            }
            list.vtx_buffer = expanded;
            list.idx_buffer.clear();
            self.total_vtx_count += list.vtx_buffer.len();
        }
        self.total_idx_count = 0;
    }

    /// Iterate `(list, command)` pairs in submission order.
    pub fn commands(&self) -> impl Iterator<Item = (&DrawList, &crate::draw_cmd::DrawCmd)> + '_ {
        self.cmd_lists
            .iter()
            .flat_map(|list| list.cmd_buffer.iter().map(move |cmd| (&**list, cmd)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::COL32_WHITE;
    use crate::flags::{DrawFlags, DrawListFlags};
    use crate::shared::SharedData;
    use std::sync::Arc;

    fn list() -> DrawList {
        let mut data = SharedData::new();
        data.initial_flags = DrawListFlags::ANTI_ALIASED_FILL;
        DrawList::new(Arc::new(data))
    }

    fn triangles(vertices: impl Iterator<Item = DrawVert>) -> Vec<[(u32, u32, u32); 3]> {
        let verts: Vec<(u32, u32, u32)> = vertices
            .map(|v| (v.pos[0].to_bits(), v.pos[1].to_bits(), v.col))
            .collect();
        let mut tris: Vec<[(u32, u32, u32); 3]> = verts.chunks(3).map(|c| [c[0], c[1], c[2]]).collect();
        tris.sort();
        tris
    }

    #[test]
    fn test_totals_and_empty_lists() {
        let mut a = list();
        let mut b = list();
        let mut empty = list();
        a.add_rect_filled(Vec2::ZERO, Vec2::splat(10.0), COL32_WHITE, 0.0, DrawFlags::empty());
        b.add_circle_filled(Vec2::splat(20.0), 5.0, COL32_WHITE, 0);
        let (a_vtx, b_vtx) = (a.vtx_buffer.len(), b.vtx_buffer.len());
        let (a_idx, b_idx) = (a.idx_buffer.len(), b.idx_buffer.len());

        let mut data = DrawData::new(Vec2::ZERO, Vec2::splat(100.0), Vec2::ONE);
        data.add_draw_list(&mut a);
        data.add_draw_list(&mut empty);
        data.add_draw_list(&mut b);
        assert_eq!(data.cmd_lists_count(), 2);
        assert_eq!(data.total_vtx_count, a_vtx + b_vtx);
        assert_eq!(data.total_idx_count, a_idx + b_idx);
        assert_eq!(data.commands().count(), 2);
    }

    #[test]
    fn test_scale_clip_rects() {
        let mut a = list();
        a.push_clip_rect(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), false);
        a.add_rect_filled(Vec2::ZERO, Vec2::splat(10.0), COL32_WHITE, 0.0, DrawFlags::empty());
        a.pop_clip_rect();
        let mut data = DrawData::new(Vec2::ZERO, Vec2::splat(100.0), Vec2::splat(2.0));
        data.add_draw_list(&mut a);
        data.scale_clip_rects(Vec2::splat(2.0));
        assert_eq!(data.cmd_lists[0].cmd_buffer[0].clip_rect, Vec4::new(2.0, 4.0, 6.0, 8.0));
    }

    #[test]
    fn test_de_index_keeps_triangle_set() {
        let mut a = list();
        a.add_rect_filled(Vec2::ZERO, Vec2::splat(10.0), COL32_WHITE, 3.0, DrawFlags::empty());
        a.add_triangle_filled(Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(0.0, 5.0), 0xFF00_00FF);
        let indexed: Vec<DrawVert> = a
            .idx_buffer
            .iter()
            .map(|&i| a.vtx_buffer[i as usize])
            .collect();
        let idx_count = a.idx_buffer.len();

        let mut data = DrawData::new(Vec2::ZERO, Vec2::splat(100.0), Vec2::ONE);
        data.add_draw_list(&mut a);
        data.de_index_all_buffers();
        assert_eq!(data.total_idx_count, 0);
        assert_eq!(data.total_vtx_count, idx_count);
        let list = &data.cmd_lists[0];
        assert!(list.idx_buffer.is_empty());
        assert_eq!(
            triangles(list.vtx_buffer.iter().copied()),
            triangles(indexed.into_iter())
        );
    }

    #[test]
    fn test_clear() {
        let mut a = list();
        a.add_rect_filled(Vec2::ZERO, Vec2::splat(10.0), COL32_WHITE, 0.0, DrawFlags::empty());
        let mut data = DrawData::new(Vec2::ZERO, Vec2::splat(100.0), Vec2::ONE);
        data.add_draw_list(&mut a);
        data.valid = true;
        data.clear();
        assert!(!data.valid);
        assert_eq!(data.cmd_lists_count(), 0);
        assert_eq!(data.total_vtx_count, 0);
    }
}
