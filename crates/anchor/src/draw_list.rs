//! Per-layer vertex, index and command buffers.
//!
//! A [`DrawList`] is filled by the shape functions (see `tessellate.rs`) and handed
//! to a renderer through [`crate::DrawData`]. Each command covers a contiguous index
//! range drawn with one clip rect, texture and base vertex.

use std::sync::Arc;

use crate::channels::ChannelSplitter;
use crate::color::COL32_A_MASK;
use crate::draw_cmd::{DrawCallback, DrawCmd, DrawCmdHeader};
use crate::flags::DrawListFlags;
use crate::font::Font;
use crate::primitives::{Vec2, Vec4};
use crate::shared::SharedData;
use crate::vertex::{DrawIdx, DrawVert, TextureId, DRAW_IDX_LIMIT};

#[derive(Debug)]
pub struct DrawList {
    /// Draw commands. Usually one per clip rect and texture change.
    pub cmd_buffer: Vec<DrawCmd>,
    /// Indices, relative to the owning command's `vtx_offset`.
    pub idx_buffer: Vec<DrawIdx>,
    pub vtx_buffer: Vec<DrawVert>,
    pub flags: DrawListFlags,

    /// Vertices written since the last `vtx_offset` change.
    pub(crate) vtx_current_idx: u32,
    pub(crate) data: Arc<SharedData>,
    owner_name: String,
    pub(crate) vtx_write: usize,
    pub(crate) idx_write: usize,
    pub(crate) clip_rect_stack: Vec<Vec4>,
    pub(crate) texture_id_stack: Vec<TextureId>,
    pub(crate) path: Vec<Vec2>,
    pub(crate) cmd_header: DrawCmdHeader,
    pub(crate) splitter: ChannelSplitter,
    pub(crate) fringe_scale: f32,
    // Scratch reused by the tessellators.
    pub(crate) temp_normals: Vec<Vec2>,
    pub(crate) temp_points: Vec<Vec2>,
    overflow_reported: bool,
}

impl DrawList {
    pub fn new(data: Arc<SharedData>) -> Self {
        let mut list = Self {
            cmd_buffer: Vec::new(),
            idx_buffer: Vec::new(),
            vtx_buffer: Vec::new(),
            flags: data.initial_flags,
            vtx_current_idx: 0,
            data,
            owner_name: String::new(),
            vtx_write: 0,
            idx_write: 0,
            clip_rect_stack: Vec::new(),
            texture_id_stack: Vec::new(),
            path: Vec::new(),
            cmd_header: DrawCmdHeader::default(),
            splitter: ChannelSplitter::default(),
            fringe_scale: 1.0,
            temp_normals: Vec::new(),
            temp_points: Vec::new(),
            overflow_reported: false,
        };
        list.reset_for_new_frame();
        list
    }

    pub fn with_owner_name(mut self, name: impl Into<String>) -> Self {
        self.owner_name = name.into();
        self
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn shared_data(&self) -> &Arc<SharedData> {
        &self.data
    }

    /// Swap in the context's rebuilt shared data. Takes effect on the next reset.
    pub fn set_shared_data(&mut self, data: Arc<SharedData>) {
        self.data = data;
    }

    pub fn vtx_current_idx(&self) -> u32 {
        self.vtx_current_idx
    }

    pub fn fringe_scale(&self) -> f32 {
        self.fringe_scale
    }

    /// Width of the anti-aliased fringe. Raise it when drawing into a scaled-down target.
    pub fn set_fringe_scale(&mut self, scale: f32) {
        self.fringe_scale = scale;
    }

    /// Clear all output and start over with a single empty command.
    pub fn reset_for_new_frame(&mut self) {
        debug_assert!(self.splitter.count() <= 1, "reset while channels are split");

        self.cmd_buffer.clear();
        self.idx_buffer.clear();
        self.vtx_buffer.clear();
        self.flags = self.data.initial_flags;
        self.cmd_header = DrawCmdHeader {
            clip_rect: self.data.clip_rect_fullscreen,
            texture_id: TextureId::default(),
            vtx_offset: 0,
        };
        self.vtx_current_idx = 0;
        self.vtx_write = 0;
        self.idx_write = 0;
        self.clip_rect_stack.clear();
        self.texture_id_stack.clear();
        self.path.clear();
        self.splitter.clear();
        self.fringe_scale = 1.0;
        self.overflow_reported = false;
        self.add_draw_cmd();
    }

    /// Release every buffer, including the channel storage.
    pub fn clear_free_memory(&mut self) {
        self.cmd_buffer = Vec::new();
        self.idx_buffer = Vec::new();
        self.vtx_buffer = Vec::new();
        self.clip_rect_stack = Vec::new();
        self.texture_id_stack = Vec::new();
        self.path = Vec::new();
        self.temp_normals = Vec::new();
        self.temp_points = Vec::new();
        self.splitter.clear_free_memory();
        self.vtx_current_idx = 0;
        self.vtx_write = 0;
        self.idx_write = 0;
    }

    /// Copy of the output buffers, e.g. to keep a frame around after the list is reset.
    pub fn clone_output(&self) -> DrawList {
        let mut dst = DrawList::new(Arc::clone(&self.data)).with_owner_name(self.owner_name.clone());
        dst.cmd_buffer = self.cmd_buffer.clone();
        dst.idx_buffer = self.idx_buffer.clone();
        dst.vtx_buffer = self.vtx_buffer.clone();
        dst.flags = self.flags;
        dst
    }

    // Commands

    /// Start a new command from the current clip rect, texture and vertex offset.
    pub fn add_draw_cmd(&mut self) {
        let idx_offset = self.idx_buffer.len() as u32;
        debug_assert!(self.cmd_header.clip_rect.x <= self.cmd_header.clip_rect.z);
        debug_assert!(self.cmd_header.clip_rect.y <= self.cmd_header.clip_rect.w);
        self.cmd_buffer.push(DrawCmd::from_header(self.cmd_header, idx_offset));
    }

    /// Queue a callback for the renderer. Following geometry goes into a fresh command.
    pub fn add_callback(&mut self, callback: DrawCallback) {
        let needs_cmd = self
            .cmd_buffer
            .last()
            .map_or(true, |cmd| cmd.elem_count != 0 || cmd.user_callback.is_some());
        if needs_cmd {
            self.add_draw_cmd();
        }
        if let Some(cmd) = self.cmd_buffer.last_mut() {
            cmd.user_callback = Some(callback);
        }
        self.add_draw_cmd();
    }

    /// Drop a trailing command that draws nothing.
    pub fn pop_unused_draw_cmd(&mut self) {
        if matches!(self.cmd_buffer.last(), Some(cmd) if cmd.elem_count == 0 && cmd.user_callback.is_none()) {
            self.cmd_buffer.pop();
        }
    }

    /// Fold the last command into the previous one when they can share a draw call.
    pub fn try_merge_draw_cmds(&mut self) {
        let n = self.cmd_buffer.len();
        if n < 2 {
            return;
        }
        let (head, tail) = self.cmd_buffer.split_at_mut(n - 1);
        let (prev, curr) = (&mut head[n - 2], &tail[0]);
        if prev.can_merge_with(curr) && prev.idx_offset + prev.elem_count == curr.idx_offset {
            prev.elem_count += curr.elem_count;
            self.cmd_buffer.pop();
        }
    }

    pub(crate) fn on_changed_clip_rect(&mut self) {
        let header = self.cmd_header;
        let n = self.cmd_buffer.len();
        let Some(curr) = self.cmd_buffer.last() else {
            self.add_draw_cmd();
            return;
        };
        if curr.elem_count != 0 && curr.clip_rect != header.clip_rect {
            self.add_draw_cmd();
            return;
        }
        debug_assert!(curr.user_callback.is_none());

        if curr.elem_count == 0 && n > 1 {
            let prev = &self.cmd_buffer[n - 2];
            if prev.header_eq(&header) && prev.user_callback.is_none() {
                self.cmd_buffer.pop();
                return;
            }
        }
        self.cmd_buffer[n - 1].clip_rect = header.clip_rect;
    }

    pub(crate) fn on_changed_texture_id(&mut self) {
        let header = self.cmd_header;
        let n = self.cmd_buffer.len();
        let Some(curr) = self.cmd_buffer.last() else {
            self.add_draw_cmd();
            return;
        };
        if curr.elem_count != 0 && curr.texture_id != header.texture_id {
            self.add_draw_cmd();
            return;
        }
        debug_assert!(curr.user_callback.is_none());

        if curr.elem_count == 0 && n > 1 {
            let prev = &self.cmd_buffer[n - 2];
            if prev.header_eq(&header) && prev.user_callback.is_none() {
                self.cmd_buffer.pop();
                return;
            }
        }
        self.cmd_buffer[n - 1].texture_id = header.texture_id;
    }

    pub(crate) fn on_changed_vtx_offset(&mut self) {
        // Indices restart at 0 relative to the new base.
        self.vtx_current_idx = 0;
        match self.cmd_buffer.last_mut() {
            Some(curr) if curr.elem_count == 0 => {
                debug_assert!(curr.user_callback.is_none());
                curr.vtx_offset = self.cmd_header.vtx_offset;
            }
            _ => self.add_draw_cmd(),
        }
    }

    // State stacks

    /// Push a clip rect, optionally intersected with the current one.
    ///
    /// The stored rect never inverts: `max` is raised to `min` on either axis, so a
    /// disjoint intersection yields an empty rect that clips everything.
    pub fn push_clip_rect(&mut self, min: Vec2, max: Vec2, intersect_with_current: bool) {
        let mut cr = Vec4::new(min.x, min.y, max.x, max.y);
        if intersect_with_current {
            let current = self.cmd_header.clip_rect;
            cr.x = cr.x.max(current.x);
            cr.y = cr.y.max(current.y);
            cr.z = cr.z.min(current.z);
            cr.w = cr.w.min(current.w);
        }
        cr.z = cr.x.max(cr.z);
        cr.w = cr.y.max(cr.w);

        self.clip_rect_stack.push(cr);
        self.cmd_header.clip_rect = cr;
        self.on_changed_clip_rect();
    }

    pub fn push_clip_rect_full_screen(&mut self) {
        let full = self.data.clip_rect_fullscreen;
        self.push_clip_rect(Vec2::new(full.x, full.y), Vec2::new(full.z, full.w), false);
    }

    pub fn pop_clip_rect(&mut self) {
        debug_assert!(!self.clip_rect_stack.is_empty(), "pop_clip_rect without push");
        self.clip_rect_stack.pop();
        self.cmd_header.clip_rect = self
            .clip_rect_stack
            .last()
            .copied()
            .unwrap_or(self.data.clip_rect_fullscreen);
        self.on_changed_clip_rect();
    }

    pub fn get_clip_rect_min(&self) -> Vec2 {
        let cr = self.cmd_header.clip_rect;
        Vec2::new(cr.x, cr.y)
    }

    pub fn get_clip_rect_max(&self) -> Vec2 {
        let cr = self.cmd_header.clip_rect;
        Vec2::new(cr.z, cr.w)
    }

    /// Clip rect new geometry is recorded with.
    pub fn current_clip_rect(&self) -> Vec4 {
        self.cmd_header.clip_rect
    }

    pub fn push_texture_id(&mut self, texture_id: TextureId) {
        self.texture_id_stack.push(texture_id);
        self.cmd_header.texture_id = texture_id;
        self.on_changed_texture_id();
    }

    pub fn pop_texture_id(&mut self) {
        debug_assert!(!self.texture_id_stack.is_empty(), "pop_texture_id without push");
        self.texture_id_stack.pop();
        self.cmd_header.texture_id = self.texture_id_stack.last().copied().unwrap_or_default();
        self.on_changed_texture_id();
    }

    pub fn current_texture_id(&self) -> TextureId {
        self.cmd_header.texture_id
    }

    /// Start addressing vertices from the current end of the vertex buffer.
    pub fn push_vtx_offset(&mut self) {
        self.cmd_header.vtx_offset = self.vtx_buffer.len() as u32;
        self.on_changed_vtx_offset();
    }

    // Channels

    pub fn channels_split(&mut self, count: usize) {
        let mut splitter = std::mem::take(&mut self.splitter);
        splitter.split(self, count);
        self.splitter = splitter;
    }

    pub fn channels_set_current(&mut self, n: usize) {
        let mut splitter = std::mem::take(&mut self.splitter);
        splitter.set_current_channel(self, n);
        self.splitter = splitter;
    }

    pub fn channels_merge(&mut self) {
        let mut splitter = std::mem::take(&mut self.splitter);
        splitter.merge(self);
        self.splitter = splitter;
    }

    // Primitive reservation and writers

    /// Make room for `idx_count` indices and `vtx_count` vertices in the current command.
    ///
    /// With 16-bit indices the vertex offset moves forward when the range would
    /// overflow. Without [`DrawListFlags::ALLOW_VTX_OFFSET`] nothing is reserved and
    /// `false` is returned; the caller must not write.
    pub fn prim_reserve(&mut self, idx_count: usize, vtx_count: usize) -> bool {
        if std::mem::size_of::<DrawIdx>() == 2 && self.vtx_current_idx as usize + vtx_count >= DRAW_IDX_LIMIT {
            if self.flags.contains(DrawListFlags::ALLOW_VTX_OFFSET) && vtx_count < DRAW_IDX_LIMIT {
                self.cmd_header.vtx_offset = self.vtx_buffer.len() as u32;
                self.on_changed_vtx_offset();
            } else {
                self.report_index_overflow(vtx_count);
                return false;
            }
        }

        let Some(cmd) = self.cmd_buffer.last_mut() else {
            return false;
        };
        cmd.elem_count += idx_count as u32;

        let vtx_start = self.vtx_buffer.len();
        self.vtx_buffer.resize(vtx_start + vtx_count, DrawVert::default());
        self.vtx_write = vtx_start;

        let idx_start = self.idx_buffer.len();
        self.idx_buffer.resize(idx_start + idx_count, 0);
        self.idx_write = idx_start;
        true
    }

    /// Give back the tail of the last reservation.
    pub fn prim_unreserve(&mut self, idx_count: usize, vtx_count: usize) {
        if let Some(cmd) = self.cmd_buffer.last_mut() {
            cmd.elem_count = cmd.elem_count.saturating_sub(idx_count as u32);
        }
        self.vtx_buffer.truncate(self.vtx_buffer.len().saturating_sub(vtx_count));
        self.idx_buffer.truncate(self.idx_buffer.len().saturating_sub(idx_count));
        self.vtx_write = self.vtx_write.min(self.vtx_buffer.len());
        self.idx_write = self.idx_write.min(self.idx_buffer.len());
    }

    fn report_index_overflow(&mut self, vtx_count: usize) {
        if self.overflow_reported || !self.data.diagnostics.warn_index_overflow {
            return;
        }
        self.overflow_reported = true;
        log::warn!(
            "draw list '{}': dropped {} vertices, 16-bit index range exhausted and vertex offsets not allowed",
            self.owner_name,
            vtx_count
        );
    }

    /// Write a vertex without advancing the index counter.
    #[inline]
    pub(crate) fn put_vtx(&mut self, pos: Vec2, uv: Vec2, col: u32) {
        self.vtx_buffer[self.vtx_write] = DrawVert::new(pos, uv, col);
        self.vtx_write += 1;
    }

    #[inline]
    pub(crate) fn put_idx(&mut self, idx: u32) {
        self.idx_buffer[self.idx_write] = idx as DrawIdx;
        self.idx_write += 1;
    }

    #[inline]
    pub fn prim_write_vtx(&mut self, pos: Vec2, uv: Vec2, col: u32) {
        self.put_vtx(pos, uv, col);
        self.vtx_current_idx += 1;
    }

    #[inline]
    pub fn prim_write_idx(&mut self, idx: DrawIdx) {
        self.idx_buffer[self.idx_write] = idx;
        self.idx_write += 1;
    }

    /// Write a vertex and the index pointing at it.
    #[inline]
    pub fn prim_vtx(&mut self, pos: Vec2, uv: Vec2, col: u32) {
        self.put_idx(self.vtx_current_idx);
        self.prim_write_vtx(pos, uv, col);
    }

    /// Axis-aligned rect using the white pixel. Needs a prior `prim_reserve(6, 4)`.
    pub fn prim_rect(&mut self, a: Vec2, c: Vec2, col: u32) {
        let uv = self.data.tex_uv_white_pixel;
        let b = Vec2::new(c.x, a.y);
        let d = Vec2::new(a.x, c.y);
        self.write_quad([a, b, c, d], [uv; 4], col);
    }

    pub fn prim_rect_uv(&mut self, a: Vec2, c: Vec2, uv_a: Vec2, uv_c: Vec2, col: u32) {
        let b = Vec2::new(c.x, a.y);
        let d = Vec2::new(a.x, c.y);
        let uv_b = Vec2::new(uv_c.x, uv_a.y);
        let uv_d = Vec2::new(uv_a.x, uv_c.y);
        self.write_quad([a, b, c, d], [uv_a, uv_b, uv_c, uv_d], col);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn prim_quad_uv(
        &mut self,
        a: Vec2,
        b: Vec2,
        c: Vec2,
        d: Vec2,
        uv_a: Vec2,
        uv_b: Vec2,
        uv_c: Vec2,
        uv_d: Vec2,
        col: u32,
    ) {
        self.write_quad([a, b, c, d], [uv_a, uv_b, uv_c, uv_d], col);
    }

    fn write_quad(&mut self, pos: [Vec2; 4], uv: [Vec2; 4], col: u32) {
        let idx = self.vtx_current_idx;
        for i in [0, 1, 2, 0, 2, 3] {
            self.put_idx(idx + i);
        }
        for (p, t) in pos.into_iter().zip(uv) {
            self.put_vtx(p, t, col);
        }
        self.vtx_current_idx += 4;
    }

    // Text and images

    /// Draw UTF-8 text with the current font and size.
    pub fn add_text(&mut self, pos: Vec2, col: u32, text: &str) {
        let Some(font) = self.data.font.clone() else {
            return;
        };
        let size = self.data.font_size;
        self.add_text_with_font(&font, size, pos, col, text.as_bytes(), 0.0, None);
    }

    /// Draw text with an explicit font. A `font_size` of 0 uses the current size.
    ///
    /// `cpu_fine_clip_rect` additionally clips glyph quads on the CPU.
    #[allow(clippy::too_many_arguments)]
    pub fn add_text_with_font(
        &mut self,
        font: &Font,
        font_size: f32,
        pos: Vec2,
        col: u32,
        text: &[u8],
        wrap_width: f32,
        cpu_fine_clip_rect: Option<Vec4>,
    ) {
        if col & COL32_A_MASK == 0 || text.is_empty() {
            return;
        }
        let font_size = if font_size == 0.0 { self.data.font_size } else { font_size };

        let mut clip_rect = self.cmd_header.clip_rect;
        if let Some(fine) = cpu_fine_clip_rect {
            clip_rect.x = clip_rect.x.max(fine.x);
            clip_rect.y = clip_rect.y.max(fine.y);
            clip_rect.z = clip_rect.z.min(fine.z);
            clip_rect.w = clip_rect.w.min(fine.w);
        }

        let push_texture = font.tex_id != self.cmd_header.texture_id;
        if push_texture {
            self.push_texture_id(font.tex_id);
        }
        font.render_text(self, font_size, pos, col, clip_rect, text, wrap_width, cpu_fine_clip_rect.is_some());
        if push_texture {
            self.pop_texture_id();
        }
    }

    pub fn add_image(&mut self, texture_id: TextureId, p_min: Vec2, p_max: Vec2, uv_min: Vec2, uv_max: Vec2, col: u32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        let push_texture = texture_id != self.cmd_header.texture_id;
        if push_texture {
            self.push_texture_id(texture_id);
        }
        if self.prim_reserve(6, 4) {
            self.prim_rect_uv(p_min, p_max, uv_min, uv_max, col);
        }
        if push_texture {
            self.pop_texture_id();
        }
    }

    /// Image mapped onto an arbitrary quad, corners in order.
    pub fn add_image_quad(&mut self, texture_id: TextureId, p: [Vec2; 4], uv: [Vec2; 4], col: u32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        let push_texture = texture_id != self.cmd_header.texture_id;
        if push_texture {
            self.push_texture_id(texture_id);
        }
        if self.prim_reserve(6, 4) {
            self.prim_quad_uv(p[0], p[1], p[2], p[3], uv[0], uv[1], uv[2], uv[3], col);
        }
        if push_texture {
            self.pop_texture_id();
        }
    }
}
