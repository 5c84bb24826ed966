use std::fmt;
use std::sync::Arc;

use crate::draw_list::DrawList;
use crate::primitives::Vec4;
use crate::vertex::TextureId;

/// User code invoked by the renderer in place of a draw call.
pub type DrawCallbackFn = dyn Fn(&DrawList, &DrawCmd) + Send + Sync;

/// What a callback command asks the renderer to do.
#[derive(Clone)]
pub enum DrawCallback {
    /// Restore the renderer's own pipeline, buffers and bindings.
    ResetRenderState,
    /// Run user code with the owning draw list and command.
    Custom(Arc<DrawCallbackFn>),
}

impl DrawCallback {
    pub fn custom(f: impl Fn(&DrawList, &DrawCmd) + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for DrawCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetRenderState => f.write_str("ResetRenderState"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// The state two commands must share to be drawn with one GPU call.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DrawCmdHeader {
    /// `(x1, y1, x2, y2)` in display space.
    pub clip_rect: Vec4,
    pub texture_id: TextureId,
    pub vtx_offset: u32,
}

/// A contiguous index range drawn with a single clip rect and texture.
#[derive(Clone, Debug, Default)]
pub struct DrawCmd {
    /// `(x1, y1, x2, y2)` in display space. Multiply by the framebuffer scale for pixels.
    pub clip_rect: Vec4,
    pub texture_id: TextureId,
    /// Base vertex for this command's indices.
    pub vtx_offset: u32,
    /// Start of this command's range in the index buffer.
    pub idx_offset: u32,
    /// Number of indices (three per triangle).
    pub elem_count: u32,
    pub user_callback: Option<DrawCallback>,
}

impl DrawCmd {
    pub fn from_header(header: DrawCmdHeader, idx_offset: u32) -> Self {
        Self {
            clip_rect: header.clip_rect,
            texture_id: header.texture_id,
            vtx_offset: header.vtx_offset,
            idx_offset,
            elem_count: 0,
            user_callback: None,
        }
    }

    pub fn header(&self) -> DrawCmdHeader {
        DrawCmdHeader {
            clip_rect: self.clip_rect,
            texture_id: self.texture_id,
            vtx_offset: self.vtx_offset,
        }
    }

    #[inline]
    pub fn header_eq(&self, header: &DrawCmdHeader) -> bool {
        self.clip_rect == header.clip_rect
            && self.texture_id == header.texture_id
            && self.vtx_offset == header.vtx_offset
    }

    pub fn set_header(&mut self, header: &DrawCmdHeader) {
        self.clip_rect = header.clip_rect;
        self.texture_id = header.texture_id;
        self.vtx_offset = header.vtx_offset;
    }

    /// Adjacent commands can be merged into one draw call.
    pub fn can_merge_with(&self, next: &DrawCmd) -> bool {
        self.header_eq(&next.header())
            && self.user_callback.is_none()
            && next.user_callback.is_none()
    }

    /// Degenerate clip rect: nothing of this command is visible.
    pub fn is_clipped_out(&self) -> bool {
        self.clip_rect.z <= self.clip_rect.x || self.clip_rect.w <= self.clip_rect.y
    }
}
