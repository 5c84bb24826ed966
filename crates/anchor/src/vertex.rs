use crate::primitives::Vec2;

/// Index type of draw-list index buffers. `u16` unless the `index-u32` feature is on.
#[cfg(not(feature = "index-u32"))]
pub type DrawIdx = u16;
#[cfg(feature = "index-u32")]
pub type DrawIdx = u32;

/// Vertices addressable by one command before `vtx_offset` has to move.
pub const DRAW_IDX_LIMIT: usize = if std::mem::size_of::<DrawIdx>() == 2 {
    1 << 16
} else {
    u32::MAX as usize
};

/// One vertex as uploaded to the GPU.
///
/// `#[repr(C)]` with `pos` at offset 0, `uv` at 8 and `col` at 16; backends build
/// their vertex layouts from these offsets.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct DrawVert {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub col: u32,
}

impl DrawVert {
    pub const SIZE: usize = std::mem::size_of::<Self>();
    pub const OFFSET_POS: usize = 0;
    pub const OFFSET_UV: usize = 8;
    pub const OFFSET_COL: usize = 16;

    #[inline]
    pub fn new(pos: Vec2, uv: Vec2, col: u32) -> Self {
        Self {
            pos: pos.to_array(),
            uv: uv.to_array(),
            col,
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::from_array(self.pos)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

/// Opaque texture handle owned by the renderer backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

impl TextureId {
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    pub const fn id(self) -> usize {
        self.0
    }
}

impl From<usize> for TextureId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_contractual() {
        assert_eq!(DrawVert::SIZE, 20);
        let v = DrawVert::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), 0xAABBCCDD);
        let base = &v as *const DrawVert as usize;
        assert_eq!(&v.pos as *const _ as usize - base, DrawVert::OFFSET_POS);
        assert_eq!(&v.uv as *const _ as usize - base, DrawVert::OFFSET_UV);
        assert_eq!(&v.col as *const _ as usize - base, DrawVert::OFFSET_COL);
    }
}
