use anchor::{DrawIdx, DrawVert};

/// Buffer layout matching [`DrawVert`]: position, uv, packed color.
pub const fn draw_vert_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
        wgpu::VertexAttribute {
            offset: DrawVert::OFFSET_POS as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: DrawVert::OFFSET_UV as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: DrawVert::OFFSET_COL as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Unorm8x4, // u8x4 normalized to 0.0-1.0
        },
    ];

    wgpu::VertexBufferLayout {
        array_stride: DrawVert::SIZE as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: ATTRIBUTES,
    }
}

pub const fn index_format() -> wgpu::IndexFormat {
    if std::mem::size_of::<DrawIdx>() == 2 {
        wgpu::IndexFormat::Uint16
    } else {
        wgpu::IndexFormat::Uint32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_draw_vert() {
        let layout = draw_vert_layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[2].offset, 16);
    }

    #[test]
    fn test_index_format_follows_draw_idx() {
        let expected = if DrawIdx::MAX as u64 > u16::MAX as u64 {
            wgpu::IndexFormat::Uint32
        } else {
            wgpu::IndexFormat::Uint16
        };
        assert_eq!(index_format(), expected);
    }
}
