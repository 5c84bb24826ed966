//! # anchor-wgpu
//!
//! WGPU rendering backend for anchor.
//!
//! [`Renderer`] uploads the frame's [`DrawData`] into shared vertex/index buffers
//! and issues one `draw_indexed` per command, with the command's clip rect as
//! scissor and its texture bound. [`InputState`] feeds winit window events into
//! the core [`anchor::Io`].

mod input;
mod vertex;

pub use input::*;

use std::borrow::Cow;
use std::collections::HashMap;

use anchor::{AtlasError, DrawCallback, DrawData, DrawIdx, DrawVert, FontAtlas, TextureId, Vec2, Vec4, COL32_R_SHIFT};
use glam::Mat4;
use vertex::{draw_vert_layout, index_format};

const INITIAL_VERTEX_CAPACITY: usize = 5000;
const INITIAL_INDEX_CAPACITY: usize = 10000;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("texture data is {actual} bytes, {width}x{height} needs {expected}")]
    TextureSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("texture {0:?} is not registered with this renderer")]
    UnknownTexture(TextureId),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// Pixels handed to [`Renderer::register_texture`], rows top to bottom.
#[derive(Clone, Copy, Debug)]
pub enum TexturePixels<'a> {
    /// One coverage byte per pixel, drawn as white with that alpha.
    Alpha8(&'a [u8]),
    /// Four bytes per pixel in R, G, B, A order.
    Rgba8(&'a [u8]),
}

impl<'a> TexturePixels<'a> {
    fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Alpha8(_) => 1,
            Self::Rgba8(_) => 4,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Alpha8(p) | Self::Rgba8(p) => p.len(),
        }
    }

    fn to_rgba8(self) -> Cow<'a, [u8]> {
        match self {
            Self::Alpha8(p) => Cow::Owned(p.iter().flat_map(|&a| [255, 255, 255, a]).collect()),
            Self::Rgba8(p) => Cow::Borrowed(p),
        }
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

/// WGPU renderer for anchor draw data
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_capacity: usize,
    index_capacity: usize,

    textures: HashMap<TextureId, GpuTexture>,
    next_texture_id: usize,

    // Scratch, reused across frames.
    vertices: Vec<DrawVert>,
    indices: Vec<DrawIdx>,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Anchor UI Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/anchor.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Anchor UI Uniform Buffer"),
            size: std::mem::size_of::<[f32; 16]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Anchor UI Globals Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Anchor UI Globals Bind Group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Anchor UI Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Anchor UI Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Anchor UI Pipeline Layout"),
            bind_group_layouts: &[&globals_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let vs_entry = if COL32_R_SHIFT == 0 { "vs_main" } else { "vs_main_bgra" };
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Anchor UI Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(vs_entry),
                buffers: &[draw_vert_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            vertex_buffer: create_vertex_buffer(device, INITIAL_VERTEX_CAPACITY),
            index_buffer: create_index_buffer(device, INITIAL_INDEX_CAPACITY),
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group_layout,
            sampler,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            index_capacity: INITIAL_INDEX_CAPACITY,
            textures: HashMap::new(),
            next_texture_id: 1,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Upload a texture and return the id draw commands refer to it by.
    pub fn register_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: TexturePixels<'_>,
    ) -> Result<TextureId, RendererError> {
        check_texture_size(width, height, &pixels)?;
        let id = TextureId::new(self.next_texture_id);
        self.next_texture_id += 1;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Anchor UI Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_texture(queue, &texture, width, height, pixels);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Anchor UI Texture Bind Group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        log::debug!("registered texture {id:?} ({width}x{height})");
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
                size: (width, height),
            },
        );
        Ok(id)
    }

    /// Overwrite the pixels of a registered texture of the same size.
    pub fn update_texture(
        &mut self,
        queue: &wgpu::Queue,
        id: TextureId,
        pixels: TexturePixels<'_>,
    ) -> Result<(), RendererError> {
        let tex = self.textures.get(&id).ok_or(RendererError::UnknownTexture(id))?;
        let (width, height) = tex.size;
        check_texture_size(width, height, &pixels)?;
        write_texture(queue, &tex.texture, width, height, pixels);
        Ok(())
    }

    pub fn remove_texture(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    pub fn has_texture(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    /// Build the atlas if needed, upload its pixels and store the texture id in it.
    ///
    /// Re-uploading replaces the texture previously registered for this atlas.
    pub fn upload_font_atlas(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        atlas: &mut FontAtlas,
    ) -> Result<TextureId, RendererError> {
        let previous = atlas.tex_id();
        let (pixels, width, height) = atlas.get_tex_data_as_alpha8()?;

        let id = match self.textures.get(&previous) {
            Some(tex) if tex.size == (width, height) => {
                self.update_texture(queue, previous, TexturePixels::Alpha8(pixels))?;
                previous
            }
            _ => {
                let id = self.register_texture(device, queue, width, height, TexturePixels::Alpha8(pixels))?;
                self.remove_texture(previous);
                id
            }
        };
        atlas.set_tex_id(id);
        log::info!("Font atlas uploaded: {width}x{height} as {id:?}");
        Ok(id)
    }

    /// Draw one frame of `draw_data` on top of `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        draw_data: &DrawData<'_>,
    ) {
        let fb_size = draw_data.display_size * draw_data.framebuffer_scale;
        if fb_size.x <= 0.0 || fb_size.y <= 0.0 || draw_data.total_vtx_count == 0 {
            return;
        }
        let (fb_width, fb_height) = (fb_size.x as u32, fb_size.y as u32);

        self.vertices.clear();
        self.indices.clear();
        self.vertices.reserve(draw_data.total_vtx_count);
        self.indices.reserve(draw_data.total_idx_count + 1);
        for list in &draw_data.cmd_lists {
            self.vertices.extend_from_slice(&list.vtx_buffer);
            self.indices.extend_from_slice(&list.idx_buffer);
        }
        // Buffer writes must be a multiple of 4 bytes.
        while (self.indices.len() * std::mem::size_of::<DrawIdx>()) % 4 != 0 {
            self.indices.push(0);
        }

        if self.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = (self.vertices.len() * 2).next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
        }
        if self.indices.len() > self.index_capacity {
            self.index_capacity = (self.indices.len() * 2).next_power_of_two();
            self.index_buffer = create_index_buffer(device, self.index_capacity);
        }

        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&self.indices));

        let projection = projection_matrix(draw_data.display_pos, draw_data.display_size);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&projection.to_cols_array()),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Anchor UI Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // Preserve existing content
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.setup_render_state(&mut render_pass, fb_size);

        let mut global_vtx_offset = 0u32;
        let mut global_idx_offset = 0u32;
        for list in &draw_data.cmd_lists {
            for cmd in &list.cmd_buffer {
                match &cmd.user_callback {
                    Some(DrawCallback::ResetRenderState) => {
                        self.setup_render_state(&mut render_pass, fb_size);
                        continue;
                    }
                    Some(DrawCallback::Custom(callback)) => {
                        (callback.as_ref())(list, cmd);
                        continue;
                    }
                    None => {}
                }
                if cmd.elem_count == 0 {
                    continue;
                }
                let Some((x, y, w, h)) = scissor_rect(
                    cmd.clip_rect,
                    draw_data.display_pos,
                    draw_data.framebuffer_scale,
                    (fb_width, fb_height),
                ) else {
                    continue;
                };
                let Some(texture) = self.textures.get(&cmd.texture_id) else {
                    log::warn!("skipping draw command with unregistered texture {:?}", cmd.texture_id);
                    continue;
                };

                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                render_pass.set_scissor_rect(x, y, w, h);
                let start = global_idx_offset + cmd.idx_offset;
                render_pass.draw_indexed(
                    start..start + cmd.elem_count,
                    (global_vtx_offset + cmd.vtx_offset) as i32,
                    0..1,
                );
            }
            global_idx_offset += list.idx_buffer.len() as u32;
            global_vtx_offset += list.vtx_buffer.len() as u32;
        }
    }

    fn setup_render_state(&self, render_pass: &mut wgpu::RenderPass<'_>, fb_size: Vec2) {
        render_pass.set_viewport(0.0, 0.0, fb_size.x, fb_size.y, 0.0, 1.0);
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), index_format());
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Anchor UI Vertex Buffer"),
        size: (capacity * DrawVert::SIZE) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    // Rounded up so the size stays 4-byte aligned with 16-bit indices.
    let size = (capacity * std::mem::size_of::<DrawIdx>()).next_multiple_of(4);
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Anchor UI Index Buffer"),
        size: size as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn check_texture_size(width: u32, height: u32, pixels: &TexturePixels<'_>) -> Result<(), RendererError> {
    let expected = width as usize * height as usize * pixels.bytes_per_pixel();
    if width == 0 || height == 0 || pixels.len() != expected {
        return Err(RendererError::TextureSize {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

fn write_texture(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, pixels: TexturePixels<'_>) {
    let rgba = pixels.to_rgba8();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Orthographic projection mapping the display rect to clip space, y down.
pub fn projection_matrix(display_pos: Vec2, display_size: Vec2) -> Mat4 {
    let l = display_pos.x;
    let r = display_pos.x + display_size.x;
    let t = display_pos.y;
    let b = display_pos.y + display_size.y;
    Mat4::from_cols_array(&[
        2.0 / (r - l),
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 / (t - b),
        0.0,
        0.0,
        0.0,
        0.0,
        0.5,
        0.0,
        (r + l) / (l - r),
        (t + b) / (b - t),
        0.5,
        1.0,
    ])
}

/// A command's clip rect in framebuffer pixels, clamped to the framebuffer.
///
/// `None` when nothing of it is visible.
pub fn scissor_rect(
    clip_rect: Vec4,
    display_pos: Vec2,
    framebuffer_scale: Vec2,
    (fb_width, fb_height): (u32, u32),
) -> Option<(u32, u32, u32, u32)> {
    let min_x = ((clip_rect.x - display_pos.x) * framebuffer_scale.x).max(0.0).floor();
    let min_y = ((clip_rect.y - display_pos.y) * framebuffer_scale.y).max(0.0).floor();
    let max_x = ((clip_rect.z - display_pos.x) * framebuffer_scale.x).min(fb_width as f32).ceil();
    let max_y = ((clip_rect.w - display_pos.y) * framebuffer_scale.y).min(fb_height as f32).ceil();
    if max_x <= min_x || max_y <= min_y {
        return None;
    }
    Some((min_x as u32, min_y as u32, (max_x - min_x) as u32, (max_y - min_y) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_clip(m: &Mat4, x: f32, y: f32) -> Vec2 {
        (*m * glam::Vec4::new(x, y, 0.0, 1.0)).truncate().truncate()
    }

    #[test]
    fn test_projection_maps_display_corners() {
        let m = projection_matrix(Vec2::new(100.0, 50.0), Vec2::new(800.0, 600.0));
        assert!(to_clip(&m, 100.0, 50.0).abs_diff_eq(Vec2::new(-1.0, 1.0), 1e-6));
        assert!(to_clip(&m, 900.0, 650.0).abs_diff_eq(Vec2::new(1.0, -1.0), 1e-6));
        assert!(to_clip(&m, 500.0, 350.0).abs_diff_eq(Vec2::ZERO, 1e-6));
    }

    #[test]
    fn test_scissor_scales_and_clamps() {
        let fb = (1600, 1200);
        let scale = Vec2::splat(2.0);
        assert_eq!(
            scissor_rect(Vec4::new(10.0, 20.0, 110.0, 70.0), Vec2::ZERO, scale, fb),
            Some((20, 40, 200, 100))
        );
        // Offset display and partially off-screen.
        assert_eq!(
            scissor_rect(Vec4::new(-50.0, 90.0, 150.0, 2000.0), Vec2::new(0.0, 100.0), Vec2::ONE, fb),
            Some((0, 0, 150, 1200))
        );
    }

    #[test]
    fn test_scissor_rejects_empty() {
        let fb = (800, 600);
        assert_eq!(scissor_rect(Vec4::new(10.0, 10.0, 10.0, 50.0), Vec2::ZERO, Vec2::ONE, fb), None);
        assert_eq!(scissor_rect(Vec4::new(900.0, 0.0, 950.0, 50.0), Vec2::ZERO, Vec2::ONE, fb), None);
        assert_eq!(scissor_rect(Vec4::new(0.0, 0.0, 50.0, -5.0), Vec2::ZERO, Vec2::ONE, fb), None);
    }

    #[test]
    fn test_texture_size_check() {
        let ok = [0u8; 16];
        assert!(check_texture_size(2, 2, &TexturePixels::Rgba8(&ok)).is_ok());
        assert!(check_texture_size(4, 4, &TexturePixels::Alpha8(&ok)).is_ok());
        assert!(matches!(
            check_texture_size(4, 4, &TexturePixels::Rgba8(&ok)),
            Err(RendererError::TextureSize { expected: 64, actual: 16, .. })
        ));
        assert!(check_texture_size(0, 4, &TexturePixels::Alpha8(&[])).is_err());
    }

    #[test]
    fn test_alpha8_expands_to_white() {
        let rgba = TexturePixels::Alpha8(&[0, 128]).to_rgba8();
        assert_eq!(&rgba[..], &[255, 255, 255, 0, 255, 255, 255, 128]);
    }
}
