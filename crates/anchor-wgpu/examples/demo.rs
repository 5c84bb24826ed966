//! Draws a few shapes, text and the software cursor through the anchor frame loop.
//!
//! Pass a TTF path as the first argument to render text with it instead of the
//! built-in bitmap font.

use anchor::{
    render_check_mark, render_color_rect_with_alpha_checkerboard, BackendFlags, Context, DrawFlags, FontAtlas,
    FontData, StyleColor, Vec2,
};
use anchor_text::SwashRasterizer;
use anchor_wgpu::{InputState, Renderer};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    ui: Context,
    input: InputState,
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
}

impl GpuState {
    async fn new(window: Arc<Window>, ui: &mut Context) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        // Vertex colors are authored in sRGB space; blend in a non-sRGB target.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer = Renderer::new(&device, surface_format);
        renderer
            .upload_font_atlas(&device, &queue, ui.font_atlas_mut())
            .unwrap();

        Self {
            surface,
            device,
            queue,
            config,
            renderer,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(&mut self, ui: &mut Context) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Anchor Demo Encoder"),
            });

        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.45,
                            g: 0.55,
                            b: 0.60,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        build_ui(ui);
        let draw_data = ui.render();
        self.renderer
            .render(&self.device, &self.queue, &mut encoder, &view, &draw_data);
        drop(draw_data);

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

fn build_ui(ui: &mut Context) {
    let style = ui.style();
    let window_bg = style.color_u32(StyleColor::WindowBg, 1.0);
    let border = style.color_u32(StyleColor::Border, 1.0);
    let text = style.color_u32(StyleColor::Text, 1.0);
    let check = style.color_u32(StyleColor::CheckMark, 1.0);
    let frame_count = ui.frame_count();

    let dl = ui.window_draw_list("Demo");
    let origin = Vec2::new(40.0, 40.0);
    dl.add_rect_filled(origin, origin + Vec2::new(420.0, 300.0), window_bg, 8.0, DrawFlags::ROUND_CORNERS_ALL);
    dl.add_rect(origin, origin + Vec2::new(420.0, 300.0), border, 8.0, DrawFlags::ROUND_CORNERS_ALL, 1.0);
    dl.add_text(origin + Vec2::new(12.0, 10.0), text, &format!("Hello from anchor, frame {frame_count}"));

    let t = frame_count as f32 * 0.02;
    let center = origin + Vec2::new(90.0, 130.0);
    dl.add_circle_filled(center, 40.0, anchor::col32(230, 120, 60, 255), 0);
    dl.add_circle(center, 50.0 + 5.0 * t.sin(), text, 0, 2.0);
    dl.add_bezier_cubic(
        origin + Vec2::new(160.0, 200.0),
        origin + Vec2::new(220.0, 60.0),
        origin + Vec2::new(300.0, 260.0),
        origin + Vec2::new(400.0, 100.0),
        check,
        3.0,
        0,
    );
    render_check_mark(dl, origin + Vec2::new(20.0, 240.0), check, 24.0);
    render_color_rect_with_alpha_checkerboard(
        dl,
        origin + Vec2::new(60.0, 236.0),
        origin + Vec2::new(200.0, 276.0),
        anchor::col32(60, 160, 255, 128),
        10.0,
        Vec2::ZERO,
        4.0,
        DrawFlags::ROUND_CORNERS_ALL,
    );
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("Anchor - Demo")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
            self.input = InputState::new(&window);
            self.window = Some(window.clone());
            self.gpu_state = Some(pollster::block_on(GpuState::new(window, &mut self.ui)));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        self.input.handle_event(self.ui.io_mut(), &event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::RedrawRequested => {
                let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) else {
                    return;
                };
                self.input.prepare_frame(self.ui.io_mut(), window);
                if let Err(e) = self.ui.new_frame() {
                    log::error!("new_frame failed: {e}");
                    event_loop.exit();
                    return;
                }
                self.input.update_cursor(self.ui.io(), window);
                match gpu_state.render(&mut self.ui) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => gpu_state.resize(window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                    Err(e) => log::warn!("Render error: {e:?}"),
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut atlas = FontAtlas::new().with_rasterizer(Arc::new(SwashRasterizer));
    match std::env::args().nth(1) {
        Some(path) => match std::fs::read(&path) {
            Ok(data) => {
                atlas
                    .add_font_from_memory_ttf(FontData::Owned(data.into()), 18.0, None)
                    .unwrap();
            }
            Err(e) => log::warn!("Could not read {path}: {e}, using the built-in font"),
        },
        None => log::info!("No TTF given, using the built-in font"),
    }

    let mut ui = Context::with_font_atlas(atlas);
    ui.io_mut().backend_flags |= BackendFlags::RENDERER_HAS_VTX_OFFSET;
    ui.io_mut().mouse_draw_cursor = true;
    ui.io_mut().ini_filename = None;

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        ui,
        input: InputState::default(),
    };

    println!("Anchor demo - press ESC to exit");

    event_loop.run_app(&mut app).unwrap();
}
