//! Per-frame driver tying together input, style, the font atlas and the draw lists.

use std::path::Path;
use std::sync::Arc;

use crate::color::{col32, COL32_BLACK, COL32_WHITE};
use crate::diagnostics::Diagnostics;
use crate::draw_data::DrawData;
use crate::draw_list::DrawList;
use crate::error::{AtlasError, SettingsError};
use crate::font_atlas::FontAtlas;
use crate::io::Io;
use crate::primitives::{Vec2, Vec4};
use crate::render::render_mouse_cursor;
use crate::settings::SettingsStore;
use crate::shared::SharedData;
use crate::style::Style;

/// Owns everything a frame needs.
///
/// ```no_run
/// # use anchor::Context;
/// let mut ctx = Context::new();
/// ctx.io_mut().display_size = anchor::Vec2::new(1280.0, 720.0);
/// loop {
///     ctx.new_frame().unwrap();
///     ctx.foreground_draw_list().add_text(anchor::Vec2::new(10.0, 10.0), anchor::COL32_WHITE, "hello");
///     let draw_data = ctx.render();
///     // hand draw_data to the renderer
/// #   break;
/// }
/// ```
#[derive(Debug)]
pub struct Context {
    io: Io,
    style: Style,
    font_atlas: FontAtlas,
    shared: Arc<SharedData>,
    pub diagnostics: Diagnostics,
    settings: SettingsStore,
    background: DrawList,
    windows: Vec<DrawList>,
    foreground: DrawList,
    frame_count: u64,
    within_frame: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_font_atlas(FontAtlas::new())
    }

    /// Use a pre-populated atlas, e.g. one shared setup with custom fonts.
    pub fn with_font_atlas(font_atlas: FontAtlas) -> Self {
        let shared = Arc::new(SharedData::new());
        Self {
            io: Io::default(),
            style: Style::default(),
            font_atlas,
            background: DrawList::new(Arc::clone(&shared)).with_owner_name("##Background"),
            foreground: DrawList::new(Arc::clone(&shared)).with_owner_name("##Foreground"),
            windows: Vec::new(),
            shared,
            diagnostics: Diagnostics::default(),
            settings: SettingsStore::new(),
            frame_count: 0,
            within_frame: false,
        }
    }

    pub fn io(&self) -> &Io {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn font_atlas(&self) -> &FontAtlas {
        &self.font_atlas
    }

    pub fn font_atlas_mut(&mut self) -> &mut FontAtlas {
        &mut self.font_atlas
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn shared_data(&self) -> &Arc<SharedData> {
        &self.shared
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_within_frame(&self) -> bool {
        self.within_frame
    }

    /// Start a frame: build and lock the atlas, refresh shared data, reset every layer.
    pub fn new_frame(&mut self) -> Result<(), AtlasError> {
        if self.within_frame {
            log::warn!("new_frame() called twice without render()");
            self.font_atlas.unlock();
        }
        self.validate_io();

        if !self.font_atlas.is_built() {
            if self.font_atlas.fonts().is_empty() {
                self.font_atlas.add_font_default(None)?;
            }
            self.font_atlas.build()?;
            log::info!(
                "Font atlas built: {}x{}, {} font(s)",
                self.font_atlas.tex_size().0,
                self.font_atlas.tex_size().1,
                self.font_atlas.fonts().len()
            );
        }
        self.font_atlas.diagnostics = self.diagnostics;
        self.font_atlas.lock();

        if !self.settings.is_loaded() {
            match self.io.ini_filename.clone() {
                Some(path) => {
                    if let Err(e) = self.settings.load_from_disk(&path) {
                        log::warn!("Failed to load settings from {}: {e}", path.display());
                        self.settings.set_loaded();
                    }
                }
                None => self.settings.set_loaded(),
            }
        }
        if self.settings.update(self.io.delta_time) {
            self.save_settings();
        }

        self.shared = Arc::new(self.build_shared_data());
        let shared = Arc::clone(&self.shared);
        let tex_id = self.font_atlas.tex_id();
        for list in self.layers_mut() {
            list.set_shared_data(Arc::clone(&shared));
            list.reset_for_new_frame();
            list.push_texture_id(tex_id);
            list.push_clip_rect_full_screen();
        }

        self.frame_count += 1;
        self.within_frame = true;
        Ok(())
    }

    fn validate_io(&mut self) {
        if self.io.display_size.x < 0.0 || self.io.display_size.y < 0.0 {
            log::warn!("invalid display size {:?}, clamping to zero", self.io.display_size);
            self.io.display_size = self.io.display_size.max(Vec2::ZERO);
        }
        if !(self.io.delta_time > 0.0) {
            log::warn!("delta_time must be positive, got {}", self.io.delta_time);
            self.io.delta_time = 1.0 / 60.0;
        }
    }

    fn build_shared_data(&self) -> SharedData {
        // Keep the circle tables when the error did not change.
        let mut data = (*self.shared).clone();
        if data.circle_segment_max_error() != self.style.circle_segment_max_error {
            data.set_circle_tessellation_max_error(self.style.circle_segment_max_error);
        }
        data.curve_tessellation_tol = self.style.curve_tessellation_tol;
        data.tex_uv_white_pixel = self.font_atlas.tex_uv_white_pixel();
        data.tex_uv_lines = self.font_atlas.tex_uv_lines().to_vec();
        data.font = self.font_atlas.font(0).cloned();
        data.font_size = data
            .font
            .as_ref()
            .map_or(0.0, |f| f.font_size * f.scale * self.io.font_global_scale);
        data.clip_rect_fullscreen = Vec4::new(0.0, 0.0, self.io.display_size.x, self.io.display_size.y);
        data.initial_flags = self.style.draw_list_flags(self.io.backend_flags);
        data.diagnostics = self.diagnostics;
        data
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut DrawList> {
        std::iter::once(&mut self.background)
            .chain(self.windows.iter_mut())
            .chain(std::iter::once(&mut self.foreground))
    }

    /// Drawn behind every window.
    pub fn background_draw_list(&mut self) -> &mut DrawList {
        &mut self.background
    }

    /// Drawn over every window.
    pub fn foreground_draw_list(&mut self) -> &mut DrawList {
        &mut self.foreground
    }

    /// Draw list of window `name`, created on first use. Windows render in creation order.
    pub fn window_draw_list(&mut self, name: &str) -> &mut DrawList {
        let idx = match self.windows.iter().position(|w| w.owner_name() == name) {
            Some(idx) => idx,
            None => {
                log::debug!("Creating window draw list '{name}'");
                let mut list = DrawList::new(Arc::clone(&self.shared)).with_owner_name(name);
                if self.within_frame {
                    list.push_texture_id(self.font_atlas.tex_id());
                    list.push_clip_rect_full_screen();
                }
                self.windows.push(list);
                self.windows.len() - 1
            }
        };
        &mut self.windows[idx]
    }

    /// Drop a window's draw list.
    pub fn remove_window(&mut self, name: &str) {
        self.windows.retain(|w| w.owner_name() != name);
    }

    /// Schedule an automatic save. No-op without `io.ini_filename`.
    pub fn mark_settings_dirty(&mut self) {
        if self.io.ini_filename.is_some() {
            self.settings.mark_dirty(self.io.ini_saving_rate);
        }
    }

    pub fn load_ini_settings_from_memory(&mut self, text: &str) -> Result<(), SettingsError> {
        self.settings.load_from_memory(text)
    }

    pub fn save_ini_settings_to_memory(&mut self) -> String {
        self.settings.save_to_memory()
    }

    /// A missing file loads nothing and is not an error.
    pub fn load_ini_settings_from_disk(&mut self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        self.settings.load_from_disk(path.as_ref())
    }

    pub fn save_ini_settings_to_disk(&mut self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        self.settings.save_to_disk(path.as_ref())
    }

    /// Write settings to `io.ini_filename` now, if one is set.
    pub fn save_settings(&mut self) {
        let Some(path) = self.io.ini_filename.clone() else {
            return;
        };
        if let Err(e) = self.settings.save_to_disk(&path) {
            log::warn!("Failed to save settings to {}: {e}", path.display());
        }
    }

    /// End the frame and collect every non-empty layer, back to front.
    ///
    /// The returned data borrows the context, so it cannot outlive the next `new_frame`.
    pub fn render(&mut self) -> DrawData<'_> {
        if !self.within_frame {
            log::warn!("render() called without new_frame()");
        }
        self.within_frame = false;

        if self.io.mouse_draw_cursor && self.io.is_mouse_pos_valid() {
            render_mouse_cursor(
                &mut self.foreground,
                &self.font_atlas,
                self.io.mouse_pos,
                self.style.mouse_cursor_scale,
                self.io.mouse_cursor,
                COL32_WHITE,
                COL32_BLACK,
                col32(0, 0, 0, 48),
            );
        }
        self.font_atlas.unlock();

        // Per-frame input is consumed by the frame that saw it.
        self.io.mouse_wheel = 0.0;
        self.io.mouse_wheel_h = 0.0;
        self.io.clear_input_characters();

        let mut draw_data = DrawData::new(Vec2::ZERO, self.io.display_size, self.io.display_framebuffer_scale);
        draw_data.add_draw_list(&mut self.background);
        for window in &mut self.windows {
            draw_data.add_draw_list(window);
        }
        draw_data.add_draw_list(&mut self.foreground);
        draw_data.valid = true;
        draw_data
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if self.settings.is_dirty() {
            self.save_settings();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{BackendFlags, DrawFlags, DrawListFlags};
    use crate::io::MouseCursor;
    use crate::settings::KeyValueSettings;

    fn context() -> Context {
        let mut ctx = Context::new();
        ctx.io_mut().display_size = Vec2::new(100.0, 100.0);
        ctx.io_mut().ini_filename = None;
        ctx
    }

    #[test]
    fn test_first_frame_builds_atlas_and_shared_data() {
        let mut ctx = context();
        ctx.new_frame().unwrap();
        assert!(ctx.font_atlas().is_built());
        assert!(ctx.font_atlas().is_locked());
        let shared = ctx.shared_data();
        assert_eq!(shared.clip_rect_fullscreen, Vec4::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(shared.font_size, 13.0);
        assert_eq!(shared.tex_uv_white_pixel, ctx.font_atlas().tex_uv_white_pixel());
        assert!(shared.font.is_some());
        let data = ctx.render();
        assert!(data.valid);
        assert_eq!(data.cmd_lists_count(), 0);
        assert!(!ctx.font_atlas().is_locked());
    }

    #[test]
    fn test_layers_render_back_to_front() {
        let mut ctx = context();
        ctx.new_frame().unwrap();
        let white = COL32_WHITE;
        ctx.foreground_draw_list()
            .add_rect_filled(Vec2::ZERO, Vec2::ONE, white, 0.0, DrawFlags::empty());
        ctx.window_draw_list("B")
            .add_rect_filled(Vec2::ZERO, Vec2::ONE, white, 0.0, DrawFlags::empty());
        ctx.window_draw_list("A")
            .add_rect_filled(Vec2::ZERO, Vec2::ONE, white, 0.0, DrawFlags::empty());
        ctx.background_draw_list()
            .add_rect_filled(Vec2::ZERO, Vec2::ONE, white, 0.0, DrawFlags::empty());

        let data = ctx.render();
        let names: Vec<&str> = data.cmd_lists.iter().map(|l| l.owner_name()).collect();
        assert_eq!(names, vec!["##Background", "B", "A", "##Foreground"]);
        assert_eq!(data.display_size, Vec2::new(100.0, 100.0));
        for list in &data.cmd_lists {
            assert_eq!(list.cmd_buffer[0].clip_rect, Vec4::new(0.0, 0.0, 100.0, 100.0));
        }
    }

    #[test]
    fn test_new_frame_resets_layers() {
        let mut ctx = context();
        ctx.new_frame().unwrap();
        ctx.window_draw_list("W")
            .add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), COL32_WHITE, 1.0);
        let _ = ctx.render();
        ctx.new_frame().unwrap();
        assert!(ctx.window_draw_list("W").vtx_buffer.is_empty());
        assert_eq!(ctx.render().cmd_lists_count(), 0);
        assert_eq!(ctx.frame_count(), 2);
    }

    #[test]
    fn test_style_and_backend_flags_reach_draw_lists() {
        let mut ctx = context();
        ctx.style_mut().anti_aliased_fill = false;
        ctx.style_mut().circle_segment_max_error = 0.3;
        ctx.io_mut().backend_flags |= BackendFlags::RENDERER_HAS_VTX_OFFSET;
        ctx.new_frame().unwrap();
        let flags = ctx.window_draw_list("W").flags;
        assert!(!flags.contains(DrawListFlags::ANTI_ALIASED_FILL));
        assert!(flags.contains(DrawListFlags::ALLOW_VTX_OFFSET));
        assert_eq!(ctx.shared_data().circle_segment_max_error(), 0.3);
    }

    #[test]
    fn test_software_cursor() {
        let mut ctx = context();
        ctx.io_mut().mouse_draw_cursor = true;
        ctx.io_mut().mouse_pos = Vec2::new(50.0, 50.0);
        ctx.io_mut().mouse_cursor = MouseCursor::Hand;
        ctx.new_frame().unwrap();
        let data = ctx.render();
        assert_eq!(data.cmd_lists_count(), 1);
        assert_eq!(data.total_vtx_count, 16);
    }

    #[test]
    fn test_render_consumes_frame_input() {
        let mut ctx = context();
        ctx.new_frame().unwrap();
        ctx.io_mut().mouse_wheel = 2.0;
        ctx.io_mut().add_input_characters_utf8("hi");
        let _ = ctx.render();
        assert_eq!(ctx.io().mouse_wheel, 0.0);
        assert!(ctx.io().input_queue_characters.is_empty());
    }

    #[test]
    fn test_atlas_is_locked_during_frame() {
        let mut ctx = context();
        ctx.diagnostics.assert_atlas_unlocked = false;
        ctx.new_frame().unwrap();
        assert!(matches!(ctx.font_atlas_mut().add_font_default(None), Err(AtlasError::Locked)));
        let _ = ctx.render();
        assert!(ctx.font_atlas_mut().add_font_default(None).is_ok());
    }

    #[test]
    fn test_new_frame_after_clear_fonts() {
        let mut ctx = context();
        ctx.new_frame().unwrap();
        let _ = ctx.render();
        ctx.font_atlas_mut().clear_fonts();
        ctx.new_frame().unwrap();
        assert_eq!(ctx.font_atlas().fonts().len(), 1);
        assert!(ctx.font_atlas().is_built());
        let _ = ctx.render();
    }

    #[test]
    fn test_ini_memory_round_trip() {
        let mut ctx = context();
        ctx.settings_mut().add_handler(Box::new(KeyValueSettings::new("Window")));
        ctx.load_ini_settings_from_memory("[Window][Tools]\nSize=300,200\n\n[Table][0x1]\nColumn 0 Width=40\n")
            .unwrap();
        let saved = ctx.save_ini_settings_to_memory();
        assert!(saved.contains("[Window][Tools]\nSize=300,200\n"));
        assert!(saved.contains("[Table][0x1]\nColumn 0 Width=40\n"));
    }

    #[test]
    fn test_settings_load_on_first_frame() {
        let path = std::env::temp_dir().join(format!("anchor-ctx-{}.ini", std::process::id()));
        std::fs::write(&path, "[Window][Main]\nPos=1,2\n").unwrap();
        let mut ctx = context();
        ctx.io_mut().ini_filename = Some(path.clone());
        ctx.settings_mut().add_handler(Box::new(KeyValueSettings::new("Window")));
        ctx.new_frame().unwrap();
        let windows = ctx.settings().handler::<KeyValueSettings>().unwrap();
        assert_eq!(windows.get("Main", "Pos"), Some("1,2"));
        let _ = ctx.render();
        ctx.io_mut().ini_filename = None;
        let _ = std::fs::remove_file(&path);
    }
}
