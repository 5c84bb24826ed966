use crate::color::Color;
use crate::flags::{BackendFlags, DrawListFlags, StyleColor, StyleVar};
use crate::primitives::Vec2;
use crate::shared::{DEFAULT_CIRCLE_SEGMENT_MAX_ERROR, DEFAULT_CURVE_TESSELLATION_TOL};

/// Sizes, tessellation quality and the color table.
///
/// Change it between frames; the context copies the tessellation settings into
/// the shared draw data at `new_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Global alpha applied to every style color.
    pub alpha: f32,
    pub window_padding: Vec2,
    pub window_rounding: f32,
    pub window_border_size: f32,
    pub window_min_size: Vec2,
    pub window_title_align: Vec2,
    pub child_rounding: f32,
    pub child_border_size: f32,
    pub popup_rounding: f32,
    pub popup_border_size: f32,
    pub frame_padding: Vec2,
    pub frame_rounding: f32,
    pub frame_border_size: f32,
    pub item_spacing: Vec2,
    pub item_inner_spacing: Vec2,
    pub cell_padding: Vec2,
    pub touch_extra_padding: Vec2,
    pub indent_spacing: f32,
    pub columns_min_spacing: f32,
    pub scrollbar_size: f32,
    pub scrollbar_rounding: f32,
    pub grab_min_size: f32,
    pub grab_rounding: f32,
    pub log_slider_deadzone: f32,
    pub tab_rounding: f32,
    pub tab_border_size: f32,
    pub tab_min_width_for_close_button: f32,
    pub button_text_align: Vec2,
    pub selectable_text_align: Vec2,
    pub display_window_padding: Vec2,
    pub display_safe_area_padding: Vec2,
    pub mouse_cursor_scale: f32,

    pub anti_aliased_lines: bool,
    /// Draw thick lines from the baked atlas strips instead of extra geometry.
    pub anti_aliased_lines_use_tex: bool,
    pub anti_aliased_fill: bool,
    /// Bezier tessellation tolerance; smaller means more segments.
    pub curve_tessellation_tol: f32,
    /// Max distance between a circle's true edge and its polygon, in pixels.
    pub circle_segment_max_error: f32,

    pub colors: [Color; StyleColor::COUNT],
}

/// Value of a [`StyleVar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleVarValue {
    Float(f32),
    Vec2(Vec2),
}

enum VarSlot<'a> {
    Float(&'a mut f32),
    Vec2(&'a mut Vec2),
}

impl Default for Style {
    fn default() -> Self {
        let mut style = Self {
            alpha: 1.0,
            window_padding: Vec2::new(8.0, 8.0),
            window_rounding: 0.0,
            window_border_size: 1.0,
            window_min_size: Vec2::new(32.0, 32.0),
            window_title_align: Vec2::new(0.0, 0.5),
            child_rounding: 0.0,
            child_border_size: 1.0,
            popup_rounding: 0.0,
            popup_border_size: 1.0,
            frame_padding: Vec2::new(4.0, 3.0),
            frame_rounding: 0.0,
            frame_border_size: 0.0,
            item_spacing: Vec2::new(8.0, 4.0),
            item_inner_spacing: Vec2::new(4.0, 4.0),
            cell_padding: Vec2::new(4.0, 2.0),
            touch_extra_padding: Vec2::ZERO,
            indent_spacing: 21.0,
            columns_min_spacing: 6.0,
            scrollbar_size: 14.0,
            scrollbar_rounding: 9.0,
            grab_min_size: 10.0,
            grab_rounding: 0.0,
            log_slider_deadzone: 4.0,
            tab_rounding: 4.0,
            tab_border_size: 0.0,
            tab_min_width_for_close_button: 0.0,
            button_text_align: Vec2::new(0.5, 0.5),
            selectable_text_align: Vec2::ZERO,
            display_window_padding: Vec2::new(19.0, 19.0),
            display_safe_area_padding: Vec2::new(3.0, 3.0),
            mouse_cursor_scale: 1.0,
            anti_aliased_lines: true,
            anti_aliased_lines_use_tex: true,
            anti_aliased_fill: true,
            curve_tessellation_tol: DEFAULT_CURVE_TESSELLATION_TOL,
            circle_segment_max_error: DEFAULT_CIRCLE_SEGMENT_MAX_ERROR,
            colors: [Color::default(); StyleColor::COUNT],
        };
        style_colors_dark(&mut style.colors);
        style
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn color(&self, idx: StyleColor) -> Color {
        self.colors[idx as usize]
    }

    #[inline]
    pub fn set_color(&mut self, idx: StyleColor, color: Color) {
        self.colors[idx as usize] = color;
    }

    /// Packed style color with the global alpha and `alpha_mul` applied.
    pub fn color_u32(&self, idx: StyleColor, alpha_mul: f32) -> u32 {
        self.color(idx).mul_alpha(self.alpha * alpha_mul).to_u32()
    }

    fn slot(&mut self, var: StyleVar) -> VarSlot<'_> {
        use VarSlot::{Float as F, Vec2 as V};
        match var {
            StyleVar::Alpha => F(&mut self.alpha),
            StyleVar::WindowPadding => V(&mut self.window_padding),
            StyleVar::WindowRounding => F(&mut self.window_rounding),
            StyleVar::WindowBorderSize => F(&mut self.window_border_size),
            StyleVar::WindowMinSize => V(&mut self.window_min_size),
            StyleVar::WindowTitleAlign => V(&mut self.window_title_align),
            StyleVar::ChildRounding => F(&mut self.child_rounding),
            StyleVar::ChildBorderSize => F(&mut self.child_border_size),
            StyleVar::PopupRounding => F(&mut self.popup_rounding),
            StyleVar::PopupBorderSize => F(&mut self.popup_border_size),
            StyleVar::FramePadding => V(&mut self.frame_padding),
            StyleVar::FrameRounding => F(&mut self.frame_rounding),
            StyleVar::FrameBorderSize => F(&mut self.frame_border_size),
            StyleVar::ItemSpacing => V(&mut self.item_spacing),
            StyleVar::ItemInnerSpacing => V(&mut self.item_inner_spacing),
            StyleVar::IndentSpacing => F(&mut self.indent_spacing),
            StyleVar::CellPadding => V(&mut self.cell_padding),
            StyleVar::ScrollbarSize => F(&mut self.scrollbar_size),
            StyleVar::ScrollbarRounding => F(&mut self.scrollbar_rounding),
            StyleVar::GrabMinSize => F(&mut self.grab_min_size),
            StyleVar::GrabRounding => F(&mut self.grab_rounding),
            StyleVar::TabRounding => F(&mut self.tab_rounding),
            StyleVar::ButtonTextAlign => V(&mut self.button_text_align),
            StyleVar::SelectableTextAlign => V(&mut self.selectable_text_align),
        }
    }

    pub fn var(&mut self, var: StyleVar) -> StyleVarValue {
        match self.slot(var) {
            VarSlot::Float(v) => StyleVarValue::Float(*v),
            VarSlot::Vec2(v) => StyleVarValue::Vec2(*v),
        }
    }

    /// Overwrite a style variable and return its previous value.
    ///
    /// Returns `None` and leaves the style untouched when `value` has the wrong
    /// shape for `var`.
    pub fn set_var(&mut self, var: StyleVar, value: StyleVarValue) -> Option<StyleVarValue> {
        match (self.slot(var), value) {
            (VarSlot::Float(slot), StyleVarValue::Float(v)) => Some(StyleVarValue::Float(std::mem::replace(slot, v))),
            (VarSlot::Vec2(slot), StyleVarValue::Vec2(v)) => Some(StyleVarValue::Vec2(std::mem::replace(slot, v))),
            _ => {
                log::warn!("style variable {var:?} does not take {value:?}");
                None
            }
        }
    }

    /// Scale every size for a display scale factor. Sizes are floored to whole pixels.
    pub fn scale_all_sizes(&mut self, factor: f32) {
        let f = |v: f32| (v * factor).floor();
        let v = |v: Vec2| (v * factor).floor();
        self.window_padding = v(self.window_padding);
        self.window_rounding = f(self.window_rounding);
        self.window_min_size = v(self.window_min_size);
        self.child_rounding = f(self.child_rounding);
        self.popup_rounding = f(self.popup_rounding);
        self.frame_padding = v(self.frame_padding);
        self.frame_rounding = f(self.frame_rounding);
        self.item_spacing = v(self.item_spacing);
        self.item_inner_spacing = v(self.item_inner_spacing);
        self.cell_padding = v(self.cell_padding);
        self.touch_extra_padding = v(self.touch_extra_padding);
        self.indent_spacing = f(self.indent_spacing);
        self.columns_min_spacing = f(self.columns_min_spacing);
        self.scrollbar_size = f(self.scrollbar_size);
        self.scrollbar_rounding = f(self.scrollbar_rounding);
        self.grab_min_size = f(self.grab_min_size);
        self.grab_rounding = f(self.grab_rounding);
        self.log_slider_deadzone = f(self.log_slider_deadzone);
        self.tab_rounding = f(self.tab_rounding);
        if self.tab_min_width_for_close_button != f32::MAX {
            self.tab_min_width_for_close_button = f(self.tab_min_width_for_close_button);
        }
        self.display_window_padding = v(self.display_window_padding);
        self.display_safe_area_padding = v(self.display_safe_area_padding);
        self.mouse_cursor_scale = f(self.mouse_cursor_scale);
    }

    /// Draw-list flags for a frame rendered by a backend with `backend_flags`.
    pub fn draw_list_flags(&self, backend_flags: BackendFlags) -> DrawListFlags {
        let mut flags = DrawListFlags::empty();
        if self.anti_aliased_lines {
            flags |= DrawListFlags::ANTI_ALIASED_LINES;
        }
        if self.anti_aliased_lines_use_tex {
            flags |= DrawListFlags::ANTI_ALIASED_LINES_USE_TEX;
        }
        if self.anti_aliased_fill {
            flags |= DrawListFlags::ANTI_ALIASED_FILL;
        }
        if backend_flags.contains(BackendFlags::RENDERER_HAS_VTX_OFFSET) {
            flags |= DrawListFlags::ALLOW_VTX_OFFSET;
        }
        flags
    }
}

fn lerp(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

fn fill_tabs(colors: &mut [Color; StyleColor::COUNT], tab_t: f32) {
    use StyleColor as C;
    let c = |colors: &[Color; StyleColor::COUNT], i: C| colors[i as usize];
    colors[C::Tab as usize] = lerp(c(colors, C::Header), c(colors, C::TitleBgActive), tab_t);
    colors[C::TabHovered as usize] = c(colors, C::HeaderHovered);
    colors[C::TabActive as usize] = lerp(c(colors, C::HeaderActive), c(colors, C::TitleBgActive), 0.60);
    colors[C::TabUnfocused as usize] = lerp(c(colors, C::Tab), c(colors, C::TitleBg), 0.80);
    colors[C::TabUnfocusedActive as usize] = lerp(c(colors, C::TabActive), c(colors, C::TitleBg), 0.40);
}

pub fn style_colors_dark(colors: &mut [Color; StyleColor::COUNT]) {
    use StyleColor as C;
    let rgba = Color::new;
    colors[C::Text as usize] = rgba(1.00, 1.00, 1.00, 1.00);
    colors[C::TextDisabled as usize] = rgba(0.50, 0.50, 0.50, 1.00);
    colors[C::WindowBg as usize] = rgba(0.06, 0.06, 0.06, 0.94);
    colors[C::ChildBg as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::PopupBg as usize] = rgba(0.08, 0.08, 0.08, 0.94);
    colors[C::Border as usize] = rgba(0.43, 0.43, 0.50, 0.50);
    colors[C::BorderShadow as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::FrameBg as usize] = rgba(0.16, 0.29, 0.48, 0.54);
    colors[C::FrameBgHovered as usize] = rgba(0.26, 0.59, 0.98, 0.40);
    colors[C::FrameBgActive as usize] = rgba(0.26, 0.59, 0.98, 0.67);
    colors[C::TitleBg as usize] = rgba(0.04, 0.04, 0.04, 1.00);
    colors[C::TitleBgActive as usize] = rgba(0.16, 0.29, 0.48, 1.00);
    colors[C::TitleBgCollapsed as usize] = rgba(0.00, 0.00, 0.00, 0.51);
    colors[C::MenuBarBg as usize] = rgba(0.14, 0.14, 0.14, 1.00);
    colors[C::ScrollbarBg as usize] = rgba(0.02, 0.02, 0.02, 0.53);
    colors[C::ScrollbarGrab as usize] = rgba(0.31, 0.31, 0.31, 1.00);
    colors[C::ScrollbarGrabHovered as usize] = rgba(0.41, 0.41, 0.41, 1.00);
    colors[C::ScrollbarGrabActive as usize] = rgba(0.51, 0.51, 0.51, 1.00);
    colors[C::CheckMark as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::SliderGrab as usize] = rgba(0.24, 0.52, 0.88, 1.00);
    colors[C::SliderGrabActive as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::Button as usize] = rgba(0.26, 0.59, 0.98, 0.40);
    colors[C::ButtonHovered as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::ButtonActive as usize] = rgba(0.06, 0.53, 0.98, 1.00);
    colors[C::Header as usize] = rgba(0.26, 0.59, 0.98, 0.31);
    colors[C::HeaderHovered as usize] = rgba(0.26, 0.59, 0.98, 0.80);
    colors[C::HeaderActive as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::Separator as usize] = colors[C::Border as usize];
    colors[C::SeparatorHovered as usize] = rgba(0.10, 0.40, 0.75, 0.78);
    colors[C::SeparatorActive as usize] = rgba(0.10, 0.40, 0.75, 1.00);
    colors[C::ResizeGrip as usize] = rgba(0.26, 0.59, 0.98, 0.20);
    colors[C::ResizeGripHovered as usize] = rgba(0.26, 0.59, 0.98, 0.67);
    colors[C::ResizeGripActive as usize] = rgba(0.26, 0.59, 0.98, 0.95);
    fill_tabs(colors, 0.80);
    colors[C::DockingPreview as usize] = colors[C::HeaderActive as usize].mul_alpha(0.7);
    colors[C::DockingEmptyBg as usize] = rgba(0.20, 0.20, 0.20, 1.00);
    colors[C::PlotLines as usize] = rgba(0.61, 0.61, 0.61, 1.00);
    colors[C::PlotLinesHovered as usize] = rgba(1.00, 0.43, 0.35, 1.00);
    colors[C::PlotHistogram as usize] = rgba(0.90, 0.70, 0.00, 1.00);
    colors[C::PlotHistogramHovered as usize] = rgba(1.00, 0.60, 0.00, 1.00);
    colors[C::TableHeaderBg as usize] = rgba(0.19, 0.19, 0.20, 1.00);
    colors[C::TableBorderStrong as usize] = rgba(0.31, 0.31, 0.35, 1.00);
    colors[C::TableBorderLight as usize] = rgba(0.23, 0.23, 0.25, 1.00);
    colors[C::TableRowBg as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::TableRowBgAlt as usize] = rgba(1.00, 1.00, 1.00, 0.06);
    colors[C::TextSelectedBg as usize] = rgba(0.26, 0.59, 0.98, 0.35);
    colors[C::DragDropTarget as usize] = rgba(1.00, 1.00, 0.00, 0.90);
    colors[C::NavHighlight as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::NavWindowingHighlight as usize] = rgba(1.00, 1.00, 1.00, 0.70);
    colors[C::NavWindowingDimBg as usize] = rgba(0.80, 0.80, 0.80, 0.20);
    colors[C::ModalWindowDimBg as usize] = rgba(0.80, 0.80, 0.80, 0.35);
}

pub fn style_colors_light(colors: &mut [Color; StyleColor::COUNT]) {
    use StyleColor as C;
    let rgba = Color::new;
    colors[C::Text as usize] = rgba(0.00, 0.00, 0.00, 1.00);
    colors[C::TextDisabled as usize] = rgba(0.60, 0.60, 0.60, 1.00);
    colors[C::WindowBg as usize] = rgba(0.94, 0.94, 0.94, 1.00);
    colors[C::ChildBg as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::PopupBg as usize] = rgba(1.00, 1.00, 1.00, 0.98);
    colors[C::Border as usize] = rgba(0.00, 0.00, 0.00, 0.30);
    colors[C::BorderShadow as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::FrameBg as usize] = rgba(1.00, 1.00, 1.00, 1.00);
    colors[C::FrameBgHovered as usize] = rgba(0.26, 0.59, 0.98, 0.40);
    colors[C::FrameBgActive as usize] = rgba(0.26, 0.59, 0.98, 0.67);
    colors[C::TitleBg as usize] = rgba(0.96, 0.96, 0.96, 1.00);
    colors[C::TitleBgActive as usize] = rgba(0.82, 0.82, 0.82, 1.00);
    colors[C::TitleBgCollapsed as usize] = rgba(1.00, 1.00, 1.00, 0.51);
    colors[C::MenuBarBg as usize] = rgba(0.86, 0.86, 0.86, 1.00);
    colors[C::ScrollbarBg as usize] = rgba(0.98, 0.98, 0.98, 0.53);
    colors[C::ScrollbarGrab as usize] = rgba(0.69, 0.69, 0.69, 0.80);
    colors[C::ScrollbarGrabHovered as usize] = rgba(0.49, 0.49, 0.49, 0.80);
    colors[C::ScrollbarGrabActive as usize] = rgba(0.49, 0.49, 0.49, 1.00);
    colors[C::CheckMark as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::SliderGrab as usize] = rgba(0.26, 0.59, 0.98, 0.78);
    colors[C::SliderGrabActive as usize] = rgba(0.46, 0.54, 0.80, 0.60);
    colors[C::Button as usize] = rgba(0.26, 0.59, 0.98, 0.40);
    colors[C::ButtonHovered as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::ButtonActive as usize] = rgba(0.06, 0.53, 0.98, 1.00);
    colors[C::Header as usize] = rgba(0.26, 0.59, 0.98, 0.31);
    colors[C::HeaderHovered as usize] = rgba(0.26, 0.59, 0.98, 0.80);
    colors[C::HeaderActive as usize] = rgba(0.26, 0.59, 0.98, 1.00);
    colors[C::Separator as usize] = rgba(0.39, 0.39, 0.39, 0.62);
    colors[C::SeparatorHovered as usize] = rgba(0.14, 0.44, 0.80, 0.78);
    colors[C::SeparatorActive as usize] = rgba(0.14, 0.44, 0.80, 1.00);
    colors[C::ResizeGrip as usize] = rgba(0.35, 0.35, 0.35, 0.17);
    colors[C::ResizeGripHovered as usize] = rgba(0.26, 0.59, 0.98, 0.67);
    colors[C::ResizeGripActive as usize] = rgba(0.26, 0.59, 0.98, 0.95);
    fill_tabs(colors, 0.90);
    colors[C::DockingPreview as usize] = colors[C::Header as usize].mul_alpha(0.7);
    colors[C::DockingEmptyBg as usize] = rgba(0.20, 0.20, 0.20, 1.00);
    colors[C::PlotLines as usize] = rgba(0.39, 0.39, 0.39, 1.00);
    colors[C::PlotLinesHovered as usize] = rgba(1.00, 0.43, 0.35, 1.00);
    colors[C::PlotHistogram as usize] = rgba(0.90, 0.70, 0.00, 1.00);
    colors[C::PlotHistogramHovered as usize] = rgba(1.00, 0.45, 0.00, 1.00);
    colors[C::TableHeaderBg as usize] = rgba(0.78, 0.87, 0.98, 1.00);
    colors[C::TableBorderStrong as usize] = rgba(0.57, 0.57, 0.64, 1.00);
    colors[C::TableBorderLight as usize] = rgba(0.68, 0.68, 0.74, 1.00);
    colors[C::TableRowBg as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::TableRowBgAlt as usize] = rgba(0.30, 0.30, 0.30, 0.09);
    colors[C::TextSelectedBg as usize] = rgba(0.26, 0.59, 0.98, 0.35);
    colors[C::DragDropTarget as usize] = rgba(0.26, 0.59, 0.98, 0.95);
    colors[C::NavHighlight as usize] = colors[C::HeaderHovered as usize];
    colors[C::NavWindowingHighlight as usize] = rgba(0.70, 0.70, 0.70, 0.70);
    colors[C::NavWindowingDimBg as usize] = rgba(0.20, 0.20, 0.20, 0.20);
    colors[C::ModalWindowDimBg as usize] = rgba(0.20, 0.20, 0.20, 0.35);
}

pub fn style_colors_classic(colors: &mut [Color; StyleColor::COUNT]) {
    use StyleColor as C;
    let rgba = Color::new;
    colors[C::Text as usize] = rgba(0.90, 0.90, 0.90, 1.00);
    colors[C::TextDisabled as usize] = rgba(0.60, 0.60, 0.60, 1.00);
    colors[C::WindowBg as usize] = rgba(0.00, 0.00, 0.00, 0.85);
    colors[C::ChildBg as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::PopupBg as usize] = rgba(0.11, 0.11, 0.14, 0.92);
    colors[C::Border as usize] = rgba(0.50, 0.50, 0.50, 0.50);
    colors[C::BorderShadow as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::FrameBg as usize] = rgba(0.43, 0.43, 0.43, 0.39);
    colors[C::FrameBgHovered as usize] = rgba(0.47, 0.47, 0.69, 0.40);
    colors[C::FrameBgActive as usize] = rgba(0.42, 0.41, 0.64, 0.69);
    colors[C::TitleBg as usize] = rgba(0.27, 0.27, 0.54, 0.83);
    colors[C::TitleBgActive as usize] = rgba(0.32, 0.32, 0.63, 0.87);
    colors[C::TitleBgCollapsed as usize] = rgba(0.40, 0.40, 0.80, 0.20);
    colors[C::MenuBarBg as usize] = rgba(0.40, 0.40, 0.55, 0.80);
    colors[C::ScrollbarBg as usize] = rgba(0.20, 0.25, 0.30, 0.60);
    colors[C::ScrollbarGrab as usize] = rgba(0.40, 0.40, 0.80, 0.30);
    colors[C::ScrollbarGrabHovered as usize] = rgba(0.40, 0.40, 0.80, 0.40);
    colors[C::ScrollbarGrabActive as usize] = rgba(0.41, 0.39, 0.80, 0.60);
    colors[C::CheckMark as usize] = rgba(0.90, 0.90, 0.90, 0.50);
    colors[C::SliderGrab as usize] = rgba(1.00, 1.00, 1.00, 0.30);
    colors[C::SliderGrabActive as usize] = rgba(0.41, 0.39, 0.80, 0.60);
    colors[C::Button as usize] = rgba(0.35, 0.40, 0.61, 0.62);
    colors[C::ButtonHovered as usize] = rgba(0.40, 0.48, 0.71, 0.79);
    colors[C::ButtonActive as usize] = rgba(0.46, 0.54, 0.80, 1.00);
    colors[C::Header as usize] = rgba(0.40, 0.40, 0.90, 0.45);
    colors[C::HeaderHovered as usize] = rgba(0.45, 0.45, 0.90, 0.80);
    colors[C::HeaderActive as usize] = rgba(0.53, 0.53, 0.87, 0.80);
    colors[C::Separator as usize] = rgba(0.50, 0.50, 0.50, 0.60);
    colors[C::SeparatorHovered as usize] = rgba(0.60, 0.60, 0.70, 1.00);
    colors[C::SeparatorActive as usize] = rgba(0.70, 0.70, 0.90, 1.00);
    colors[C::ResizeGrip as usize] = rgba(1.00, 1.00, 1.00, 0.10);
    colors[C::ResizeGripHovered as usize] = rgba(0.78, 0.82, 1.00, 0.60);
    colors[C::ResizeGripActive as usize] = rgba(0.78, 0.82, 1.00, 0.90);
    fill_tabs(colors, 0.80);
    colors[C::DockingPreview as usize] = colors[C::Header as usize].mul_alpha(0.7);
    colors[C::DockingEmptyBg as usize] = rgba(0.20, 0.20, 0.20, 1.00);
    colors[C::PlotLines as usize] = rgba(1.00, 1.00, 1.00, 1.00);
    colors[C::PlotLinesHovered as usize] = rgba(0.90, 0.70, 0.00, 1.00);
    colors[C::PlotHistogram as usize] = rgba(0.90, 0.70, 0.00, 1.00);
    colors[C::PlotHistogramHovered as usize] = rgba(1.00, 0.60, 0.00, 1.00);
    colors[C::TableHeaderBg as usize] = rgba(0.27, 0.27, 0.38, 1.00);
    colors[C::TableBorderStrong as usize] = rgba(0.31, 0.31, 0.45, 1.00);
    colors[C::TableBorderLight as usize] = rgba(0.26, 0.26, 0.28, 1.00);
    colors[C::TableRowBg as usize] = rgba(0.00, 0.00, 0.00, 0.00);
    colors[C::TableRowBgAlt as usize] = rgba(1.00, 1.00, 1.00, 0.07);
    colors[C::TextSelectedBg as usize] = rgba(0.00, 0.00, 1.00, 0.35);
    colors[C::DragDropTarget as usize] = rgba(1.00, 1.00, 0.00, 0.90);
    colors[C::NavHighlight as usize] = colors[C::HeaderHovered as usize];
    colors[C::NavWindowingHighlight as usize] = rgba(1.00, 1.00, 1.00, 0.70);
    colors[C::NavWindowingDimBg as usize] = rgba(0.80, 0.80, 0.80, 0.20);
    colors[C::ModalWindowDimBg as usize] = rgba(0.20, 0.20, 0.20, 0.35);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tessellation_settings() {
        let style = Style::default();
        assert_eq!(style.curve_tessellation_tol, 1.25);
        assert_eq!(style.circle_segment_max_error, 1.60);
        assert_eq!(
            style.draw_list_flags(BackendFlags::RENDERER_HAS_VTX_OFFSET),
            DrawListFlags::all()
        );
        assert!(!style
            .draw_list_flags(BackendFlags::empty())
            .contains(DrawListFlags::ALLOW_VTX_OFFSET));
    }

    #[test]
    fn test_every_preset_fills_every_color() {
        for preset in [style_colors_dark, style_colors_light, style_colors_classic] {
            let mut colors = [Color::new(-1.0, -1.0, -1.0, -1.0); StyleColor::COUNT];
            preset(&mut colors);
            for (i, c) in colors.iter().enumerate() {
                for v in [c.r, c.g, c.b, c.a] {
                    assert!((0.0..=1.0).contains(&v), "{:?} = {c:?}", StyleColor::ALL[i]);
                }
            }
        }
    }

    #[test]
    fn test_tab_colors_derive_from_headers() {
        let style = Style::default();
        let tab = style.color(StyleColor::Tab);
        let header = style.color(StyleColor::Header);
        let title = style.color(StyleColor::TitleBgActive);
        assert!((tab.r - (header.r + (title.r - header.r) * 0.8)).abs() < 1e-6);
        assert_eq!(style.color(StyleColor::TabHovered), style.color(StyleColor::HeaderHovered));
    }

    #[test]
    fn test_set_var_checks_shape() {
        let mut style = Style::default();
        let prev = style.set_var(StyleVar::FrameRounding, StyleVarValue::Float(3.0));
        assert_eq!(prev, Some(StyleVarValue::Float(0.0)));
        assert_eq!(style.frame_rounding, 3.0);

        assert_eq!(style.set_var(StyleVar::FramePadding, StyleVarValue::Float(1.0)), None);
        assert_eq!(style.var(StyleVar::FramePadding), StyleVarValue::Vec2(Vec2::new(4.0, 3.0)));
    }

    #[test]
    fn test_scale_all_sizes_floors() {
        let mut style = Style::default();
        style.scale_all_sizes(1.5);
        assert_eq!(style.frame_padding, Vec2::new(6.0, 4.0));
        assert_eq!(style.indent_spacing, 31.0);
        assert_eq!(style.mouse_cursor_scale, 1.0);
    }

    #[test]
    fn test_color_u32_applies_global_alpha() {
        let mut style = Style::default();
        style.alpha = 0.5;
        let col = style.color_u32(StyleColor::Text, 1.0);
        assert!((Color::from_u32(col).a - 128.0 / 255.0).abs() < 1e-6);
    }
}
