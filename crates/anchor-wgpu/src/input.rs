//! winit event translation into [`anchor::Io`].
//!
//! Positions and sizes arrive in physical pixels and are stored in points
//! (physical / scale factor); the scale factor becomes the framebuffer scale.

use std::time::Instant;

use anchor::{Io, MouseButton as UiMouseButton, MouseCursor, Vec2, MOUSE_POS_UNAVAILABLE};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window};

/// Per-window input bookkeeping that `Io` does not carry itself.
#[derive(Debug, Clone)]
pub struct InputState {
    scale_factor: f64,
    last_frame: Instant,
    // `None` until the first cursor update.
    last_cursor: Option<Option<MouseCursor>>,
}

impl InputState {
    pub fn new(window: &Window) -> Self {
        Self::with_scale_factor(window.scale_factor())
    }

    pub fn with_scale_factor(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Display size, framebuffer scale and delta time. Call before `new_frame`.
    pub fn prepare_frame(&mut self, io: &mut Io, window: &Window) {
        let now = Instant::now();
        io.delta_time = now.duration_since(self.last_frame).as_secs_f32().max(f32::EPSILON);
        self.last_frame = now;

        self.scale_factor = window.scale_factor();
        self.set_display_size(io, window.inner_size());
    }

    /// Process a winit WindowEvent and update `io`.
    ///
    /// This should be called for each WindowEvent received from winit.
    pub fn handle_event(&mut self, io: &mut Io, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.set_display_size(io, *size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = *scale_factor;
                io.display_framebuffer_scale = Vec2::splat(*scale_factor as f32);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(self.scale_factor);
                io.mouse_pos = Vec2::new(logical.x, logical.y);
            }
            WindowEvent::CursorLeft { .. } => {
                io.mouse_pos = MOUSE_POS_UNAVAILABLE;
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = to_mouse_button(*button) {
                    io.mouse_down[button.index()] = *state == ElementState::Pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (h, v) = wheel_delta(*delta);
                io.mouse_wheel_h += h;
                io.mouse_wheel += v;
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                io.key_shift = state.shift_key();
                io.key_ctrl = state.control_key();
                io.key_alt = state.alt_key();
                io.key_super = state.super_key();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                match &event.logical_key {
                    Key::Character(text) => {
                        // ctrl+letter is a shortcut, not text
                        let is_shortcut = io.key_ctrl && text.chars().count() == 1 && text.chars().all(char::is_alphabetic);
                        if !is_shortcut {
                            io.add_input_characters_utf8(text);
                        }
                    }
                    Key::Named(NamedKey::Space) => io.add_input_character(' ' as u32),
                    _ => {}
                }
            }
            WindowEvent::Focused(false) => io.clear_input_keys(),
            _ => {}
        }
    }

    /// Show the cursor `io` asks for, or hide the OS one while the UI draws its own.
    pub fn update_cursor(&mut self, io: &Io, window: &Window) {
        let wanted = (!io.mouse_draw_cursor).then_some(io.mouse_cursor);
        if self.last_cursor == Some(wanted) {
            return;
        }
        self.last_cursor = Some(wanted);

        match wanted.and_then(to_cursor_icon) {
            Some(icon) => {
                window.set_cursor_visible(true);
                window.set_cursor(icon);
            }
            None => window.set_cursor_visible(false),
        }
    }

    fn set_display_size(&self, io: &mut Io, size: PhysicalSize<u32>) {
        let logical = size.to_logical::<f32>(self.scale_factor);
        io.display_size = Vec2::new(logical.width, logical.height);
        io.display_framebuffer_scale = Vec2::splat(self.scale_factor as f32);
    }
}

pub fn to_mouse_button(button: MouseButton) -> Option<UiMouseButton> {
    match button {
        MouseButton::Left => Some(UiMouseButton::Left),
        MouseButton::Right => Some(UiMouseButton::Right),
        MouseButton::Middle => Some(UiMouseButton::Middle),
        MouseButton::Back => Some(UiMouseButton::Extra1),
        MouseButton::Forward => Some(UiMouseButton::Extra2),
        MouseButton::Other(_) => None,
    }
}

/// `None` for [`MouseCursor::None`], which hides the cursor.
pub fn to_cursor_icon(cursor: MouseCursor) -> Option<CursorIcon> {
    Some(match cursor {
        MouseCursor::None => return None,
        MouseCursor::Arrow => CursorIcon::Default,
        MouseCursor::TextInput => CursorIcon::Text,
        MouseCursor::ResizeAll => CursorIcon::Move,
        MouseCursor::ResizeNS => CursorIcon::NsResize,
        MouseCursor::ResizeEW => CursorIcon::EwResize,
        MouseCursor::ResizeNESW => CursorIcon::NeswResize,
        MouseCursor::ResizeNWSE => CursorIcon::NwseResize,
        MouseCursor::Hand => CursorIcon::Pointer,
        MouseCursor::NotAllowed => CursorIcon::NotAllowed,
    })
}

/// Horizontal and vertical wheel steps. Pixel deltas only contribute their sign.
fn wheel_delta(delta: MouseScrollDelta) -> (f32, f32) {
    match delta {
        MouseScrollDelta::LineDelta(h, v) => (h, v),
        MouseScrollDelta::PixelDelta(pos) => (step(pos.x), step(pos.y)),
    }
}

fn step(v: f64) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::with_scale_factor(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, Modifiers, TouchPhase};
    use winit::keyboard::ModifiersState;

    fn device() -> DeviceId {
        // SAFETY: only used as an opaque tag in synthetic events.
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn test_cursor_position_in_points() {
        let mut input = InputState::with_scale_factor(2.0);
        let mut io = Io::new();
        input.handle_event(
            &mut io,
            &WindowEvent::CursorMoved {
                device_id: device(),
                position: PhysicalPosition::new(200.0, 100.0),
            },
        );
        assert_eq!(io.mouse_pos, Vec2::new(100.0, 50.0));

        input.handle_event(&mut io, &WindowEvent::CursorLeft { device_id: device() });
        assert!(!io.is_mouse_pos_valid());
    }

    #[test]
    fn test_buttons_and_focus_loss() {
        let mut input = InputState::default();
        let mut io = Io::new();
        input.handle_event(
            &mut io,
            &WindowEvent::MouseInput {
                device_id: device(),
                state: ElementState::Pressed,
                button: MouseButton::Right,
            },
        );
        assert!(io.is_mouse_down(UiMouseButton::Right));
        assert!(!io.is_mouse_down(UiMouseButton::Left));

        input.handle_event(&mut io, &WindowEvent::ModifiersChanged(Modifiers::from(ModifiersState::SHIFT)));
        assert!(io.key_shift && !io.key_ctrl);

        input.handle_event(&mut io, &WindowEvent::Focused(false));
        assert!(!io.is_mouse_down(UiMouseButton::Right));
        assert!(!io.key_shift);
    }

    #[test]
    fn test_wheel_accumulates() {
        let mut input = InputState::default();
        let mut io = Io::new();
        for delta in [
            MouseScrollDelta::LineDelta(0.0, 1.0),
            MouseScrollDelta::LineDelta(0.5, 2.0),
            MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -37.0)),
        ] {
            input.handle_event(
                &mut io,
                &WindowEvent::MouseWheel {
                    device_id: device(),
                    delta,
                    phase: TouchPhase::Moved,
                },
            );
        }
        assert_eq!(io.mouse_wheel, 2.0);
        assert_eq!(io.mouse_wheel_h, 0.5);
    }

    #[test]
    fn test_resize_and_scale_factor() {
        let mut input = InputState::with_scale_factor(1.5);
        let mut io = Io::new();
        input.handle_event(&mut io, &WindowEvent::Resized(PhysicalSize::new(1200, 900)));
        assert_eq!(io.display_size, Vec2::new(800.0, 600.0));
        assert_eq!(io.display_framebuffer_scale, Vec2::splat(1.5));
    }

    #[test]
    fn test_cursor_icons() {
        assert_eq!(to_cursor_icon(MouseCursor::None), None);
        assert_eq!(to_cursor_icon(MouseCursor::Hand), Some(CursorIcon::Pointer));
        assert_eq!(to_cursor_icon(MouseCursor::ResizeNWSE), Some(CursorIcon::NwseResize));
        assert_eq!(to_mouse_button(MouseButton::Other(7)), None);
        assert_eq!(to_mouse_button(MouseButton::Back), Some(UiMouseButton::Extra1));
    }
}
