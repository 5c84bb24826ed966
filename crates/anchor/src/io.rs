//! Per-frame host configuration and input.
//!
//! The windowing layer fills this in before every `new_frame`. The core reads
//! mouse position, buttons, wheel, modifiers and the queued text input.

use std::path::PathBuf;

use crate::flags::{BackendFlags, ConfigFlags};
use crate::primitives::Vec2;

/// Cursor shapes the core can request from the host (or draw itself).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseCursor {
    /// Hide the cursor.
    None,
    #[default]
    Arrow,
    TextInput,
    ResizeAll,
    ResizeNS,
    ResizeEW,
    ResizeNESW,
    ResizeNWSE,
    Hand,
    NotAllowed,
}

impl MouseCursor {
    pub const ALL: [MouseCursor; 10] = [
        Self::None,
        Self::Arrow,
        Self::TextInput,
        Self::ResizeAll,
        Self::ResizeNS,
        Self::ResizeEW,
        Self::ResizeNESW,
        Self::ResizeNWSE,
        Self::Hand,
        Self::NotAllowed,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Extra1,
    Extra2,
}

impl MouseButton {
    pub const COUNT: usize = 5;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// "Mouse position unavailable" marker for [`Io::mouse_pos`].
pub const MOUSE_POS_UNAVAILABLE: Vec2 = Vec2::new(-f32::MAX, -f32::MAX);

#[derive(Clone, Debug)]
pub struct Io {
    pub config_flags: ConfigFlags,
    pub backend_flags: BackendFlags,
    /// Main display size in points.
    pub display_size: Vec2,
    /// Pixels per point; for retina displays this is usually 2.
    pub display_framebuffer_scale: Vec2,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// Settings file, `None` disables automatic load/save.
    pub ini_filename: Option<PathBuf>,
    /// Minimum seconds between automatic settings saves.
    pub ini_saving_rate: f32,
    /// Global scale applied to every font.
    pub font_global_scale: f32,
    /// Draw the cursor with the atlas art instead of the OS cursor.
    pub mouse_draw_cursor: bool,

    pub mouse_pos: Vec2,
    pub mouse_down: [bool; MouseButton::COUNT],
    /// Vertical wheel, one unit scrolls about five lines.
    pub mouse_wheel: f32,
    pub mouse_wheel_h: f32,
    pub key_ctrl: bool,
    pub key_shift: bool,
    pub key_alt: bool,
    pub key_super: bool,

    /// Cursor the core wants shown this frame.
    pub mouse_cursor: MouseCursor,
    /// Text typed since the last frame.
    pub input_queue_characters: Vec<char>,
    /// High half of a UTF-16 surrogate pair waiting for its low half.
    input_queue_surrogate: u16,
}

impl Default for Io {
    fn default() -> Self {
        Self {
            config_flags: ConfigFlags::empty(),
            backend_flags: BackendFlags::empty(),
            display_size: Vec2::new(-1.0, -1.0),
            display_framebuffer_scale: Vec2::ONE,
            delta_time: 1.0 / 60.0,
            ini_filename: Some(PathBuf::from("anchor.ini")),
            ini_saving_rate: 5.0,
            font_global_scale: 1.0,
            mouse_draw_cursor: false,
            mouse_pos: MOUSE_POS_UNAVAILABLE,
            mouse_down: [false; MouseButton::COUNT],
            mouse_wheel: 0.0,
            mouse_wheel_h: 0.0,
            key_ctrl: false,
            key_shift: false,
            key_alt: false,
            key_super: false,
            mouse_cursor: MouseCursor::Arrow,
            input_queue_characters: Vec::new(),
            input_queue_surrogate: 0,
        }
    }
}

impl Io {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mouse_pos_valid(&self) -> bool {
        self.mouse_pos.x >= -256_000.0 && self.mouse_pos.y >= -256_000.0
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_down[button.index()]
    }

    /// Queue one typed codepoint. NUL and invalid scalars are dropped.
    pub fn add_input_character(&mut self, c: u32) {
        if c == 0 {
            return;
        }
        self.input_queue_characters
            .push(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    /// Queue one UTF-16 unit, pairing surrogates across calls.
    pub fn add_input_character_utf16(&mut self, unit: u16) {
        if unit == 0 && self.input_queue_surrogate == 0 {
            return;
        }
        if (0xD800..=0xDBFF).contains(&unit) {
            if self.input_queue_surrogate != 0 {
                self.input_queue_characters.push(char::REPLACEMENT_CHARACTER);
            }
            self.input_queue_surrogate = unit;
            return;
        }

        let high = std::mem::take(&mut self.input_queue_surrogate);
        let decoded = if high != 0 {
            char::decode_utf16([high, unit]).next()
        } else {
            char::decode_utf16([unit]).next()
        };
        let c = match decoded {
            Some(Ok(c)) => c,
            _ => char::REPLACEMENT_CHARACTER,
        };
        self.input_queue_characters.push(c);
    }

    /// Queue every character of UTF-8 text.
    pub fn add_input_characters_utf8(&mut self, text: &str) {
        self.input_queue_characters.extend(text.chars().filter(|&c| c != '\0'));
    }

    pub fn clear_input_characters(&mut self) {
        self.input_queue_characters.clear();
        self.input_queue_surrogate = 0;
    }

    /// Drop pressed buttons and modifiers, e.g. when the window loses focus.
    pub fn clear_input_keys(&mut self) {
        self.mouse_down = [false; MouseButton::COUNT];
        self.key_ctrl = false;
        self.key_shift = false;
        self.key_alt = false;
        self.key_super = false;
        self.clear_input_characters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_and_codepoint_input() {
        let mut io = Io::new();
        io.add_input_characters_utf8("hé");
        io.add_input_character(0x1F600);
        io.add_input_character(0);
        assert_eq!(io.input_queue_characters, vec!['h', 'é', '😀']);
        io.clear_input_characters();
        assert!(io.input_queue_characters.is_empty());
    }

    #[test]
    fn test_utf16_surrogate_pairs() {
        let mut io = Io::new();
        let units: Vec<u16> = "a😀".encode_utf16().collect();
        for u in units {
            io.add_input_character_utf16(u);
        }
        assert_eq!(io.input_queue_characters, vec!['a', '😀']);

        // A lone low surrogate becomes U+FFFD.
        io.clear_input_characters();
        io.add_input_character_utf16(0xDC00);
        assert_eq!(io.input_queue_characters, vec![char::REPLACEMENT_CHARACTER]);
    }

    #[test]
    fn test_mouse_pos_starts_unavailable() {
        let mut io = Io::new();
        assert!(!io.is_mouse_pos_valid());
        io.mouse_pos = Vec2::new(10.0, 20.0);
        assert!(io.is_mouse_pos_valid());
        io.mouse_down[MouseButton::Right.index()] = true;
        assert!(io.is_mouse_down(MouseButton::Right));
        io.clear_input_keys();
        assert!(!io.is_mouse_down(MouseButton::Right));
    }
}
