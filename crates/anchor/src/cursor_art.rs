//! Software mouse cursor art baked into the font atlas.
//!
//! The art block is `CURSOR_ART_W x CURSOR_ART_H` characters: `'X'` for the
//! border, `'.'` for the fill and `' '` for empty. The atlas stores it twice side
//! by side: the fill copy first, then the border copy one column further right.

use crate::io::MouseCursor;
use crate::primitives::Vec2;

pub const CURSOR_ART_W: usize = 108;
pub const CURSOR_ART_H: usize = 27;

/// Placement of one cursor inside the art block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorLayout {
    pub pos: Vec2,
    pub size: Vec2,
    /// Hot spot relative to the top-left corner.
    pub offset: Vec2,
}

const fn layout(pos: (f32, f32), size: (f32, f32), offset: (f32, f32)) -> CursorLayout {
    CursorLayout {
        pos: Vec2::new(pos.0, pos.1),
        size: Vec2::new(size.0, size.1),
        offset: Vec2::new(offset.0, offset.1),
    }
}

/// Layout of a cursor, `None` for cursors without art.
pub fn cursor_layout(cursor: MouseCursor) -> Option<CursorLayout> {
    Some(match cursor {
        MouseCursor::Arrow => layout((0.0, 3.0), (12.0, 19.0), (0.0, 0.0)),
        MouseCursor::TextInput => layout((13.0, 0.0), (7.0, 16.0), (1.0, 8.0)),
        MouseCursor::ResizeAll => layout((31.0, 0.0), (23.0, 23.0), (11.0, 11.0)),
        MouseCursor::ResizeNS => layout((21.0, 0.0), (9.0, 23.0), (4.0, 11.0)),
        MouseCursor::ResizeEW => layout((55.0, 18.0), (23.0, 9.0), (11.0, 4.0)),
        MouseCursor::ResizeNESW => layout((73.0, 0.0), (17.0, 17.0), (8.0, 8.0)),
        MouseCursor::ResizeNWSE => layout((55.0, 0.0), (17.0, 17.0), (8.0, 8.0)),
        MouseCursor::Hand => layout((91.0, 0.0), (17.0, 22.0), (5.0, 0.0)),
        MouseCursor::None | MouseCursor::NotAllowed => return None,
    })
}

/// Shape of each cursor in its own `w x h` box.
fn inside(cursor: MouseCursor, x: i32, y: i32) -> bool {
    match cursor {
        MouseCursor::Arrow => {
            let head = y < 16 && x <= y.min(11) && x <= 16 - y + 4;
            let tail_x = 4 + (y - 12) / 2;
            let tail = (12..19).contains(&y) && x >= tail_x && x < tail_x + 3;
            head || tail
        }
        MouseCursor::TextInput => y <= 1 || y >= 14 || (2..=4).contains(&x),
        MouseCursor::ResizeAll => {
            let (dx, dy) = ((x - 11).abs(), (y - 11).abs());
            let bars = (dx <= 1 && dy <= 9) || (dy <= 1 && dx <= 9);
            let heads = (dy >= 6 && dx <= 11 - dy) || (dx >= 6 && dy <= 11 - dx);
            bars || heads
        }
        MouseCursor::ResizeNS => {
            let dx = (x - 4).abs();
            let stem = dx <= 1;
            let heads = (y <= 4 && dx <= y) || (y >= 18 && dx <= 22 - y);
            stem || heads
        }
        MouseCursor::ResizeEW => inside(MouseCursor::ResizeNS, y, x),
        MouseCursor::ResizeNESW => {
            let band = (x + y - 16).abs() <= 2;
            let top_right = x >= 9 && y <= 7 && (16 - x) + y <= 7;
            let bottom_left = x <= 7 && y >= 9 && x + (16 - y) <= 7;
            band || top_right || bottom_left
        }
        MouseCursor::ResizeNWSE => inside(MouseCursor::ResizeNESW, 16 - x, y),
        MouseCursor::Hand => {
            let finger = (5..=8).contains(&x) && y <= 10;
            let palm = (2..=15).contains(&x) && (8..=20).contains(&y) && !(x == 2 && y == 8);
            finger || palm
        }
        MouseCursor::None | MouseCursor::NotAllowed => false,
    }
}

/// The whole art block, row-major, one byte per pixel.
pub fn cursor_art() -> Vec<u8> {
    let mut art = vec![b' '; CURSOR_ART_W * CURSOR_ART_H];
    for cursor in MouseCursor::ALL {
        let Some(l) = cursor_layout(cursor) else {
            continue;
        };
        let (w, h) = (l.size.x as i32, l.size.y as i32);
        let shape = |x: i32, y: i32| x >= 0 && y >= 0 && x < w && y < h && inside(cursor, x, y);
        for y in 0..h {
            for x in 0..w {
                if !shape(x, y) {
                    continue;
                }
                let edge = !shape(x - 1, y) || !shape(x + 1, y) || !shape(x, y - 1) || !shape(x, y + 1);
                let ax = l.pos.x as usize + x as usize;
                let ay = l.pos.y as usize + y as usize;
                art[ay * CURSOR_ART_W + ax] = if edge { b'X' } else { b'.' };
            }
        }
    }
    art
}
