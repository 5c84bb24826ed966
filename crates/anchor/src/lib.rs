//! # anchor
//!
//! Graphics backend agnostic immediate-mode UI core.
//!
//! This crate builds per-frame vertex, index and command buffers ([`DrawList`]),
//! packs fonts and cursor art into one texture ([`FontAtlas`]) and hands the result
//! to a renderer as [`DrawData`]. Rendering is handled by separate backend crates
//! like `anchor-wgpu`; TTF rasterization by `anchor-text`.

mod builtin_font;
mod channels;
mod color;
pub mod compression;
mod context;
mod cursor_art;
mod diagnostics;
mod draw_cmd;
mod draw_data;
mod draw_list;
mod error;
mod flags;
mod font;
mod font_atlas;
mod font_rasterizer;
pub mod glyph_ranges;
mod io;
mod primitives;
mod rect_pack;
mod render;
pub mod settings;
mod shared;
mod style;
mod tessellate;
mod vertex;

pub use builtin_font::*;
pub use channels::*;
pub use color::*;
pub use context::*;
pub use diagnostics::*;
pub use draw_cmd::*;
pub use draw_data::*;
pub use draw_list::*;
pub use error::*;
pub use flags::*;
pub use font::*;
pub use font_atlas::*;
pub use font_rasterizer::*;
pub use glyph_ranges::GlyphRangesBuilder;
pub use io::*;
pub use primitives::*;
pub use rect_pack::*;
pub use render::*;
pub use settings::{KeyValueSettings, SettingsHandler, SettingsStore};
pub use shared::*;
pub use style::*;
pub use tessellate::*;
pub use vertex::*;
