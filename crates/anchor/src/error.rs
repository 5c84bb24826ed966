use thiserror::Error;

/// Failures while unpacking embedded font data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecompressError {
    #[error("stream does not start with the compressed-data magic")]
    BadMagic,
    #[error("stream declares more than 4 GiB of output")]
    TooLarge,
    #[error("stream ended inside a token at byte {0}")]
    Truncated(usize),
    #[error("unknown token {token:#04x} at byte {offset}")]
    UnknownToken { token: u8, offset: usize },
    #[error("back-reference reaches before the start of the output")]
    MatchOutOfRange,
    #[error("token writes past the declared output length of {0} bytes")]
    Overrun(usize),
    #[error("decoded {actual} bytes, header declared {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("adler-32 mismatch: stream says {expected:#010x}, data hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("base85 text length {0} is not a multiple of 5")]
    Base85Length(usize),
    #[error("invalid base85 character {0:?}")]
    Base85Char(char),
}

/// Failures while building a font atlas.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("atlas is locked between new_frame() and render()")]
    Locked,
    #[error("atlas has no fonts")]
    NoFonts,
    #[error("font size must be positive, got {0}")]
    InvalidSize(f32),
    #[error("merge mode needs a font to merge into")]
    MergeWithoutFont,
    #[error("font '{0}' needs a rasterizer but none is installed")]
    NoRasterizer(String),
    #[error("font '{name}' could not be opened: {reason}")]
    InvalidFontData { name: String, reason: String },
    #[error("font data is empty")]
    EmptyFontData,
    #[error("glyph ranges must be non-empty pairs with start <= end, got {0:?}")]
    InvalidGlyphRange((u32, u32)),
    #[error("no glyph of any font could be packed")]
    NoGlyphs,
    #[error("font index {0} does not exist")]
    UnknownFont(usize),
    #[error("custom rect {0} does not exist")]
    UnknownCustomRect(usize),
    #[error(transparent)]
    Decompress(#[from] DecompressError),
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while reading persisted settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("line {line}: malformed section header '{text}'")]
    BadHeader { line: usize, text: String },
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
}
