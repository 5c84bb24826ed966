/// Which caller-visible defects get reported.
///
/// Everything here is reported through `log`; nothing changes the produced geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diagnostics {
    /// Warn (once per frame and draw list) when geometry is dropped because 16-bit
    /// indices ran out and vertex offsets are not allowed.
    pub warn_index_overflow: bool,
    /// Log codepoints the atlas builder could not find or pack.
    pub log_missing_glyphs: bool,
    /// `debug_assert!` on atlas mutation while a frame holds the lock.
    pub assert_atlas_unlocked: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::all()
    }
}

impl Diagnostics {
    /// Report nothing
    pub const fn none() -> Self {
        Self {
            warn_index_overflow: false,
            log_missing_glyphs: false,
            assert_atlas_unlocked: false,
        }
    }

    /// Report everything
    pub const fn all() -> Self {
        Self {
            warn_index_overflow: true,
            log_missing_glyphs: true,
            assert_atlas_unlocked: true,
        }
    }

    pub const fn with_index_overflow(mut self, enabled: bool) -> Self {
        self.warn_index_overflow = enabled;
        self
    }

    pub const fn with_missing_glyphs(mut self, enabled: bool) -> Self {
        self.log_missing_glyphs = enabled;
        self
    }

    pub const fn with_atlas_unlocked(mut self, enabled: bool) -> Self {
        self.assert_atlas_unlocked = enabled;
        self
    }

    pub const fn is_enabled(&self) -> bool {
        self.warn_index_overflow || self.log_missing_glyphs || self.assert_atlas_unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let d = Diagnostics::none().with_missing_glyphs(true);
        assert!(d.is_enabled());
        assert!(d.log_missing_glyphs && !d.warn_index_overflow);
        assert!(!Diagnostics::none().is_enabled());
        assert_eq!(Diagnostics::default(), Diagnostics::all());
    }
}
