// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error type for context operations and capacity signals.
///
/// Carries a non-exhaustive [`ErrorKind`] plus a numeric detail whose meaning
/// depends on the kind (see [`Error::value`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// Kind specific detail, zero when unused.
    value: usize,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Extra detail for the error.
    ///
    /// For [`ErrorKind::ScratchFull`] this is the number of scratch bytes the
    /// failed request needed. It is zero for every other kind.
    pub fn value(&self) -> usize {
        self.value
    }

    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, value: 0 }
    }

    pub(crate) fn scratch_full(needed: usize) -> Self {
        Self {
            kind: ErrorKind::ScratchFull,
            value: needed,
        }
    }
}

impl From<RendererError> for Error {
    fn from(_: RendererError) -> Self {
        Self::new(ErrorKind::Renderer)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::AtlasFull => write!(f, "glyph atlas is full"),
            ErrorKind::ScratchFull => write!(
                f,
                "scratch memory exhausted: {} bytes needed",
                self.value
            ),
            ErrorKind::StatesOverflow => write!(f, "too many pushed style states"),
            ErrorKind::StatesUnderflow => write!(f, "popped the last style state"),
            ErrorKind::FallbacksFull => write!(f, "fallback font list is full"),
            ErrorKind::FontLoad => write!(f, "font data could not be loaded"),
            ErrorKind::Renderer => write!(f, "renderer could not create the atlas texture"),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No free space was left in the atlas for a new glyph.
    AtlasFull,

    /// Building a glyph needed more scratch memory than configured.
    ScratchFull,

    /// A style state push exceeded the stack depth.
    StatesOverflow,

    /// A style state pop would have removed the last frame.
    StatesUnderflow,

    /// A font already has the maximum number of fallbacks.
    FallbacksFull,

    /// The font engine rejected the font data, or it could not be read.
    FontLoad,

    /// The renderer refused to create or resize the atlas texture.
    Renderer,
}

/// What the context should do after reporting a capacity error.
///
/// Returned from the callback installed with
/// [`Context::set_error_callback`](crate::Context::set_error_callback).
/// Only [`ErrorKind::AtlasFull`] acts on the answer: the action is applied and
/// the allocation that failed is retried once.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorAction {
    /// Carry on without changes.
    #[default]
    Ignore,

    /// Grow the atlas, keeping every cached glyph.
    ExpandAtlas {
        /// New width in pixels.
        width: u16,
        /// New height in pixels.
        height: u16,
    },

    /// Throw away every cached glyph and start over with the given size.
    ResetAtlas {
        /// New width in pixels.
        width: u16,
        /// New height in pixels.
        height: u16,
    },
}

/// Failure reported by a [`Renderer`](crate::Renderer) when it cannot
/// provide a texture of the requested size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RendererError;

impl core::fmt::Display for RendererError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("renderer failed to provide the atlas texture")
    }
}

impl core::error::Error for RendererError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn scratch_full_carries_bytes_needed() {
        let err = Error::scratch_full(64_016);
        assert_eq!(err.kind(), ErrorKind::ScratchFull);
        assert_eq!(err.value(), 64_016);
        assert_eq!(
            err.to_string(),
            "scratch memory exhausted: 64016 bytes needed"
        );
    }

    #[test]
    fn renderer_error_converts() {
        let err: Error = RendererError.into();
        assert_eq!(err.kind(), ErrorKind::Renderer);
        assert_eq!(err.value(), 0);
    }
}
