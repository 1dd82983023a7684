// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text Atlas caches rasterized glyphs in a single texture atlas and turns
//! strings into textured quads for realtime renderers.
//!
//! A [`Context`] owns the atlas, the registered fonts and a stack of text
//! styles. Font files are handled by a [`FontEngine`]; drawing goes through a
//! [`Renderer`], which receives the changed part of the single channel atlas
//! texture and batches of coloured, textured triangles.
//!
//! ```no_run
//! use text_atlas::{Alignment, Context, ContextConfig, HAlign, SwashEngine, VAlign, rgba};
//!
//! # fn main() -> Result<(), text_atlas::Error> {
//! let mut cx = Context::new(ContextConfig::default(), SwashEngine::new(), ())?;
//! let sans = cx.add_font_file("sans", "Roboto-Regular.ttf")?;
//! cx.set_font(sans);
//! cx.set_size(24.0);
//! cx.set_color(rgba(255, 255, 255, 255));
//! cx.set_align(Alignment::new(HAlign::Center, VAlign::Middle));
//! let (advance, bounds) = cx.measure_text(320.0, 240.0, "Hello, world!");
//! cx.draw_text(320.0, 240.0, "Hello, world!");
//! # let _ = (advance, bounds);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): Get floating point functions from the standard library
//!   (likely using your target's libc) and allow loading fonts from files.
//! - `libm`: Use floating point implementations from [libm].
//! - `swash` (enabled by default): Provides [`SwashEngine`], a font engine backed by [swash].
//! - `bytemuck`: Implements `Pod` for [`Quad`] and [`DirtyRect`].
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//!
//! [libm]: https://crates.io/crates/libm
//! [swash]: https://crates.io/crates/swash

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("text_atlas requires either the `std` or `libm` feature to be enabled");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use core_maths as _;

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod atlas;
pub mod blur;
pub mod utf8;

mod batch;
mod context;
mod error;
mod font;
mod glyph;
mod layout;
mod renderer;
mod scratch;
mod state;

#[cfg(feature = "bytemuck")]
mod impl_bytemuck;

#[cfg(feature = "swash")]
mod swash_engine;

#[cfg(test)]
mod tests;

pub use batch::Quad;
pub use context::{Context, ContextConfig};
pub use error::{Error, ErrorAction, ErrorKind, RendererError};
pub use font::{BitmapMut, FontEngine, FontId, GlyphMetrics, MAX_FONT_NAME_LEN, VerticalMetrics};
pub use glyph::{HASH_LUT_SIZE, MAX_BLUR, MIN_GLYPH_SIZE};
pub use layout::{Bounds, GlyphQuad, LineMetrics, Quads, TextIter};
pub use renderer::{DirtyRect, Renderer, TextureData};
pub use scratch::{ScratchArena, ScratchFull};
pub use state::{Alignment, HAlign, Origin, TextStyle, VAlign};

#[cfg(feature = "swash")]
pub use swash_engine::{SwashEngine, SwashFont};

/// Packs a colour into the vertex colour format, red in the lowest byte.
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24
}
