// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font engine capability and the per-font registry record.

use alloc::string::String;
use linebender_resource_handle::Blob;
use smallvec::SmallVec;

use crate::glyph::GlyphTable;
use crate::scratch::{ScratchArena, ScratchFull};

/// Longest font name kept, in bytes.
pub const MAX_FONT_NAME_LEN: usize = 63;

/// Index of a font registered with a [`Context`](crate::Context).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(u32);

impl FontId {
    /// Creates an id from a registration index.
    ///
    /// Ids that don't name a registered font are accepted everywhere and
    /// turn text operations into no-ops.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The registration index.
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unscaled vertical metrics in font design units.
///
/// `descent` is below the baseline and therefore usually negative.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VerticalMetrics {
    /// Distance from the baseline to the top of the tallest glyphs.
    pub ascent: f32,
    /// Signed distance from the baseline to the bottom of the deepest glyphs.
    pub descent: f32,
    /// Extra spacing recommended between lines.
    pub line_gap: f32,
}

/// Placement of a glyph bitmap, as produced by [`FontEngine::build_glyph`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Advance width in font design units.
    pub advance: i32,
    /// Left side bearing in font design units.
    pub lsb: i32,
    /// Left edge of the bitmap relative to the pen, in pixels.
    pub x0: i32,
    /// Top edge of the bitmap relative to the baseline, in pixels (y down).
    pub y0: i32,
    /// Right edge of the bitmap, exclusive.
    pub x1: i32,
    /// Bottom edge of the bitmap, exclusive.
    pub y1: i32,
}

impl GlyphMetrics {
    /// Width of the bitmap in pixels.
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// Height of the bitmap in pixels.
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// Mutable view of a rectangle inside the atlas texture.
#[derive(Debug)]
pub struct BitmapMut<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> BitmapMut<'a> {
    /// Wraps `data`, whose first byte is the top-left pixel of the rectangle.
    ///
    /// Returns `None` if `data` is too short for the requested shape.
    pub fn new(data: &'a mut [u8], width: usize, height: usize, stride: usize) -> Option<Self> {
        if width > stride && height > 1 {
            return None;
        }
        let needed = if height == 0 {
            0
        } else {
            (height - 1) * stride + width
        };
        (data.len() >= needed).then_some(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance in bytes between two rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// One row of coverage values.
    ///
    /// # Panics
    ///
    /// Panics if `y` is not below [`height`](Self::height).
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.height, "row {y} out of bounds");
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }
}

/// The font engine capability the glyph cache rasterizes through.
///
/// Everything about font files lives behind this trait: the context only
/// stores the returned handles and calls back into the engine with them.
pub trait FontEngine {
    /// Engine specific handle for a loaded font.
    type Font;

    /// Parses font data, returning `None` if it isn't usable.
    fn load_font(&mut self, data: &Blob<u8>) -> Option<Self::Font>;

    /// Unscaled ascent, descent and line gap.
    fn vertical_metrics(&self, font: &Self::Font) -> VerticalMetrics;

    /// Factor from design units to pixels so that ascent to descent spans
    /// `size` pixels.
    fn pixel_height_scale(&self, font: &Self::Font, size: f32) -> f32;

    /// Glyph index for a codepoint, `0` when the font doesn't cover it.
    fn glyph_index(&self, font: &Self::Font, codepoint: u32) -> u32;

    /// Prepares `glyph` at `size` and reports its bitmap placement.
    ///
    /// Returns `None` if the glyph can't be produced at all.
    fn build_glyph(
        &mut self,
        font: &Self::Font,
        glyph: u32,
        size: f32,
        scale: f32,
    ) -> Option<GlyphMetrics>;

    /// Writes the coverage of the glyph last passed to
    /// [`build_glyph`](Self::build_glyph) into `target`.
    ///
    /// `target` has exactly the size reported by `build_glyph`. Temporary
    /// memory must come from `scratch`.
    fn render_glyph(
        &mut self,
        font: &Self::Font,
        glyph: u32,
        scale: f32,
        target: BitmapMut<'_>,
        scratch: &mut ScratchArena,
    ) -> Result<(), ScratchFull>;

    /// Pair kerning in design units.
    fn kern_advance(&self, font: &Self::Font, left: u32, right: u32) -> i32;
}

/// A registered font.
pub(crate) struct Font<F> {
    pub(crate) name: String,
    pub(crate) handle: F,
    pub(crate) data: Blob<u8>,
    /// Ascender, descender and line height per pixel of font size.
    pub(crate) ascender: f32,
    pub(crate) descender: f32,
    pub(crate) line_height: f32,
    pub(crate) glyphs: GlyphTable,
    pub(crate) fallbacks: SmallVec<[FontId; 4]>,
}

impl<F> Font<F> {
    pub(crate) fn new(name: &str, handle: F, data: Blob<u8>, metrics: VerticalMetrics) -> Self {
        let height = metrics.ascent - metrics.descent;
        let (ascender, descender, line_height) = if height > 0.0 {
            (
                metrics.ascent / height,
                metrics.descent / height,
                (height + metrics.line_gap) / height,
            )
        } else {
            (0.0, 0.0, 0.0)
        };
        Self {
            name: String::from(truncate_name(name)),
            handle,
            data,
            ascender,
            descender,
            line_height,
            glyphs: GlyphTable::new(),
            fallbacks: SmallVec::new(),
        }
    }
}

/// Cuts `name` to at most [`MAX_FONT_NAME_LEN`] bytes without splitting a
/// character.
pub(crate) fn truncate_name(name: &str) -> &str {
    if name.len() <= MAX_FONT_NAME_LEN {
        return name;
    }
    let mut end = MAX_FONT_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn metrics_are_normalized_to_unit_height() {
        let metrics = VerticalMetrics {
            ascent: 800.0,
            descent: -200.0,
            line_gap: 100.0,
        };
        let font = Font::new("sans", (), Blob::from(vec![0_u8]), metrics);
        assert_eq!(font.ascender, 0.8);
        assert_eq!(font.descender, -0.2);
        assert_eq!(font.line_height, 1.1);
    }

    #[test]
    fn long_names_are_cut_on_char_boundary() {
        let name = "é".repeat(40);
        let cut = truncate_name(&name);
        assert_eq!(cut.len(), 62);
        assert!(name.starts_with(cut));
        assert_eq!(truncate_name("mono"), "mono");
    }

    #[test]
    fn bitmap_rows_respect_stride() {
        let mut data = vec![0_u8; 20];
        let mut bitmap = BitmapMut::new(&mut data[2..], 3, 3, 5).unwrap();
        bitmap.row_mut(2).fill(9);
        assert_eq!(&data[12..15], &[9, 9, 9]);
        assert_eq!(data.iter().filter(|&&b| b == 9).count(), 3);
        assert!(BitmapMut::new(&mut data, 4, 6, 4).is_none());
    }
}
