// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`FontEngine`] implementation backed by [swash].
//!
//! Outlines are rendered when a glyph is built and the resulting mask is
//! kept until it is copied into the atlas. Pair kerning comes from the legacy
//! `kern` table, read with [read-fonts].
//!
//! [read-fonts]: https://docs.rs/read-fonts
//!
//! [swash]: https://docs.rs/swash

use core::fmt::{Debug, Formatter};

use linebender_resource_handle::Blob;
use read_fonts::TableProvider as _;
use read_fonts::tables::kern::SubtableKind;
use swash::scale::image::Image;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;
use swash::{CacheKey, FontRef, GlyphId};

use crate::font::{BitmapMut, FontEngine, GlyphMetrics, VerticalMetrics};
use crate::scratch::{ScratchArena, ScratchFull};

/// Collection index of every loaded font.
const FONT_INDEX: u32 = 0;

/// A font loaded by [`SwashEngine`].
#[derive(Clone)]
pub struct SwashFont {
    data: Blob<u8>,
    offset: u32,
    key: CacheKey,
}

impl SwashFont {
    fn as_ref(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.data(),
            offset: self.offset,
            key: self.key,
        }
    }
}

impl Debug for SwashFont {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwashFont")
            .field("data", &self.data.id())
            .field("offset", &self.offset)
            .field("key", &self.key)
            .finish()
    }
}

/// Rasterizes glyph outlines with swash.
///
/// [`FontEngine::kern_advance`] only sees the `kern` table. GPOS kerning
/// needs shaping and is ignored.
#[derive(Default)]
pub struct SwashEngine {
    context: ScaleContext,
    image: Image,
    /// Font, glyph and scale of the mask held in `image`.
    rendered: Option<(CacheKey, GlyphId, u32)>,
}

impl SwashEngine {
    /// Creates an engine with an empty scaler cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn rasterize(&mut self, font: &SwashFont, glyph: GlyphId, scale: f32) {
        let font_ref = font.as_ref();
        let ppem = scale * f32::from(font_ref.metrics(&[]).units_per_em);
        let mut scaler = self.context.builder(font_ref).size(ppem).build();
        self.image.clear();
        let ok = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render_into(&mut scaler, glyph, &mut self.image);
        if !ok {
            // Glyphs without an outline, like spaces, leave an empty mask.
            self.image.clear();
        }
        self.rendered = Some((font.key, glyph, scale.to_bits()));
    }
}

impl Debug for SwashEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwashEngine")
            .field("rendered", &self.rendered)
            .finish_non_exhaustive()
    }
}

impl FontEngine for SwashEngine {
    type Font = SwashFont;

    fn load_font(&mut self, data: &Blob<u8>) -> Option<SwashFont> {
        let font = FontRef::from_index(data.data(), FONT_INDEX as usize)?;
        Some(SwashFont {
            data: data.clone(),
            offset: font.offset,
            key: font.key,
        })
    }

    fn vertical_metrics(&self, font: &SwashFont) -> VerticalMetrics {
        let metrics = font.as_ref().metrics(&[]);
        VerticalMetrics {
            ascent: metrics.ascent,
            descent: -metrics.descent,
            line_gap: metrics.leading,
        }
    }

    fn pixel_height_scale(&self, font: &SwashFont, size: f32) -> f32 {
        let metrics = font.as_ref().metrics(&[]);
        let height = metrics.ascent + metrics.descent;
        if height > 0.0 { size / height } else { 0.0 }
    }

    fn glyph_index(&self, font: &SwashFont, codepoint: u32) -> u32 {
        u32::from(font.as_ref().charmap().map(codepoint))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "design unit metrics are integral"
    )]
    fn build_glyph(
        &mut self,
        font: &SwashFont,
        glyph: u32,
        _size: f32,
        scale: f32,
    ) -> Option<GlyphMetrics> {
        let id = GlyphId::try_from(glyph).ok()?;
        self.rasterize(font, id, scale);

        let glyph_metrics = font.as_ref().glyph_metrics(&[]);
        let placement = self.image.placement;
        let x0 = placement.left;
        let y0 = -placement.top;
        Some(GlyphMetrics {
            advance: glyph_metrics.advance_width(id).round() as i32,
            lsb: glyph_metrics.lsb(id).round() as i32,
            x0,
            y0,
            x1: x0 + i32::try_from(placement.width).ok()?,
            y1: y0 + i32::try_from(placement.height).ok()?,
        })
    }

    fn render_glyph(
        &mut self,
        font: &SwashFont,
        glyph: u32,
        scale: f32,
        mut target: BitmapMut<'_>,
        _scratch: &mut ScratchArena,
    ) -> Result<(), ScratchFull> {
        let Ok(id) = GlyphId::try_from(glyph) else {
            return Ok(());
        };
        if self.rendered != Some((font.key, id, scale.to_bits())) {
            self.rasterize(font, id, scale);
        }
        let width = (self.image.placement.width as usize).min(target.width());
        let height = (self.image.placement.height as usize).min(target.height());
        let src_stride = self.image.placement.width as usize;
        if width == 0 {
            return Ok(());
        }
        for (y, src) in self.image.data.chunks_exact(src_stride).take(height).enumerate() {
            target.row_mut(y)[..width].copy_from_slice(&src[..width]);
        }
        Ok(())
    }

    fn kern_advance(&self, font: &SwashFont, left: u32, right: u32) -> i32 {
        kern_pair(font.data.data(), FONT_INDEX, left, right)
    }
}

/// Sums the horizontal `kern` subtable values for a glyph pair, in design
/// units. Missing or malformed tables kern to zero.
fn kern_pair(data: &[u8], index: u32, left: u32, right: u32) -> i32 {
    let Ok(font) = read_fonts::FontRef::from_index(data, index) else {
        return 0;
    };
    let Ok(kern) = font.kern() else {
        return 0;
    };
    let left = read_fonts::types::GlyphId::new(left);
    let right = read_fonts::types::GlyphId::new(right);
    kern.subtables()
        .filter_map(Result::ok)
        // Cross-stream values move glyphs vertically.
        .filter(|subtable| subtable.is_horizontal() && !subtable.is_cross_stream())
        .filter_map(|subtable| match subtable.kind().ok()? {
            SubtableKind::Format0(table) => table.kerning(left, right),
            SubtableKind::Format2(table) => table.kerning(left, right),
            SubtableKind::Format3(table) => table.kerning(left, right),
            // State machines need the whole glyph run.
            SubtableKind::Format1(_) => None,
        })
        .fold(0, i32::saturating_add)
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use linebender_resource_handle::Blob;

    use super::{SwashEngine, kern_pair};
    use crate::font::FontEngine;
    use crate::{Context, ContextConfig, ErrorKind};

    /// An sfnt holding only a `kern` table with the given subtables, each
    /// given as `(coverage, pairs)` in format 0.
    fn kern_font(subtables: &[(u16, &[(u16, u16, i16)])]) -> Vec<u8> {
        let mut kern = Vec::new();
        kern.extend_from_slice(&0_u16.to_be_bytes());
        kern.extend_from_slice(&u16::try_from(subtables.len()).unwrap().to_be_bytes());
        for &(coverage, pairs) in subtables {
            let n_pairs = u16::try_from(pairs.len()).unwrap();
            let length = 6 + 8 + 6 * n_pairs;
            let entry_selector = n_pairs.checked_ilog2().unwrap_or(0);
            let search_range = if n_pairs == 0 {
                0
            } else {
                6 * (1_u16 << entry_selector)
            };
            for word in [
                0,
                length,
                coverage,
                n_pairs,
                search_range,
                u16::try_from(entry_selector).unwrap(),
                6 * n_pairs - search_range,
            ] {
                kern.extend_from_slice(&word.to_be_bytes());
            }
            for &(left, right, value) in pairs {
                kern.extend_from_slice(&left.to_be_bytes());
                kern.extend_from_slice(&right.to_be_bytes());
                kern.extend_from_slice(&value.to_be_bytes());
            }
        }

        let mut font = Vec::new();
        font.extend_from_slice(&0x0001_0000_u32.to_be_bytes());
        // One table: numTables, searchRange, entrySelector, rangeShift.
        for word in [1_u16, 16, 0, 0] {
            font.extend_from_slice(&word.to_be_bytes());
        }
        font.extend_from_slice(b"kern");
        font.extend_from_slice(&0_u32.to_be_bytes());
        font.extend_from_slice(&28_u32.to_be_bytes());
        font.extend_from_slice(&u32::try_from(kern.len()).unwrap().to_be_bytes());
        font.extend_from_slice(&kern);
        font
    }

    #[test]
    fn garbage_is_not_a_font() {
        let mut engine = SwashEngine::new();
        assert!(engine.load_font(&Blob::from(vec![0_u8; 64])).is_none());
        assert!(engine.load_font(&Blob::from(vec![])).is_none());
    }

    #[test]
    fn kern_table_pairs_are_found() {
        let font = kern_font(&[(0x0001, &[(1, 2, -100), (3, 4, 50)])]);
        assert_eq!(kern_pair(&font, 0, 1, 2), -100);
        assert_eq!(kern_pair(&font, 0, 3, 4), 50);
        assert_eq!(kern_pair(&font, 0, 2, 1), 0);
        assert_eq!(kern_pair(&font, 0, 1, 4), 0);
    }

    #[test]
    fn horizontal_subtables_are_summed() {
        let font = kern_font(&[
            (0x0001, &[(1, 2, -100)]),
            // Vertical kerning.
            (0x0000, &[(1, 2, -7)]),
            // Cross-stream kerning.
            (0x0005, &[(1, 2, -11)]),
            (0x0001, &[(1, 2, -20), (5, 6, 3)]),
        ]);
        assert_eq!(kern_pair(&font, 0, 1, 2), -120);
        assert_eq!(kern_pair(&font, 0, 5, 6), 3);
    }

    #[test]
    fn fonts_without_kern_tables_do_not_kern() {
        assert_eq!(kern_pair(b"not a font", 0, 1, 2), 0);
        assert_eq!(kern_pair(&[], 0, 1, 2), 0);
        // A table directory without a `kern` table.
        let mut font = kern_font(&[(0x0001, &[(1, 2, -100)])]);
        font[12..16].copy_from_slice(b"kerx");
        assert_eq!(kern_pair(&font, 0, 1, 2), 0);
        // Out of range collection index.
        let font = kern_font(&[(0x0001, &[(1, 2, -100)])]);
        assert_eq!(kern_pair(&font, 1, 1, 2), 0);
    }

    #[test]
    fn context_reports_unparsable_fonts() {
        let mut cx = Context::new(ContextConfig::default(), SwashEngine::new(), ()).unwrap();
        let err = cx
            .add_font("broken", Blob::from(b"not a font".to_vec()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FontLoad);
    }
}
