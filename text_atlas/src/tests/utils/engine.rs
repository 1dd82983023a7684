// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font engine with box shaped glyphs and exactly representable metrics.
//!
//! Font data is the list of covered ASCII characters; glyph `n` is the
//! `n`th byte. Ascent and descent span 1024 units, so every size that is a
//! multiple of 1/1024 px scales without rounding.

#![allow(
    clippy::cast_possible_truncation,
    reason = "box metrics are small whole numbers"
)]

use alloc::vec::Vec;
use core::cell::Cell;

use linebender_resource_handle::Blob;

use crate::{BitmapMut, FontEngine, GlyphMetrics, ScratchArena, ScratchFull, VerticalMetrics};

const UNITS_PER_EM: f32 = 1024.0;
pub(crate) const ADVANCE: i32 = 768;

#[derive(Clone, Debug)]
pub(crate) struct BoxFont {
    /// Load order, used to tell fonts apart in [`BoxEngine::rendered`].
    pub(crate) tag: usize,
    chars: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct BoxEngine {
    loaded: usize,
    /// Pair kerning by character, in design units.
    pub(crate) kerning: Vec<(u8, u8, i32)>,
    /// Bytes of scratch requested for every rendered glyph.
    pub(crate) scratch_per_glyph: usize,
    /// Number of `build_glyph` calls.
    pub(crate) builds: usize,
    /// `(font tag, glyph)` for every rendered glyph.
    pub(crate) rendered: Vec<(usize, u32)>,
    /// Number of `pixel_height_scale` calls.
    pub(crate) scale_queries: Cell<usize>,
}

impl BoxEngine {
    fn char_of(font: &BoxFont, glyph: u32) -> Option<u8> {
        let index = usize::try_from(glyph).ok()?.checked_sub(1)?;
        font.chars.get(index).copied()
    }
}

impl FontEngine for BoxEngine {
    type Font = BoxFont;

    fn load_font(&mut self, data: &Blob<u8>) -> Option<BoxFont> {
        if data.data().is_empty() {
            return None;
        }
        let font = BoxFont {
            tag: self.loaded,
            chars: data.data().to_vec(),
        };
        self.loaded += 1;
        Some(font)
    }

    fn vertical_metrics(&self, _: &BoxFont) -> VerticalMetrics {
        VerticalMetrics {
            ascent: 768.0,
            descent: -256.0,
            line_gap: 0.0,
        }
    }

    fn pixel_height_scale(&self, _: &BoxFont, size: f32) -> f32 {
        self.scale_queries.set(self.scale_queries.get() + 1);
        size / UNITS_PER_EM
    }

    fn glyph_index(&self, font: &BoxFont, codepoint: u32) -> u32 {
        font.chars
            .iter()
            .position(|&c| u32::from(c) == codepoint)
            .and_then(|i| u32::try_from(i + 1).ok())
            .unwrap_or(0)
    }

    fn build_glyph(
        &mut self,
        _: &BoxFont,
        _: u32,
        size: f32,
        _: f32,
    ) -> Option<GlyphMetrics> {
        self.builds += 1;
        // Half an em wide, three quarters of an em tall, sitting on the
        // baseline one pixel right of the pen.
        let width = (size * 0.5) as i32;
        let height = (size * 0.75) as i32;
        Some(GlyphMetrics {
            advance: ADVANCE,
            lsb: 0,
            x0: 1,
            y0: -height,
            x1: 1 + width,
            y1: 0,
        })
    }

    fn render_glyph(
        &mut self,
        font: &BoxFont,
        glyph: u32,
        _: f32,
        mut target: BitmapMut<'_>,
        scratch: &mut ScratchArena,
    ) -> Result<(), ScratchFull> {
        if self.scratch_per_glyph > 0 {
            scratch.alloc(self.scratch_per_glyph)?;
        }
        for y in 0..target.height() {
            target.row_mut(y).fill(0xff);
        }
        self.rendered.push((font.tag, glyph));
        Ok(())
    }

    fn kern_advance(&self, font: &BoxFont, left: u32, right: u32) -> i32 {
        let (Some(left), Some(right)) = (Self::char_of(font, left), Self::char_of(font, right))
        else {
            return 0;
        };
        self.kerning
            .iter()
            .find(|&&(l, r, _)| (l, r) == (left, right))
            .map_or(0, |&(_, _, kern)| kern)
    }
}
