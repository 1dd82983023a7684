// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph cache: per-font hashed glyph records backed by the shared atlas.

use alloc::vec::Vec;

use crate::blur::blur;
use crate::error::{Error, ErrorKind};
use crate::font::{BitmapMut, FontEngine, FontId};
use crate::renderer::Renderer;
use crate::Context;

/// Number of buckets in each font's glyph lookup table. Must be a power of two.
pub const HASH_LUT_SIZE: usize = 256;

/// Smallest cached size, in tenths of a pixel.
pub const MIN_GLYPH_SIZE: i16 = 2;

/// Largest blur radius; bigger requests are clamped.
pub const MAX_BLUR: i16 = 20;

/// A rasterized glyph living in the atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Glyph {
    pub(crate) codepoint: u32,
    /// Engine glyph index in [`Glyph::font`].
    pub(crate) index: u32,
    /// The font that rendered the glyph, which is a fallback when the
    /// requesting font lacks the codepoint.
    pub(crate) font: FontId,
    /// Size in tenths of a pixel.
    pub(crate) size: i16,
    pub(crate) blur: i16,
    /// Atlas rectangle including padding.
    pub(crate) x0: u16,
    pub(crate) y0: u16,
    pub(crate) x1: u16,
    pub(crate) y1: u16,
    /// Advance in tenths of a pixel.
    pub(crate) xadv: i16,
    /// Offset from the pen to the top-left of the atlas rectangle.
    pub(crate) xoff: i16,
    pub(crate) yoff: i16,
    next: Option<u32>,
}

/// Thomas Wang style integer hash.
pub(crate) fn hash_int(mut a: u32) -> u32 {
    a = a.wrapping_add(!(a << 15));
    a ^= a >> 10;
    a = a.wrapping_add(a << 3);
    a ^= a >> 6;
    a = a.wrapping_add(!(a << 11));
    a ^= a >> 16;
    a
}

#[inline]
fn bucket(codepoint: u32) -> usize {
    hash_int(codepoint) as usize & (HASH_LUT_SIZE - 1)
}

/// Glyph records of one font with chained hash lookup.
///
/// Chains link records through their `next` index; new records are put at
/// the head of their bucket.
#[derive(Clone, Debug)]
pub(crate) struct GlyphTable {
    glyphs: Vec<Glyph>,
    lut: [Option<u32>; HASH_LUT_SIZE],
}

impl GlyphTable {
    pub(crate) fn new() -> Self {
        Self {
            glyphs: Vec::new(),
            lut: [None; HASH_LUT_SIZE],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub(crate) fn find(&self, codepoint: u32, size: i16, blur: i16) -> Option<&Glyph> {
        let mut cursor = self.lut[bucket(codepoint)];
        while let Some(i) = cursor {
            let glyph = &self.glyphs[i as usize];
            if glyph.codepoint == codepoint && glyph.size == size && glyph.blur == blur {
                return Some(glyph);
            }
            cursor = glyph.next;
        }
        None
    }

    pub(crate) fn insert(&mut self, mut glyph: Glyph) -> Glyph {
        let h = bucket(glyph.codepoint);
        glyph.next = self.lut[h];
        #[expect(
            clippy::cast_possible_truncation,
            reason = "glyph counts are bounded by the atlas area"
        )]
        let index = self.glyphs.len() as u32;
        self.lut[h] = Some(index);
        self.glyphs.push(glyph);
        glyph
    }

    pub(crate) fn clear(&mut self) {
        self.glyphs.clear();
        self.lut = [None; HASH_LUT_SIZE];
    }
}

impl<E: FontEngine, R: Renderer> Context<E, R> {
    /// Looks up or builds the glyph for `codepoint` in `font`.
    ///
    /// `size` is in tenths of a pixel. Returns `None` when the glyph can't be
    /// cached: size too small, unknown font, engine failure, or no room left
    /// in the atlas or the scratch arena.
    pub(crate) fn get_glyph(
        &mut self,
        font: FontId,
        codepoint: u32,
        size: i16,
        blur_radius: i16,
    ) -> Option<Glyph> {
        if size < MIN_GLYPH_SIZE {
            return None;
        }
        let blur_radius = blur_radius.clamp(0, MAX_BLUR);
        let pad = blur_radius + 2;

        self.scratch.reset();

        let requested = self.fonts.get(font.index())?;
        if let Some(glyph) = requested.glyphs.find(codepoint, size, blur_radius) {
            return Some(*glyph);
        }

        let mut render_font = font;
        let mut index = self.engine.glyph_index(&requested.handle, codepoint);
        if index == 0 {
            for &fallback in &requested.fallbacks {
                let Some(candidate) = self.fonts.get(fallback.index()) else {
                    continue;
                };
                let fallback_index = self.engine.glyph_index(&candidate.handle, codepoint);
                if fallback_index != 0 {
                    index = fallback_index;
                    render_font = fallback;
                    break;
                }
            }
            // Still missing: the engine's notdef glyph is cached like any other.
        }
        log::debug!(
            "glyph cache miss: U+{codepoint:04X} size {size} blur {blur_radius} in font {}",
            render_font.to_u32()
        );

        let px_size = f32::from(size) / 10.0;
        let handle = &self.fonts[render_font.index()].handle;
        let scale = self.engine.pixel_height_scale(handle, px_size);
        let metrics = self.engine.build_glyph(handle, index, px_size, scale)?;

        let gw = u16::try_from(metrics.width() + i32::from(pad) * 2).ok()?;
        let gh = u16::try_from(metrics.height() + i32::from(pad) * 2).ok()?;

        let (gx, gy) = match self.atlas.add_rect(gw, gh) {
            Some(pos) => pos,
            None => self.retry_after_atlas_full(gw, gh)?,
        };

        let stride = usize::from(self.atlas.width());
        let pad_px = pad as usize;
        let (x0, y0) = (usize::from(gx), usize::from(gy));
        let (w, h) = (usize::from(gw), usize::from(gh));

        let offset = (x0 + pad_px) + (y0 + pad_px) * stride;
        let target = BitmapMut::new(
            &mut self.texture[offset..],
            w - pad_px * 2,
            h - pad_px * 2,
            stride,
        )?;
        let rendered = self.engine.render_glyph(
            &self.fonts[render_font.index()].handle,
            index,
            scale,
            target,
            &mut self.scratch,
        );
        if let Err(full) = rendered {
            for row in 0..h {
                let start = x0 + (y0 + row) * stride;
                self.texture[start..start + w].fill(0);
            }
            log::warn!(
                "scratch memory exhausted building U+{codepoint:04X}: {} of {} bytes needed",
                full.needed,
                self.scratch.capacity()
            );
            self.signal(&Error::scratch_full(full.needed));
            return None;
        }

        // One pixel empty border.
        let origin = x0 + y0 * stride;
        for row in 0..h {
            self.texture[origin + row * stride] = 0;
            self.texture[origin + row * stride + w - 1] = 0;
        }
        self.texture[origin..origin + w].fill(0);
        let last = origin + (h - 1) * stride;
        self.texture[last..last + w].fill(0);

        if blur_radius > 0 {
            blur(
                &mut self.texture[origin..],
                w,
                h,
                stride,
                i32::from(blur_radius),
            );
        }

        self.dirty.include(gx, gy, gx + gw, gy + gh);

        #[expect(
            clippy::cast_possible_truncation,
            reason = "fixed-point advance and offsets are stored in 16 bits"
        )]
        let glyph = Glyph {
            codepoint,
            index,
            font: render_font,
            size,
            blur: blur_radius,
            x0: gx,
            y0: gy,
            x1: gx + gw,
            y1: gy + gh,
            xadv: (scale * metrics.advance as f32 * 10.0) as i16,
            xoff: (metrics.x0 - i32::from(pad)) as i16,
            yoff: (metrics.y0 - i32::from(pad)) as i16,
            next: None,
        };
        Some(self.fonts[font.index()].glyphs.insert(glyph))
    }

    /// Reports a full atlas and retries once if the callback changed it.
    fn retry_after_atlas_full(&mut self, width: u16, height: u16) -> Option<(u16, u16)> {
        log::warn!(
            "glyph atlas {}x{} is full, no room for {width}x{height}",
            self.atlas.width(),
            self.atlas.height()
        );
        if self.on_error.is_none() {
            return None;
        }
        let action = self.signal(&Error::new(ErrorKind::AtlasFull));
        self.apply_error_action(action);
        self.atlas.add_rect(width, height)
    }
}
