// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning strings into positioned glyph quads.

use core::ops::Range;

use crate::batch::Quad;
use crate::font::{Font, FontEngine, FontId};
use crate::glyph::Glyph;
use crate::renderer::Renderer;
use crate::state::{HAlign, Origin, VAlign};
use crate::utf8::{Utf8Decoder, Utf8Step};
use crate::Context;

/// Axis aligned box in drawing coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f32,
    /// Top edge (bottom edge with [`Origin::BottomLeft`]).
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge (top edge with [`Origin::BottomLeft`]).
    pub max_y: f32,
}

impl Bounds {
    fn point(x: f32, y: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }
}

/// Vertical metrics of the active font at the active size, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LineMetrics {
    /// Height above the baseline.
    pub ascender: f32,
    /// Signed distance from the baseline to the descender line, usually
    /// negative.
    pub descender: f32,
    /// Distance between consecutive baselines.
    pub line_height: f32,
}

/// One step of a [`TextIter`].
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphQuad {
    /// The decoded codepoint.
    pub codepoint: u32,
    /// Pen position before the glyph.
    pub x: f32,
    /// Pen position before the glyph.
    pub y: f32,
    /// Pen position after the glyph.
    pub next_x: f32,
    /// Pen position after the glyph.
    pub next_y: f32,
    /// Bytes consumed by this step, including skipped invalid bytes.
    pub range: Range<usize>,
    /// The glyph to draw, `None` if no glyph could be produced.
    pub quad: Option<Quad>,
}

/// Restartable position in a string being laid out.
///
/// Created by [`Context::text_iter`] and advanced by [`Context::next_quad`].
/// Cloning an iterator saves its position.
#[derive(Clone, Debug)]
pub struct TextIter<'a> {
    text: &'a [u8],
    pos: usize,
    font: FontId,
    size: i16,
    blur: i16,
    spacing: f32,
    x: f32,
    y: f32,
    decoder: Utf8Decoder,
    prev_glyph: Option<u32>,
    /// Pixel scale of the font that rendered the last kerned glyph.
    kern_scale: Option<(FontId, f32)>,
}

impl TextIter<'_> {
    /// Current pen position.
    pub fn pen(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Byte offset of the next step.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Iterator over the quads of a string, see [`Context::quads`].
#[derive(Debug)]
pub struct Quads<'c, 'a, E: FontEngine, R: Renderer> {
    cx: &'c mut Context<E, R>,
    iter: Option<TextIter<'a>>,
}

impl<E: FontEngine, R: Renderer> Iterator for Quads<'_, '_, E, R> {
    type Item = GlyphQuad;

    fn next(&mut self) -> Option<GlyphQuad> {
        let iter = self.iter.as_mut()?;
        self.cx.next_quad(iter)
    }
}

fn vertical_offset<F>(font: &Font<F>, origin: Origin, align: VAlign, size: i16) -> f32 {
    let px = f32::from(size) / 10.0;
    let offset = match align {
        VAlign::Top => font.ascender * px,
        VAlign::Middle => (font.ascender + font.descender) / 2.0 * px,
        VAlign::Baseline => 0.0,
        VAlign::Bottom => font.descender * px,
    };
    match origin {
        Origin::TopLeft => offset,
        Origin::BottomLeft => -offset,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "positions are snapped to whole pixels"
)]
#[inline]
fn snap(v: f32) -> f32 {
    v as i32 as f32
}

impl<E: FontEngine, R: Renderer> Context<E, R> {
    /// Starts laying out `text` at `(x, y)` with the active style.
    ///
    /// Returns `None` if the active font isn't registered.
    pub fn text_iter<'a, T: AsRef<[u8]> + ?Sized>(
        &mut self,
        x: f32,
        y: f32,
        text: &'a T,
    ) -> Option<TextIter<'a>> {
        self.begin_layout(x, y, text.as_ref(), true)
    }

    /// Lays out the next codepoint of `iter`.
    ///
    /// Returns `None` once the text is exhausted.
    pub fn next_quad(&mut self, iter: &mut TextIter<'_>) -> Option<GlyphQuad> {
        let start = iter.pos;
        let mut codepoint = None;
        while let Some(&byte) = iter.text.get(iter.pos) {
            iter.pos += 1;
            if let Utf8Step::Codepoint(cp) = iter.decoder.next(byte) {
                codepoint = Some(cp);
                break;
            }
        }
        let codepoint = codepoint?;

        let (x, y) = (iter.x, iter.y);
        let glyph = self.get_glyph(iter.font, codepoint, iter.size, iter.blur);
        let prev_glyph = iter.prev_glyph;
        let quad = glyph.map(|glyph| {
            let kern = prev_glyph.map(|prev| (prev, self.kern_scale(iter, &glyph)));
            self.glyph_quad(kern, &glyph, iter.spacing, &mut iter.x, iter.y)
        });
        iter.prev_glyph = glyph.map(|g| g.index);

        Some(GlyphQuad {
            codepoint,
            x,
            y,
            next_x: iter.x,
            next_y: iter.y,
            range: start..iter.pos,
            quad,
        })
    }

    /// Iterates over the glyph quads of `text` drawn at `(x, y)`.
    ///
    /// Yields nothing if the active font isn't registered.
    pub fn quads<'c, 'a, T: AsRef<[u8]> + ?Sized>(
        &'c mut self,
        x: f32,
        y: f32,
        text: &'a T,
    ) -> Quads<'c, 'a, E, R> {
        let iter = self.text_iter(x, y, text);
        Quads { cx: self, iter }
    }

    /// Draws `text` at `(x, y)` with the active style and flushes.
    ///
    /// Returns the pen position after the last glyph.
    pub fn draw_text(&mut self, x: f32, y: f32, text: impl AsRef<[u8]>) -> f32 {
        let text = text.as_ref();
        let Some(mut iter) = self.text_iter(x, y, text) else {
            return x;
        };
        let color = self.states.top().color;
        while let Some(step) = self.next_quad(&mut iter) {
            let Some(quad) = step.quad else {
                continue;
            };
            if !self.batch.has_room(6) {
                self.flush();
            }
            self.batch.push_quad(&quad, color);
        }
        self.flush();
        iter.x
    }

    /// Measures `text` as if drawn at `(x, y)`.
    ///
    /// Returns the horizontal advance and the box covering every glyph quad.
    /// Empty text, or an unregistered active font, gives zero advance and a
    /// degenerate box.
    pub fn measure_text(&mut self, x: f32, y: f32, text: impl AsRef<[u8]>) -> (f32, Bounds) {
        let Some(mut iter) = self.begin_layout(x, y, text.as_ref(), false) else {
            return (0.0, Bounds::point(x, y));
        };
        let (_, y) = iter.pen();
        let mut bounds = Bounds::point(x, y);
        let origin = self.config.origin;
        while let Some(step) = self.next_quad(&mut iter) {
            let Some(q) = step.quad else {
                continue;
            };
            bounds.min_x = bounds.min_x.min(q.x0);
            bounds.max_x = bounds.max_x.max(q.x1);
            let (top, bottom) = match origin {
                Origin::TopLeft => (q.y0, q.y1),
                Origin::BottomLeft => (q.y1, q.y0),
            };
            bounds.min_y = bounds.min_y.min(top);
            bounds.max_y = bounds.max_y.max(bottom);
        }
        let advance = iter.x - x;

        let shift = match self.states.top().align.horizontal {
            HAlign::Left => 0.0,
            HAlign::Center => advance * 0.5,
            HAlign::Right => advance,
        };
        bounds.min_x -= shift;
        bounds.max_x -= shift;
        (advance, bounds)
    }

    /// Ascender, descender and line height of the active font at the active
    /// size.
    pub fn vertical_metrics(&self) -> Option<LineMetrics> {
        let style = self.states.top();
        let font = self.fonts.get(style.font.index())?;
        let px = f32::from(style.cache_size()) / 10.0;
        Some(LineMetrics {
            ascender: font.ascender * px,
            descender: font.descender * px,
            line_height: font.line_height * px,
        })
    }

    /// Vertical extent of a line of text drawn at `y`, as `(min_y, max_y)`.
    pub fn line_bounds(&self, y: f32) -> Option<(f32, f32)> {
        let style = self.states.top();
        let font = self.fonts.get(style.font.index())?;
        let size = style.cache_size();
        let px = f32::from(size) / 10.0;
        let y = y + vertical_offset(font, self.config.origin, style.align.vertical, size);
        Some(match self.config.origin {
            Origin::TopLeft => {
                let min_y = y - font.ascender * px;
                (min_y, min_y + font.line_height * px)
            }
            Origin::BottomLeft => {
                let max_y = y + font.descender * px;
                (max_y - font.line_height * px, max_y)
            }
        })
    }

    fn begin_layout<'a>(
        &mut self,
        mut x: f32,
        mut y: f32,
        text: &'a [u8],
        align_horizontally: bool,
    ) -> Option<TextIter<'a>> {
        let style = *self.states.top();
        if style.font.index() >= self.fonts.len() {
            return None;
        }
        let size = style.cache_size();

        if align_horizontally {
            match style.align.horizontal {
                HAlign::Left => {}
                HAlign::Center => x -= self.measure_text(x, y, text).0 * 0.5,
                HAlign::Right => x -= self.measure_text(x, y, text).0,
            }
        }
        let font = &self.fonts[style.font.index()];
        y += vertical_offset(font, self.config.origin, style.align.vertical, size);

        Some(TextIter {
            text,
            pos: 0,
            font: style.font,
            size,
            blur: style.cache_blur(),
            spacing: style.spacing,
            x,
            y,
            decoder: Utf8Decoder::new(),
            prev_glyph: None,
            kern_scale: None,
        })
    }

    /// Pixel scale for kerning `glyph`, queried once per run of one font.
    ///
    /// Every glyph of an iterator has the iterator's size, so the font alone
    /// keys the cached value.
    fn kern_scale(&self, iter: &mut TextIter<'_>, glyph: &Glyph) -> f32 {
        if let Some((font, scale)) = iter.kern_scale {
            if font == glyph.font {
                return scale;
            }
        }
        let handle = &self.fonts[glyph.font.index()].handle;
        let scale = self
            .engine
            .pixel_height_scale(handle, f32::from(glyph.size) / 10.0);
        iter.kern_scale = Some((glyph.font, scale));
        scale
    }

    /// Positions `glyph` at the pen and advances it.
    ///
    /// `kern` is the previous glyph index with the pixel scale of the font
    /// that rendered `glyph`, where kerning is looked up.
    fn glyph_quad(
        &self,
        kern: Option<(u32, f32)>,
        glyph: &Glyph,
        spacing: f32,
        x: &mut f32,
        y: f32,
    ) -> Quad {
        if let Some((prev, scale)) = kern {
            let handle = &self.fonts[glyph.font.index()].handle;
            let kern = self.engine.kern_advance(handle, prev, glyph.index) as f32 * scale;
            *x += snap(kern + spacing + 0.5);
        }

        // The atlas rect has a two pixel border: one to keep neighbours from
        // bleeding in and one for interpolation. Sample one pixel inside it.
        let xoff = f32::from(glyph.xoff + 1);
        let yoff = f32::from(glyph.yoff + 1);
        let x0 = f32::from(glyph.x0 + 1);
        let y0 = f32::from(glyph.y0 + 1);
        let x1 = f32::from(glyph.x1 - 1);
        let y1 = f32::from(glyph.y1 - 1);

        let itw = 1.0 / f32::from(self.atlas.width());
        let ith = 1.0 / f32::from(self.atlas.height());

        let rx = snap(*x + xoff);
        let (ry, qy1) = match self.config.origin {
            Origin::TopLeft => {
                let ry = snap(y + yoff);
                (ry, ry + y1 - y0)
            }
            Origin::BottomLeft => {
                let ry = snap(y - yoff);
                (ry, ry - y1 + y0)
            }
        };

        *x += snap(f32::from(glyph.xadv) / 10.0 + 0.5);

        Quad {
            x0: rx,
            y0: ry,
            s0: x0 * itw,
            t0: y0 * ith,
            x1: rx + x1 - x0,
            y1: qy1,
            s1: x1 * itw,
            t1: y1 * ith,
        }
    }
}
