// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The renderer capability a [`Context`](crate::Context) flushes into.

use crate::error::RendererError;

/// Region of the atlas texture changed since the last upload.
///
/// Coordinates are in pixels, `max` edges exclusive. An empty rectangle has
/// its minimum past its maximum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct DirtyRect {
    /// Left edge.
    pub min_x: u16,
    /// Top edge.
    pub min_y: u16,
    /// Right edge, exclusive.
    pub max_x: u16,
    /// Bottom edge, exclusive.
    pub max_y: u16,
}

impl DirtyRect {
    /// The empty rectangle for a `width` x `height` texture.
    pub const fn empty(width: u16, height: u16) -> Self {
        Self {
            min_x: width,
            min_y: height,
            max_x: 0,
            max_y: 0,
        }
    }

    /// Whether no pixels are covered.
    pub const fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Grows the rectangle to cover `[x0, x1) x [y0, y1)`.
    pub fn include(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) {
        self.min_x = self.min_x.min(x0);
        self.min_y = self.min_y.min(y0);
        self.max_x = self.max_x.max(x1);
        self.max_y = self.max_y.max(y1);
    }
}

/// Read-only view of the single channel atlas texture.
#[derive(Copy, Clone, Debug)]
pub struct TextureData<'a> {
    /// Coverage values, `width` bytes per row.
    pub pixels: &'a [u8],
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

/// Receives atlas uploads and vertex batches.
///
/// Everything except [`update`](Self::update) and [`draw`](Self::draw) has a
/// default that does nothing.
pub trait Renderer {
    /// Allocates the atlas texture.
    fn create(&mut self, width: u16, height: u16) -> Result<(), RendererError> {
        let _ = (width, height);
        Ok(())
    }

    /// Reallocates the atlas texture with a new size.
    ///
    /// The context re-uploads the contents through [`update`](Self::update).
    fn resize(&mut self, width: u16, height: u16) -> Result<(), RendererError> {
        let _ = (width, height);
        Ok(())
    }

    /// Uploads the `dirty` part of `texture`.
    fn update(&mut self, dirty: DirtyRect, texture: TextureData<'_>);

    /// Draws triangles.
    ///
    /// The three slices have the same length, a multiple of three. Colours are
    /// packed RGBA with red in the lowest byte.
    fn draw(&mut self, positions: &[[f32; 2]], texcoords: &[[f32; 2]], colors: &[u32]);

    /// Releases the atlas texture. Called when the context is dropped.
    fn delete(&mut self) {}
}

/// Discards everything, for measuring without a graphics backend.
impl Renderer for () {
    fn update(&mut self, _: DirtyRect, _: TextureData<'_>) {}

    fn draw(&mut self, _: &[[f32; 2]], _: &[[f32; 2]], _: &[u32]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_rect_union() {
        let mut rect = DirtyRect::empty(64, 64);
        assert!(rect.is_empty());
        rect.include(10, 4, 12, 9);
        rect.include(2, 6, 5, 20);
        assert!(!rect.is_empty());
        assert_eq!(
            rect,
            DirtyRect {
                min_x: 2,
                min_y: 4,
                max_x: 12,
                max_y: 20
            }
        );
    }
}
