// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quads and the fixed-capacity vertex batch.

use alloc::vec::Vec;

/// Screen rectangle of a glyph with its atlas texture coordinates.
///
/// `(x0, y0)` pairs with `(s0, t0)` and `(x1, y1)` with `(s1, t1)`. With a
/// bottom-left origin `y1` is below `y0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Quad {
    /// Left edge.
    pub x0: f32,
    /// First vertical edge.
    pub y0: f32,
    /// Texture coordinate of the left edge.
    pub s0: f32,
    /// Texture coordinate of the first vertical edge.
    pub t0: f32,
    /// Right edge.
    pub x1: f32,
    /// Second vertical edge.
    pub y1: f32,
    /// Texture coordinate of the right edge.
    pub s1: f32,
    /// Texture coordinate of the second vertical edge.
    pub t1: f32,
}

/// Triangle vertices waiting to be drawn.
#[derive(Clone, Debug)]
pub(crate) struct VertexBatch {
    positions: Vec<[f32; 2]>,
    texcoords: Vec<[f32; 2]>,
    colors: Vec<u32>,
    capacity: usize,
}

impl VertexBatch {
    /// Creates a batch for `capacity` vertices, rounded down to whole quads
    /// (six vertices each) with room for at least one.
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = (capacity - capacity % 6).max(6);
        Self {
            positions: Vec::with_capacity(capacity),
            texcoords: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.colors.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `count` more vertices fit.
    pub(crate) fn has_room(&self, count: usize) -> bool {
        self.len() + count <= self.capacity
    }

    pub(crate) fn push_vertex(&mut self, x: f32, y: f32, s: f32, t: f32, color: u32) {
        debug_assert!(self.has_room(1), "vertex batch overflow");
        self.positions.push([x, y]);
        self.texcoords.push([s, t]);
        self.colors.push(color);
    }

    /// Appends the two triangles of `q`.
    pub(crate) fn push_quad(&mut self, q: &Quad, color: u32) {
        self.push_vertex(q.x0, q.y0, q.s0, q.t0, color);
        self.push_vertex(q.x1, q.y1, q.s1, q.t1, color);
        self.push_vertex(q.x1, q.y0, q.s1, q.t0, color);

        self.push_vertex(q.x0, q.y0, q.s0, q.t0, color);
        self.push_vertex(q.x0, q.y1, q.s0, q.t1, color);
        self.push_vertex(q.x1, q.y1, q.s1, q.t1, color);
    }

    pub(crate) fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    pub(crate) fn texcoords(&self) -> &[[f32; 2]] {
        &self.texcoords
    }

    pub(crate) fn colors(&self) -> &[u32] {
        &self.colors
    }

    pub(crate) fn clear(&mut self) {
        self.positions.clear();
        self.texcoords.clear();
        self.colors.clear();
    }
}
