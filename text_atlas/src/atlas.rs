// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skyline rectangle packing.
//!
//! The atlas keeps the upper contour of everything packed so far as a list of
//! horizontal spans ("skyline nodes"). New rectangles are dropped onto the
//! contour at the position that keeps the resulting top edge lowest, which
//! approximates bottom-left packing without searching for an optimal layout.
//!
//! Based on the skyline bin packer described by Jukka Jylänki.

use alloc::vec::Vec;

/// Initial capacity reserved for skyline nodes.
const INIT_ATLAS_NODES: usize = 256;

/// One span of the skyline: `width` pixels starting at `x` are filled up to `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SkylineNode {
    /// Left edge of the span.
    pub x: u16,
    /// Height of the filled region under the span.
    pub y: u16,
    /// Width of the span.
    pub width: u16,
}

/// Skyline allocator over a `width` x `height` surface.
///
/// Nodes are sorted by `x`, contiguous, and cover `[0, width)` exactly.
#[derive(Clone, Debug)]
pub struct Atlas {
    width: u16,
    height: u16,
    nodes: Vec<SkylineNode>,
}

impl Atlas {
    /// Creates an empty atlas.
    pub fn new(width: u16, height: u16) -> Self {
        let mut nodes = Vec::with_capacity(INIT_ATLAS_NODES);
        nodes.push(SkylineNode {
            x: 0,
            y: 0,
            width,
        });
        Self {
            width,
            height,
            nodes,
        }
    }

    /// Width of the surface in pixels.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height of the surface in pixels.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The current skyline, ordered left to right.
    #[inline]
    pub fn nodes(&self) -> &[SkylineNode] {
        &self.nodes
    }

    /// Tallest point of the skyline, i.e. the bottom of the populated region.
    pub fn max_y(&self) -> u16 {
        self.nodes.iter().map(|n| n.y).max().unwrap_or(0)
    }

    /// Packs a `width` x `height` rectangle and returns its top-left corner.
    ///
    /// Returns `None` without changing the skyline if the rectangle doesn't fit
    /// anywhere or has zero area.
    pub fn add_rect(&mut self, width: u16, height: u16) -> Option<(u16, u16)> {
        if width == 0 || height == 0 {
            return None;
        }
        // (top edge, span width, node index, y)
        let mut best: Option<(u32, u16, usize, u16)> = None;

        for i in 0..self.nodes.len() {
            let Some(y) = self.rect_fits(i, width, height) else {
                continue;
            };
            let top = u32::from(y) + u32::from(height);
            let node_width = self.nodes[i].width;
            let better = match best {
                None => true,
                Some((best_top, best_width, ..)) => {
                    top < best_top || (top == best_top && node_width < best_width)
                }
            };
            if better {
                best = Some((top, node_width, i, y));
            }
        }

        let (_, _, index, y) = best?;
        let x = self.nodes[index].x;
        self.add_skyline_level(index, x, y, width, height);
        Some((x, y))
    }

    /// Grows the surface. Shrinking is not supported, smaller values are ignored.
    pub fn expand(&mut self, width: u16, height: u16) {
        if width > self.width {
            self.nodes.push(SkylineNode {
                x: self.width,
                y: 0,
                width: width - self.width,
            });
            self.width = width;
        }
        self.height = self.height.max(height);
    }

    /// Forgets every packed rectangle and resizes the surface.
    pub fn reset(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.nodes.clear();
        self.nodes.push(SkylineNode {
            x: 0,
            y: 0,
            width,
        });
    }

    /// Height a `width` x `height` rectangle would rest at when placed on node
    /// `index`, or `None` if it would leave the surface.
    fn rect_fits(&self, index: usize, width: u16, height: u16) -> Option<u16> {
        let x = u32::from(self.nodes[index].x);
        if x + u32::from(width) > u32::from(self.width) {
            return None;
        }
        let mut y = self.nodes[index].y;
        let mut space_left = i32::from(width);
        let mut i = index;
        while space_left > 0 {
            let node = self.nodes.get(i)?;
            y = y.max(node.y);
            if u32::from(y) + u32::from(height) > u32::from(self.height) {
                return None;
            }
            space_left -= i32::from(node.width);
            i += 1;
        }
        Some(y)
    }

    fn add_skyline_level(&mut self, index: usize, x: u16, y: u16, width: u16, height: u16) {
        self.nodes.insert(
            index,
            SkylineNode {
                x,
                y: y + height,
                width,
            },
        );

        // Clip or drop the spans now shadowed by the new one.
        let mut i = index + 1;
        while i < self.nodes.len() {
            let prev = self.nodes[i - 1];
            let prev_right = prev.x + prev.width;
            let node = &mut self.nodes[i];
            if node.x >= prev_right {
                break;
            }
            let shrink = prev_right - node.x;
            if node.width <= shrink {
                self.nodes.remove(i);
            } else {
                node.x += shrink;
                node.width -= shrink;
                break;
            }
        }

        // Merge neighbours of equal height.
        let mut i = 0;
        while i + 1 < self.nodes.len() {
            if self.nodes[i].y == self.nodes[i + 1].y {
                self.nodes[i].width += self.nodes[i + 1].width;
                self.nodes.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }
}
