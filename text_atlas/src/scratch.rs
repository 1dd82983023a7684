// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size bump allocator for transient rasterization memory.

use alloc::vec;
use alloc::vec::Vec;

/// Allocation granularity, in bytes.
const ALIGN: usize = 16;

/// A scratch request that did not fit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScratchFull {
    /// Bytes that would have been in use had the request succeeded.
    pub needed: usize,
}

/// Bump allocator over a buffer allocated once at context creation.
///
/// Individual allocations are never freed; the whole arena is rewound with
/// [`ScratchArena::reset`] before each glyph is built.
#[derive(Clone, Debug)]
pub struct ScratchArena {
    buf: Vec<u8>,
    used: usize,
}

impl ScratchArena {
    /// Creates an arena holding `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            used: 0,
        }
    }

    /// Total size of the arena.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes handed out since the last reset, including rounding.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Rewinds the arena, invalidating every previous allocation.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Hands out `size` zeroed bytes.
    ///
    /// Sizes are rounded up to a multiple of 16 so consecutive allocations
    /// keep the same alignment relative to the buffer start.
    pub fn alloc(&mut self, size: usize) -> Result<&mut [u8], ScratchFull> {
        let rounded = size.div_ceil(ALIGN) * ALIGN;
        let needed = self.used.saturating_add(rounded);
        if needed > self.buf.len() {
            return Err(ScratchFull { needed });
        }
        let block = &mut self.buf[self.used..self.used + size];
        block.fill(0);
        self.used = needed;
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_rounded() {
        let mut arena = ScratchArena::new(64);
        assert_eq!(arena.alloc(1).map(|b| b.len()), Ok(1));
        assert_eq!(arena.used(), 16);
        assert_eq!(arena.alloc(17).map(|b| b.len()), Ok(17));
        assert_eq!(arena.used(), 48);
    }

    #[test]
    fn exhaustion_reports_bytes_needed() {
        let mut arena = ScratchArena::new(64);
        arena.alloc(40).unwrap();
        assert_eq!(arena.alloc(20), Err(ScratchFull { needed: 48 + 32 }));
        // A failed request doesn't consume anything.
        assert_eq!(arena.used(), 48);
        assert!(arena.alloc(16).is_ok());
    }

    #[test]
    fn reset_reuses_memory() {
        let mut arena = ScratchArena::new(32);
        arena.alloc(32).unwrap().fill(0xaa);
        assert!(arena.alloc(1).is_err());
        arena.reset();
        let block = arena.alloc(32).unwrap();
        assert!(block.iter().all(|&b| b == 0), "blocks are handed out zeroed");
    }
}
