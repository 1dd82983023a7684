// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional `bytemuck` trait impls.

#![allow(
    unsafe_code,
    reason = "The `bytemuck` marker traits are `unsafe` and require `unsafe impl`."
)]

use crate::{DirtyRect, Quad};
use bytemuck::{Pod, Zeroable};

// Safety: The struct is `repr(C)` with eight `f32` fields and no padding.
unsafe impl Zeroable for Quad {}

// Safety: Every bit pattern is a valid `f32`.
unsafe impl Pod for Quad {}

// Safety: The struct is `repr(C)` with four `u16` fields and no padding.
unsafe impl Zeroable for DirtyRect {}

// Safety: Every bit pattern is a valid `u16`.
unsafe impl Pod for DirtyRect {}
