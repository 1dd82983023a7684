// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exponential blur for softened glyph edges.
//!
//! A recursive one-pole filter run forwards and backwards over every row and
//! column approximates a Gaussian at a cost independent of the radius.
//! Based on "Exponential blur" by Jani Huhtanen, 2006.

#[cfg(feature = "libm")]
#[allow(unused_imports)]
use core_maths::CoreFloat;

/// Fractional bits of the filter coefficient.
const APREC: i32 = 16;
/// Fractional bits of the accumulated pixel value.
const ZPREC: i32 = 7;

/// Blurs a `width` x `height` single channel region in place.
///
/// `data` starts at the top-left pixel of the region and rows are `stride`
/// bytes apart. The outermost rows and columns are forced to zero. Radii below
/// one leave the region untouched.
pub fn blur(data: &mut [u8], width: usize, height: usize, stride: usize, radius: i32) {
    if radius < 1 || width == 0 || height == 0 {
        return;
    }
    debug_assert!(
        data.len() >= (height - 1) * stride + width,
        "blur region exceeds the buffer"
    );
    let alpha = coefficient(radius);
    for _ in 0..2 {
        blur_horizontal(data, width, height, stride, alpha);
        blur_vertical(data, width, height, stride, alpha);
    }
}

/// Picks the decay so that roughly 90% of the (infinite) kernel falls inside
/// the radius.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the coefficient is in [0, 1 << APREC)"
)]
fn coefficient(radius: i32) -> i32 {
    // 1 / sqrt(3)
    let sigma = radius as f32 * 0.57735;
    ((1 << APREC) as f32 * (1.0 - (-2.3 / (sigma + 1.0)).exp())) as i32
}

#[inline(always)]
#[expect(
    clippy::cast_possible_truncation,
    reason = "the accumulator stays within the 8-bit range after shifting"
)]
fn step(z: &mut i32, pixel: &mut u8, alpha: i32) {
    *z += (alpha * ((i32::from(*pixel) << ZPREC) - *z)) >> APREC;
    *pixel = (*z >> ZPREC) as u8;
}

fn blur_horizontal(data: &mut [u8], width: usize, height: usize, stride: usize, alpha: i32) {
    for y in 0..height {
        let row = &mut data[y * stride..y * stride + width];
        let mut z = 0;
        for pixel in &mut row[1..] {
            step(&mut z, pixel, alpha);
        }
        row[width - 1] = 0;
        z = 0;
        for pixel in row[..width - 1].iter_mut().rev() {
            step(&mut z, pixel, alpha);
        }
        row[0] = 0;
    }
}

fn blur_vertical(data: &mut [u8], width: usize, height: usize, stride: usize, alpha: i32) {
    for x in 0..width {
        let mut z = 0;
        for y in 1..height {
            step(&mut z, &mut data[y * stride + x], alpha);
        }
        data[(height - 1) * stride + x] = 0;
        z = 0;
        for y in (0..height - 1).rev() {
            step(&mut z, &mut data[y * stride + x], alpha);
        }
        data[x] = 0;
    }
}
