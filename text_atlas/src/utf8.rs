// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental UTF-8 decoding.
//!
//! This is the table driven automaton described by Bjoern Hoehrmann
//! (<http://bjoern.hoehrmann.de/utf-8/decoder/dfa/>). It consumes one byte at a
//! time and never allocates.
//!
//! The raw automaton stays in [`UTF8_REJECT`] once it gets there. [`Utf8Decoder`]
//! restarts it after every rejection, so callers can keep feeding bytes. A
//! byte that cuts a multi-byte sequence short is decoded again on its own, so
//! `b"\xc3A"` still yields `A`.

/// State value signalling that a complete codepoint is available.
pub const UTF8_ACCEPT: u32 = 0;

/// State value signalling that the bytes seen so far are not valid UTF-8.
pub const UTF8_REJECT: u32 = 12;

#[rustfmt::skip]
static UTF8D: [u8; 364] = [
    // Byte to character class.
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1, 9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,
    7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7, 7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,
    8,8,2,2,2,2,2,2,2,2,2,2,2,2,2,2, 2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,
    10,3,3,3,3,3,3,3,3,3,3,3,3,4,3,3, 11,6,6,6,5,8,8,8,8,8,8,8,8,8,8,8,
    // State and character class to next state.
    0,12,24,36,60,96,84,12,12,12,48,72, 12,12,12,12,12,12,12,12,12,12,12,12,
    12, 0,12,12,12,12,12, 0,12, 0,12,12, 12,24,12,12,12,12,12,24,12,24,12,12,
    12,12,12,12,12,12,12,24,12,12,12,12, 12,24,12,12,12,12,12,12,12,24,12,12,
    12,12,12,12,12,12,12,36,12,36,12,12, 12,36,12,12,12,12,12,36,12,36,12,12,
    12,36,12,12,12,12,12,12,12,12,12,12,
];

/// Advances the decoder by a single byte and returns the new state.
///
/// `codepoint` accumulates the bits of the sequence in progress and holds the
/// decoded value whenever the returned state is [`UTF8_ACCEPT`].
#[inline]
pub fn decode_utf8(state: &mut u32, codepoint: &mut u32, byte: u8) -> u32 {
    let class = u32::from(UTF8D[usize::from(byte)]);
    *codepoint = if *state != UTF8_ACCEPT {
        (u32::from(byte) & 0x3f) | (*codepoint << 6)
    } else {
        (0xff >> class) & u32::from(byte)
    };
    *state = u32::from(UTF8D[256 + (*state + class) as usize]);
    *state
}

/// Outcome of feeding one byte to a [`Utf8Decoder`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Utf8Step {
    /// A full codepoint was decoded.
    Codepoint(u32),
    /// More continuation bytes are expected.
    Incomplete,
    /// The byte sequence is invalid and the byte can't start a new one.
    Invalid,
}

/// Restartable UTF-8 decoder state.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Utf8Decoder {
    state: u32,
    codepoint: u32,
}

impl Utf8Decoder {
    /// Creates a decoder in the accepting state.
    pub const fn new() -> Self {
        Self {
            state: UTF8_ACCEPT,
            codepoint: 0,
        }
    }

    /// Feeds a single byte.
    ///
    /// A byte that breaks off an unfinished sequence is decoded again as the
    /// start of a new one, so only the broken prefix is lost.
    #[inline]
    pub fn next(&mut self, byte: u8) -> Utf8Step {
        let was_inside = self.state != UTF8_ACCEPT;
        match self.step(byte) {
            Utf8Step::Invalid if was_inside => self.step(byte),
            step => step,
        }
    }

    fn step(&mut self, byte: u8) -> Utf8Step {
        match decode_utf8(&mut self.state, &mut self.codepoint, byte) {
            UTF8_ACCEPT => Utf8Step::Codepoint(self.codepoint),
            UTF8_REJECT => {
                // Rejection is not sticky for our callers.
                self.state = UTF8_ACCEPT;
                Utf8Step::Invalid
            }
            _ => Utf8Step::Incomplete,
        }
    }

    /// Returns the raw automaton state.
    pub fn state(&self) -> u32 {
        self.state
    }
}
