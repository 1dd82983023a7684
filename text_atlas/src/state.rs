// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text style and the bounded style stack.

use alloc::vec::Vec;

use crate::font::FontId;

/// Direction of the vertical axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    /// `y` grows downwards from the top-left corner.
    #[default]
    TopLeft,
    /// `y` grows upwards from the bottom-left corner.
    BottomLeft,
}

/// Horizontal alignment relative to the drawing position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    /// The text starts at `x`.
    #[default]
    Left,
    /// The text is centered on `x`.
    Center,
    /// The text ends at `x`.
    Right,
}

/// Vertical alignment relative to the drawing position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    /// `y` is the top of the line.
    Top,
    /// `y` is halfway between ascender and descender.
    Middle,
    /// `y` is the baseline.
    #[default]
    Baseline,
    /// `y` is the descender line.
    Bottom,
}

/// Horizontal and vertical alignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    /// Horizontal part.
    pub horizontal: HAlign,
    /// Vertical part.
    pub vertical: VAlign,
}

impl Alignment {
    /// Left aligned on the baseline.
    pub const LEFT_BASELINE: Self = Self::new(HAlign::Left, VAlign::Baseline);

    /// Creates an alignment from its two parts.
    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// One frame of the style stack.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font used for drawing and measuring.
    pub font: FontId,
    /// Alignment relative to the drawing position.
    pub align: Alignment,
    /// Font size in pixels.
    pub size: f32,
    /// Packed RGBA colour, see [`rgba`](crate::rgba).
    pub color: u32,
    /// Blur radius in pixels.
    pub blur: f32,
    /// Extra space between glyphs in pixels.
    pub spacing: f32,
}

impl TextStyle {
    /// Size in tenths of a pixel, the unit glyphs are cached in.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "sizes are truncated to tenths of a pixel"
    )]
    pub(crate) fn cache_size(&self) -> i16 {
        (self.size * 10.0) as i16
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "blur is cached in whole pixels"
    )]
    pub(crate) fn cache_blur(&self) -> i16 {
        self.blur as i16
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontId::new(0),
            align: Alignment::LEFT_BASELINE,
            size: 12.0,
            color: 0xffff_ffff,
            blur: 0.0,
            spacing: 0.0,
        }
    }
}

/// A push/pop failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum StackError {
    Overflow,
    Underflow,
}

/// Bounded stack of styles that always holds at least one frame.
#[derive(Clone, Debug)]
pub(crate) struct StateStack {
    states: Vec<TextStyle>,
    max_depth: usize,
}

impl StateStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        let mut states = Vec::with_capacity(max_depth);
        states.push(TextStyle::default());
        Self { states, max_depth }
    }

    pub(crate) fn depth(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn top(&self) -> &TextStyle {
        self.states.last().unwrap_or_else(|| unreachable!("style stack is never empty"))
    }

    pub(crate) fn top_mut(&mut self) -> &mut TextStyle {
        self.states
            .last_mut()
            .unwrap_or_else(|| unreachable!("style stack is never empty"))
    }

    /// Duplicates the top frame.
    pub(crate) fn push(&mut self) -> Result<(), StackError> {
        if self.states.len() >= self.max_depth {
            return Err(StackError::Overflow);
        }
        let top = *self.top();
        self.states.push(top);
        Ok(())
    }

    /// Drops the top frame, keeping the last one.
    pub(crate) fn pop(&mut self) -> Result<(), StackError> {
        if self.states.len() <= 1 {
            return Err(StackError::Underflow);
        }
        self.states.pop();
        Ok(())
    }

    /// Resets the top frame to the defaults.
    pub(crate) fn clear(&mut self) {
        *self.top_mut() = TextStyle::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_default_frame() {
        let stack = StateStack::new(20);
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.top(), TextStyle::default());
        assert_eq!(stack.top().size, 12.0);
        assert_eq!(stack.top().color, 0xffff_ffff);
        assert_eq!(stack.top().align, Alignment::LEFT_BASELINE);
    }

    #[test]
    fn push_copies_and_pop_restores() {
        let mut stack = StateStack::new(4);
        stack.top_mut().size = 30.0;
        stack.push().unwrap();
        assert_eq!(stack.top().size, 30.0);
        stack.top_mut().size = 8.0;
        stack.pop().unwrap();
        assert_eq!(stack.top().size, 30.0);
    }

    #[test]
    fn bounded_both_ways() {
        let mut stack = StateStack::new(3);
        assert_eq!(stack.push(), Ok(()));
        assert_eq!(stack.push(), Ok(()));
        assert_eq!(stack.push(), Err(StackError::Overflow));
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.pop(), Ok(()));
        assert_eq!(stack.pop(), Ok(()));
        assert_eq!(stack.pop(), Err(StackError::Underflow));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn clear_only_touches_top() {
        let mut stack = StateStack::new(4);
        stack.top_mut().blur = 3.0;
        stack.push().unwrap();
        stack.top_mut().spacing = 2.0;
        stack.clear();
        assert_eq!(*stack.top(), TextStyle::default());
        stack.pop().unwrap();
        assert_eq!(stack.top().blur, 3.0);
    }

    #[test]
    fn cache_units_truncate() {
        let style = TextStyle {
            size: 20.57,
            blur: 2.9,
            ..TextStyle::default()
        };
        assert_eq!(style.cache_size(), 205);
        assert_eq!(style.cache_blur(), 2);
    }
}
