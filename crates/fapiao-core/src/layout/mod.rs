//! Line reconstruction from positioned page text.
//!
//! A page-text source reports fragments of text with their position on
//! the page, in no particular order. This module groups them into visual
//! lines and glues horizontally adjacent fragments back together.

mod merger;

pub use merger::{merge_text_items, LineMerger, DEFAULT_TOLERANCE};

use serde::{Deserialize, Serialize};

/// A fragment of text as positioned on a page.
///
/// Coordinates are in page space with `y` growing upward (PDF user space).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    /// Text content (a single glyph or a short run).
    pub text: String,
    /// Left edge.
    pub x: f64,
    /// Baseline position.
    pub y: f64,
    /// Advance width of the fragment.
    pub width: f64,
    /// Height of the fragment (usually the font size).
    pub height: f64,
}

impl PositionedToken {
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge of the fragment.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// One or more tokens merged because they touch on the same line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Concatenated token texts in increasing-x order.
    pub text: String,
    /// Left edge of the first merged token.
    pub x: f64,
    /// Raw `y` of the first merged token.
    pub y: f64,
    /// Distance from `x` to the right edge of the last merged token.
    pub width: f64,
    /// Tallest merged token.
    pub height: f64,
}

impl TextBlock {
    pub(crate) fn start(token: &PositionedToken) -> Self {
        Self {
            text: token.text.clone(),
            x: token.x,
            y: token.y,
            width: token.width,
            height: token.height,
        }
    }

    /// Right edge of the block.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Horizontal gap between the block's right edge and a token.
    pub fn gap_to(&self, token: &PositionedToken) -> f64 {
        token.x - self.right()
    }

    pub(crate) fn absorb(&mut self, token: &PositionedToken) {
        self.text.push_str(&token.text);
        self.width = token.right() - self.x;
        self.height = self.height.max(token.height);
    }
}

/// All blocks that share one quantized `y` bucket, left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGroup {
    /// Quantized vertical position of the line (NaN for unplaceable tokens).
    pub y: f64,
    /// Blocks in ascending `x` order.
    pub blocks: Vec<TextBlock>,
}
