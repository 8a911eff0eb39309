//! Text services consumed by the layout engine.
//!
//! Shaping, font fallback and line-break discovery are collaborators the
//! engine calls through traits, so an embedder can plug in a real shaping
//! stack.  Small deterministic implementations ship here:
//! - [`FixedMetricsShaper`]: monospace advances from the font size
//! - [`SingleTypeface`] and [`CoverageFallback`]: font fallback
//! - [`UnicodeLineBreaker`]: UAX #14 via `unicode-linebreak`
//! - [`grapheme_boundaries`]: caret stops via `unicode-segmentation`

mod fallback;
mod fixed;
mod grapheme;
mod linebreak;

use std::sync::Arc;

use crate::core::types::{Direction, Point};
use crate::layout::style::Style;

pub use fallback::{CoverageFallback, SingleTypeface};
pub use fixed::FixedMetricsShaper;
pub use grapheme::grapheme_boundaries;
pub use linebreak::{is_hard_break, is_space, UnicodeLineBreaker};

/// A concrete font face request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Typeface {
    pub family: Arc<str>,
    pub weight: u16,
    pub italic: bool,
}

impl Typeface {
    pub fn new(family: &str) -> Self {
        Self {
            family: Arc::from(family),
            weight: 400,
            italic: false,
        }
    }

    /// The face a style asks for, before any fallback.
    pub fn for_style(style: &Style) -> Self {
        Self {
            family: style.font_family.clone(),
            weight: style.weight,
            italic: style.italic,
        }
    }
}

/// Output of one shaping call.
///
/// Glyphs are in visual (left-to-right) order.  Positions are relative to
/// the left edge of the shaped text, on a baseline at y = 0.  `clusters`
/// holds the absolute code point index of each glyph; it is non-decreasing
/// for LTR text and non-increasing for RTL text.  `code_point_x` has one
/// entry per code point: the x of its leading edge (left edge for LTR,
/// right edge for RTL).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedText {
    pub glyph_ids: Vec<u16>,
    pub glyph_positions: Vec<Point>,
    pub clusters: Vec<usize>,
    pub code_point_x: Vec<f32>,
    pub ascent: f32,
    pub descent: f32,
    pub width: f32,
}

/// Glyph shaping.
pub trait Shaper {
    /// Shape `code_points` (one direction, one typeface).  `start_offset`
    /// is the absolute index of `code_points[0]` and is added to clusters.
    fn shape(
        &mut self,
        code_points: &[char],
        style: &Style,
        typeface: &Typeface,
        direction: Direction,
        start_offset: usize,
    ) -> ShapedText;
}

/// A sub-range served by one typeface, relative to the slice passed to
/// [`FontFallback::font_runs`].
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRun {
    pub start: usize,
    pub length: usize,
    pub typeface: Typeface,
}

/// Font fallback.  The returned runs cover the input without gaps.
pub trait FontFallback {
    fn font_runs(&mut self, code_points: &[char], style: &Style) -> Vec<FallbackRun>;
}

/// A line break candidate.
///
/// `wrap` is where the next line starts; `measure` is where the current
/// line's visible content ends (before trailing whitespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBreak {
    pub measure: usize,
    pub wrap: usize,
    pub required: bool,
}

/// Line break discovery.  Candidates are returned in increasing order and
/// the end of the text is always the last candidate.
pub trait LineBreaker {
    fn breaks(&mut self, code_points: &[char]) -> Vec<LineBreak>;
}
