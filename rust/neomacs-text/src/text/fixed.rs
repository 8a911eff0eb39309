//! Monospace shaper with metrics derived from the font size.

use super::{ShapedText, Shaper, Typeface};
use crate::core::bidi::{bidi_class, BidiClass};
use crate::core::types::{Direction, Point};
use crate::layout::style::Style;

/// Ascent and descent as fractions of the font size.
const ASCENT_RATIO: f32 = 0.8;
const DESCENT_RATIO: f32 = 0.2;

/// One glyph per code point, every visible glyph `font_size *
/// advance_ratio` wide.  Marks, format controls and line terminators are
/// zero width.
#[derive(Debug, Clone)]
pub struct FixedMetricsShaper {
    advance_ratio: f32,
}

impl Default for FixedMetricsShaper {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl FixedMetricsShaper {
    pub fn new(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }

    pub fn advance(&self, ch: char, font_size: f32) -> f32 {
        if is_zero_width(ch) {
            0.0
        } else {
            font_size * self.advance_ratio
        }
    }
}

fn is_zero_width(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    ) || matches!(bidi_class(ch), BidiClass::NSM | BidiClass::BN)
}

fn glyph_id(ch: char) -> u16 {
    if is_zero_width(ch) {
        0
    } else {
        (ch as u32).min(u16::MAX as u32) as u16
    }
}

impl Shaper for FixedMetricsShaper {
    fn shape(
        &mut self,
        code_points: &[char],
        style: &Style,
        _typeface: &Typeface,
        direction: Direction,
        start_offset: usize,
    ) -> ShapedText {
        let n = code_points.len();
        let mut shaped = ShapedText {
            glyph_ids: Vec::with_capacity(n),
            glyph_positions: Vec::with_capacity(n),
            clusters: Vec::with_capacity(n),
            code_point_x: vec![0.0; n],
            ascent: style.font_size * ASCENT_RATIO,
            descent: style.font_size * DESCENT_RATIO,
            width: 0.0,
        };

        let mut x = 0.0;
        let mut emit = |i: usize, x: &mut f32| {
            let ch = code_points[i];
            let advance = self.advance(ch, style.font_size);
            shaped.glyph_ids.push(glyph_id(ch));
            shaped.glyph_positions.push(Point::new(*x, 0.0));
            shaped.clusters.push(start_offset + i);
            shaped.code_point_x[i] = match direction {
                Direction::Ltr => *x,
                Direction::Rtl => *x + advance,
            };
            *x += advance;
        };
        match direction {
            Direction::Ltr => (0..n).for_each(|i| emit(i, &mut x)),
            Direction::Rtl => (0..n).rev().for_each(|i| emit(i, &mut x)),
        }
        shaped.width = x;
        shaped
    }
}
