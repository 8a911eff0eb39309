//! Laid-out lines.

use super::font_run::RunId;

/// One line of a laid-out block.  Rebuilt on every layout pass.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    /// Runs in logical order.
    pub runs: Vec<RunId>,
    /// First code point of the line.
    pub start: usize,
    /// Wrap position: first code point of the next line.
    pub end: usize,
    /// Top of the line.
    pub y: f32,
    pub baseline: f32,
    pub ascent: f32,
    pub descent: f32,
    pub height: f32,
    /// Content width, excluding trailing whitespace.
    pub width: f32,
    pub alignment_offset: f32,
    /// An ellipsis replaced content at the end of this line.
    pub truncated: bool,
}

impl TextLine {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            end: start,
            ..Self::default()
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.y && y < self.bottom()
    }
}
