//! Horizontal placement of the runs of one line.
//!
//! Runs arrive in logical order.  Three strategies:
//! - LTR paragraphs: x advances to the right.  Runs at the paragraph
//!   level are placed as they come; a maximal group of higher-level runs
//!   is reordered internally (L2 over the run levels) and occupies one
//!   block.
//! - RTL paragraphs: the mirror image.  x moves left from 0 and the line
//!   is shifted right by its content width at the end.
//! - Word-style RTL: runs of equal direction form groups, each group is
//!   laid out in its own direction, groups flow right to left in source
//!   order and the line is pinned to the right edge of the max width.
//!
//! Trailing whitespace runs hang past the content on the paragraph's end
//! side and never count toward the line width.

use super::font_run::{FontRun, FontRunKind, RunId};
use super::line::TextLine;
use super::options::RtlLayoutMode;
use crate::core::arena::Arena;
use crate::core::bidi::reorder_visual;

/// Ascent and descent of a line, leading included.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl LineMetrics {
    /// Natural metrics plus half the extra leading above and below.
    pub fn with_line_height(ascent: f32, descent: f32, line_height: f32) -> Self {
        let half_leading = (ascent + descent) * (line_height - 1.0) / 2.0;
        Self {
            ascent: ascent + half_leading,
            descent: descent + half_leading,
        }
    }

    fn union(self, other: LineMetrics) -> Self {
        Self {
            ascent: self.ascent.max(other.ascent),
            descent: self.descent.max(other.descent),
        }
    }
}

/// Place the runs of `line` and compute its width and metrics.
///
/// `empty` supplies the metrics of a line without runs.
pub fn place_line(
    line: &mut TextLine,
    line_index: usize,
    arena: &mut Arena<FontRun>,
    base_level: u8,
    mode: RtlLayoutMode,
    max_width: Option<f32>,
    empty: LineMetrics,
) {
    let mut content: Vec<RunId> = Vec::with_capacity(line.runs.len());
    let mut trailing: Vec<RunId> = Vec::new();
    for (i, &id) in line.runs.iter().enumerate() {
        let run = &mut arena[id];
        run.line_index = line_index;
        run.index_in_line = i;
        if run.kind == FontRunKind::TrailingWhitespace {
            trailing.push(id);
        } else {
            content.push(id);
        }
    }

    let rtl = base_level % 2 == 1;
    let width = if !rtl {
        let width = place_forward(&content, arena, base_level);
        let mut x = width;
        for &id in &trailing {
            arena[id].x = x;
            x += arena[id].width;
        }
        width
    } else {
        let left = match mode {
            RtlLayoutMode::Standard => place_backward(&content, arena, base_level),
            RtlLayoutMode::WordStyle => place_word_style(&content, arena),
        };
        let mut x = left;
        for &id in &trailing {
            x -= arena[id].width;
            arena[id].x = x;
        }
        let width = (0.0 - left).max(0.0);
        let shift = match mode {
            RtlLayoutMode::Standard => width,
            RtlLayoutMode::WordStyle => max_width.unwrap_or(width),
        };
        for &id in &line.runs {
            arena[id].x += shift;
        }
        width
    };
    line.width = width;

    let metrics = line
        .runs
        .iter()
        .map(|&id| {
            let run = &arena[id];
            LineMetrics::with_line_height(run.ascent, run.descent, run.style.line_height)
        })
        .reduce(LineMetrics::union)
        .unwrap_or(empty);
    line.ascent = metrics.ascent;
    line.descent = metrics.descent;
    line.height = metrics.ascent + metrics.descent;
}

/// End of the group of runs starting at `i` whose level exceeds `base_level`.
fn group_end(ids: &[RunId], arena: &Arena<FontRun>, i: usize, base_level: u8) -> usize {
    let mut j = i;
    while j < ids.len() && arena[ids[j]].level > base_level {
        j += 1;
    }
    j
}

/// Place `ids` left to right from `x` in L2 order; returns the right edge.
fn place_group(ids: &[RunId], arena: &mut Arena<FontRun>, mut x: f32) -> f32 {
    let levels: Vec<u8> = ids.iter().map(|&id| arena[id].level).collect();
    for k in reorder_visual(&levels) {
        let run = &mut arena[ids[k]];
        run.x = x;
        x += run.width;
    }
    x
}

fn group_width(ids: &[RunId], arena: &Arena<FontRun>) -> f32 {
    ids.iter().map(|&id| arena[id].width).sum()
}

/// LTR paragraph: returns the content width.
fn place_forward(ids: &[RunId], arena: &mut Arena<FontRun>, base_level: u8) -> f32 {
    let mut x = 0.0;
    let mut i = 0;
    while i < ids.len() {
        if arena[ids[i]].level <= base_level {
            let run = &mut arena[ids[i]];
            run.x = x;
            x += run.width;
            i += 1;
            continue;
        }
        let j = group_end(ids, arena, i, base_level);
        x = place_group(&ids[i..j], arena, x);
        i = j;
    }
    x
}

/// RTL paragraph: x moves left from 0; returns the (negative) left edge.
fn place_backward(ids: &[RunId], arena: &mut Arena<FontRun>, base_level: u8) -> f32 {
    let mut x = 0.0;
    let mut i = 0;
    while i < ids.len() {
        if arena[ids[i]].level <= base_level {
            let run = &mut arena[ids[i]];
            x -= run.width;
            run.x = x;
            i += 1;
            continue;
        }
        let j = group_end(ids, arena, i, base_level);
        x -= group_width(&ids[i..j], arena);
        place_group(&ids[i..j], arena, x);
        i = j;
    }
    x
}

/// Word-style RTL: returns the (negative) left edge.
fn place_word_style(ids: &[RunId], arena: &mut Arena<FontRun>) -> f32 {
    let mut right = 0.0;
    let mut i = 0;
    while i < ids.len() {
        let direction = arena[ids[i]].direction;
        let mut j = i;
        while j < ids.len() && arena[ids[j]].direction == direction {
            j += 1;
        }
        let group = &ids[i..j];
        let left = right - group_width(group, arena);
        if direction.is_rtl() {
            let mut x = right;
            for &id in group {
                let run = &mut arena[id];
                x -= run.width;
                run.x = x;
            }
        } else {
            let mut x = left;
            for &id in group {
                let run = &mut arena[id];
                run.x = x;
                x += run.width;
            }
        }
        right = left;
        i = j;
    }
    right
}
