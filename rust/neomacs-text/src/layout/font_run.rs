//! Font runs: the atomic unit of laid-out text.
//!
//! A font run covers `[start, start + length)` with one direction, level,
//! typeface and style.  Glyphs are stored in visual order; `clusters`
//! maps each glyph to its code point and is non-decreasing for LTR runs
//! and non-increasing for RTL runs.  `relative_cp_x` holds the leading
//! edge of every code point relative to the run's left edge, so the first
//! code point of an RTL run sits at `width`.
//!
//! Runs are split while lines are broken.  Both halves are rebased so
//! that each starts at x = 0 on its left edge.

use std::sync::Arc;

use crate::core::arena::Handle;
use crate::core::error::{LayoutError, LayoutResult};
use crate::core::types::{Direction, Point};
use crate::layout::style::Style;
use crate::text::{ShapedText, Typeface};

/// Handle to a font run owned by a `TextBlock`.  Handles from an earlier
/// layout pass do not resolve.
pub type RunId = Handle<FontRun>;

/// Role of a run within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontRunKind {
    #[default]
    Normal,
    /// Whitespace between a line's measured end and its wrap position.
    /// Not painted, not counted in the line width.
    TrailingWhitespace,
    /// Synthesized truncation marker; covers no code points.
    Ellipsis,
}

#[derive(Debug, Clone)]
pub struct FontRun {
    pub kind: FontRunKind,
    pub start: usize,
    pub length: usize,
    pub level: u8,
    pub direction: Direction,
    pub style: Arc<Style>,
    pub typeface: Typeface,
    pub glyph_ids: Vec<u16>,
    pub glyph_positions: Vec<Point>,
    pub clusters: Vec<usize>,
    pub relative_cp_x: Vec<f32>,
    pub ascent: f32,
    pub descent: f32,
    pub width: f32,
    /// Left edge within the line, before alignment.
    pub x: f32,
    pub line_index: usize,
    pub index_in_line: usize,
    /// Absolute glyph positions, filled in when the layout is finalized.
    pub positions: Vec<Point>,
}

impl FontRun {
    pub fn from_shaped(
        start: usize,
        length: usize,
        level: u8,
        style: Arc<Style>,
        typeface: Typeface,
        shaped: ShapedText,
    ) -> Self {
        Self {
            kind: FontRunKind::Normal,
            start,
            length,
            level,
            direction: Direction::from_level(level),
            style,
            typeface,
            glyph_ids: shaped.glyph_ids,
            glyph_positions: shaped.glyph_positions,
            clusters: shaped.clusters,
            relative_cp_x: shaped.code_point_x,
            ascent: shaped.ascent,
            descent: shaped.descent,
            width: shaped.width,
            x: 0.0,
            line_index: 0,
            index_in_line: 0,
            positions: Vec::new(),
        }
    }

    /// Replace the glyph data, keeping range and style.
    pub fn reshape(&mut self, direction: Direction, shaped: ShapedText) {
        self.direction = direction;
        self.glyph_ids = shaped.glyph_ids;
        self.glyph_positions = shaped.glyph_positions;
        self.clusters = shaped.clusters;
        self.relative_cp_x = shaped.code_point_x;
        self.ascent = shaped.ascent;
        self.descent = shaped.descent;
        self.width = shaped.width;
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    #[inline]
    pub fn is_rtl(&self) -> bool {
        self.direction.is_rtl()
    }

    pub fn contains(&self, cp: usize) -> bool {
        cp >= self.start && cp < self.end()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_ids.len()
    }

    /// Visual distance from the logical start of the run to the leading
    /// edge of `cp`.  `cp` is clamped to `[start, end]`; `end` yields the
    /// full width.
    pub fn leading_width(&self, cp: usize) -> f32 {
        let cp = cp.clamp(self.start, self.end());
        if cp == self.end() {
            return self.width;
        }
        let x = self.relative_cp_x[cp - self.start];
        match self.direction {
            Direction::Ltr => x,
            Direction::Rtl => self.width - x,
        }
    }

    /// X of the boundary before `cp`, relative to the run's left edge.
    pub fn boundary_x(&self, cp: usize) -> f32 {
        match self.direction {
            Direction::Ltr => self.leading_width(cp),
            Direction::Rtl => self.width - self.leading_width(cp),
        }
    }

    /// Whether a line may be split before `cp`: every glyph cluster that
    /// starts at or after it belongs wholly to the second half.
    pub fn is_boundary(&self, cp: usize) -> bool {
        if cp <= self.start || cp >= self.end() {
            return cp == self.start || cp == self.end();
        }
        match self.direction {
            Direction::Ltr => self.clusters.binary_search(&cp).is_ok(),
            Direction::Rtl => self.clusters.binary_search_by(|c| cp.cmp(c)).is_ok(),
        }
    }

    /// Last boundary whose leading width fits in `max_width`.
    ///
    /// With `force` and nothing fitting, the first boundary with a
    /// non-zero leading width is returned instead, so a line always makes
    /// progress.  Otherwise the run start means nothing fits.
    pub fn find_break_position(&self, max_width: f32, force: bool) -> usize {
        let mut best = self.start;
        for cp in self.start + 1..=self.end() {
            if !self.is_boundary(cp) {
                continue;
            }
            if self.leading_width(cp) <= max_width {
                best = cp;
            } else {
                break;
            }
        }
        if best == self.start && force {
            if let Some(cp) = (self.start + 1..=self.end())
                .find(|&cp| self.is_boundary(cp) && self.leading_width(cp) > 0.0)
            {
                return cp;
            }
        }
        best
    }

    /// Split before `at`, keeping `[start, at)` and returning `[at, end)`
    /// as a new run.
    pub fn split(&mut self, at: usize) -> LayoutResult<FontRun> {
        if at <= self.start || at >= self.end() {
            return Err(LayoutError::ArgumentOutOfRange {
                index: at,
                len: self.end(),
            });
        }
        let local = at - self.start;
        let mut tail = FontRun {
            kind: self.kind,
            start: at,
            length: self.end() - at,
            level: self.level,
            direction: self.direction,
            style: self.style.clone(),
            typeface: self.typeface.clone(),
            glyph_ids: Vec::new(),
            glyph_positions: Vec::new(),
            clusters: Vec::new(),
            relative_cp_x: self.relative_cp_x.split_off(local),
            ascent: self.ascent,
            descent: self.descent,
            width: 0.0,
            x: 0.0,
            line_index: self.line_index,
            index_in_line: self.index_in_line + 1,
            positions: Vec::new(),
        };
        self.length = local;

        match self.direction {
            Direction::Ltr => {
                let k = self.clusters.partition_point(|&c| c < at);
                let split_x = self.glyph_positions.get(k).map_or(self.width, |p| p.x);
                tail.glyph_ids = self.glyph_ids.split_off(k);
                tail.glyph_positions = self.glyph_positions.split_off(k);
                tail.clusters = self.clusters.split_off(k);
                for p in &mut tail.glyph_positions {
                    p.x -= split_x;
                }
                for x in &mut tail.relative_cp_x {
                    *x = (*x - split_x).max(0.0);
                }
                tail.width = self.width - split_x;
                self.width = split_x;
            }
            Direction::Rtl => {
                // The logically later half is visually on the left.
                let k = self.clusters.partition_point(|&c| c >= at);
                let split_x = self.glyph_positions.get(k).map_or(self.width, |p| p.x);
                let head_ids = self.glyph_ids.split_off(k);
                let head_positions = self.glyph_positions.split_off(k);
                let head_clusters = self.clusters.split_off(k);
                tail.glyph_ids = std::mem::replace(&mut self.glyph_ids, head_ids);
                tail.glyph_positions = std::mem::replace(&mut self.glyph_positions, head_positions);
                tail.clusters = std::mem::replace(&mut self.clusters, head_clusters);
                for p in &mut self.glyph_positions {
                    p.x -= split_x;
                }
                for x in &mut self.relative_cp_x {
                    *x = (*x - split_x).max(0.0);
                }
                tail.width = split_x;
                self.width -= split_x;
            }
        }
        Ok(tail)
    }

    /// Code point boundary nearest to `x` (relative to the left edge).
    pub fn offset_for_x(&self, x: f32) -> usize {
        let mut best = self.start;
        let mut best_distance = f32::INFINITY;
        for cp in self.start..=self.end() {
            if !self.is_boundary(cp) {
                continue;
            }
            let distance = (self.boundary_x(cp) - x).abs();
            if distance < best_distance {
                best = cp;
                best_distance = distance;
            }
        }
        best
    }
}
