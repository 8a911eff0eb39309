//! Line breaking and truncation.
//!
//! One pass over the font runs in logical order.  For each line the
//! break candidates are walked while the width accumulates; the last
//! candidate that fits ends the line, a required candidate ends it at
//! once, and a line with no fitting candidate force-splits the run that
//! overflows.  Runs are split at the measured end and at the wrap
//! position; what lies between is tagged as trailing whitespace.
//!
//! Lines past `max_lines`, or below `max_height`, are dropped and the new
//! last line is truncated with an ellipsis.

use super::font_run::{FontRun, FontRunKind, RunId};
use super::line::TextLine;
use super::options::LayoutOptions;
use super::placement::{place_line, LineMetrics};
use crate::core::arena::Arena;
use crate::core::error::{LayoutError, LayoutResult};
use crate::core::types::Direction;
use crate::text::{is_hard_break, is_space, LineBreak, Shaper};

/// Mutable state of one line-breaking pass.
pub struct LineLayout<'a> {
    code_points: &'a [char],
    arena: &'a mut Arena<FontRun>,
    shaper: &'a mut dyn Shaper,
    options: &'a LayoutOptions,
    base_level: u8,
    empty: LineMetrics,
    /// All runs in logical order; grows as runs are split.
    order: Vec<RunId>,
    lines: Vec<TextLine>,
    y: f32,
}

impl<'a> LineLayout<'a> {
    pub fn new(
        code_points: &'a [char],
        arena: &'a mut Arena<FontRun>,
        shaper: &'a mut dyn Shaper,
        options: &'a LayoutOptions,
        base_level: u8,
        empty: LineMetrics,
        order: Vec<RunId>,
    ) -> Self {
        Self {
            code_points,
            arena,
            shaper,
            options,
            base_level,
            empty,
            order,
            lines: Vec::new(),
            y: 0.0,
        }
    }

    fn base_direction(&self) -> Direction {
        Direction::from_level(self.base_level)
    }

    /// Break all runs into lines.
    pub fn run(mut self, breaks: &[LineBreak]) -> LayoutResult<Vec<TextLine>> {
        let n = self.code_points.len();
        let max_width = self.options.line_width();
        let max_lines = self.options.max_lines.map(|m| m.max(1));
        let mut run_idx = 0;
        let mut truncated = false;

        while run_idx < self.order.len() {
            let line_start = self.arena[self.order[run_idx]].start;
            let first = breaks.partition_point(|b| b.wrap <= line_start);
            let (measure, wrap) = self.find_line_end(run_idx, line_start, &breaks[first..], max_width)?;
            let end_idx = self.commit_line(run_idx, measure, wrap)?;

            let mut line = TextLine::new(line_start);
            line.end = wrap;
            line.runs = self.order[run_idx..end_idx].to_vec();
            self.place(&mut line, self.lines.len());
            log::trace!(
                "line {}: {}..{} (measure {}), width {}",
                self.lines.len(),
                line_start,
                wrap,
                measure,
                line.width
            );

            if let Some(max_height) = self.options.max_height {
                if self.y + line.height > max_height && !self.lines.is_empty() {
                    self.truncate_last_line()?;
                    truncated = true;
                    break;
                }
            }

            self.push_line(line);
            run_idx = end_idx;

            if max_lines == Some(self.lines.len()) && run_idx < self.order.len() {
                self.truncate_last_line()?;
                truncated = true;
                break;
            }
        }

        if truncated {
            for &id in &self.order[run_idx..] {
                self.arena.remove(id);
            }
        } else if self.lines.is_empty() || is_hard_break(self.code_points[n - 1]) {
            // Empty text still has one line, and the caret can sit on the
            // empty line after a final newline.
            let mut line = TextLine::new(n);
            self.place(&mut line, self.lines.len());
            let fits_height = self
                .options
                .max_height
                .map_or(true, |max_height| self.y + line.height <= max_height);
            let fits_lines = max_lines.map_or(true, |max| self.lines.len() < max);
            if self.lines.is_empty() || (fits_height && fits_lines) {
                self.push_line(line);
            }
        }

        log::debug!(
            "line layout: {} lines, {} runs{}",
            self.lines.len(),
            self.arena.len(),
            if truncated { ", truncated" } else { "" }
        );
        Ok(self.lines)
    }

    fn push_line(&mut self, mut line: TextLine) {
        line.y = self.y;
        line.baseline = self.y + line.ascent;
        self.y += line.height;
        self.lines.push(line);
    }

    fn place(&mut self, line: &mut TextLine, line_index: usize) {
        place_line(
            line,
            line_index,
            self.arena,
            self.base_level,
            self.options.rtl_mode,
            self.options.max_width,
            self.empty,
        );
    }

    /// Width of `[line start, cp)` for a line starting at `run_idx`.
    /// `x_before[i]` is the width of the line's runs before run `run_idx + i`.
    fn width_to(&self, run_idx: usize, x_before: &[f32], cp: usize) -> f32 {
        for (i, &x) in x_before.iter().enumerate() {
            let run = &self.arena[self.order[run_idx + i]];
            if cp <= run.end() {
                return x + run.leading_width(cp);
            }
        }
        x_before.last().copied().unwrap_or(0.0)
    }

    /// Measure and wrap positions ending the line that starts at `run_idx`.
    fn find_line_end(
        &self,
        run_idx: usize,
        line_start: usize,
        candidates: &[LineBreak],
        max_width: f32,
    ) -> LayoutResult<(usize, usize)> {
        let mut x_before: Vec<f32> = Vec::new();
        let mut x = 0.0;
        let mut best: Option<(usize, usize)> = None;
        let mut next = 0;
        let mut overflow = false;

        'runs: for r in run_idx..self.order.len() {
            let run = &self.arena[self.order[r]];
            x_before.push(x);
            while next < candidates.len() && candidates[next].wrap <= run.end() {
                let candidate = candidates[next];
                let measure = candidate.measure.max(line_start);
                if self.width_to(run_idx, &x_before, measure) > max_width {
                    overflow = true;
                    break 'runs;
                }
                best = Some((measure, candidate.wrap));
                next += 1;
                if candidate.required {
                    break 'runs;
                }
            }
            x += run.width;
        }

        if let Some(best) = best {
            return Ok(best);
        }
        if overflow {
            return self.force_break(run_idx, line_start, max_width);
        }
        // No candidate reached: take everything that is left.
        match self.order.last() {
            Some(&last) => {
                let end = self.arena[last].end();
                Ok((end, end))
            }
            None => Err(LayoutError::Internal("line break on an empty run list".into())),
        }
    }

    /// Break inside the first run that overflows.
    fn force_break(
        &self,
        run_idx: usize,
        line_start: usize,
        max_width: f32,
    ) -> LayoutResult<(usize, usize)> {
        let mut x = 0.0;
        let mut measure = None;
        for r in run_idx..self.order.len() {
            let run = &self.arena[self.order[r]];
            if x + run.width > max_width || r + 1 == self.order.len() {
                let pos = run.find_break_position(max_width - x, r == run_idx);
                measure = Some(if pos > line_start { pos } else { run.end() });
                break;
            }
            x += run.width;
        }
        let Some(measure) = measure else {
            return Err(LayoutError::Internal(format!(
                "no run to force-break in line starting at {}",
                line_start
            )));
        };

        let mut wrap = measure;
        while wrap < self.code_points.len() && is_space(self.code_points[wrap]) {
            wrap += 1;
            if is_hard_break(self.code_points[wrap - 1]) {
                break;
            }
        }
        Ok((measure, wrap))
    }

    /// Split the run containing `pos` (strictly inside) so a run starts
    /// there.
    fn split_at(&mut self, from: usize, pos: usize) -> LayoutResult<()> {
        let Some(i) = (from..self.order.len()).find(|&i| {
            let run = &self.arena[self.order[i]];
            run.start < pos && pos < run.end()
        }) else {
            return Ok(());
        };
        let tail = self.arena[self.order[i]].split(pos)?;
        let id = self.arena.insert(tail);
        self.order.insert(i + 1, id);
        Ok(())
    }

    /// Split at the line's measure and wrap positions, tag the trailing
    /// whitespace and return the index of the first run of the next line.
    fn commit_line(&mut self, run_idx: usize, measure: usize, wrap: usize) -> LayoutResult<usize> {
        self.split_at(run_idx, measure)?;
        self.split_at(run_idx, wrap)?;

        let mut end_idx = run_idx;
        while end_idx < self.order.len() && self.arena[self.order[end_idx]].start < wrap {
            end_idx += 1;
        }

        let base = self.base_direction();
        for i in run_idx..end_idx {
            let id = self.order[i];
            if self.arena[id].start < measure {
                continue;
            }
            let run = &self.arena[id];
            if run.direction != base {
                let shaped = self.shaper.shape(
                    &self.code_points[run.start..run.end()],
                    &run.style,
                    &run.typeface,
                    base,
                    run.start,
                );
                self.arena[id].reshape(base, shaped);
            }
            let run = &mut self.arena[id];
            run.kind = FontRunKind::TrailingWhitespace;
            run.level = self.base_level;
        }
        Ok(end_idx)
    }

    /// Drop trailing space code points from the logical end of `runs`.
    fn strip_trailing_spaces(&mut self, runs: &mut Vec<RunId>) -> LayoutResult<()> {
        while let Some(&last) = runs.last() {
            let run = &self.arena[last];
            let mut p = run.end();
            while p > run.start && is_space(self.code_points[p - 1]) {
                p -= 1;
            }
            if p == run.end() {
                break;
            }
            if p == run.start {
                runs.pop();
                self.arena.remove(last);
                continue;
            }
            self.arena[last].split(p)?;
            break;
        }
        Ok(())
    }

    /// Trim the last line so its content plus an ellipsis fits, then
    /// append the ellipsis.
    fn truncate_last_line(&mut self) -> LayoutResult<()> {
        let Some(mut line) = self.lines.pop() else {
            return Ok(());
        };
        let line_index = self.lines.len();
        self.y = line.y;

        let Some(ellipsis) = self.options.ellipsis else {
            line.truncated = true;
            self.push_line(line);
            return Ok(());
        };

        // Style of the ellipsis: the logically last run before trimming.
        let Some(&last) = line.runs.last() else {
            line.truncated = true;
            self.push_line(line);
            return Ok(());
        };
        let style = self.arena[last].style.clone();
        let typeface = self.arena[last].typeface.clone();

        let mut runs = std::mem::take(&mut line.runs);
        runs.retain(|&id| {
            if self.arena[id].kind == FontRunKind::TrailingWhitespace {
                self.arena.remove(id);
                false
            } else {
                true
            }
        });
        self.strip_trailing_spaces(&mut runs)?;

        let base = self.base_direction();
        let mut width: f32 = runs.iter().map(|&id| self.arena[id].width).sum();
        let marker_start = runs.last().map_or(line.start, |&id| self.arena[id].end());
        let shaped = self.shaper.shape(&[ellipsis], &style, &typeface, base, marker_start);
        let available = self.options.line_width() - shaped.width;

        while width > available {
            let Some(&last) = runs.last() else {
                break;
            };
            let run = &self.arena[last];
            let keep = run.width - (width - available);
            let pos = if keep > 0.0 {
                run.find_break_position(keep, false)
            } else {
                run.start
            };
            if pos <= run.start {
                width -= run.width;
                runs.pop();
                self.arena.remove(last);
                continue;
            }
            self.arena[last].split(pos)?;
            break;
        }
        self.strip_trailing_spaces(&mut runs)?;

        let marker_start = runs.last().map_or(line.start, |&id| self.arena[id].end());
        let shaped = self.shaper.shape(&[ellipsis], &style, &typeface, base, marker_start);
        let mut marker = FontRun::from_shaped(marker_start, 0, self.base_level, style, typeface, shaped);
        marker.kind = FontRunKind::Ellipsis;
        marker.relative_cp_x.clear();
        runs.push(self.arena.insert(marker));

        line.runs = runs;
        line.end = marker_start;
        line.truncated = true;
        self.place(&mut line, line_index);
        log::debug!("truncated line {} at {}", line_index, marker_start);
        self.push_line(line);
        Ok(())
    }
}
