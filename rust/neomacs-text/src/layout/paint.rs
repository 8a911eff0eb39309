//! Painting laid-out lines onto a canvas.
//!
//! Layers go bottom to top: selection, run backgrounds, glyphs, then
//! underline and strike-through.

use std::ops::Range;

use super::font_run::{FontRun, FontRunKind};
use super::line::TextLine;
use super::style::{Style, UnderlineStyle};
use crate::core::arena::Arena;
use crate::core::types::{Color, Point, Rect};
use crate::text::Typeface;

/// Drawing backend.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw glyphs at absolute baseline positions.
    fn draw_glyphs(&mut self, glyph_ids: &[u16], positions: &[Point], typeface: &Typeface, style: &Style);

    fn draw_line(&mut self, from: Point, to: Point, thickness: f32, color: Color);

    /// Horizontal spans `(x0, x1)` where the glyphs cross the band
    /// `top..bottom`.  Gapped underlines skip these spans.  The default
    /// reports none.
    fn glyph_intercepts(
        &mut self,
        _glyph_ids: &[u16],
        _positions: &[Point],
        _typeface: &Typeface,
        _style: &Style,
        _top: f32,
        _bottom: f32,
    ) -> Vec<(f32, f32)> {
        Vec::new()
    }
}

/// Highlighted code point range.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub range: Range<usize>,
    pub color: Color,
}

fn decoration_thickness(style: &Style) -> f32 {
    (style.font_size / 16.0).max(1.0)
}

/// Left edge of `run` in canvas coordinates.
fn run_left(origin: Point, line: &TextLine, run: &FontRun) -> f32 {
    origin.x + line.alignment_offset + run.x
}

/// Paint `lines` with the block's top-left corner at `origin`.
pub fn paint_lines(
    canvas: &mut dyn Canvas,
    lines: &[TextLine],
    arena: &Arena<FontRun>,
    origin: Point,
    selection: Option<&Selection>,
) {
    if let Some(selection) = selection.filter(|s| s.range.start < s.range.end) {
        for line in lines {
            for &id in &line.runs {
                let run = &arena[id];
                let start = selection.range.start.max(run.start);
                let end = selection.range.end.min(run.end());
                if start >= end {
                    continue;
                }
                let (a, b) = (run.boundary_x(start), run.boundary_x(end));
                let left = run_left(origin, line, run) + a.min(b);
                canvas.fill_rect(
                    Rect::new(left, origin.y + line.y, (a - b).abs(), line.height),
                    selection.color,
                );
            }
        }
    }

    for line in lines {
        for &id in &line.runs {
            let run = &arena[id];
            if run.kind == FontRunKind::TrailingWhitespace {
                continue;
            }
            if let Some(color) = run.style.background {
                let left = run_left(origin, line, run);
                canvas.fill_rect(Rect::new(left, origin.y + line.y, run.width, line.height), color);
            }
        }
    }

    let mut positions: Vec<Point> = Vec::new();
    for line in lines {
        for &id in &line.runs {
            let run = &arena[id];
            if run.kind == FontRunKind::TrailingWhitespace || run.glyph_ids.is_empty() {
                continue;
            }
            positions.clear();
            positions.extend(run.positions.iter().map(|p| Point::new(p.x + origin.x, p.y + origin.y)));
            canvas.draw_glyphs(&run.glyph_ids, &positions, &run.typeface, &run.style);
        }
    }

    for line in lines {
        for &id in &line.runs {
            let run = &arena[id];
            if run.kind == FontRunKind::TrailingWhitespace {
                continue;
            }
            paint_decorations(canvas, origin, line, run, &mut positions);
        }
    }
}

fn paint_decorations(
    canvas: &mut dyn Canvas,
    origin: Point,
    line: &TextLine,
    run: &FontRun,
    positions: &mut Vec<Point>,
) {
    let style = &run.style;
    let thickness = decoration_thickness(style);
    let left = run_left(origin, line, run);
    let right = left + run.width;
    let baseline = origin.y + line.baseline;

    match style.underline {
        UnderlineStyle::None => {}
        UnderlineStyle::Solid => {
            let y = baseline + 2.0 * thickness;
            canvas.draw_line(Point::new(left, y), Point::new(right, y), thickness, style.text_color);
        }
        UnderlineStyle::Gapped => {
            let y = baseline + 2.0 * thickness;
            positions.clear();
            positions.extend(run.positions.iter().map(|p| Point::new(p.x + origin.x, p.y + origin.y)));
            let mut gaps = canvas.glyph_intercepts(
                &run.glyph_ids,
                positions.as_slice(),
                &run.typeface,
                style,
                y - thickness / 2.0,
                y + thickness / 2.0,
            );
            gaps.sort_by(|a, b| a.0.total_cmp(&b.0));
            let mut x = left;
            for (x0, x1) in gaps {
                let gap_start = (x0 - thickness).max(left);
                if gap_start > x {
                    canvas.draw_line(Point::new(x, y), Point::new(gap_start, y), thickness, style.text_color);
                }
                x = x.max(x1 + thickness);
            }
            if x < right {
                canvas.draw_line(Point::new(x, y), Point::new(right, y), thickness, style.text_color);
            }
        }
    }

    if style.strike_through {
        let y = baseline - run.ascent * 0.3;
        canvas.draw_line(Point::new(left, y), Point::new(right, y), thickness, style.text_color);
    }
}
