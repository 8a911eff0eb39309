//! Text block: styled text plus layout constraints, laid out on demand.
//!
//! Editing and option setters only mark the block dirty.  Every query
//! first re-runs the pipeline if needed:
//!
//! 1. bidi class data and level resolution
//! 2. level runs x style runs -> font fallback -> shaping
//! 3. line breaking, truncation and per-line placement
//! 4. alignment and absolute glyph positions
//!
//! Run handles from an earlier pass stop resolving once the block is
//! laid out again.

use std::sync::Arc;

use super::breaker::LineLayout;
use super::font_run::{FontRun, RunId};
use super::hit_test::{self, CaretInfo};
use super::line::TextLine;
use super::options::{Alignment, BaseDirection, LayoutOptions, RtlLayoutMode};
use super::paint::{paint_lines, Canvas, Selection};
use super::placement::LineMetrics;
use super::runs::build_font_runs;
use super::style::{Style, StyledText};
use crate::core::arena::Arena;
use crate::core::bidi::{BidiData, BidiResolver};
use crate::core::error::LayoutResult;
use crate::core::types::{Direction, Point};
use crate::text::{
    grapheme_boundaries, FixedMetricsShaper, FontFallback, LineBreaker, Shaper, SingleTypeface,
    Typeface, UnicodeLineBreaker,
};

/// Read-only view of a finished layout.
#[derive(Clone, Copy)]
pub struct TextLayout<'a> {
    lines: &'a [TextLine],
    arena: &'a Arena<FontRun>,
    width: f32,
    height: f32,
}

impl<'a> TextLayout<'a> {
    pub fn lines(&self) -> &'a [TextLine] {
        self.lines
    }

    /// `None` for a handle from another layout pass.
    pub fn run(&self, id: RunId) -> Option<&'a FontRun> {
        self.arena.get(id)
    }

    /// Runs of `line` in logical order.
    pub fn runs(&self, line: &'a TextLine) -> impl Iterator<Item = &'a FontRun> + 'a {
        let arena = self.arena;
        line.runs.iter().filter_map(move |&id| arena.get(id))
    }

    /// Logically following run on the same line.
    pub fn next_run(&self, id: RunId) -> Option<RunId> {
        let run = self.arena.get(id)?;
        self.lines.get(run.line_index)?.runs.get(run.index_in_line + 1).copied()
    }

    /// Logically preceding run on the same line.
    pub fn previous_run(&self, id: RunId) -> Option<RunId> {
        let run = self.arena.get(id)?;
        let i = run.index_in_line.checked_sub(1)?;
        self.lines.get(run.line_index)?.runs.get(i).copied()
    }

    /// Widest line and total height.
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

impl std::fmt::Debug for TextLayout<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayout")
            .field("lines", &self.lines.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

pub struct TextBlock {
    text: StyledText,
    options: LayoutOptions,
    /// Style for metrics when there is no text to take them from.
    default_style: Arc<Style>,
    shaper: Box<dyn Shaper + Send>,
    fallback: Box<dyn FontFallback + Send>,
    breaker: Box<dyn LineBreaker + Send>,

    // Per-pass state, reused between passes.
    bidi: BidiData,
    resolver: BidiResolver,
    levels: Vec<u8>,
    paragraph_level: u8,
    arena: Arena<FontRun>,
    lines: Vec<TextLine>,
    caret_stops: Vec<usize>,
    width: f32,
    height: f32,
    dirty: bool,
}

impl Default for TextBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBlock {
    /// Block with the built-in monospace shaper, single-face fallback and
    /// UAX #14 line breaker.
    pub fn new() -> Self {
        Self::with_services(
            Box::new(FixedMetricsShaper::default()),
            Box::new(SingleTypeface),
            Box::new(UnicodeLineBreaker::new()),
        )
    }

    pub fn with_services(
        shaper: Box<dyn Shaper + Send>,
        fallback: Box<dyn FontFallback + Send>,
        breaker: Box<dyn LineBreaker + Send>,
    ) -> Self {
        Self {
            text: StyledText::new(),
            options: LayoutOptions::default(),
            default_style: Arc::new(Style::default()),
            shaper,
            fallback,
            breaker,
            bidi: BidiData::new(),
            resolver: BidiResolver::new(),
            levels: Vec::new(),
            paragraph_level: 0,
            arena: Arena::new(),
            lines: Vec::new(),
            caret_stops: Vec::new(),
            width: 0.0,
            height: 0.0,
            dirty: true,
        }
    }

    pub fn text(&self) -> &StyledText {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    // ---- Editing ----

    pub fn add_text(&mut self, text: &str, style: Arc<Style>) {
        self.text.add_text(text, style);
        self.dirty = true;
    }

    /// Insert at `index`; `None` continues the style of the text around it.
    pub fn insert(&mut self, index: usize, text: &str, style: Option<Arc<Style>>) -> LayoutResult<()> {
        self.text.insert(index, text, style)?;
        self.dirty = true;
        Ok(())
    }

    pub fn delete(&mut self, start: usize, end: usize) -> LayoutResult<()> {
        self.text.delete(start, end)?;
        self.dirty = true;
        Ok(())
    }

    pub fn apply_style(&mut self, start: usize, end: usize, style: Arc<Style>) -> LayoutResult<()> {
        self.text.apply_style(start, end, style)?;
        self.dirty = true;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.dirty = true;
    }

    // ---- Options ----

    fn update<T: PartialEq>(dirty: &mut bool, field: &mut T, value: T) {
        if *field != value {
            *field = value;
            *dirty = true;
        }
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        Self::update(&mut self.dirty, &mut self.options, options);
    }

    pub fn set_default_style(&mut self, style: Arc<Style>) {
        Self::update(&mut self.dirty, &mut self.default_style, style);
    }

    pub fn set_max_width(&mut self, max_width: Option<f32>) {
        Self::update(&mut self.dirty, &mut self.options.max_width, max_width);
    }

    pub fn set_max_height(&mut self, max_height: Option<f32>) {
        Self::update(&mut self.dirty, &mut self.options.max_height, max_height);
    }

    pub fn set_max_lines(&mut self, max_lines: Option<usize>) {
        Self::update(&mut self.dirty, &mut self.options.max_lines, max_lines);
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        Self::update(&mut self.dirty, &mut self.options.alignment, alignment);
    }

    pub fn set_base_direction(&mut self, direction: BaseDirection) {
        Self::update(&mut self.dirty, &mut self.options.base_direction, direction);
    }

    pub fn set_rtl_mode(&mut self, mode: RtlLayoutMode) {
        Self::update(&mut self.dirty, &mut self.options.rtl_mode, mode);
    }

    pub fn set_ellipsis(&mut self, ellipsis: Option<char>) {
        Self::update(&mut self.dirty, &mut self.options.ellipsis, ellipsis);
    }

    pub fn needs_layout(&self) -> bool {
        self.dirty
    }

    // ---- Queries ----

    pub fn layout(&mut self) -> LayoutResult<TextLayout<'_>> {
        self.ensure_layout()?;
        Ok(TextLayout {
            lines: &self.lines,
            arena: &self.arena,
            width: self.width,
            height: self.height,
        })
    }

    /// Widest line and total height.
    pub fn measured_size(&mut self) -> LayoutResult<(f32, f32)> {
        self.ensure_layout()?;
        Ok((self.width, self.height))
    }

    /// Paragraph embedding level after resolution.
    pub fn paragraph_level(&mut self) -> LayoutResult<u8> {
        self.ensure_layout()?;
        Ok(self.paragraph_level)
    }

    /// Resolved embedding level of every code point.
    pub fn levels(&mut self) -> LayoutResult<&[u8]> {
        self.ensure_layout()?;
        Ok(&self.levels)
    }

    /// Code point indices a caret may rest at, ascending.
    pub fn caret_indices(&mut self) -> LayoutResult<&[usize]> {
        self.ensure_layout()?;
        Ok(&self.caret_stops)
    }

    pub fn hit_test(&mut self, x: f32, y: f32) -> LayoutResult<usize> {
        self.ensure_layout()?;
        Ok(hit_test::hit_test(&self.lines, &self.arena, &self.caret_stops, x, y))
    }

    pub fn caret_info(&mut self, index: usize) -> LayoutResult<CaretInfo> {
        self.ensure_layout()?;
        hit_test::caret_info(&self.lines, &self.arena, self.text.len(), self.paragraph_level, index)
    }

    pub fn paint(
        &mut self,
        canvas: &mut dyn Canvas,
        origin: Point,
        selection: Option<&Selection>,
    ) -> LayoutResult<()> {
        self.ensure_layout()?;
        paint_lines(canvas, &self.lines, &self.arena, origin, selection);
        Ok(())
    }

    // ---- Layout pass ----

    fn ensure_layout(&mut self) -> LayoutResult<()> {
        if !self.dirty {
            return Ok(());
        }
        self.arena.clear();
        self.lines.clear();

        let code_points = self.text.code_points();
        let n = code_points.len();

        self.bidi.init(code_points);
        self.levels.clear();
        self.levels.resize(n, 0);
        let base = self.options.base_direction;
        self.paragraph_level = if self.bidi.needs_resolution() || base == BaseDirection::Rtl {
            self.resolver.resolve(
                self.bidi.types(),
                self.bidi.bracket_types(),
                self.bidi.bracket_values(),
                base.to_bidi(),
                &mut self.levels,
            )?
        } else {
            0
        };
        log::debug!(
            "bidi: {} code points, paragraph level {}",
            n,
            self.paragraph_level
        );

        let order = build_font_runs(
            code_points,
            &self.levels,
            self.text.style_runs(),
            self.fallback.as_mut(),
            self.shaper.as_mut(),
            &mut self.arena,
        )?;

        let empty_style = self
            .text
            .style_runs()
            .last()
            .map_or_else(|| self.default_style.clone(), |run| run.style.clone());
        let shaped = self.shaper.shape(
            &[],
            &empty_style,
            &Typeface::for_style(&empty_style),
            Direction::from_level(self.paragraph_level),
            n,
        );
        let empty = LineMetrics::with_line_height(shaped.ascent, shaped.descent, empty_style.line_height);

        let breaks = self.breaker.breaks(code_points);
        self.lines = LineLayout::new(
            code_points,
            &mut self.arena,
            self.shaper.as_mut(),
            &self.options,
            self.paragraph_level,
            empty,
            order,
        )
        .run(&breaks)?;

        self.caret_stops = grapheme_boundaries(code_points);
        self.finalize();
        self.dirty = false;
        log::debug!(
            "layout: {} lines, size {}x{}",
            self.lines.len(),
            self.width,
            self.height
        );
        Ok(())
    }

    /// Alignment offsets and absolute glyph positions.
    fn finalize(&mut self) {
        self.width = self.lines.iter().map(|line| line.width).fold(0.0, f32::max);
        self.height = self.lines.last().map_or(0.0, TextLine::bottom);

        let rtl = self.paragraph_level % 2 == 1;
        let pinned = rtl && self.options.rtl_mode == RtlLayoutMode::WordStyle && self.options.max_width.is_some();
        let reference = self.options.max_width.unwrap_or(self.width);
        let alignment = match self.options.alignment {
            Alignment::Auto if rtl => Alignment::Right,
            Alignment::Auto => Alignment::Left,
            other => other,
        };

        for line in &mut self.lines {
            line.alignment_offset = match alignment {
                _ if pinned => 0.0,
                Alignment::Center => (reference - line.width) / 2.0,
                Alignment::Right => reference - line.width,
                Alignment::Left | Alignment::Auto => 0.0,
            };
            for &id in &line.runs {
                let run = &mut self.arena[id];
                let dx = line.alignment_offset + run.x;
                run.positions = run
                    .glyph_positions
                    .iter()
                    .map(|p| Point::new(p.x + dx, p.y + line.baseline))
                    .collect();
            }
        }
    }
}

impl std::fmt::Debug for TextBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBlock")
            .field("len", &self.text.len())
            .field("options", &self.options)
            .field("lines", &self.lines.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
