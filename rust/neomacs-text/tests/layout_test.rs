//! End-to-end layout through `TextBlock`.

use std::sync::Arc;

use neomacs_text::text::{CoverageFallback, FixedMetricsShaper, UnicodeLineBreaker};
use neomacs_text::{
    BaseDirection, Color, FontRunKind, Point, Rect, RtlLayoutMode, Selection, Style, TextBlock,
    Typeface,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn style() -> Arc<Style> {
    Arc::new(Style::default().with_font_size(10.0))
}

/// 10 units per visible code point, 10-unit lines.
fn block(text: &str) -> TextBlock {
    init_logger();
    let mut block = TextBlock::with_services(
        Box::new(FixedMetricsShaper::new(1.0)),
        Box::new(neomacs_text::text::SingleTypeface),
        Box::new(UnicodeLineBreaker::new()),
    );
    block.set_default_style(style());
    block.add_text(text, style());
    block
}

fn line_ranges(block: &mut TextBlock) -> Vec<(usize, usize)> {
    let layout = block.layout().unwrap();
    layout.lines().iter().map(|l| (l.start, l.end)).collect()
}

#[test]
fn wraps_at_word_boundaries() {
    let mut b = block("Apples Pears Bananas");
    b.set_max_width(Some(100.0));
    assert_eq!(line_ranges(&mut b), vec![(0, 7), (7, 13), (13, 20)]);

    let layout = b.layout().unwrap();
    let widths: Vec<f32> = layout.lines().iter().map(|l| l.width).collect();
    assert_eq!(widths, vec![60.0, 50.0, 70.0]);
    for line in layout.lines() {
        // Trailing spaces hang past the content and are never measured.
        let content: f32 = layout
            .runs(line)
            .filter(|run| run.kind != FontRunKind::TrailingWhitespace)
            .map(|run| run.width)
            .sum();
        assert_eq!(content, line.width);
    }
    assert_eq!(layout.size(), (70.0, 30.0));
}

#[test]
fn max_lines_one_truncates_with_ellipsis() {
    let mut b = block("Apples Pears Bananas");
    b.set_max_width(Some(100.0));
    b.set_max_lines(Some(1));
    let layout = b.layout().unwrap();
    assert_eq!(layout.lines().len(), 1);
    let line = &layout.lines()[0];
    let last = layout.run(*line.runs.last().unwrap()).unwrap();
    assert_eq!(last.kind, FontRunKind::Ellipsis);
    assert_eq!(last.length, 0);
    assert!(line.width <= 100.0);
    assert!(line.truncated);
}

#[test]
fn ellipsis_can_be_disabled() {
    let mut b = block("Apples Pears Bananas");
    b.set_max_width(Some(100.0));
    b.set_max_lines(Some(1));
    b.set_ellipsis(None);
    let layout = b.layout().unwrap();
    let line = &layout.lines()[0];
    assert!(line.truncated);
    assert!(layout.runs(line).all(|run| run.kind != FontRunKind::Ellipsis));
}

#[test]
fn max_height_limits_lines() {
    let mut b = block("Apples Pears Bananas");
    b.set_max_width(Some(70.0));
    b.set_max_height(Some(25.0));
    let (_, height) = b.measured_size().unwrap();
    assert_eq!(height, 20.0);
}

#[test]
fn mixed_direction_line() {
    // "abc " then three Hebrew letters: the Hebrew run is reversed in place.
    let mut b = block("abc \u{05D0}\u{05D1}\u{05D2}");
    assert_eq!(b.levels().unwrap(), &[0, 0, 0, 0, 1, 1, 1]);
    assert_eq!(b.caret_info(4).unwrap().x, 70.0);
    assert_eq!(b.caret_info(7).unwrap().x, 40.0);
}

#[test]
fn rtl_base_direction() {
    let mut b = block("abc");
    b.set_base_direction(BaseDirection::Rtl);
    b.set_max_width(Some(100.0));
    assert_eq!(b.paragraph_level().unwrap(), 1);
    let layout = b.layout().unwrap();
    // Auto alignment follows the paragraph: right-aligned.
    assert_eq!(layout.lines()[0].alignment_offset, 70.0);
}

#[test]
fn word_style_groups_flow_right_to_left() {
    let mut b = block("\u{05D0}\u{05D1} abc \u{05D2}");
    b.set_base_direction(BaseDirection::Rtl);
    b.set_rtl_mode(RtlLayoutMode::WordStyle);
    b.set_max_width(Some(100.0));
    let layout = b.layout().unwrap();
    let line = &layout.lines()[0];
    // Runs of alternating direction: each group sits left of the one
    // before it.
    assert_eq!(line.runs.len(), 3);
    let mut previous_left = f32::INFINITY;
    for run in layout.runs(line) {
        assert!(run.x + run.width <= previous_left);
        previous_left = run.x;
    }
    let right = layout.runs(line).map(|r| r.x + r.width).fold(0.0, f32::max);
    assert_eq!(right, 100.0);
}

fn assert_hit_test_idempotent(b: &mut TextBlock) {
    let stops = b.caret_indices().unwrap().to_vec();
    for index in stops {
        let caret = b.caret_info(index).unwrap();
        let y = (caret.top + caret.bottom) / 2.0;
        assert_eq!(b.hit_test(caret.x, y).unwrap(), index, "caret {} at x {}", index, caret.x);
    }
}

#[test]
fn hit_test_round_trips_ltr() {
    let mut b = block("Apples Pears Bananas");
    b.set_max_width(Some(100.0));
    assert_hit_test_idempotent(&mut b);
}

#[test]
fn hit_test_round_trips_rtl() {
    let mut b = block("\u{05E9}\u{05DC}\u{05D5}\u{05DD} \u{05E2}\u{05D5}\u{05DC}\u{05DD}");
    b.set_max_width(Some(60.0));
    assert_eq!(b.layout().unwrap().lines().len(), 2);
    assert_hit_test_idempotent(&mut b);
}

#[test]
fn hit_test_round_trips_mixed() {
    let mut b = block("abc \u{05D0}\u{05D1}\u{05D2}");
    assert_hit_test_idempotent(&mut b);
}

#[test]
fn hard_break_in_rtl_paragraph_does_not_capture_clicks() {
    let mut b = block("ab\ncd");
    b.set_base_direction(BaseDirection::Rtl);
    let layout = b.layout().unwrap();
    assert_eq!(layout.lines().len(), 2);
    let newline = layout.runs(&layout.lines()[0]).last().unwrap();
    assert_eq!(newline.kind, FontRunKind::TrailingWhitespace);
    assert_eq!(newline.width, 0.0);

    assert_eq!(b.caret_info(1).unwrap().x, 10.0);
    assert_eq!(b.hit_test(10.0, 5.0).unwrap(), 1);
    assert_eq!(b.hit_test(1.0, 5.0).unwrap(), 0);
    assert_eq!(b.hit_test(19.0, 5.0).unwrap(), 2);
    assert_eq!(b.hit_test(25.0, 5.0).unwrap(), 2);
    assert_eq!(b.hit_test(11.0, 15.0).unwrap(), 4);
}

#[test]
fn hit_test_keeps_caret_before_soft_wrap() {
    let mut b = block("Apples Pears");
    b.set_max_width(Some(80.0));
    assert_eq!(b.hit_test(500.0, 5.0).unwrap(), 6);
    assert_eq!(b.hit_test(500.0, 15.0).unwrap(), 12);
}

#[test]
fn grapheme_clusters_are_caret_stops() {
    let mut b = block("e\u{0301}x");
    assert_eq!(b.caret_indices().unwrap(), &[0, 2, 3]);
    // The combining mark has no width; a click on the "e" lands before
    // or after the whole cluster.
    assert_eq!(b.hit_test(9.0, 5.0).unwrap(), 2);
}

#[test]
fn edits_relayout() {
    let mut b = block("Apples Pears");
    b.set_max_width(Some(100.0));
    assert_eq!(line_ranges(&mut b).len(), 2);
    b.delete(6, 12).unwrap();
    assert_eq!(line_ranges(&mut b), vec![(0, 6)]);
    b.insert(6, "!", None).unwrap();
    assert_eq!(b.measured_size().unwrap(), (70.0, 10.0));
    b.apply_style(0, 1, Arc::new(Style::default().with_font_size(20.0))).unwrap();
    let (width, height) = b.measured_size().unwrap();
    assert_eq!((width, height), (80.0, 20.0));
}

#[test]
fn coverage_fallback_splits_runs() {
    init_logger();
    let mut b = TextBlock::with_services(
        Box::new(FixedMetricsShaper::new(1.0)),
        Box::new(CoverageFallback::new("symbols", |ch: char| ch.is_ascii())),
        Box::new(UnicodeLineBreaker::new()),
    );
    b.add_text("ab\u{2603}c", style());
    let layout = b.layout().unwrap();
    let faces: Vec<&str> = layout
        .runs(&layout.lines()[0])
        .map(|run| run.typeface.family.as_ref())
        .collect();
    assert_eq!(faces, vec!["monospace", "symbols", "monospace"]);
}

#[derive(Default)]
struct CountingCanvas {
    rects: Vec<Rect>,
    glyph_runs: usize,
    glyphs: usize,
}

impl neomacs_text::Canvas for CountingCanvas {
    fn fill_rect(&mut self, rect: Rect, _color: Color) {
        self.rects.push(rect);
    }

    fn draw_glyphs(&mut self, glyph_ids: &[u16], _positions: &[Point], _typeface: &Typeface, _style: &Style) {
        self.glyph_runs += 1;
        self.glyphs += glyph_ids.len();
    }

    fn draw_line(&mut self, _from: Point, _to: Point, _thickness: f32, _color: Color) {}
}

#[test]
fn paint_skips_trailing_whitespace() {
    let mut b = block("Apples Pears Bananas");
    b.set_max_width(Some(100.0));
    let mut canvas = CountingCanvas::default();
    let selection = Selection { range: 0..3, color: Color::WHITE };
    b.paint(&mut canvas, Point::new(5.0, 5.0), Some(&selection)).unwrap();
    assert_eq!(canvas.glyph_runs, 3);
    assert_eq!(canvas.glyphs, 18);
    assert_eq!(canvas.rects, vec![Rect::new(5.0, 5.0, 30.0, 10.0)]);
}
