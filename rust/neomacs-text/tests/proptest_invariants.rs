//! Property tests for run splitting, text edits and line breaking.

use std::sync::Arc;

use proptest::prelude::*;

use neomacs_text::core::Direction;
use neomacs_text::layout::{FontRun, Style, StyledText};
use neomacs_text::text::{FixedMetricsShaper, Shaper, SingleTypeface, UnicodeLineBreaker};
use neomacs_text::{BaseDirection, Point, TextBlock, Typeface};

const CASES: u32 = 128;

fn style(size: f32) -> Arc<Style> {
    Arc::new(Style::default().with_font_size(size))
}

fn shaped_run(text: &[char], direction: Direction) -> FontRun {
    let style = style(10.0);
    let typeface = Typeface::for_style(&style);
    let shaped = FixedMetricsShaper::new(1.0).shape(text, &style, &typeface, direction, 0);
    let level = direction.base_level();
    FontRun::from_shaped(0, text.len(), level, style, typeface, shaped)
}

fn letters() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop_oneof![Just('a'), Just('b'), Just('\u{05D0}'), Just('\u{0301}')], 2..24)
}

#[derive(Debug, Clone)]
enum Edit {
    Add(String, u8),
    Insert(usize, String, Option<u8>),
    Delete(usize, usize),
    Apply(usize, usize, u8),
}

fn edit() -> impl Strategy<Value = Edit> {
    let text = "[a-c ]{0,5}";
    prop_oneof![
        (text, 0u8..3).prop_map(|(t, s)| Edit::Add(t, s)),
        (any::<usize>(), text, prop::option::of(0u8..3)).prop_map(|(i, t, s)| Edit::Insert(i, t, s)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::Delete(a, b)),
        (any::<usize>(), any::<usize>(), 0u8..3).prop_map(|(a, b, s)| Edit::Apply(a, b, s)),
    ]
}

fn block_with(text: &str, max_width: Option<f32>) -> TextBlock {
    let mut block = TextBlock::with_services(
        Box::new(FixedMetricsShaper::new(1.0)),
        Box::new(SingleTypeface),
        Box::new(UnicodeLineBreaker::new()),
    );
    block.set_default_style(style(10.0));
    block.add_text(text, style(10.0));
    block.set_max_width(max_width);
    block
}

/// Whether some code point other than `index` has a run boundary at `x`
/// on the same line, so a click there cannot single out `index`.
fn shares_x(block: &mut TextBlock, line_index: usize, index: usize, x: f32) -> bool {
    let layout = block.layout().unwrap();
    let line = &layout.lines()[line_index];
    layout.runs(line).any(|run| {
        (run.start..=run.end()).any(|cp| {
            cp != index && (line.alignment_offset + run.x + run.boundary_x(cp) - x).abs() < 0.5
        })
    })
}

/// Ordered pair of positions within `0..=len`.
fn range(len: usize, a: usize, b: usize) -> (usize, usize) {
    let (a, b) = (a % (len + 1), b % (len + 1));
    (a.min(b), a.max(b))
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(CASES))]

    #[test]
    fn split_halves_concatenate_in_visual_order(
        text in letters(),
        rtl in any::<bool>(),
        at in any::<usize>(),
    ) {
        let direction = if rtl { Direction::Rtl } else { Direction::Ltr };
        let original = shaped_run(&text, direction);
        let at = 1 + at % (text.len() - 1);
        let mut head = original.clone();
        let tail = head.split(at).unwrap();

        prop_assert_eq!(head.length + tail.length, original.length);
        prop_assert_eq!(head.width + tail.width, original.width);
        prop_assert!(head.clusters.iter().all(|&c| c < at));
        prop_assert!(tail.clusters.iter().all(|&c| c >= at));

        let (left, right) = if rtl { (&tail, &head) } else { (&head, &tail) };
        let ids: Vec<u16> = left.glyph_ids.iter().chain(&right.glyph_ids).copied().collect();
        prop_assert_eq!(&ids, &original.glyph_ids);
        let clusters: Vec<usize> = left.clusters.iter().chain(&right.clusters).copied().collect();
        prop_assert_eq!(&clusters, &original.clusters);
        let positions: Vec<Point> = left
            .glyph_positions
            .iter()
            .copied()
            .chain(right.glyph_positions.iter().map(|p| Point::new(p.x + left.width, p.y)))
            .collect();
        prop_assert_eq!(&positions, &original.glyph_positions);
    }

    #[test]
    fn leading_width_is_monotonic(text in letters(), rtl in any::<bool>()) {
        let direction = if rtl { Direction::Rtl } else { Direction::Ltr };
        let run = shaped_run(&text, direction);
        for cp in 0..run.length {
            prop_assert!(run.leading_width(cp) <= run.leading_width(cp + 1));
            if rtl {
                prop_assert!(run.boundary_x(cp) >= run.boundary_x(cp + 1));
            } else {
                prop_assert!(run.boundary_x(cp) <= run.boundary_x(cp + 1));
            }
        }
    }

    #[test]
    fn style_runs_partition_text_after_edits(edits in prop::collection::vec(edit(), 1..24)) {
        let styles = [style(10.0), style(12.0), style(14.0)];
        let mut text = StyledText::new();
        for edit in edits {
            let len = text.len();
            match edit {
                Edit::Add(t, s) => text.add_text(&t, styles[s as usize].clone()),
                Edit::Insert(i, t, s) => {
                    let style = s.map(|s| styles[s as usize].clone());
                    text.insert(i % (len + 1), &t, style).unwrap();
                }
                Edit::Delete(a, b) => {
                    let (start, end) = range(len, a, b);
                    text.delete(start, end).unwrap();
                }
                Edit::Apply(a, b, s) => {
                    let (start, end) = range(len, a, b);
                    text.apply_style(start, end, styles[s as usize].clone()).unwrap();
                }
            }
            prop_assert!(text.check_invariants().is_ok(), "{:?}", text.check_invariants());
            let covered: usize = text.style_runs().iter().map(|r| r.length).sum();
            prop_assert_eq!(covered, text.len());
        }
    }

    #[test]
    fn lines_tile_the_text_and_fit(
        text in "[a-e\u{05D0}-\u{05D4} ]{1,60}",
        max_width in 10.0f32..120.0,
    ) {
        let max_width = (max_width / 10.0).floor() * 10.0;
        let mut block = block_with(&text, Some(max_width));
        let len = block.len();
        let layout = block.layout().unwrap();
        let lines = layout.lines();

        prop_assert_eq!(lines[0].start, 0);
        prop_assert_eq!(lines[lines.len() - 1].end, len);
        for pair in lines.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].end > pair[0].start);
        }
        for line in lines {
            prop_assert!(line.width <= max_width, "line {:?} wider than {}", line, max_width);
        }
    }

    #[test]
    fn hit_test_finds_every_caret(
        text in "[ab\u{05D0}\u{05D1} \n]{1,30}",
        rtl in any::<bool>(),
        max_width in prop::option::of(prop_oneof![Just(30.0f32), Just(50.0), Just(80.0)]),
    ) {
        let mut block = block_with(&text, max_width);
        if rtl {
            block.set_base_direction(BaseDirection::Rtl);
        }
        let stops = block.caret_indices().unwrap().to_vec();
        for index in stops {
            let caret = block.caret_info(index).unwrap();
            if shares_x(&mut block, caret.line_index, index, caret.x) {
                continue;
            }
            let y = (caret.top + caret.bottom) / 2.0;
            let hit = block.hit_test(caret.x, y).unwrap();
            prop_assert_eq!(hit, index, "caret at x {} on line {}", caret.x, caret.line_index);
        }
    }
}
