//! Directional run building: resolved levels x style runs -> font runs.

use std::ops::Range;

use super::font_run::{FontRun, RunId};
use super::style::StyleRun;
use crate::core::arena::Arena;
use crate::core::error::{LayoutError, LayoutResult};
use crate::core::types::Direction;
use crate::text::{FontFallback, Shaper};

/// Maximal constant-level ranges of `levels`.
pub fn level_runs(levels: &[u8]) -> Vec<(Range<usize>, u8)> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=levels.len() {
        if i == levels.len() || levels[i] != levels[start] {
            runs.push((start..i, levels[start]));
            start = i;
        }
    }
    runs
}

/// Shape `code_points` into font runs, in logical order.
///
/// A new sub-range starts at every level change and every style change;
/// each sub-range is split further by font fallback and shaped per
/// typeface.
pub fn build_font_runs(
    code_points: &[char],
    levels: &[u8],
    style_runs: &[StyleRun],
    fallback: &mut dyn FontFallback,
    shaper: &mut dyn Shaper,
    arena: &mut Arena<FontRun>,
) -> LayoutResult<Vec<RunId>> {
    let n = code_points.len();
    if levels.len() != n {
        return Err(LayoutError::LengthMismatch {
            what: "levels",
            expected: n,
            actual: levels.len(),
        });
    }

    let directional = level_runs(levels);
    let mut order = Vec::with_capacity(directional.len() + style_runs.len());
    let (mut d, mut s) = (0, 0);
    let mut pos = 0;
    while pos < n {
        let (Some((range, level)), Some(style_run)) = (directional.get(d), style_runs.get(s)) else {
            return Err(LayoutError::Internal(format!(
                "style runs do not cover code point {}",
                pos
            )));
        };
        if style_run.start > pos || style_run.end() <= pos {
            return Err(LayoutError::Internal(format!(
                "style run {}..{} does not contain code point {}",
                style_run.start,
                style_run.end(),
                pos
            )));
        }
        let end = range.end.min(style_run.end());
        let direction = Direction::from_level(*level);
        let slice = &code_points[pos..end];

        let mut covered = 0;
        for fb in fallback.font_runs(slice, &style_run.style) {
            if fb.start != covered || fb.length == 0 || fb.start + fb.length > slice.len() {
                return Err(LayoutError::Internal(format!(
                    "font fallback run {}+{} breaks the cover of {}..{}",
                    fb.start, fb.length, pos, end
                )));
            }
            let start = pos + fb.start;
            let shaped = shaper.shape(
                &slice[fb.start..fb.start + fb.length],
                &style_run.style,
                &fb.typeface,
                direction,
                start,
            );
            order.push(arena.insert(FontRun::from_shaped(
                start,
                fb.length,
                *level,
                style_run.style.clone(),
                fb.typeface,
                shaped,
            )));
            covered += fb.length;
        }
        if covered != slice.len() {
            return Err(LayoutError::Internal(format!(
                "font fallback covered {} of {} code points at {}",
                covered,
                slice.len(),
                pos
            )));
        }

        pos = end;
        if pos == range.end {
            d += 1;
        }
        if pos == style_run.end() {
            s += 1;
        }
    }

    log::debug!(
        "run builder: {} level runs, {} style runs -> {} font runs",
        directional.len(),
        style_runs.len(),
        order.len()
    );
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::style::{Style, StyledText};
    use crate::text::{FixedMetricsShaper, SingleTypeface};
    use std::sync::Arc;

    #[test]
    fn test_level_runs() {
        assert_eq!(
            level_runs(&[0, 0, 1, 1, 2, 0]),
            vec![(0..2, 0), (2..4, 1), (4..5, 2), (5..6, 0)]
        );
        assert!(level_runs(&[]).is_empty());
    }

    #[test]
    fn test_levels_and_styles_intersect() {
        let mut text = StyledText::new();
        text.add_text("abc", Arc::new(Style::default()));
        text.add_text(
            "d\u{05D0}\u{05D1}",
            Arc::new(Style::default().with_font_size(20.0)),
        );
        let levels = [0, 0, 0, 0, 1, 1];
        let mut arena = Arena::new();
        let order = build_font_runs(
            text.code_points(),
            &levels,
            text.style_runs(),
            &mut SingleTypeface,
            &mut FixedMetricsShaper::default(),
            &mut arena,
        )
        .unwrap();
        let spans: Vec<(usize, usize, u8)> = order
            .iter()
            .map(|&id| (arena[id].start, arena[id].length, arena[id].level))
            .collect();
        assert_eq!(spans, vec![(0, 3, 0), (3, 1, 0), (4, 2, 1)]);
        assert!(arena[order[2]].is_rtl());
        assert_eq!(arena[order[2]].clusters, vec![5, 4]);
    }

    #[test]
    fn test_level_length_mismatch() {
        let mut text = StyledText::new();
        text.add_text("ab", Arc::new(Style::default()));
        let mut arena = Arena::new();
        let err = build_font_runs(
            text.code_points(),
            &[0],
            text.style_runs(),
            &mut SingleTypeface,
            &mut FixedMetricsShaper::default(),
            &mut arena,
        );
        assert!(matches!(err, Err(LayoutError::LengthMismatch { .. })));
    }
}
