//! Visual styles and the styled code point buffer.

use std::sync::Arc;

use crate::core::error::{LayoutError, LayoutResult};
use crate::core::types::Color;

/// Underline rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Solid,
    /// Solid line interrupted around glyph descenders.
    Gapped,
}

/// Visual style of a range of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font_family: Arc<str>,
    pub font_size: f32,
    pub weight: u16,
    pub italic: bool,
    pub text_color: Color,
    pub background: Option<Color>,
    pub underline: UnderlineStyle,
    pub strike_through: bool,
    /// Line height as a multiple of the natural ascent + descent.
    pub line_height: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: Arc::from("monospace"),
            font_size: 16.0,
            weight: 400,
            italic: false,
            text_color: Color::BLACK,
            background: None,
            underline: UnderlineStyle::None,
            strike_through: false,
            line_height: 1.0,
        }
    }
}

impl Style {
    pub fn with_font_family(mut self, family: &str) -> Self {
        self.font_family = Arc::from(family);
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_underline(mut self, underline: UnderlineStyle) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_strike_through(mut self, strike: bool) -> Self {
        self.strike_through = strike;
        self
    }

    pub fn with_line_height(mut self, multiplier: f32) -> Self {
        self.line_height = multiplier;
        self
    }
}

/// A style applied to `[start, start + length)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRun {
    pub start: usize,
    pub length: usize,
    pub style: Arc<Style>,
}

impl StyleRun {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Code points plus a style partition.
///
/// The style runs cover `[0, len)` without gaps or overlaps, no run is
/// empty, and adjacent runs never carry equal styles.
#[derive(Debug, Clone, Default)]
pub struct StyledText {
    code_points: Vec<char>,
    runs: Vec<StyleRun>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.code_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_points.is_empty()
    }

    pub fn code_points(&self) -> &[char] {
        &self.code_points
    }

    pub fn style_runs(&self) -> &[StyleRun] {
        &self.runs
    }

    pub fn clear(&mut self) {
        self.code_points.clear();
        self.runs.clear();
    }

    /// Style in effect at `index`.  At the end of the text this is the
    /// style of the last run.
    pub fn style_at(&self, index: usize) -> Option<&Arc<Style>> {
        let i = self.runs.partition_point(|run| run.end() <= index);
        self.runs.get(i).or_else(|| self.runs.last()).map(|run| &run.style)
    }

    /// Append text in `style`.
    pub fn add_text(&mut self, text: &str, style: Arc<Style>) {
        let start = self.code_points.len();
        self.code_points.extend(text.chars());
        let length = self.code_points.len() - start;
        if length == 0 {
            return;
        }
        self.runs.push(StyleRun {
            start,
            length,
            style,
        });
        self.coalesce();
    }

    /// Insert text at `index`.  Without an explicit style the text takes
    /// the style of the code point before it (or after it, at index 0).
    pub fn insert(&mut self, index: usize, text: &str, style: Option<Arc<Style>>) -> LayoutResult<()> {
        let len = self.len();
        if index > len {
            return Err(LayoutError::ArgumentOutOfRange { index, len });
        }
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        if count == 0 {
            return Ok(());
        }
        let style = match style {
            Some(style) => style,
            None => match self.style_at(index.saturating_sub(1)) {
                Some(style) => style.clone(),
                None => Arc::new(Style::default()),
            },
        };

        self.code_points.splice(index..index, inserted);

        // Split the run containing `index`, shift the rest.
        let mut runs = Vec::with_capacity(self.runs.len() + 2);
        let mut placed = false;
        for run in self.runs.drain(..) {
            if run.end() <= index {
                runs.push(run);
                continue;
            }
            if !placed {
                if run.start < index {
                    runs.push(StyleRun {
                        start: run.start,
                        length: index - run.start,
                        style: run.style.clone(),
                    });
                }
                runs.push(StyleRun {
                    start: index,
                    length: count,
                    style: style.clone(),
                });
                placed = true;
                let tail_start = run.start.max(index);
                runs.push(StyleRun {
                    start: tail_start + count,
                    length: run.end() - tail_start,
                    style: run.style,
                });
                continue;
            }
            runs.push(StyleRun {
                start: run.start + count,
                ..run
            });
        }
        if !placed {
            runs.push(StyleRun {
                start: index,
                length: count,
                style,
            });
        }
        self.runs = runs;
        self.coalesce();
        Ok(())
    }

    /// Delete `[start, end)`.
    pub fn delete(&mut self, start: usize, end: usize) -> LayoutResult<()> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        self.code_points.drain(start..end);
        let removed = end - start;
        for run in &mut self.runs {
            let run_end = run.end();
            let overlap = run_end.min(end).saturating_sub(run.start.max(start));
            run.length -= overlap;
            if run.start >= end {
                run.start -= removed;
            } else if run.start > start {
                run.start = start;
            }
        }
        self.runs.retain(|run| run.length > 0);
        self.coalesce();
        Ok(())
    }

    /// Replace the style of `[start, end)`.
    pub fn apply_style(&mut self, start: usize, end: usize, style: Arc<Style>) -> LayoutResult<()> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        let mut runs = Vec::with_capacity(self.runs.len() + 2);
        for run in self.runs.drain(..) {
            let run_end = run.end();
            if run_end <= start || run.start >= end {
                runs.push(run);
                continue;
            }
            if run.start < start {
                runs.push(StyleRun {
                    start: run.start,
                    length: start - run.start,
                    style: run.style.clone(),
                });
            }
            if run_end > end {
                runs.push(StyleRun {
                    start: end,
                    length: run_end - end,
                    style: run.style,
                });
            }
        }
        let at = runs.partition_point(|run| run.start < start);
        runs.insert(
            at,
            StyleRun {
                start,
                length: end - start,
                style,
            },
        );
        self.runs = runs;
        self.coalesce();
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> LayoutResult<()> {
        let len = self.len();
        if end > len {
            return Err(LayoutError::ArgumentOutOfRange { index: end, len });
        }
        if start > end {
            return Err(LayoutError::InvalidRange { start, end });
        }
        Ok(())
    }

    /// Merge neighbours with equal styles.
    fn coalesce(&mut self) {
        let mut merged: Vec<StyleRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(prev) if Arc::ptr_eq(&prev.style, &run.style) || *prev.style == *run.style => {
                    prev.length += run.length;
                }
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Verify the partition invariant.
    pub fn check_invariants(&self) -> LayoutResult<()> {
        let mut expected = 0;
        for (i, run) in self.runs.iter().enumerate() {
            if run.start != expected {
                return Err(LayoutError::Internal(format!(
                    "style run {} starts at {}, expected {}",
                    i, run.start, expected
                )));
            }
            if run.length == 0 {
                return Err(LayoutError::Internal(format!("style run {} is empty", i)));
            }
            if i > 0 && *self.runs[i - 1].style == *run.style {
                return Err(LayoutError::Internal(format!(
                    "style runs {} and {} were not coalesced",
                    i - 1,
                    i
                )));
            }
            expected = run.end();
        }
        if expected != self.len() {
            return Err(LayoutError::Internal(format!(
                "style runs cover {} of {} code points",
                expected,
                self.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Arc<Style> {
        Arc::new(Style {
            weight: 700,
            ..Style::default()
        })
    }

    fn plain() -> Arc<Style> {
        Arc::new(Style::default())
    }

    fn spans(text: &StyledText) -> Vec<(usize, usize, u16)> {
        text.style_runs()
            .iter()
            .map(|r| (r.start, r.length, r.style.weight))
            .collect()
    }

    #[test]
    fn test_add_text_coalesces_equal_styles() {
        let mut text = StyledText::new();
        text.add_text("Hello ", plain());
        text.add_text("world", plain());
        assert_eq!(spans(&text), vec![(0, 11, 400)]);
        text.add_text("!", bold());
        assert_eq!(spans(&text), vec![(0, 11, 400), (11, 1, 700)]);
        text.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_inherits_preceding_style() {
        let mut text = StyledText::new();
        text.add_text("ab", plain());
        text.add_text("cd", bold());
        text.insert(3, "XY", None).unwrap();
        assert_eq!(text.code_points().iter().collect::<String>(), "abcXYd");
        assert_eq!(spans(&text), vec![(0, 2, 400), (2, 4, 700)]);
        text.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_with_style_splits_run() {
        let mut text = StyledText::new();
        text.add_text("abcd", plain());
        text.insert(2, "X", Some(bold())).unwrap();
        assert_eq!(spans(&text), vec![(0, 2, 400), (2, 1, 700), (3, 2, 400)]);
        text.insert(5, "!", Some(bold())).unwrap();
        assert_eq!(spans(&text), vec![(0, 2, 400), (2, 1, 700), (3, 2, 400), (5, 1, 700)]);
        text.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_into_empty_text() {
        let mut text = StyledText::new();
        text.insert(0, "abc", None).unwrap();
        assert_eq!(spans(&text), vec![(0, 3, 400)]);
        assert!(text.insert(5, "x", None).is_err());
    }

    #[test]
    fn test_delete_across_runs() {
        let mut text = StyledText::new();
        text.add_text("aa", plain());
        text.add_text("bb", bold());
        text.add_text("cc", plain());
        text.delete(1, 5).unwrap();
        assert_eq!(text.code_points().iter().collect::<String>(), "ac");
        assert_eq!(spans(&text), vec![(0, 2, 400)]);
        text.check_invariants().unwrap();
    }

    #[test]
    fn test_apply_style() {
        let mut text = StyledText::new();
        text.add_text("abcdef", plain());
        text.apply_style(1, 3, bold()).unwrap();
        assert_eq!(spans(&text), vec![(0, 1, 400), (1, 2, 700), (3, 3, 400)]);
        text.apply_style(0, 6, plain()).unwrap();
        assert_eq!(spans(&text), vec![(0, 6, 400)]);
        assert!(text.apply_style(4, 2, bold()).is_err());
        assert!(text.apply_style(0, 7, bold()).is_err());
    }

    #[test]
    fn test_reversed_range_reports_indices() {
        let mut text = StyledText::new();
        text.add_text("abcdef", plain());
        assert!(matches!(
            text.delete(5, 2),
            Err(LayoutError::InvalidRange { start: 5, end: 2 })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_invalid_range_keeps_wide_indices() {
        let mut text = StyledText::new();
        text.add_text("abcdef", plain());
        let far = u32::MAX as usize + 7;
        assert!(matches!(
            text.apply_style(far, 3, bold()),
            Err(LayoutError::InvalidRange { start, end: 3 }) if start == far
        ));
    }

    #[test]
    fn test_style_at() {
        let mut text = StyledText::new();
        text.add_text("ab", plain());
        text.add_text("cd", bold());
        assert_eq!(text.style_at(1).map(|s| s.weight), Some(400));
        assert_eq!(text.style_at(2).map(|s| s.weight), Some(700));
        assert_eq!(text.style_at(4).map(|s| s.weight), Some(700));
    }
}
