//! Font fallback strategies.

use std::sync::Arc;

use super::{FallbackRun, FontFallback, Typeface};
use crate::core::bidi::{bidi_class, BidiClass};
use crate::layout::style::Style;

/// Every code point is served by the style's own typeface.
#[derive(Debug, Clone, Default)]
pub struct SingleTypeface;

impl FontFallback for SingleTypeface {
    fn font_runs(&mut self, code_points: &[char], style: &Style) -> Vec<FallbackRun> {
        if code_points.is_empty() {
            return Vec::new();
        }
        vec![FallbackRun {
            start: 0,
            length: code_points.len(),
            typeface: Typeface::for_style(style),
        }]
    }
}

/// Switches to a fallback family for code points the primary face does
/// not cover.  Combining marks stay with the face of their base.
pub struct CoverageFallback {
    fallback_family: Arc<str>,
    covers: Box<dyn Fn(char) -> bool + Send>,
}

impl CoverageFallback {
    pub fn new(fallback_family: &str, covers: impl Fn(char) -> bool + Send + 'static) -> Self {
        Self {
            fallback_family: Arc::from(fallback_family),
            covers: Box::new(covers),
        }
    }
}

impl std::fmt::Debug for CoverageFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageFallback")
            .field("fallback_family", &self.fallback_family)
            .finish_non_exhaustive()
    }
}

impl FontFallback for CoverageFallback {
    fn font_runs(&mut self, code_points: &[char], style: &Style) -> Vec<FallbackRun> {
        let primary = Typeface::for_style(style);
        let fallback = Typeface {
            family: self.fallback_family.clone(),
            ..primary.clone()
        };

        let mut runs: Vec<FallbackRun> = Vec::new();
        let mut current: Option<bool> = None;
        for (i, &ch) in code_points.iter().enumerate() {
            let covered = match current {
                Some(prev) if bidi_class(ch) == BidiClass::NSM => prev,
                _ => (self.covers)(ch),
            };
            match runs.last_mut() {
                Some(run) if current == Some(covered) => run.length += 1,
                _ => runs.push(FallbackRun {
                    start: i,
                    length: 1,
                    typeface: if covered { primary.clone() } else { fallback.clone() },
                }),
            }
            current = Some(covered);
        }
        runs
    }
}
