//! UAX #14 line break candidates.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use super::{LineBreak, LineBreaker};

/// Whether `ch` is trailing whitespace that a line may hang past its
/// measured end: spaces, tabs and line terminators.  No-break spaces are
/// content.
pub fn is_space(ch: char) -> bool {
    match ch {
        '\u{A0}' | '\u{2007}' | '\u{202F}' | '\u{FEFF}' => false,
        ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}' => true,
        other => other.is_whitespace(),
    }
}

/// Line terminators that force a break after themselves.
pub fn is_hard_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Line breaker backed by `unicode-linebreak`.  The UTF-8 buffer is kept
/// between calls.
#[derive(Debug, Default)]
pub struct UnicodeLineBreaker {
    text: String,
}

impl UnicodeLineBreaker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineBreaker for UnicodeLineBreaker {
    fn breaks(&mut self, code_points: &[char]) -> Vec<LineBreak> {
        let n = code_points.len();
        if n == 0 {
            return vec![LineBreak {
                measure: 0,
                wrap: 0,
                required: false,
            }];
        }
        self.text.clear();
        self.text.extend(code_points);

        let mut result = Vec::new();
        let mut byte = 0;
        let mut cp = 0;
        let mut prev_wrap = 0;
        for (offset, opportunity) in linebreaks(&self.text) {
            while byte < offset && cp < n {
                byte += code_points[cp].len_utf8();
                cp += 1;
            }
            let wrap = cp;
            let mut measure = wrap;
            while measure > prev_wrap && is_space(code_points[measure - 1]) {
                measure -= 1;
            }
            let required = match opportunity {
                BreakOpportunity::Mandatory if wrap == n => is_hard_break(code_points[n - 1]),
                BreakOpportunity::Mandatory => true,
                BreakOpportunity::Allowed => false,
            };
            result.push(LineBreak {
                measure,
                wrap,
                required,
            });
            prev_wrap = wrap;
        }

        if result.last().map(|b| b.wrap) != Some(n) {
            // Always offer the end of the text.
            let mut measure = n;
            while measure > prev_wrap && is_space(code_points[measure - 1]) {
                measure -= 1;
            }
            result.push(LineBreak {
                measure,
                wrap: n,
                required: false,
            });
        }
        log::trace!("line breaker: {} candidates for {} code points", result.len(), n);
        result
    }
}
