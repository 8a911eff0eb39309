//! Caret stops at extended grapheme cluster boundaries.

use unicode_segmentation::UnicodeSegmentation;

/// Code point indices where a caret may rest, always including 0 and the
/// text length.
pub fn grapheme_boundaries(code_points: &[char]) -> Vec<usize> {
    let text: String = code_points.iter().collect();
    let mut stops = Vec::with_capacity(code_points.len() + 1);
    let mut byte = 0;
    let mut cp = 0;
    for (offset, _) in text.grapheme_indices(true) {
        while byte < offset {
            byte += code_points[cp].len_utf8();
            cp += 1;
        }
        stops.push(cp);
    }
    if stops.first() != Some(&0) {
        stops.insert(0, 0);
    }
    stops.push(code_points.len());
    stops.dedup();
    stops
}
