//! Visual reordering (UAX#9 L2).
//!
//! Works on any sequence of levels: per code point, or per run when the
//! placement code reorders font runs within a line.

/// Visual order of the items carrying `levels`.
///
/// From the highest level down to the lowest odd level, every maximal
/// stretch at that level or above is reversed.  Returns logical indices in
/// left-to-right visual order.
pub fn reorder_visual(levels: &[u8]) -> Vec<usize> {
    let n = levels.len();
    let mut order: Vec<usize> = (0..n).collect();

    // Without an odd level nothing is reversed.
    let Some(lowest_odd) = levels.iter().copied().filter(|l| l % 2 == 1).min() else {
        return order;
    };
    let highest = levels.iter().copied().max().unwrap_or(0);

    let mut level = highest;
    while level >= lowest_odd {
        let mut i = 0;
        while i < n {
            if levels[order[i]] < level {
                i += 1;
                continue;
            }
            let start = i;
            while i < n && levels[order[i]] >= level {
                i += 1;
            }
            order[start..i].reverse();
        }
        level -= 1;
    }
    order
}
