//! Unicode Bidirectional Algorithm (UAX#9) resolver.
//!
//! Resolves one embedding level per code point.  The caller's class array
//! is the original classification and is never written; the rules rewrite
//! a working copy owned by the resolver.  Scratch buffers are kept between
//! calls, so a long-lived resolver does not allocate in steady state.

use std::ops::Range;

use super::data::BidiData;
use super::types::*;
use super::view::SequenceView;
use crate::core::error::{LayoutError, LayoutResult};

/// One isolating run sequence (BD13): level runs chained across
/// isolate initiator / matching PDI links.
#[derive(Debug)]
struct IsolatingRunSequence {
    indices: Vec<usize>,
    level: u8,
    sos: BidiClass,
    eos: BidiClass,
}

/// Reusable UAX#9 level resolver.
#[derive(Debug, Default)]
pub struct BidiResolver {
    types: Vec<BidiClass>,
    matching_pdi: Vec<Option<usize>>,
    matching_initiator: Vec<Option<usize>>,
    /// Paragraph indices of characters that survive X9.
    text_index: Vec<usize>,
    run_start: Vec<Option<usize>>,
    runs: Vec<Range<usize>>,
    sequences: Vec<IsolatingRunSequence>,
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> LayoutResult<()> {
    if expected != actual {
        return Err(LayoutError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Least level above `level` with the requested parity.
fn next_level(level: u8, rtl: bool) -> u8 {
    if rtl {
        (level + 1) | 1
    } else {
        (level + 2) & !1
    }
}

impl BidiResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve levels for one paragraph.
    ///
    /// All input arrays and `levels` must have the same length.  Returns
    /// the paragraph embedding level actually used (resolved by P2/P3 when
    /// `direction` is `Auto`).
    pub fn resolve(
        &mut self,
        types: &[BidiClass],
        bracket_types: &[BracketType],
        bracket_values: &[u32],
        direction: BidiDir,
        levels: &mut [u8],
    ) -> LayoutResult<u8> {
        let n = types.len();
        check_len("bracket types", n, bracket_types.len())?;
        check_len("bracket values", n, bracket_values.len())?;
        check_len("levels", n, levels.len())?;

        self.types.clear();
        self.types.extend_from_slice(types);
        self.match_isolates(types);

        let paragraph_level = match direction.explicit_level() {
            Some(level) => level,
            None => self.first_strong_level(types, 0, n).unwrap_or(0),
        };
        if n == 0 {
            return Ok(paragraph_level);
        }

        self.resolve_explicit(types, paragraph_level, levels);
        self.build_sequences(types, paragraph_level, levels)?;

        let sequences = std::mem::take(&mut self.sequences);
        for seq in &sequences {
            let mut view = SequenceView::new(&seq.indices, &mut self.types);
            resolve_weak(&mut view, seq.sos, seq.eos);
            resolve_brackets(
                &mut view,
                types,
                bracket_types,
                bracket_values,
                seq.level,
                seq.sos,
            );
            resolve_neutrals(&mut view, seq.level, seq.sos, seq.eos);
            resolve_implicit(&view, levels);
        }
        log::trace!(
            "bidi: {} code points, paragraph level {}, {} run sequences",
            n,
            paragraph_level,
            sequences.len()
        );
        self.sequences = sequences;

        assign_removed_levels(types, paragraph_level, levels);
        reset_whitespace_levels(types, paragraph_level, levels);
        Ok(paragraph_level)
    }

    /// BD9: pair isolate initiators with their PDIs.
    fn match_isolates(&mut self, types: &[BidiClass]) {
        let n = types.len();
        self.matching_pdi.clear();
        self.matching_pdi.resize(n, None);
        self.matching_initiator.clear();
        self.matching_initiator.resize(n, None);

        let mut pending: Vec<usize> = Vec::new();
        for (i, &class) in types.iter().enumerate() {
            match class {
                BidiClass::LRI | BidiClass::RLI | BidiClass::FSI => pending.push(i),
                BidiClass::PDI => {
                    if let Some(open) = pending.pop() {
                        self.matching_pdi[open] = Some(i);
                        self.matching_initiator[i] = Some(open);
                    }
                }
                BidiClass::B => pending.clear(),
                _ => {}
            }
        }
    }

    /// P2/P3 over `start..end`: level of the first strong character,
    /// skipping isolates.  An initiator without a matching PDI hides the
    /// rest of the range.
    fn first_strong_level(&self, types: &[BidiClass], start: usize, end: usize) -> Option<u8> {
        let mut i = start;
        while i < end {
            match types[i] {
                BidiClass::L => return Some(0),
                BidiClass::R | BidiClass::AL => return Some(1),
                BidiClass::LRI | BidiClass::RLI | BidiClass::FSI => match self.matching_pdi[i] {
                    Some(pdi) => i = pdi,
                    None => return None,
                },
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// X1-X8: explicit levels and directional overrides.
    fn resolve_explicit(&mut self, types: &[BidiClass], paragraph_level: u8, levels: &mut [u8]) {
        let n = types.len();
        let initial = DirectionalStatus {
            level: paragraph_level,
            override_status: Override::Neutral,
            isolate_status: false,
        };
        let mut current = initial;
        let mut stack: Vec<DirectionalStatus> = Vec::with_capacity(MAX_DEPTH as usize + 2);
        let mut overflow_isolates = 0usize;
        let mut overflow_embeddings = 0usize;
        let mut valid_isolates = 0usize;

        for i in 0..n {
            let class = types[i];
            match class {
                // X2-X5
                BidiClass::RLE | BidiClass::LRE | BidiClass::RLO | BidiClass::LRO => {
                    let rtl = matches!(class, BidiClass::RLE | BidiClass::RLO);
                    let level = next_level(current.level, rtl);
                    if level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0 {
                        stack.push(current);
                        current = DirectionalStatus {
                            level,
                            override_status: match class {
                                BidiClass::RLO => Override::RTL,
                                BidiClass::LRO => Override::LTR,
                                _ => Override::Neutral,
                            },
                            isolate_status: false,
                        };
                    } else if overflow_isolates == 0 {
                        overflow_embeddings += 1;
                    }
                    levels[i] = current.level;
                }
                // X5a-X5c
                BidiClass::RLI | BidiClass::LRI | BidiClass::FSI => {
                    levels[i] = current.level;
                    if let Some(forced) = current.override_status.class() {
                        self.types[i] = forced;
                    }
                    let rtl = match class {
                        BidiClass::RLI => true,
                        BidiClass::LRI => false,
                        _ => {
                            let end = self.matching_pdi[i].unwrap_or(n);
                            self.first_strong_level(types, i + 1, end) == Some(1)
                        }
                    };
                    let level = next_level(current.level, rtl);
                    if level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0 {
                        valid_isolates += 1;
                        stack.push(current);
                        current = DirectionalStatus {
                            level,
                            override_status: Override::Neutral,
                            isolate_status: true,
                        };
                    } else {
                        overflow_isolates += 1;
                    }
                }
                // X6a
                BidiClass::PDI => {
                    if overflow_isolates > 0 {
                        overflow_isolates -= 1;
                    } else if valid_isolates > 0 {
                        overflow_embeddings = 0;
                        while !current.isolate_status {
                            match stack.pop() {
                                Some(prev) => current = prev,
                                None => break,
                            }
                        }
                        if let Some(prev) = stack.pop() {
                            current = prev;
                        }
                        valid_isolates -= 1;
                    }
                    levels[i] = current.level;
                    if let Some(forced) = current.override_status.class() {
                        self.types[i] = forced;
                    }
                }
                // X7
                BidiClass::PDF => {
                    if overflow_isolates > 0 {
                        // Inside an overflowed isolate; nothing to pop.
                    } else if overflow_embeddings > 0 {
                        overflow_embeddings -= 1;
                    } else if !current.isolate_status {
                        if let Some(prev) = stack.pop() {
                            current = prev;
                        }
                    }
                    levels[i] = current.level;
                }
                // X8
                BidiClass::B => {
                    levels[i] = paragraph_level;
                    stack.clear();
                    current = initial;
                    overflow_isolates = 0;
                    overflow_embeddings = 0;
                    valid_isolates = 0;
                }
                BidiClass::BN => {
                    levels[i] = current.level;
                }
                // X6
                _ => {
                    levels[i] = current.level;
                    if let Some(forced) = current.override_status.class() {
                        self.types[i] = forced;
                    }
                }
            }
        }
    }

    /// X9, X10 and BD13: level runs over the X9-compacted text, chained
    /// into isolating run sequences with their sos/eos.
    fn build_sequences(
        &mut self,
        types: &[BidiClass],
        paragraph_level: u8,
        levels: &[u8],
    ) -> LayoutResult<()> {
        let n = types.len();
        self.text_index.clear();
        self.text_index
            .extend((0..n).filter(|&i| !types[i].is_removed_by_x9()));
        let m = self.text_index.len();

        self.runs.clear();
        let mut start = 0;
        for k in 1..=m {
            if k == m || levels[self.text_index[k]] != levels[self.text_index[start]] {
                self.runs.push(start..k);
                start = k;
            }
        }

        self.run_start.clear();
        self.run_start.resize(n, None);
        for (r, run) in self.runs.iter().enumerate() {
            self.run_start[self.text_index[run.start]] = Some(r);
        }

        self.sequences.clear();
        for run in &self.runs {
            let first = self.text_index[run.start];
            if types[first] == BidiClass::PDI && self.matching_initiator[first].is_some() {
                // Continuation of a sequence started at the initiator.
                continue;
            }

            let mut indices = Vec::new();
            let mut current = run.clone();
            loop {
                indices.extend_from_slice(&self.text_index[current.clone()]);
                let last = self.text_index[current.end - 1];
                if !types[last].is_isolate_initiator() {
                    break;
                }
                let Some(pdi) = self.matching_pdi[last] else {
                    break;
                };
                match self.run_start[pdi] {
                    Some(r) => current = self.runs[r].clone(),
                    None => {
                        return Err(LayoutError::Internal(format!(
                            "isolate initiator at {} has no level run starting at its PDI {}",
                            last, pdi
                        )))
                    }
                }
            }

            let level = levels[first];
            let prev_level = if run.start > 0 {
                levels[self.text_index[run.start - 1]]
            } else {
                paragraph_level
            };
            let last = indices[indices.len() - 1];
            let next_level = if self.types[last].is_isolate_initiator() {
                paragraph_level
            } else {
                match self.text_index.get(current.end) {
                    Some(&next) => levels[next],
                    None => paragraph_level,
                }
            };

            self.sequences.push(IsolatingRunSequence {
                indices,
                level,
                sos: class_for_level(level.max(prev_level)),
                eos: class_for_level(level.max(next_level)),
            });
        }
        Ok(())
    }
}

/// W1-W7.
fn resolve_weak(view: &mut SequenceView<'_>, sos: BidiClass, eos: BidiClass) {
    let len = view.len();

    // W1
    let mut prev = sos;
    for i in 0..len {
        let class = view.get(i);
        if class == BidiClass::NSM {
            view.set(i, prev);
        } else if class.is_isolate_control() {
            prev = BidiClass::ON;
        } else {
            prev = class;
        }
    }

    // W2
    let mut last_strong = sos;
    for i in 0..len {
        match view.get(i) {
            class @ (BidiClass::L | BidiClass::R | BidiClass::AL) => last_strong = class,
            BidiClass::EN if last_strong == BidiClass::AL => view.set(i, BidiClass::AN),
            _ => {}
        }
    }

    // W3
    for i in 0..len {
        if view.get(i) == BidiClass::AL {
            view.set(i, BidiClass::R);
        }
    }

    // W4
    for i in 1..len.saturating_sub(1) {
        let class = view.get(i);
        if class != BidiClass::ES && class != BidiClass::CS {
            continue;
        }
        let prev = view.get(i - 1);
        let next = view.get(i + 1);
        if prev == BidiClass::EN && next == BidiClass::EN {
            view.set(i, BidiClass::EN);
        } else if class == BidiClass::CS && prev == BidiClass::AN && next == BidiClass::AN {
            view.set(i, BidiClass::AN);
        }
    }

    // W5
    let mut i = 0;
    while i < len {
        if view.get(i) != BidiClass::ET {
            i += 1;
            continue;
        }
        let limit = view.run_limit(i, |c| c == BidiClass::ET);
        let mut adjacent = if i == 0 { sos } else { view.get(i - 1) };
        if adjacent != BidiClass::EN {
            adjacent = if limit == len { eos } else { view.get(limit) };
        }
        if adjacent == BidiClass::EN {
            view.fill(i, limit, BidiClass::EN);
        }
        i = limit;
    }

    // W6
    for i in 0..len {
        if matches!(view.get(i), BidiClass::ES | BidiClass::ET | BidiClass::CS) {
            view.set(i, BidiClass::ON);
        }
    }

    // W7
    let mut last_strong = sos;
    for i in 0..len {
        match view.get(i) {
            class @ (BidiClass::L | BidiClass::R) => last_strong = class,
            BidiClass::EN if last_strong == BidiClass::L => view.set(i, BidiClass::L),
            _ => {}
        }
    }
}

/// N0: paired brackets (BD14-BD16).
fn resolve_brackets(
    view: &mut SequenceView<'_>,
    original: &[BidiClass],
    bracket_types: &[BracketType],
    bracket_values: &[u32],
    level: u8,
    sos: BidiClass,
) {
    let mut openers: Vec<(u32, usize)> = Vec::with_capacity(MAX_BPA_STACK);
    let mut pairs: Vec<(usize, usize)> = Vec::new();

    for i in 0..view.len() {
        if view.get(i) != BidiClass::ON {
            continue;
        }
        let index = view.index(i);
        match bracket_types[index] {
            BracketType::Open => {
                if openers.len() == MAX_BPA_STACK {
                    break;
                }
                openers.push((bracket_values[index], i));
            }
            BracketType::Close => {
                let value = bracket_values[index];
                if let Some(depth) = openers.iter().rposition(|&(v, _)| v == value) {
                    pairs.push((openers[depth].1, i));
                    openers.truncate(depth);
                }
            }
            BracketType::None => {}
        }
    }
    if pairs.is_empty() {
        return;
    }
    pairs.sort_unstable_by_key(|&(open, _)| open);

    let embedding = class_for_level(level);
    let opposite = class_for_level(level + 1);

    for &(open, close) in &pairs {
        let mut found_opposite = false;
        let mut found_embedding = false;
        for k in open + 1..close {
            let strong = view.get(k).neutral_strength();
            if strong == embedding {
                found_embedding = true;
                break;
            }
            if strong == opposite {
                found_opposite = true;
            }
        }

        let resolved = if found_embedding {
            embedding
        } else if found_opposite {
            let context = (0..open)
                .rev()
                .map(|k| view.get(k).neutral_strength())
                .find(|&c| c != BidiClass::ON)
                .unwrap_or(sos);
            if context == opposite {
                opposite
            } else {
                embedding
            }
        } else {
            continue;
        };

        set_bracket_pair(view, original, open, close, resolved);
    }
}

fn set_bracket_pair(
    view: &mut SequenceView<'_>,
    original: &[BidiClass],
    open: usize,
    close: usize,
    class: BidiClass,
) {
    view.set(open, class);
    view.set(close, class);
    for k in open + 1..close {
        if original[view.index(k)] != BidiClass::NSM {
            break;
        }
        view.set(k, class);
    }
    for k in close + 1..view.len() {
        if original[view.index(k)] != BidiClass::NSM {
            break;
        }
        view.set(k, class);
    }
}

/// N1/N2.
fn resolve_neutrals(view: &mut SequenceView<'_>, level: u8, sos: BidiClass, eos: BidiClass) {
    let len = view.len();
    let embedding = class_for_level(level);
    let mut i = 0;
    while i < len {
        if !view.get(i).is_neutral_or_isolate() {
            i += 1;
            continue;
        }
        let limit = view.run_limit(i, BidiClass::is_neutral_or_isolate);
        let leading = if i == 0 {
            sos
        } else {
            view.get(i - 1).neutral_strength()
        };
        let trailing = if limit == len {
            eos
        } else {
            view.get(limit).neutral_strength()
        };
        let resolved = if leading == trailing { leading } else { embedding };
        view.fill(i, limit, resolved);
        i = limit;
    }
}

/// I1/I2.
fn resolve_implicit(view: &SequenceView<'_>, levels: &mut [u8]) {
    for i in 0..view.len() {
        let index = view.index(i);
        let level = levels[index];
        levels[index] = match (level % 2 == 0, view.get(i)) {
            (true, BidiClass::R) => level + 1,
            (true, BidiClass::AN | BidiClass::EN) => level + 2,
            (false, BidiClass::L | BidiClass::AN | BidiClass::EN) => level + 1,
            _ => level,
        };
    }
}

/// Characters removed by X9 take the level of the preceding character.
fn assign_removed_levels(types: &[BidiClass], paragraph_level: u8, levels: &mut [u8]) {
    for i in 0..types.len() {
        if types[i].is_removed_by_x9() {
            levels[i] = if i == 0 { paragraph_level } else { levels[i - 1] };
        }
    }
}

/// L1: separators, and the whitespace before them or at the end of the
/// text, go back to the paragraph level.
fn reset_whitespace_levels(types: &[BidiClass], paragraph_level: u8, levels: &mut [u8]) {
    let mut trailing = true;
    for i in (0..types.len()).rev() {
        let class = types[i];
        if class == BidiClass::B || class == BidiClass::S {
            levels[i] = paragraph_level;
            trailing = true;
        } else if class.is_line_end_whitespace() {
            if trailing {
                levels[i] = paragraph_level;
            }
        } else {
            trailing = false;
        }
    }
}

/// Resolve bidi embedding levels for a line of text.
///
/// Convenience wrapper that derives the class and bracket arrays from the
/// Unicode tables.  Returns one level per `char` of `text`.
pub fn resolve_levels(text: &str, base_dir: BidiDir) -> LayoutResult<Vec<u8>> {
    let chars: Vec<char> = text.chars().collect();
    let mut data = BidiData::new();
    data.init(&chars);
    let mut levels = vec![0u8; chars.len()];
    BidiResolver::new().resolve(
        data.types(),
        data.bracket_types(),
        data.bracket_values(),
        base_dir,
        &mut levels,
    )?;
    Ok(levels)
}
