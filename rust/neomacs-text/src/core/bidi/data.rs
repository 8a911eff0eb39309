//! Per-code-point bidi data derived from the Unicode tables.
//!
//! Bidi classes come from `unicode-bidi`'s hardcoded `DerivedBidiClass`
//! data, compacted once into a [`CodePointTrie`] so that preparing a
//! paragraph is an O(1) lookup per code point.  Paired bracket data
//! (BidiBrackets.txt) is looked up directly; brackets are rare.

use std::sync::OnceLock;

use unicode_bidi::{BidiDataSource, HardcodedBidiData};

use super::types::{BidiClass, BracketType};
use crate::core::trie::{CodePointTrie, TrieBuilder, MAX_CODEPOINT};

static CLASS_TABLE: OnceLock<CodePointTrie<BidiClass>> = OnceLock::new();

fn from_unicode(class: unicode_bidi::BidiClass) -> BidiClass {
    use unicode_bidi::BidiClass as U;
    match class {
        U::L => BidiClass::L,
        U::R => BidiClass::R,
        U::AL => BidiClass::AL,
        U::EN => BidiClass::EN,
        U::ES => BidiClass::ES,
        U::ET => BidiClass::ET,
        U::AN => BidiClass::AN,
        U::CS => BidiClass::CS,
        U::NSM => BidiClass::NSM,
        U::BN => BidiClass::BN,
        U::B => BidiClass::B,
        U::S => BidiClass::S,
        U::WS => BidiClass::WS,
        U::ON => BidiClass::ON,
        U::LRE => BidiClass::LRE,
        U::LRO => BidiClass::LRO,
        U::RLE => BidiClass::RLE,
        U::RLO => BidiClass::RLO,
        U::PDF => BidiClass::PDF,
        U::LRI => BidiClass::LRI,
        U::RLI => BidiClass::RLI,
        U::FSI => BidiClass::FSI,
        U::PDI => BidiClass::PDI,
    }
}

fn build_class_table() -> CodePointTrie<BidiClass> {
    let source = HardcodedBidiData;
    // Surrogates are not chars; they keep the ON default.
    let mut builder = TrieBuilder::new(BidiClass::ON, BidiClass::ON);
    let mut run: Option<(u32, BidiClass)> = None;

    fn flush(builder: &mut TrieBuilder<BidiClass>, start: u32, end: u32, class: BidiClass) {
        if let Err(err) = builder.set_range(start, end, class, true) {
            log::error!("bidi class table: {}", err);
        }
    }

    for cp in 0..=MAX_CODEPOINT {
        let class = char::from_u32(cp).map(|ch| from_unicode(source.bidi_class(ch)));
        match (run, class) {
            (Some((_, current)), Some(class)) if current == class => {}
            (prev, class) => {
                if let Some((start, current)) = prev {
                    if current != BidiClass::ON {
                        flush(&mut builder, start, cp - 1, current);
                    }
                }
                run = class.map(|class| (cp, class));
            }
        }
    }
    if let Some((start, current)) = run {
        if current != BidiClass::ON {
            flush(&mut builder, start, MAX_CODEPOINT, current);
        }
    }

    builder.build()
}

/// Bidi class of a character.  Unassigned code points get the defaults
/// from DerivedBidiClass.txt; anything unmapped is ON.
pub fn bidi_class(ch: char) -> BidiClass {
    CLASS_TABLE.get_or_init(build_class_table).get_char(ch)
}

/// Paired bracket type and canonical pair identity.
///
/// The identity is the canonical opening bracket of the pair, so both
/// halves of a pair share it.  U+2329/U+232A are canonically equivalent to
/// U+3008/U+3009 and map to the same identity.
pub fn bracket(ch: char) -> (BracketType, u32) {
    match HardcodedBidiData.bidi_matched_opening_bracket(ch) {
        Some(matched) => {
            let kind = if matched.is_open {
                BracketType::Open
            } else {
                BracketType::Close
            };
            (kind, canonical_bracket(matched.opening) as u32)
        }
        None => (BracketType::None, 0),
    }
}

fn canonical_bracket(ch: char) -> char {
    match ch {
        '\u{2329}' => '\u{3008}',
        '\u{232A}' => '\u{3009}',
        other => other,
    }
}

/// Whether any class forces a bidi pass: strong RTL, Arabic numbers or
/// explicit controls.
fn needs_resolution(class: BidiClass) -> bool {
    matches!(
        class,
        BidiClass::R
            | BidiClass::AL
            | BidiClass::AN
            | BidiClass::LRE
            | BidiClass::LRO
            | BidiClass::RLE
            | BidiClass::RLO
            | BidiClass::PDF
            | BidiClass::LRI
            | BidiClass::RLI
            | BidiClass::FSI
            | BidiClass::PDI
    )
}

/// Bidi input arrays for one paragraph.  Buffers are reused across calls.
#[derive(Debug, Default, Clone)]
pub struct BidiData {
    types: Vec<BidiClass>,
    bracket_types: Vec<BracketType>,
    bracket_values: Vec<u32>,
    needs_resolution: bool,
}

impl BidiData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the arrays for `code_points`.
    pub fn init(&mut self, code_points: &[char]) {
        self.types.clear();
        self.bracket_types.clear();
        self.bracket_values.clear();
        self.needs_resolution = false;

        for &ch in code_points {
            let class = bidi_class(ch);
            self.needs_resolution |= needs_resolution(class);
            // All bracket characters are ON (BidiBrackets.txt stability policy).
            let (kind, value) = if class == BidiClass::ON {
                bracket(ch)
            } else {
                (BracketType::None, 0)
            };
            self.types.push(class);
            self.bracket_types.push(kind);
            self.bracket_values.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> &[BidiClass] {
        &self.types
    }

    pub fn bracket_types(&self) -> &[BracketType] {
        &self.bracket_types
    }

    pub fn bracket_values(&self) -> &[u32] {
        &self.bracket_values
    }

    /// False when the text is plain left-to-right-capable (no RTL letters,
    /// Arabic digits or explicit controls).  Under an LTR paragraph such
    /// text resolves to all-zero levels.
    pub fn needs_resolution(&self) -> bool {
        self.needs_resolution
    }
}
