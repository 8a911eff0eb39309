//! Range-compressed code point trie.
//!
//! A two-stage lookup table mapping every Unicode code point to a small
//! `Copy` value.  The builder accepts sparse range inserts; `build`
//! compacts the result by sharing identical 32-entry blocks, so property
//! tables with long uniform stretches (most of the code space) cost one
//! index entry per block.
//!
//! | Stage | Entries | Covers |
//! |-------|---------|--------|
//! | index | 34 816  | 32 code points each |
//! | data  | 32 per distinct block | 1 code point each |
//!
//! Lookups above U+10FFFF return the table's error value.

use std::collections::HashMap;
use std::hash::Hash;

use super::error::{LayoutError, LayoutResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const SHIFT: u32 = 5;
const BLOCK_SIZE: usize = 1 << SHIFT;
const BLOCK_MASK: u32 = (BLOCK_SIZE as u32) - 1;

/// Maximum valid Unicode scalar value (inclusive).
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

const INDEX_LEN: usize = ((MAX_CODEPOINT + 1) >> SHIFT) as usize;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Mutable, sparse form of a trie.  Blocks are allocated on first write.
pub struct TrieBuilder<V> {
    default: V,
    error: V,
    blocks: Vec<Option<Box<[Option<V>]>>>,
}

impl<V: Copy + Eq + Hash> TrieBuilder<V> {
    /// `default` is returned for code points never set, `error` for
    /// lookups outside the Unicode range.
    pub fn new(default: V, error: V) -> Self {
        Self {
            default,
            error,
            blocks: vec![None; INDEX_LEN],
        }
    }

    /// Set a single code point, overwriting any previous value.
    pub fn set(&mut self, cp: u32, value: V) -> LayoutResult<()> {
        self.set_range(cp, cp, value, true)
    }

    /// Set every code point in `start..=end`.
    ///
    /// With `overwrite == false` only code points that have not been set
    /// yet receive the value.
    pub fn set_range(&mut self, start: u32, end: u32, value: V, overwrite: bool) -> LayoutResult<()> {
        if start > end || end > MAX_CODEPOINT {
            return Err(LayoutError::InvalidRange {
                start: start as usize,
                end: end as usize,
            });
        }

        let mut cp = start;
        loop {
            let block = (cp >> SHIFT) as usize;
            let block_end = ((block as u32) << SHIFT) | BLOCK_MASK;
            let stop = block_end.min(end);
            let cells = self.blocks[block].get_or_insert_with(|| vec![None; BLOCK_SIZE].into_boxed_slice());
            for c in cp..=stop {
                let cell = &mut cells[(c & BLOCK_MASK) as usize];
                if overwrite || cell.is_none() {
                    *cell = Some(value);
                }
            }
            if stop == end {
                break;
            }
            cp = stop + 1;
        }
        Ok(())
    }

    /// Value currently stored for `cp` (slow path, for building).
    pub fn get(&self, cp: u32) -> V {
        if cp > MAX_CODEPOINT {
            return self.error;
        }
        self.blocks[(cp >> SHIFT) as usize]
            .as_ref()
            .and_then(|cells| cells[(cp & BLOCK_MASK) as usize])
            .unwrap_or(self.default)
    }

    /// Compact into an immutable trie.
    pub fn build(&self) -> CodePointTrie<V> {
        let mut data: Vec<V> = vec![self.default; BLOCK_SIZE];
        let mut index = vec![0u32; INDEX_LEN];
        let mut seen: HashMap<Vec<V>, u32> = HashMap::new();
        seen.insert(vec![self.default; BLOCK_SIZE], 0);

        for (block, cells) in self.blocks.iter().enumerate() {
            let Some(cells) = cells else {
                continue;
            };
            let values: Vec<V> = cells.iter().map(|c| c.unwrap_or(self.default)).collect();
            let offset = match seen.get(&values) {
                Some(&offset) => offset,
                None => {
                    let offset = data.len() as u32;
                    data.extend_from_slice(&values);
                    seen.insert(values, offset);
                    offset
                }
            };
            index[block] = offset;
        }

        log::debug!(
            "code point trie: {} distinct blocks, {} data entries",
            seen.len(),
            data.len()
        );

        CodePointTrie {
            index,
            data,
            default: self.default,
            error: self.error,
        }
    }
}

// ---------------------------------------------------------------------------
// Frozen trie
// ---------------------------------------------------------------------------

/// Immutable, compacted property table.  Safe to share between threads.
#[derive(Clone)]
pub struct CodePointTrie<V> {
    index: Vec<u32>,
    data: Vec<V>,
    default: V,
    error: V,
}

impl<V: Copy> CodePointTrie<V> {
    #[inline]
    pub fn get(&self, cp: u32) -> V {
        if cp > MAX_CODEPOINT {
            return self.error;
        }
        let offset = self.index[(cp >> SHIFT) as usize] as usize;
        self.data[offset + (cp & BLOCK_MASK) as usize]
    }

    #[inline]
    pub fn get_char(&self, ch: char) -> V {
        self.get(ch as u32)
    }

    pub fn default_value(&self) -> V {
        self.default
    }

    pub fn error_value(&self) -> V {
        self.error
    }

    /// Number of data entries after block sharing.
    pub fn data_len(&self) -> usize {
        self.data.len()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for CodePointTrie<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodePointTrie")
            .field("data_len", &self.data.len())
            .field("default", &self.default)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_returns_default() {
        let trie = TrieBuilder::new(7u8, 255u8).build();
        assert_eq!(trie.get(0), 7);
        assert_eq!(trie.get(0x10FFFF), 7);
        assert_eq!(trie.data_len(), BLOCK_SIZE);
    }

    #[test]
    fn out_of_range_returns_error_value() {
        let trie = TrieBuilder::new(0u8, 99u8).build();
        assert_eq!(trie.get(0x110000), 99);
        assert_eq!(trie.get(u32::MAX), 99);
    }

    #[test]
    fn range_spanning_blocks() {
        let mut b = TrieBuilder::new(0u8, 0u8);
        b.set_range(0x1F, 0x101, 3, true).unwrap();
        let trie = b.build();
        assert_eq!(trie.get(0x1E), 0);
        assert_eq!(trie.get(0x1F), 3);
        assert_eq!(trie.get(0x80), 3);
        assert_eq!(trie.get(0x101), 3);
        assert_eq!(trie.get(0x102), 0);
    }

    #[test]
    fn overwrite_flag() {
        let mut b = TrieBuilder::new(0u8, 0u8);
        b.set_range(10, 20, 1, true).unwrap();
        b.set_range(15, 30, 2, false).unwrap();
        assert_eq!(b.get(15), 1);
        assert_eq!(b.get(25), 2);
        b.set_range(15, 30, 3, true).unwrap();
        let trie = b.build();
        assert_eq!(trie.get(14), 1);
        assert_eq!(trie.get(15), 3);
        assert_eq!(trie.get(30), 3);
    }

    #[test]
    fn identical_blocks_are_shared() {
        let mut b = TrieBuilder::new(0u8, 0u8);
        b.set_range(0x0000, 0x1FFF, 5, true).unwrap();
        let trie = b.build();
        // One default block plus one shared all-5 block.
        assert_eq!(trie.data_len(), 2 * BLOCK_SIZE);
        assert_eq!(trie.get(0x1234), 5);
    }

    #[test]
    fn invalid_ranges_rejected() {
        let mut b = TrieBuilder::new(0u8, 0u8);
        assert!(b.set_range(5, 4, 1, true).is_err());
        assert!(b.set_range(0, 0x110000, 1, true).is_err());
    }
}
