//! Index-indirected view of one isolating run sequence.
//!
//! The W, N and I rules walk a sequence as if it were contiguous, but its
//! characters are scattered over the paragraph (X9-removed characters are
//! skipped, and isolates splice level runs together).  The view maps a
//! position in the sequence to the paragraph index and reads and writes
//! the working class array through it.

use super::types::BidiClass;

pub struct SequenceView<'a> {
    indices: &'a [usize],
    types: &'a mut [BidiClass],
}

impl<'a> SequenceView<'a> {
    pub fn new(indices: &'a [usize], types: &'a mut [BidiClass]) -> Self {
        Self { indices, types }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Paragraph index of sequence position `i`.
    #[inline]
    pub fn index(&self, i: usize) -> usize {
        self.indices[i]
    }

    #[inline]
    pub fn get(&self, i: usize) -> BidiClass {
        self.types[self.indices[i]]
    }

    #[inline]
    pub fn set(&mut self, i: usize, class: BidiClass) {
        self.types[self.indices[i]] = class;
    }

    /// Set every position in `start..end`.
    pub fn fill(&mut self, start: usize, end: usize, class: BidiClass) {
        for &index in &self.indices[start..end] {
            self.types[index] = class;
        }
    }

    /// End of the run of positions starting at `start` whose class
    /// satisfies `pred`.
    pub fn run_limit(&self, start: usize, pred: impl Fn(BidiClass) -> bool) -> usize {
        let mut i = start;
        while i < self.len() && pred(self.get(i)) {
            i += 1;
        }
        i
    }
}
