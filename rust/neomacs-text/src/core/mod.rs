//! Core types and data structures for the text layout engine.

pub mod types;
pub mod error;
pub mod arena;
pub mod trie;
pub mod bidi;

pub use types::*;
pub use error::*;
pub use arena::{Arena, Handle};
pub use trie::{CodePointTrie, TrieBuilder};
