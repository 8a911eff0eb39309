//! Unicode Bidirectional Algorithm (UAX#9) implementation.
//!
//! Provides bidi level resolution for the layout engine:
//! - Bidi_Class and paired bracket lookup from Unicode data tables
//! - Isolate matching (BD9) and paragraph level (P2-P3)
//! - Explicit embedding level resolution (X1-X10)
//! - Weak type resolution (W1-W7)
//! - Paired Bracket Algorithm (N0)
//! - Neutral type resolution (N1-N2)
//! - Implicit level resolution (I1-I2)
//! - Whitespace reset (L1)
//! - Visual reordering (L2)
//!
//! # Usage
//!
//! ```rust
//! use neomacs_text::core::bidi::{resolve_levels, reorder_visual, BidiDir};
//!
//! let text = "Hello \u{05E9}\u{05DC}\u{05D5}\u{05DD}";
//! let levels = resolve_levels(text, BidiDir::Auto).unwrap();
//! let visual_order = reorder_visual(&levels);
//! assert_eq!(visual_order[6], 9);
//! ```

pub mod types;
pub mod data;
pub mod view;
pub mod resolver;
pub mod reorder;

pub use types::{class_for_level, BidiClass, BidiDir, BracketType, MAX_DEPTH};
pub use data::{bidi_class, bracket, BidiData};
pub use resolver::{resolve_levels, BidiResolver};
pub use reorder::reorder_visual;
