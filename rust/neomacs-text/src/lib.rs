//! Neomacs text layout.
//!
//! Bidi-aware layout of styled paragraphs:
//! - `core`: geometry, errors, the run arena, code point tries and the
//!   Unicode Bidirectional Algorithm
//! - `text`: shaping, font fallback and line break services
//! - `layout`: font runs, line breaking with truncation, placement,
//!   hit testing and painting, driven by [`TextBlock`]
//!
//! ```rust
//! use std::sync::Arc;
//! use neomacs_text::{Style, TextBlock};
//!
//! let mut block = TextBlock::new();
//! block.add_text("Hello \u{05E9}\u{05DC}\u{05D5}\u{05DD}", Arc::new(Style::default()));
//! block.set_max_width(Some(60.0));
//! let lines = block.layout().unwrap().lines().len();
//! assert_eq!(lines, 2);
//! ```

pub mod core;
pub mod text;
pub mod layout;

pub use crate::core::{Color, Direction, LayoutError, LayoutResult, Point, Rect};
pub use layout::{
    Alignment, BaseDirection, Canvas, CaretInfo, FontRun, FontRunKind, LayoutOptions, RtlLayoutMode,
    RunId, Selection, Style, StyledText, TextBlock, TextLayout, TextLine, UnderlineStyle,
};
pub use text::{FontFallback, LineBreaker, Shaper, Typeface};
