//! Line layout: runs, line breaking, placement and the text block.

pub mod style;
pub mod font_run;
pub mod line;
pub mod options;
pub mod runs;
pub mod placement;
pub mod breaker;
pub mod paint;
pub mod block;

pub use style::{Style, StyleRun, StyledText, UnderlineStyle};
pub use font_run::{FontRun, FontRunKind, RunId};
pub use line::TextLine;
pub use options::{Alignment, BaseDirection, LayoutOptions, RtlLayoutMode, DEFAULT_ELLIPSIS};
pub use placement::LineMetrics;
pub use hit_test::CaretInfo;
pub use paint::{Canvas, Selection};
pub use block::{TextBlock, TextLayout};
