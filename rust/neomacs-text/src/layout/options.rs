//! Layout constraints and presentation options.

use crate::core::bidi::BidiDir;

/// Horizontal alignment of lines within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Left for LTR paragraphs, right for RTL paragraphs.
    #[default]
    Auto,
    Left,
    Center,
    Right,
}

/// Paragraph base direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseDirection {
    /// First strong character decides.
    #[default]
    Auto,
    Ltr,
    Rtl,
}

impl BaseDirection {
    pub fn to_bidi(self) -> BidiDir {
        match self {
            BaseDirection::Auto => BidiDir::Auto,
            BaseDirection::Ltr => BidiDir::LTR,
            BaseDirection::Rtl => BidiDir::RTL,
        }
    }
}

/// Placement strategy for RTL paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RtlLayoutMode {
    /// UAX #9 visual reordering.
    #[default]
    Standard,
    /// Runs of equal direction are grouped; groups flow right to left in
    /// source order and the line is pinned to the right edge of the
    /// maximum width.
    WordStyle,
}

pub const DEFAULT_ELLIPSIS: char = '\u{2026}';

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
    pub max_lines: Option<usize>,
    pub alignment: Alignment,
    pub base_direction: BaseDirection,
    pub rtl_mode: RtlLayoutMode,
    /// Marker appended to truncated lines.  `None` truncates silently.
    pub ellipsis: Option<char>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_width: None,
            max_height: None,
            max_lines: None,
            alignment: Alignment::Auto,
            base_direction: BaseDirection::Auto,
            rtl_mode: RtlLayoutMode::Standard,
            ellipsis: Some(DEFAULT_ELLIPSIS),
        }
    }
}

impl LayoutOptions {
    /// Width available to a line.
    pub fn line_width(&self) -> f32 {
        self.max_width.unwrap_or(f32::INFINITY)
    }
}
