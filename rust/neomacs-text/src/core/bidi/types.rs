//! Classes, directions and stack entries shared by the UAX #9 resolver.

/// Unicode `Bidi_Class` property value, named by its short alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BidiClass {
    L = 0,
    R = 1,
    /// Arabic letter.
    AL = 2,
    EN = 3,
    ES = 4,
    ET = 5,
    AN = 6,
    CS = 7,
    NSM = 8,
    /// Boundary neutral; dropped by X9 along with the embedding controls.
    BN = 9,
    /// Paragraph separator.
    B = 10,
    /// Segment separator (tab).
    S = 11,
    WS = 12,
    ON = 13,
    LRE = 14,
    LRO = 15,
    RLE = 16,
    RLO = 17,
    PDF = 18,
    LRI = 19,
    RLI = 20,
    FSI = 21,
    PDI = 22,
}

impl BidiClass {
    /// L, R or AL.
    pub fn is_strong(self) -> bool {
        matches!(self, BidiClass::L | BidiClass::R | BidiClass::AL)
    }

    /// LRI, RLI or FSI.
    pub fn is_isolate_initiator(self) -> bool {
        matches!(self, BidiClass::LRI | BidiClass::RLI | BidiClass::FSI)
    }

    pub fn is_isolate_control(self) -> bool {
        self.is_isolate_initiator() || self == BidiClass::PDI
    }

    /// Classes X9 takes out of the sequence.
    pub fn is_removed_by_x9(self) -> bool {
        matches!(
            self,
            BidiClass::LRE
                | BidiClass::RLE
                | BidiClass::LRO
                | BidiClass::RLO
                | BidiClass::PDF
                | BidiClass::BN
        )
    }

    /// Types that N1/N2 treat as neutral.
    pub fn is_neutral_or_isolate(self) -> bool {
        matches!(
            self,
            BidiClass::B
                | BidiClass::S
                | BidiClass::WS
                | BidiClass::ON
                | BidiClass::LRI
                | BidiClass::RLI
                | BidiClass::FSI
                | BidiClass::PDI
        )
    }

    /// Types that L1 resets when they precede a separator or the end of
    /// the text: whitespace, isolate controls and X9-removed formatting.
    pub fn is_line_end_whitespace(self) -> bool {
        matches!(
            self,
            BidiClass::WS
                | BidiClass::LRI
                | BidiClass::RLI
                | BidiClass::FSI
                | BidiClass::PDI
        ) || self.is_removed_by_x9()
    }

    /// Direction a class counts as when resolving neutrals: numbers act
    /// as R, everything not strong is ON.
    pub fn neutral_strength(self) -> BidiClass {
        match self {
            BidiClass::L => BidiClass::L,
            BidiClass::R | BidiClass::AL | BidiClass::EN | BidiClass::AN => BidiClass::R,
            _ => BidiClass::ON,
        }
    }

    /// Parse the short property alias used by the Unicode data files.
    pub fn from_alias(alias: &str) -> Option<BidiClass> {
        let class = match alias {
            "L" => BidiClass::L,
            "R" => BidiClass::R,
            "AL" => BidiClass::AL,
            "EN" => BidiClass::EN,
            "ES" => BidiClass::ES,
            "ET" => BidiClass::ET,
            "AN" => BidiClass::AN,
            "CS" => BidiClass::CS,
            "NSM" => BidiClass::NSM,
            "BN" => BidiClass::BN,
            "B" => BidiClass::B,
            "S" => BidiClass::S,
            "WS" => BidiClass::WS,
            "ON" => BidiClass::ON,
            "LRE" => BidiClass::LRE,
            "LRO" => BidiClass::LRO,
            "RLE" => BidiClass::RLE,
            "RLO" => BidiClass::RLO,
            "PDF" => BidiClass::PDF,
            "LRI" => BidiClass::LRI,
            "RLI" => BidiClass::RLI,
            "FSI" => BidiClass::FSI,
            "PDI" => BidiClass::PDI,
            _ => return None,
        };
        Some(class)
    }
}

/// Strong class for an embedding level's direction (L for even, R for odd).
pub fn class_for_level(level: u8) -> BidiClass {
    if level % 2 == 0 {
        BidiClass::L
    } else {
        BidiClass::R
    }
}

/// Requested paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BidiDir {
    LTR,
    RTL,
    /// P2/P3: first strong class outside isolates, LTR if none.
    #[default]
    Auto,
}

impl BidiDir {
    /// Explicit paragraph level, or `None` for auto-detection.
    pub fn explicit_level(self) -> Option<u8> {
        match self {
            BidiDir::LTR => Some(0),
            BidiDir::RTL => Some(1),
            BidiDir::Auto => None,
        }
    }
}

/// `Bidi_Paired_Bracket_Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BracketType {
    #[default]
    None,
    Open,
    Close,
}

/// Directional override in force for a stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    Neutral,
    LTR,
    RTL,
}

impl Override {
    /// Class an overridden character is rewritten to.
    pub fn class(self) -> Option<BidiClass> {
        match self {
            Override::Neutral => None,
            Override::LTR => Some(BidiClass::L),
            Override::RTL => Some(BidiClass::R),
        }
    }
}

/// One level of the X1-X8 stack.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalStatus {
    pub level: u8,
    pub override_status: Override,
    pub isolate_status: bool,
}

/// Deepest explicit level X1-X8 will push.
pub const MAX_DEPTH: u8 = 125;

/// Open brackets N0 tracks before giving up on the sequence.
pub const MAX_BPA_STACK: usize = 63;
