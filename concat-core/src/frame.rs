//! Reading frames
//!
//! A reading frame records where codon boundaries begin within a sequence
//! and on which strand. Positive frames read the sequence as given, negative
//! frames read its reverse complement.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
#[repr(i8)]
pub enum ReadingFrame {
    N3 = -3,
    N2 = -2,
    N1 = -1,
    #[default]
    Unknown = 0,
    P1 = 1,
    P2 = 2,
    P3 = 3,
}

impl ReadingFrame {
    /// All known frames, forward first
    pub const ALL: [ReadingFrame; 6] = [
        ReadingFrame::P1,
        ReadingFrame::P2,
        ReadingFrame::P3,
        ReadingFrame::N1,
        ReadingFrame::N2,
        ReadingFrame::N3,
    ];

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -3 => Some(Self::N3),
            -2 => Some(Self::N2),
            -1 => Some(Self::N1),
            0 => Some(Self::Unknown),
            1 => Some(Self::P1),
            2 => Some(Self::P2),
            3 => Some(Self::P3),
            _ => None,
        }
    }

    /// Forward frame whose first full codon begins at `offset`
    pub fn forward(offset: usize) -> Self {
        match offset % 3 {
            0 => Self::P1,
            1 => Self::P2,
            _ => Self::P3,
        }
    }

    /// Reverse frame whose first full codon on the complementary strand begins at `offset`
    pub fn reverse(offset: usize) -> Self {
        Self::forward(offset).flipped()
    }

    pub fn value(self) -> i8 {
        self as i8
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    pub fn is_reverse(self) -> bool {
        self.value() < 0
    }

    /// Magnitude of the frame, 0 for unknown
    pub fn magnitude(self) -> u8 {
        self.value().unsigned_abs()
    }

    /// Number of bases preceding the first full codon
    pub fn offset(self) -> usize {
        (self.magnitude() as usize).saturating_sub(1)
    }

    /// Same offset on the opposite strand
    pub fn flipped(self) -> Self {
        Self::from_i8(-self.value()).unwrap_or_default()
    }

    /// Positive frame with the same magnitude
    pub fn to_forward(self) -> Self {
        Self::from_i8(self.value().abs()).unwrap_or_default()
    }

    pub fn label(self) -> String {
        format!("{:+}", self.value())
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::P1 => "starts with 1st codon position",
            Self::P2 => "starts with 2nd codon position",
            Self::P3 => "starts with 3rd codon position",
            Self::N1 => "reverse complement of +1",
            Self::N2 => "reverse complement of +2",
            Self::N3 => "reverse complement of +3",
        }
    }
}

impl fmt::Display for ReadingFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.description())
    }
}

impl TryFrom<i8> for ReadingFrame {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::from_i8(value).ok_or_else(|| format!("reading frame out of range: {}", value))
    }
}

impl From<ReadingFrame> for i8 {
    fn from(frame: ReadingFrame) -> Self {
        frame.value()
    }
}
