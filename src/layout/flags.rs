//! The packed layout byte.
//!
//! ```text
//! bit 7 6        5    4    3 2        1 0
//!     - ABSOLUTE GROW WRAP ALIGNMENT  DIRECTION
//! ```

use bitflags::bitflags;

bitflags! {
    /// Layout flags as stored in the element header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutFlags: u8 {
        const DIRECTION_MASK = 0b0000_0011;
        const ALIGNMENT_MASK = 0b0000_1100;
        const WRAP = 1 << 4;
        const GROW = 1 << 5;
        const ABSOLUTE = 1 << 6;
    }
}

/// Main-axis direction (bits 0-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum Direction {
    #[default]
    Row = 0,
    Column = 1,
    RowReverse = 2,
    ColumnReverse = 3,
}

impl Direction {
    #[inline]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    #[inline]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

impl From<u8> for Direction {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            1 => Self::Column,
            2 => Self::RowReverse,
            3 => Self::ColumnReverse,
            _ => Self::Row,
        }
    }
}

/// Alignment vocabulary shared by main and cross axis (bits 2-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum Alignment {
    #[default]
    Start = 0,
    Center = 1,
    End = 2,
    SpaceBetween = 3,
}

impl Alignment {
    /// The cross-axis reading of this alignment. Space-between has no
    /// cross-axis meaning and falls back to start.
    pub const fn cross(self) -> Alignment {
        match self {
            Self::SpaceBetween => Self::Start,
            other => other,
        }
    }
}

impl From<u8> for Alignment {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            1 => Self::Center,
            2 => Self::End,
            3 => Self::SpaceBetween,
            _ => Self::Start,
        }
    }
}

impl LayoutFlags {
    pub fn direction(self) -> Direction {
        Direction::from(self.bits())
    }

    pub fn alignment(self) -> Alignment {
        Alignment::from(self.bits() >> 2)
    }

    pub fn with_direction(self, direction: Direction) -> Self {
        Self::from_bits_retain((self.bits() & !Self::DIRECTION_MASK.bits()) | direction as u8)
    }

    pub fn with_alignment(self, alignment: Alignment) -> Self {
        Self::from_bits_retain((self.bits() & !Self::ALIGNMENT_MASK.bits()) | ((alignment as u8) << 2))
    }

    #[inline]
    pub fn grows(self) -> bool {
        self.contains(Self::GROW)
    }

    #[inline]
    pub fn is_absolute(self) -> bool {
        self.contains(Self::ABSOLUTE)
    }

    #[inline]
    pub fn wraps(self) -> bool {
        self.contains(Self::WRAP)
    }
}
