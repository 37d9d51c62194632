//! Core types for krb-runtime.
//!
//! Colors, edge insets and geometry shared by every pipeline stage.
//! Geometry is in whole layout units (`i32`); the document stores hints as
//! `u16` and the layout engine widens them.

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Alpha 255 = fully opaque, 0 = fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Transparent color.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    // Standard colors
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Build from the 4-byte wire representation (r, g, b, a).
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// The 4-byte wire representation.
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Check if color is fully opaque.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Check if color is fully transparent.
    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Scale alpha by an opacity factor in `0.0..=1.0`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        if opacity >= 1.0 {
            return self;
        }
        Self {
            a: (self.a as f32 * opacity.max(0.0)).round() as u8,
            ..self
        }
    }
}

// =============================================================================
// Edges
// =============================================================================

/// Per-edge values (border widths, padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Edges {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Edges {
    pub const ZERO: Self = Self::uniform(0);

    /// Same value on every edge.
    pub const fn uniform(v: u16) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    pub const fn new(top: u16, right: u16, bottom: u16, left: u16) -> Self {
        Self { top, right, bottom, left }
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.top == 0 && self.right == 0 && self.bottom == 0 && self.left == 0
    }

    /// left + right
    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.left as i32 + self.right as i32
    }

    /// top + bottom
    #[inline]
    pub fn vertical(&self) -> i32 {
        self.top as i32 + self.bottom as i32
    }

    /// Component-wise sum.
    pub fn add(self, other: Edges) -> Edges {
        Edges {
            top: self.top.saturating_add(other.top),
            right: self.right.saturating_add(other.right),
            bottom: self.bottom.saturating_add(other.bottom),
            left: self.left.saturating_add(other.left),
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Width and height in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An absolute, axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside this rect (right/bottom edges exclusive).
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by per-edge insets. Never produces a negative size.
    pub fn deflate(&self, edges: Edges) -> Rect {
        Rect {
            x: self.x + edges.left as i32,
            y: self.y + edges.top as i32,
            width: (self.width - edges.horizontal()).max(0),
            height: (self.height - edges.vertical()).max(0),
        }
    }
}

// =============================================================================
// Text & Cursor
// =============================================================================

/// Text alignment (wire values 0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum TextAlign {
    #[default]
    Start = 0,
    Center = 1,
    End = 2,
    Justify = 3,
}

impl From<u8> for TextAlign {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Center,
            2 => Self::End,
            3 => Self::Justify,
            _ => Self::Start,
        }
    }
}

/// Font weight (wire values are CSS-style numeric weights).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
    Heavy,
}

impl From<u16> for FontWeight {
    fn from(value: u16) -> Self {
        match value {
            0..=349 => Self::Light,
            350..=549 => Self::Normal,
            550..=799 => Self::Bold,
            _ => Self::Heavy,
        }
    }
}

/// Pointer cursor shown over an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(u8)]
pub enum CursorType {
    #[default]
    Default = 0,
    Pointer = 1,
    Text = 2,
    Move = 3,
    NotAllowed = 4,
}

impl From<u8> for CursorType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Pointer,
            2 => Self::Text,
            3 => Self::Move,
            4 => Self::NotAllowed,
            _ => Self::Default,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
