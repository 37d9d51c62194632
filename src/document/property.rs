//! Property ids, wire value types and decoded property values.

use crate::types::{Edges, Rgba};

// =============================================================================
// Property ids
// =============================================================================

/// Standard property ids (one byte on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    BackgroundColor,
    ForegroundColor,
    BorderColor,
    BorderWidth,
    Padding,
    TextContent,
    FontSize,
    FontWeight,
    TextAlignment,
    ImageSource,
    Opacity,
    Visibility,
    Gap,
    MaxWidth,
    MaxHeight,
    Width,
    LayoutFlags,
    Height,
    WindowWidth,
    WindowHeight,
    WindowTitle,
    ScaleFactor,
    Cursor,
    FontFamily,
    CrossAlignment,
    Other(u8),
}

impl From<u8> for PropertyId {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::BackgroundColor,
            0x02 => Self::ForegroundColor,
            0x03 => Self::BorderColor,
            0x04 => Self::BorderWidth,
            0x06 => Self::Padding,
            0x08 => Self::TextContent,
            0x09 => Self::FontSize,
            0x0A => Self::FontWeight,
            0x0B => Self::TextAlignment,
            0x0C => Self::ImageSource,
            0x0D => Self::Opacity,
            0x0F => Self::Visibility,
            0x10 => Self::Gap,
            0x13 => Self::MaxWidth,
            0x14 => Self::MaxHeight,
            0x19 => Self::Width,
            0x1A => Self::LayoutFlags,
            0x1B => Self::Height,
            0x20 => Self::WindowWidth,
            0x21 => Self::WindowHeight,
            0x22 => Self::WindowTitle,
            0x25 => Self::ScaleFactor,
            0x29 => Self::Cursor,
            0x2A => Self::FontFamily,
            0x46 => Self::CrossAlignment,
            other => Self::Other(other),
        }
    }
}

impl From<PropertyId> for u8 {
    fn from(id: PropertyId) -> u8 {
        match id {
            PropertyId::BackgroundColor => 0x01,
            PropertyId::ForegroundColor => 0x02,
            PropertyId::BorderColor => 0x03,
            PropertyId::BorderWidth => 0x04,
            PropertyId::Padding => 0x06,
            PropertyId::TextContent => 0x08,
            PropertyId::FontSize => 0x09,
            PropertyId::FontWeight => 0x0A,
            PropertyId::TextAlignment => 0x0B,
            PropertyId::ImageSource => 0x0C,
            PropertyId::Opacity => 0x0D,
            PropertyId::Visibility => 0x0F,
            PropertyId::Gap => 0x10,
            PropertyId::MaxWidth => 0x13,
            PropertyId::MaxHeight => 0x14,
            PropertyId::Width => 0x19,
            PropertyId::LayoutFlags => 0x1A,
            PropertyId::Height => 0x1B,
            PropertyId::WindowWidth => 0x20,
            PropertyId::WindowHeight => 0x21,
            PropertyId::WindowTitle => 0x22,
            PropertyId::ScaleFactor => 0x25,
            PropertyId::Cursor => 0x29,
            PropertyId::FontFamily => 0x2A,
            PropertyId::CrossAlignment => 0x46,
            PropertyId::Other(raw) => raw,
        }
    }
}

// =============================================================================
// Value types
// =============================================================================

/// Wire value type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Byte,
    Short,
    Color,
    String,
    Resource,
    Percentage,
    EdgeInsets,
    Enum,
    Other(u8),
}

impl From<u8> for ValueType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::None,
            0x01 => Self::Byte,
            0x02 => Self::Short,
            0x03 => Self::Color,
            0x04 => Self::String,
            0x05 => Self::Resource,
            0x06 => Self::Percentage,
            0x08 => Self::EdgeInsets,
            0x09 => Self::Enum,
            other => Self::Other(other),
        }
    }
}

impl From<ValueType> for u8 {
    fn from(value: ValueType) -> u8 {
        match value {
            ValueType::None => 0x00,
            ValueType::Byte => 0x01,
            ValueType::Short => 0x02,
            ValueType::Color => 0x03,
            ValueType::String => 0x04,
            ValueType::Resource => 0x05,
            ValueType::Percentage => 0x06,
            ValueType::EdgeInsets => 0x08,
            ValueType::Enum => 0x09,
            ValueType::Other(raw) => raw,
        }
    }
}

// =============================================================================
// Values
// =============================================================================

/// A decoded property value.
///
/// String and resource values are indices into the document's tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropValue {
    None,
    Byte(u8),
    Short(u16),
    Color(Rgba),
    String(u8),
    Resource(u8),
    /// 8.8 fixed point.
    Percentage(u16),
    Edges(Edges),
    Enum(u8),
    Raw { value_type: u8, bytes: Vec<u8> },
}

impl PropValue {
    /// Decode a value from its wire type and payload.
    ///
    /// Payloads whose size does not match the type are kept as `Raw`.
    pub fn decode(value_type: ValueType, bytes: &[u8]) -> Self {
        match (value_type, bytes) {
            (ValueType::None, []) => Self::None,
            (ValueType::Byte, [b]) => Self::Byte(*b),
            (ValueType::Short, [lo, hi]) => Self::Short(u16::from_le_bytes([*lo, *hi])),
            (ValueType::Color, [r, g, b, a]) => Self::Color(Rgba::new(*r, *g, *b, *a)),
            (ValueType::String, [idx]) => Self::String(*idx),
            (ValueType::Resource, [idx]) => Self::Resource(*idx),
            (ValueType::Percentage, [lo, hi]) => Self::Percentage(u16::from_le_bytes([*lo, *hi])),
            (ValueType::EdgeInsets, [v]) => Self::Edges(Edges::uniform(*v as u16)),
            (ValueType::EdgeInsets, [t, r, b, l]) => {
                Self::Edges(Edges::new(*t as u16, *r as u16, *b as u16, *l as u16))
            }
            (ValueType::Enum, [v]) => Self::Enum(*v),
            (other, bytes) => Self::Raw {
                value_type: other.into(),
                bytes: bytes.to_vec(),
            },
        }
    }

    /// Encode to `(value type, payload)`.
    pub fn encode(&self) -> (ValueType, Vec<u8>) {
        match self {
            Self::None => (ValueType::None, Vec::new()),
            Self::Byte(b) => (ValueType::Byte, vec![*b]),
            Self::Short(v) => (ValueType::Short, v.to_le_bytes().to_vec()),
            Self::Color(c) => (ValueType::Color, c.to_bytes().to_vec()),
            Self::String(idx) => (ValueType::String, vec![*idx]),
            Self::Resource(idx) => (ValueType::Resource, vec![*idx]),
            Self::Percentage(v) => (ValueType::Percentage, v.to_le_bytes().to_vec()),
            Self::Edges(e) => (
                ValueType::EdgeInsets,
                vec![
                    e.top.min(255) as u8,
                    e.right.min(255) as u8,
                    e.bottom.min(255) as u8,
                    e.left.min(255) as u8,
                ],
            ),
            Self::Enum(v) => (ValueType::Enum, vec![*v]),
            Self::Raw { value_type, bytes } => (ValueType::from(*value_type), bytes.clone()),
        }
    }

    /// Numeric view of byte/short/enum values.
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::Byte(b) | Self::Enum(b) => Some(*b as u16),
            Self::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Uniform bytes widen to all four edges.
    pub fn as_edges(&self) -> Option<Edges> {
        match self {
            Self::Edges(e) => Some(*e),
            Self::Byte(b) => Some(Edges::uniform(*b as u16)),
            Self::Short(v) => Some(Edges::uniform(*v)),
            _ => None,
        }
    }

    pub fn as_string_index(&self) -> Option<u8> {
        match self {
            Self::String(idx) => Some(*idx),
            _ => None,
        }
    }
}

/// One `(id, value)` pair from a style or an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    pub id: PropertyId,
    pub value: PropValue,
}

impl Property {
    pub fn new(id: PropertyId, value: PropValue) -> Self {
        Self { id, value }
    }

    pub fn color(id: PropertyId, color: Rgba) -> Self {
        Self::new(id, PropValue::Color(color))
    }

    pub fn byte(id: PropertyId, value: u8) -> Self {
        Self::new(id, PropValue::Byte(value))
    }

    pub fn short(id: PropertyId, value: u16) -> Self {
        Self::new(id, PropValue::Short(value))
    }
}

/// A custom `(key, value)` property; the key is a string-table index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomProperty {
    pub key: u8,
    pub value: PropValue,
}
