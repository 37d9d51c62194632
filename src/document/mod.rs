//! Document Model
//!
//! The immutable, already-parsed UI document the pipeline consumes.
//!
//! A [`Document`] is produced outside this crate (by a compiler or a
//! [`DocumentBuilder`]) and is only ever read by the runtime. Element records
//! share one binary encoding (see [`codec`]) between the document's element
//! section and component template blocks, which is what makes byte-offset
//! child references meaningful in both places.

pub mod builder;
pub mod codec;
mod property;

pub use builder::{DocumentBuilder, ElementSpec, TemplateWriter};
pub use property::{CustomProperty, PropValue, Property, PropertyId, ValueType};

use crate::layout::LayoutFlags;

/// Custom property key marking a component-instance placeholder.
pub const COMPONENT_NAME_KEY: &str = "_componentName";

/// Custom property key marking the slot element of a component template.
pub const SLOT_KEY: &str = "_slot";

// =============================================================================
// Element types
// =============================================================================

/// Element type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ElementType {
    App,
    #[default]
    Container,
    Text,
    Image,
    Canvas,
    Button,
    Input,
    Checkbox,
    List,
    Grid,
    Scrollable,
    Video,
    Other(u8),
}

impl ElementType {
    /// Elements that draw a text run and therefore take inherited text
    /// attributes.
    pub const fn is_text_bearing(self) -> bool {
        matches!(self, Self::Text | Self::Button | Self::Input)
    }

    /// Elements that may hold children and decoration but no intrinsic content.
    pub const fn is_container_like(self) -> bool {
        !matches!(self, Self::Text | Self::Image)
    }
}

impl From<u8> for ElementType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::App,
            0x01 => Self::Container,
            0x02 => Self::Text,
            0x03 => Self::Image,
            0x04 => Self::Canvas,
            0x10 => Self::Button,
            0x11 => Self::Input,
            0x12 => Self::Checkbox,
            0x20 => Self::List,
            0x21 => Self::Grid,
            0x22 => Self::Scrollable,
            0x30 => Self::Video,
            other => Self::Other(other),
        }
    }
}

impl From<ElementType> for u8 {
    fn from(value: ElementType) -> u8 {
        match value {
            ElementType::App => 0x00,
            ElementType::Container => 0x01,
            ElementType::Text => 0x02,
            ElementType::Image => 0x03,
            ElementType::Canvas => 0x04,
            ElementType::Button => 0x10,
            ElementType::Input => 0x11,
            ElementType::Checkbox => 0x12,
            ElementType::List => 0x20,
            ElementType::Grid => 0x21,
            ElementType::Scrollable => 0x22,
            ElementType::Video => 0x30,
            ElementType::Other(raw) => raw,
        }
    }
}

/// Event type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Press,
    Release,
    Hover,
    Focus,
    Blur,
    Change,
    Submit,
}

impl EventType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Click),
            0x02 => Some(Self::Press),
            0x03 => Some(Self::Release),
            0x04 => Some(Self::Hover),
            0x05 => Some(Self::Focus),
            0x06 => Some(Self::Blur),
            0x07 => Some(Self::Change),
            0x08 => Some(Self::Submit),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Click => 0x01,
            Self::Press => 0x02,
            Self::Release => 0x03,
            Self::Hover => 0x04,
            Self::Focus => 0x05,
            Self::Blur => 0x06,
            Self::Change => 0x07,
            Self::Submit => 0x08,
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Fixed-size part of an element record.
///
/// Property, child, event and custom-property counts are not stored here;
/// they are the lengths of the corresponding vectors in [`ElementRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ElementHeader {
    pub element_type: ElementType,
    pub name_index: u8,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub layout: LayoutFlags,
    pub style_id: u8,
}

impl ElementHeader {
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            ..Self::default()
        }
    }

    /// Nonzero x/y hints make an element absolutely positioned.
    pub const fn has_offset(&self) -> bool {
        self.x != 0 || self.y != 0
    }
}

/// `(event type, callback name index)` as stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventRecord {
    pub event_type: u8,
    pub callback: u8,
}

/// One element: header plus its variable-length tables.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct ElementRecord {
    pub header: ElementHeader,
    pub properties: Vec<Property>,
    pub custom_properties: Vec<CustomProperty>,
    pub events: Vec<EventRecord>,
    /// Child offsets relative to this record's own byte offset.
    pub child_refs: Vec<u16>,
}

impl ElementRecord {
    pub fn new(header: ElementHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    /// Value of the custom property whose key resolves to `key`.
    pub fn custom<'a>(&'a self, document: &Document, key: &str) -> Option<&'a PropValue> {
        self.custom_properties
            .iter()
            .find(|p| document.string(p.key) == Some(key))
            .map(|p| &p.value)
    }
}

// =============================================================================
// Styles & components
// =============================================================================

/// A named, already flattened property list. Ids are 1-based; 0 means "no style".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Style {
    pub id: u8,
    pub name: String,
    pub properties: Vec<Property>,
}

/// Index into [`Document::components`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub u16);

/// One declared component property with its default value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyDecl {
    pub name: String,
    pub default: PropValue,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, default: PropValue) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

/// A reusable element subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentDef {
    pub name: String,
    pub properties: Vec<PropertyDecl>,
    /// Encoded element records; child refs are relative to the block.
    pub template: Vec<u8>,
}

// =============================================================================
// Document
// =============================================================================

/// The parsed document. Read-only for the whole lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub strings: Vec<String>,
    pub elements: Vec<ElementRecord>,
    /// Byte offset of each element record inside the element section.
    pub element_offsets: Vec<u32>,
    pub styles: Vec<Style>,
    pub components: Vec<ComponentDef>,
    /// Resource table (image paths).
    pub resources: Vec<String>,
}

impl Document {
    /// String-table lookup.
    pub fn string(&self, index: u8) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// Name lookup where index 0 means "unnamed".
    pub fn name(&self, index: u8) -> Option<&str> {
        if index == 0 {
            return None;
        }
        self.string(index).filter(|s| !s.is_empty())
    }

    /// Style by its 1-based id. `0` never resolves.
    pub fn style(&self, id: u8) -> Option<&Style> {
        if id == 0 {
            return None;
        }
        self.styles.iter().find(|s| s.id == id)
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentDef> {
        self.components.get(id.0 as usize)
    }

    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.name == name)
            .map(|i| ComponentId(i as u16))
    }

    pub fn resource(&self, index: u8) -> Option<&str> {
        self.resources.get(index as usize).map(String::as_str)
    }

    /// First `App` element, if any.
    pub fn app_element(&self) -> Option<&ElementRecord> {
        self.elements
            .iter()
            .find(|e| e.header.element_type == ElementType::App)
    }
}
