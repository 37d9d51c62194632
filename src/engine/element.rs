//! The mutable per-element record the pipeline works on.

use crate::document::{ComponentId, ElementHeader, ElementType, EventType, PropValue};
use crate::layout::{Alignment, LayoutFlags};
use crate::pipeline::TextureInfo;
use crate::types::{CursorType, Edges, FontWeight, Rect, Rgba, Size, TextAlign};

use super::ElementId;

// =============================================================================
// Identity & kind
// =============================================================================

/// Where an element came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementSource {
    /// Index into `Document::elements`.
    Document(usize),
    /// Node `local` of the template of `component`.
    Template { component: ComponentId, local: usize },
}

/// Resolved once at ingestion so later stages never re-inspect custom
/// properties to find out what an element is.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Standard(ElementType),
    ComponentInstance {
        name: String,
        definition: Option<ComponentId>,
        /// Declared defaults overridden by the instance's custom properties.
        props: Vec<(String, PropValue)>,
        expanded: bool,
        /// Document children captured before the first expansion.
        usage: Vec<ElementId>,
        /// Template roots currently attached under the placeholder.
        roots: Vec<ElementId>,
        /// Decoration authored on the usage tag, carried by the template root.
        decoration: Decoration,
    },
}

impl ElementKind {
    pub fn component_name(&self) -> Option<&str> {
        match self {
            Self::ComponentInstance { name, .. } => Some(name),
            Self::Standard(_) => None,
        }
    }

    /// Merged instance property by name.
    pub fn instance_prop(&self, key: &str) -> Option<&PropValue> {
        match self {
            Self::ComponentInstance { props, .. } => {
                props.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            Self::Standard(_) => None,
        }
    }
}

/// A resolved `(event, callback name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    pub event: EventType,
    pub callback: String,
}

// =============================================================================
// Resolved attributes
// =============================================================================

/// Visual attributes after default → style → direct resolution.
///
/// `None` on the inheritable fields means "not set on this element".
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub background: Rgba,
    pub foreground: Option<Rgba>,
    pub border_color: Option<Rgba>,
    pub border: Edges,
    pub padding: Edges,
    pub text_align: Option<TextAlign>,
    pub font_size: Option<u16>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub visible: bool,
    pub cursor: CursorType,
    /// 0 transparent, 255 opaque.
    pub opacity: u8,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            background: Rgba::TRANSPARENT,
            foreground: None,
            border_color: None,
            border: Edges::ZERO,
            padding: Edges::ZERO,
            text_align: None,
            font_size: None,
            font_family: None,
            font_weight: None,
            visible: true,
            cursor: CursorType::Default,
            opacity: 255,
        }
    }
}

impl Visual {
    /// Border plus padding.
    pub fn insets(&self) -> Edges {
        self.border.add(self.padding)
    }

    pub fn has_visible_border(&self) -> bool {
        !self.border.is_zero() && self.border_color.is_some_and(|c| !c.is_transparent())
    }

    pub fn has_visible_decoration(&self) -> bool {
        !self.background.is_transparent() || self.has_visible_border()
    }
}

/// Box decoration a component usage tag hands to its template root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoration {
    pub background: Rgba,
    pub border: Edges,
    pub border_color: Option<Rgba>,
    pub padding: Edges,
}

impl Decoration {
    /// Move the decoration out of `visual`, leaving it undecorated.
    pub fn take(visual: &mut Visual) -> Self {
        Self {
            background: std::mem::replace(&mut visual.background, Rgba::TRANSPARENT),
            border: std::mem::replace(&mut visual.border, Edges::ZERO),
            border_color: visual.border_color.take(),
            padding: std::mem::replace(&mut visual.padding, Edges::ZERO),
        }
    }

    /// Overlay the values that were actually set onto `visual`.
    pub fn apply_to(&self, visual: &mut Visual) {
        if !self.background.is_transparent() {
            visual.background = self.background;
        }
        if !self.border.is_zero() {
            visual.border = self.border;
        }
        if self.border_color.is_some() {
            visual.border_color = self.border_color;
        }
        if !self.padding.is_zero() {
            visual.padding = self.padding;
        }
    }
}

/// Sizing inputs for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sizing {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub max_width: Option<i32>,
    pub max_height: Option<i32>,
    pub gap: i32,
    pub cross_align: Option<Alignment>,
}

/// Text attributes after inheritance. Every element carries one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub color: Rgba,
    pub font_size: u16,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub align: TextAlign,
}

// =============================================================================
// Render element
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RenderElement {
    pub id: ElementId,
    pub source: ElementSource,
    pub kind: ElementKind,
    pub header: ElementHeader,
    pub name: Option<String>,
    pub visual: Visual,
    pub sizing: Sizing,
    pub layout: LayoutFlags,
    pub text: Option<String>,
    pub resource: Option<u8>,
    pub texture: Option<TextureInfo>,
    pub texture_loaded: bool,
    pub events: Vec<EventBinding>,
    /// Template element marked as the destination of usage children.
    pub slot: bool,
    pub text_style: TextStyle,
    /// Pre-layout measured size.
    pub intrinsic: Size,
    /// Final geometry, overwritten every layout pass.
    pub rect: Rect,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
}

impl RenderElement {
    pub fn new(id: ElementId, source: ElementSource, header: ElementHeader) -> Self {
        Self {
            id,
            source,
            kind: ElementKind::Standard(header.element_type),
            header,
            name: None,
            visual: Visual::default(),
            sizing: Sizing::default(),
            layout: header.layout,
            text: None,
            resource: None,
            texture: None,
            texture_loaded: false,
            events: Vec::new(),
            slot: false,
            text_style: TextStyle::default(),
            intrinsic: Size::ZERO,
            rect: Rect::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.header.element_type
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.kind, ElementKind::ComponentInstance { .. })
    }

    pub fn component_name(&self) -> Option<&str> {
        self.kind.component_name()
    }

    /// Absolute flag or a nonzero header offset.
    pub fn is_absolute(&self) -> bool {
        self.layout.is_absolute() || self.header.has_offset()
    }

    pub fn grows(&self) -> bool {
        self.layout.grows()
    }

    pub fn is_visible(&self) -> bool {
        self.visual.visible
    }

    /// Visible and positioned by the parent's flow.
    pub fn in_flow(&self) -> bool {
        self.visual.visible && !self.is_absolute()
    }

    pub fn callback_for(&self, event: EventType) -> Option<&str> {
        self.events
            .iter()
            .find(|b| b.event == event)
            .map(|b| b.callback.as_str())
    }

    /// Content box: the rect minus border and padding.
    pub fn content_rect(&self) -> Rect {
        self.rect.deflate(self.visual.insets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_makes_absolute() {
        let mut header = ElementHeader::new(ElementType::Container);
        let el = RenderElement::new(ElementId(0), ElementSource::Document(0), header);
        assert!(!el.is_absolute());
        header.x = 4;
        let el = RenderElement::new(ElementId(0), ElementSource::Document(0), header);
        assert!(el.is_absolute());
        assert!(!el.in_flow());
    }

    #[test]
    fn test_decoration_visibility() {
        let mut v = Visual::default();
        assert!(!v.has_visible_decoration());
        v.border = Edges::uniform(1);
        assert!(!v.has_visible_decoration());
        v.border_color = Some(Rgba::GRAY);
        assert!(v.has_visible_decoration());
    }

    #[test]
    fn test_content_rect() {
        let mut el = RenderElement::new(
            ElementId(1),
            ElementSource::Document(1),
            ElementHeader::new(ElementType::Container),
        );
        el.rect = Rect::new(10, 10, 100, 50);
        el.visual.border = Edges::uniform(1);
        el.visual.padding = Edges::new(2, 3, 2, 3);
        assert_eq!(el.content_rect(), Rect::new(14, 13, 92, 44));
    }
}
