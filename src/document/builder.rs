//! Programmatic document construction.
//!
//! [`DocumentBuilder`] assembles a [`Document`] from [`ElementSpec`]s and lays
//! out the element section with real byte offsets, so child references go
//! through exactly the same resolution path as a compiled document.
//! [`TemplateWriter`] does the same for component template blocks.

use std::collections::HashMap;

use tracing::warn;

use super::codec::{encode_record, encoded_len};
use super::{
    ComponentDef, CustomProperty, Document, ElementHeader, ElementRecord, ElementType, EventRecord,
    EventType, PropValue, Property, PropertyDecl, PropertyId, Style, COMPONENT_NAME_KEY, SLOT_KEY,
};
use crate::layout::{Alignment, Direction, LayoutFlags};
use crate::types::{Edges, Rgba};

// =============================================================================
// Element spec
// =============================================================================

/// A value whose string or resource operand is still unresolved.
#[derive(Debug, Clone, PartialEq)]
enum SpecValue {
    Value(PropValue),
    Str(String),
    Resource(String),
}

/// Fluent description of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    header: ElementHeader,
    name: Option<String>,
    properties: Vec<(PropertyId, SpecValue)>,
    customs: Vec<(String, SpecValue)>,
    events: Vec<(EventType, String)>,
}

impl ElementSpec {
    pub fn new(element_type: ElementType) -> Self {
        Self {
            header: ElementHeader::new(element_type),
            name: None,
            properties: Vec::new(),
            customs: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn app() -> Self {
        Self::new(ElementType::App)
    }

    pub fn container() -> Self {
        Self::new(ElementType::Container)
    }

    /// A text element with content.
    pub fn label(content: &str) -> Self {
        Self::new(ElementType::Text).text(content)
    }

    pub fn button(content: &str) -> Self {
        Self::new(ElementType::Button).text(content)
    }

    /// A component-instance placeholder.
    pub fn instance(component: &str) -> Self {
        Self::container().component(component)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Header width/height hints.
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.header.width = width;
        self.header.height = height;
        self
    }

    /// Header x/y hints. Nonzero values make the element absolute.
    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.header.x = x;
        self.header.y = y;
        self
    }

    pub fn layout(mut self, flags: LayoutFlags) -> Self {
        self.header.layout = flags;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.header.layout = self.header.layout.with_direction(direction);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.header.layout = self.header.layout.with_alignment(alignment);
        self
    }

    pub fn grow(mut self) -> Self {
        self.header.layout |= LayoutFlags::GROW;
        self
    }

    pub fn absolute(mut self) -> Self {
        self.header.layout |= LayoutFlags::ABSOLUTE;
        self
    }

    pub fn wrap(mut self) -> Self {
        self.header.layout |= LayoutFlags::WRAP;
        self
    }

    pub fn style(mut self, id: u8) -> Self {
        self.header.style_id = id;
        self
    }

    pub fn prop(mut self, id: PropertyId, value: PropValue) -> Self {
        self.properties.push((id, SpecValue::Value(value)));
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.properties
            .push((PropertyId::TextContent, SpecValue::Str(content.to_string())));
        self
    }

    pub fn font_family(mut self, family: &str) -> Self {
        self.properties
            .push((PropertyId::FontFamily, SpecValue::Str(family.to_string())));
        self
    }

    pub fn image(mut self, path: &str) -> Self {
        self.properties
            .push((PropertyId::ImageSource, SpecValue::Resource(path.to_string())));
        self
    }

    pub fn custom(mut self, key: &str, value: PropValue) -> Self {
        self.customs.push((key.to_string(), SpecValue::Value(value)));
        self
    }

    pub fn custom_str(mut self, key: &str, value: &str) -> Self {
        self.customs
            .push((key.to_string(), SpecValue::Str(value.to_string())));
        self
    }

    pub fn component(self, name: &str) -> Self {
        self.custom_str(COMPONENT_NAME_KEY, name)
    }

    /// Mark this template element as the slot for usage children.
    pub fn slot(self) -> Self {
        self.custom(SLOT_KEY, PropValue::Byte(1))
    }

    pub fn on(mut self, event: EventType, callback: &str) -> Self {
        self.events.push((event, callback.to_string()));
        self
    }

    pub fn background(self, color: Rgba) -> Self {
        self.prop(PropertyId::BackgroundColor, PropValue::Color(color))
    }

    pub fn foreground(self, color: Rgba) -> Self {
        self.prop(PropertyId::ForegroundColor, PropValue::Color(color))
    }

    pub fn border_color(self, color: Rgba) -> Self {
        self.prop(PropertyId::BorderColor, PropValue::Color(color))
    }

    pub fn border_width(self, width: u8) -> Self {
        self.prop(PropertyId::BorderWidth, PropValue::Byte(width))
    }

    pub fn padding(self, padding: u8) -> Self {
        self.prop(PropertyId::Padding, PropValue::Byte(padding))
    }

    pub fn padding_edges(self, edges: Edges) -> Self {
        self.prop(PropertyId::Padding, PropValue::Edges(edges))
    }

    pub fn font_size(self, size: u16) -> Self {
        self.prop(PropertyId::FontSize, PropValue::Short(size))
    }

    pub fn gap(self, gap: u16) -> Self {
        self.prop(PropertyId::Gap, PropValue::Short(gap))
    }

    pub fn hidden(self) -> Self {
        self.prop(PropertyId::Visibility, PropValue::Byte(0))
    }

    fn resolve(&self, tables: &mut Tables) -> ElementRecord {
        let mut header = self.header;
        header.name_index = self.name.as_deref().map_or(0, |n| tables.intern(n));

        let mut record = ElementRecord::new(header);
        record.properties = self
            .properties
            .iter()
            .map(|(id, v)| Property::new(*id, tables.value(v)))
            .collect();
        record.custom_properties = self
            .customs
            .iter()
            .map(|(key, v)| CustomProperty {
                key: tables.intern(key),
                value: tables.value(v),
            })
            .collect();
        record.events = self
            .events
            .iter()
            .map(|(event, callback)| EventRecord {
                event_type: event.to_u8(),
                callback: tables.intern(callback),
            })
            .collect();
        record
    }
}

// =============================================================================
// String & resource tables
// =============================================================================

#[derive(Debug)]
struct Tables {
    strings: Vec<String>,
    string_index: HashMap<String, u8>,
    resources: Vec<String>,
}

impl Default for Tables {
    fn default() -> Self {
        // Index 0 is reserved so that a zero name index means "unnamed".
        Self {
            strings: vec![String::new()],
            string_index: HashMap::new(),
            resources: Vec::new(),
        }
    }
}

impl Tables {
    fn intern(&mut self, s: &str) -> u8 {
        if let Some(&idx) = self.string_index.get(s) {
            return idx;
        }
        let Ok(idx) = u8::try_from(self.strings.len()) else {
            warn!(string = s, "string table full, using index 0");
            return 0;
        };
        self.strings.push(s.to_string());
        self.string_index.insert(s.to_string(), idx);
        idx
    }

    fn resource(&mut self, path: &str) -> u8 {
        if let Some(pos) = self.resources.iter().position(|r| r == path) {
            return pos as u8;
        }
        let Ok(idx) = u8::try_from(self.resources.len()) else {
            warn!(path, "resource table full, using index 0");
            return 0;
        };
        self.resources.push(path.to_string());
        idx
    }

    fn value(&mut self, value: &SpecValue) -> PropValue {
        match value {
            SpecValue::Value(v) => v.clone(),
            SpecValue::Str(s) => PropValue::String(self.intern(s)),
            SpecValue::Resource(p) => PropValue::Resource(self.resource(p)),
        }
    }
}

// =============================================================================
// Record graph
// =============================================================================

/// Elements plus their structural links, before offsets are known.
#[derive(Debug, Clone, Default)]
struct RecordGraph {
    specs: Vec<ElementSpec>,
    children: Vec<Vec<usize>>,
    raw_refs: Vec<Vec<u16>>,
}

impl RecordGraph {
    fn push(&mut self, spec: ElementSpec, parent: Option<usize>) -> usize {
        let index = self.specs.len();
        self.specs.push(spec);
        self.children.push(Vec::new());
        self.raw_refs.push(Vec::new());
        if let Some(parent) = parent {
            self.link(parent, index);
        }
        index
    }

    fn link(&mut self, parent: usize, child: usize) {
        match self.children.get_mut(parent) {
            Some(list) if child < self.specs.len() => list.push(child),
            _ => warn!(parent, child, "link between unknown elements ignored"),
        }
    }

    fn raw_child_ref(&mut self, parent: usize, relative: u16) {
        if let Some(refs) = self.raw_refs.get_mut(parent) {
            refs.push(relative);
        }
    }

    /// Resolve strings, lay records out back to back and fill child refs.
    fn encode(&self, tables: &mut Tables) -> (Vec<ElementRecord>, Vec<u32>) {
        let mut records: Vec<ElementRecord> = self.specs.iter().map(|s| s.resolve(tables)).collect();

        // Ref count fixes the record size, so offsets are known before values.
        for (i, record) in records.iter_mut().enumerate() {
            record.child_refs = vec![0; self.children[i].len() + self.raw_refs[i].len()];
        }
        let mut offsets = Vec::with_capacity(records.len());
        let mut cursor = 0u32;
        for record in &records {
            offsets.push(cursor);
            cursor += encoded_len(record) as u32;
        }

        for (i, record) in records.iter_mut().enumerate() {
            let mut refs = Vec::with_capacity(record.child_refs.len());
            for &child in &self.children[i] {
                match offsets[child]
                    .checked_sub(offsets[i])
                    .and_then(|rel| u16::try_from(rel).ok())
                {
                    Some(rel) => refs.push(rel),
                    None => warn!(parent = i, child, "child precedes parent or is out of range"),
                }
            }
            refs.extend_from_slice(&self.raw_refs[i]);
            record.child_refs = refs;
        }
        (records, offsets)
    }
}

// =============================================================================
// Template writer
// =============================================================================

/// Builds the element list of a component template. The first element
/// pushed is the template root.
#[derive(Debug, Clone, Default)]
pub struct TemplateWriter {
    graph: RecordGraph,
}

impl TemplateWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, optionally as the last child of an earlier one.
    pub fn push(&mut self, spec: ElementSpec, parent: Option<usize>) -> usize {
        self.graph.push(spec, parent)
    }

    /// Append a raw relative child reference (may point nowhere).
    pub fn raw_child_ref(&mut self, parent: usize, relative: u16) {
        self.graph.raw_child_ref(parent, relative);
    }

    fn encode(&self, tables: &mut Tables) -> Vec<u8> {
        let (records, _) = self.graph.encode(tables);
        let mut bytes = Vec::new();
        for record in &records {
            encode_record(&mut bytes, record);
        }
        bytes
    }
}

// =============================================================================
// Document builder
// =============================================================================

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    tables: Tables,
    graph: RecordGraph,
    styles: Vec<Style>,
    components: Vec<ComponentDef>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, optionally as the last child of an earlier one.
    /// Returns its document index.
    pub fn push(&mut self, spec: ElementSpec, parent: Option<usize>) -> usize {
        self.graph.push(spec, parent)
    }

    /// Add another structural link. Linking an already parented child is
    /// allowed here; the tree builder decides what to do with it.
    pub fn link(&mut self, parent: usize, child: usize) {
        self.graph.link(parent, child);
    }

    /// Append a raw relative child reference (may point nowhere).
    pub fn raw_child_ref(&mut self, parent: usize, relative: u16) {
        self.graph.raw_child_ref(parent, relative);
    }

    pub fn intern(&mut self, s: &str) -> u8 {
        self.tables.intern(s)
    }

    pub fn resource(&mut self, path: &str) -> u8 {
        self.tables.resource(path)
    }

    /// Register a style and return its 1-based id.
    pub fn style(&mut self, name: &str, properties: Vec<Property>) -> u8 {
        let id = u8::try_from(self.styles.len() + 1).unwrap_or(u8::MAX);
        self.styles.push(Style {
            id,
            name: name.to_string(),
            properties,
        });
        id
    }

    pub fn component(&mut self, name: &str, properties: Vec<PropertyDecl>, template: &TemplateWriter) {
        let template = template.encode(&mut self.tables);
        self.components.push(ComponentDef {
            name: name.to_string(),
            properties,
            template,
        });
    }

    pub fn build(mut self) -> Document {
        let (elements, element_offsets) = self.graph.encode(&mut self.tables);
        Document {
            strings: self.tables.strings,
            elements,
            element_offsets,
            styles: self.styles,
            components: self.components,
            resources: self.tables.resources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::codec::{decode_records, HEADER_SIZE};

    #[test]
    fn test_child_refs_are_relative_offsets() {
        let mut b = DocumentBuilder::new();
        let root = b.push(ElementSpec::app(), None);
        let a = b.push(ElementSpec::container(), Some(root));
        let c = b.push(ElementSpec::container(), Some(root));
        let doc = b.build();

        let refs = &doc.elements[root].child_refs;
        assert_eq!(refs.len(), 2);
        assert_eq!(doc.element_offsets[root] + refs[0] as u32, doc.element_offsets[a]);
        assert_eq!(doc.element_offsets[root] + refs[1] as u32, doc.element_offsets[c]);
        // root carries two child refs
        assert_eq!(doc.element_offsets[a], (HEADER_SIZE + 4) as u32);
    }

    #[test]
    fn test_strings_are_interned() {
        let mut b = DocumentBuilder::new();
        let root = b.push(ElementSpec::app().name("main"), None);
        b.push(ElementSpec::label("main"), Some(root));
        let doc = b.build();
        assert_eq!(doc.strings[0], "");
        assert_eq!(doc.name(doc.elements[0].header.name_index), Some("main"));
        assert_eq!(
            doc.elements[1].properties[0].value,
            PropValue::String(doc.elements[0].header.name_index)
        );
    }

    #[test]
    fn test_template_block_decodes() {
        let mut t = TemplateWriter::new();
        let root = t.push(ElementSpec::container().name("bar"), None);
        t.push(ElementSpec::label("$title"), Some(root));

        let mut b = DocumentBuilder::new();
        b.component("Bar", vec![PropertyDecl::new("title", PropValue::None)], &t);
        let doc = b.build();

        let records = decode_records(&doc.components[0].template).unwrap();
        assert_eq!(records.len(), 2);
        let (root_off, root_rec) = &records[0];
        assert_eq!(root_off + root_rec.child_refs[0] as usize, records[1].0);
    }

    #[test]
    fn test_style_ids_are_one_based() {
        let mut b = DocumentBuilder::new();
        assert_eq!(b.style("a", vec![]), 1);
        assert_eq!(b.style("b", vec![]), 2);
    }
}
