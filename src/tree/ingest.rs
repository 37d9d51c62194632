//! Ingestion - turning element records into resolved arena elements.

use tracing::{debug, warn};

use crate::document::{ComponentDef, Document, ElementHeader, ElementRecord, PropValue, COMPONENT_NAME_KEY, SLOT_KEY};
use crate::engine::{Decoration, ElementId, ElementKind, ElementSource, RenderArena};
use crate::style::{resolve_element, RenderConfig};

/// Allocate and resolve one element from its record.
///
/// `header` replaces the record's header, which lets the expander override
/// the style id of a template root before resolution sees it.
pub fn materialize(
    arena: &mut RenderArena,
    source: ElementSource,
    header: ElementHeader,
    record: &ElementRecord,
    document: &Document,
    config: &RenderConfig,
) -> ElementId {
    let id = arena.push(source, header);
    if let Some(element) = arena.get_mut(id) {
        resolve_element(element, record, document, config);
        element.kind = classify(record, document);
    }
    id
}

/// Standard element or component instance.
pub fn classify(record: &ElementRecord, document: &Document) -> ElementKind {
    let Some(marker) = record.custom(document, COMPONENT_NAME_KEY) else {
        return ElementKind::Standard(record.header.element_type);
    };
    let Some(name) = marker.as_string_index().and_then(|i| document.string(i)) else {
        warn!(value = ?marker, "component marker is not a string, treating as standard element");
        return ElementKind::Standard(record.header.element_type);
    };

    let definition = document.find_component(name);
    let props = instance_props(record, document, definition.and_then(|d| document.component(d)));
    ElementKind::ComponentInstance {
        name: name.to_string(),
        definition,
        props,
        expanded: false,
        usage: Vec::new(),
        roots: Vec::new(),
        decoration: Decoration::default(),
    }
}

/// Declared defaults, overridden by the instance's own custom properties.
pub fn instance_props(
    record: &ElementRecord,
    document: &Document,
    definition: Option<&ComponentDef>,
) -> Vec<(String, PropValue)> {
    let mut props: Vec<(String, PropValue)> = definition
        .map(|d| {
            d.properties
                .iter()
                .map(|p| (p.name.clone(), p.default.clone()))
                .collect()
        })
        .unwrap_or_default();

    for custom in &record.custom_properties {
        let Some(key) = document.string(custom.key) else {
            warn!(index = custom.key, "custom property key out of range");
            continue;
        };
        if key == COMPONENT_NAME_KEY || key == SLOT_KEY {
            continue;
        }
        match props.iter_mut().find(|(k, _)| k == key) {
            Some((_, value)) => *value = custom.value.clone(),
            None => props.push((key.to_string(), custom.value.clone())),
        }
    }
    props
}

/// Resolve every document element. Must run on an empty arena so that
/// element `i` gets id `i`.
pub fn ingest(arena: &mut RenderArena, document: &Document, config: &RenderConfig) -> Vec<ElementId> {
    let ids: Vec<ElementId> = document
        .elements
        .iter()
        .enumerate()
        .map(|(i, record)| {
            materialize(arena, ElementSource::Document(i), record.header, record, document, config)
        })
        .collect();
    let instances = ids
        .iter()
        .filter(|&&id| arena.get(id).is_some_and(|e| e.is_instance()))
        .count();
    debug!(elements = ids.len(), instances, "document ingested");
    ids
}
