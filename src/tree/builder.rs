//! Tree construction from byte-offset child references.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::document::Document;
use crate::engine::{ElementId, RenderArena};
use crate::error::LoadError;

/// Link document elements (ids `0..n`) using their child refs.
///
/// Bad references and rejected links are logged and skipped. Returns the
/// roots in document order.
pub fn build_tree(arena: &mut RenderArena, document: &Document) -> Result<Vec<ElementId>, LoadError> {
    let elements = document.elements.len();
    if document.element_offsets.len() != elements {
        return Err(LoadError::OffsetTableMismatch {
            offsets: document.element_offsets.len(),
            elements,
        });
    }

    let by_offset: HashMap<u32, ElementId> = document
        .element_offsets
        .iter()
        .enumerate()
        .map(|(i, &offset)| (offset, ElementId(i as u32)))
        .collect();

    let mut links = 0usize;
    for (i, record) in document.elements.iter().enumerate() {
        let parent = ElementId(i as u32);
        let base = document.element_offsets[i];
        for &relative in &record.child_refs {
            let absolute = base + relative as u32;
            let Some(&child) = by_offset.get(&absolute) else {
                warn!(element = %parent, offset = absolute, "child reference does not point at an element");
                continue;
            };
            match arena.link(parent, child) {
                Ok(()) => links += 1,
                Err(err) => warn!(element = %parent, child = %child, "rejected child link: {err}"),
            }
        }
    }

    let roots: Vec<ElementId> = arena
        .roots()
        .into_iter()
        .filter(|id| id.index() < elements)
        .collect();
    if roots.is_empty() {
        return Err(LoadError::NoRoots { elements });
    }
    debug!(links, roots = roots.len(), "render tree built");
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentBuilder, ElementSpec};
    use crate::style::RenderConfig;
    use crate::tree::ingest;

    fn load(doc: &Document) -> (RenderArena, Result<Vec<ElementId>, LoadError>) {
        let mut arena = RenderArena::new();
        ingest(&mut arena, doc, &RenderConfig::default());
        let roots = build_tree(&mut arena, doc);
        (arena, roots)
    }

    #[test]
    fn test_builds_parent_child_links() {
        let mut b = DocumentBuilder::new();
        let root = b.push(ElementSpec::app(), None);
        let a = b.push(ElementSpec::container(), Some(root));
        b.push(ElementSpec::label("x"), Some(a));
        let (arena, roots) = load(&b.build());
        assert_eq!(roots.unwrap(), vec![ElementId(0)]);
        assert_eq!(arena.children(ElementId(0)), &[ElementId(1)]);
        assert_eq!(arena.children(ElementId(1)), &[ElementId(2)]);
    }

    #[test]
    fn test_dangling_ref_is_skipped() {
        let mut b = DocumentBuilder::new();
        let root = b.push(ElementSpec::app(), None);
        b.push(ElementSpec::container(), Some(root));
        b.raw_child_ref(root, 3);
        let (arena, roots) = load(&b.build());
        assert!(roots.is_ok());
        assert_eq!(arena.children(ElementId(0)).len(), 1);
    }

    #[test]
    fn test_second_parent_rejected() {
        let mut b = DocumentBuilder::new();
        let root = b.push(ElementSpec::app(), None);
        let a = b.push(ElementSpec::container(), Some(root));
        let c = b.push(ElementSpec::container(), Some(root));
        let shared = b.push(ElementSpec::label("shared"), Some(a));
        b.link(c, shared);
        let (arena, _) = load(&b.build());
        assert_eq!(arena.parent(ElementId(shared as u32)), Some(ElementId(a as u32)));
        assert!(arena.children(ElementId(c as u32)).is_empty());
    }

    #[test]
    fn test_empty_document_has_no_roots() {
        let doc = DocumentBuilder::new().build();
        let (_, roots) = load(&doc);
        assert_eq!(roots.unwrap_err(), LoadError::NoRoots { elements: 0 });
    }

    #[test]
    fn test_offset_table_mismatch() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::app(), None);
        let mut doc = b.build();
        doc.element_offsets.clear();
        let (_, roots) = load(&doc);
        assert!(matches!(roots, Err(LoadError::OffsetTableMismatch { .. })));
    }
}
