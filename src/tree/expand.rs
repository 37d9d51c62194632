//! Component expansion.
//!
//! A placeholder element (`ElementKind::ComponentInstance`) is replaced, as
//! far as its children are concerned, by a fresh copy of its component's
//! template. Usage children (the placeholder's own document children) move
//! into the template's slot element.
//!
//! ```text
//! before                      after
//! #4 TabBar (instance)        #4 TabBar (instance)
//!   #5 Button                   #9 Container (template root)
//!   #6 Button                     #10 Container (_slot)
//!                                   #5 Button
//!                                   #6 Button
//! ```

use tracing::{debug, trace, warn};

use crate::document::{ComponentId, Document, PropValue};
use crate::engine::{Decoration, ElementId, ElementKind, ElementSource, RenderArena};
use crate::error::ExpandError;
use crate::layout::LayoutFlags;
use crate::style::RenderConfig;

use super::ingest::materialize;
use super::template::decode_template;

/// Maximum nesting of component templates inside templates.
pub const MAX_DEPTH: usize = 32;

/// Expands component instances into an arena.
pub struct Expander<'a> {
    document: &'a Document,
    config: &'a RenderConfig,
    /// Components currently being expanded, outermost first.
    stack: Vec<ComponentId>,
}

impl<'a> Expander<'a> {
    pub fn new(document: &'a Document, config: &'a RenderConfig) -> Self {
        Self {
            document,
            config,
            stack: Vec::new(),
        }
    }

    /// Expand every not-yet-expanded instance, in id order. Returns the
    /// number of instances that expanded successfully.
    pub fn expand_all(&mut self, arena: &mut RenderArena) -> usize {
        let pending: Vec<ElementId> = arena
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::ComponentInstance { expanded: false, .. }))
            .map(|e| e.id)
            .collect();

        let mut expanded = 0;
        for id in pending {
            // Nested instances may already have been handled by their parent.
            let still_pending = arena
                .get(id)
                .is_some_and(|e| matches!(e.kind, ElementKind::ComponentInstance { expanded: false, .. }));
            if !still_pending {
                continue;
            }
            match self.expand(arena, id) {
                Ok(_) => expanded += 1,
                Err(err) => warn!(element = %id, "component expansion failed: {err}"),
            }
        }
        debug!(expanded, "components expanded");
        expanded
    }

    /// Expand one instance, replacing any earlier expansion. Returns the
    /// template roots now attached under the placeholder.
    pub fn expand(&mut self, arena: &mut RenderArena, id: ElementId) -> Result<Vec<ElementId>, ExpandError> {
        let (name, definition, usage, decoration) = self.detach(arena, id)?;

        let result = self.splice(arena, id, &name, definition, &usage, decoration);
        match &result {
            Ok(roots) => {
                // Usage children dropped for lack of a template root are gone.
                let kept: Vec<ElementId> = usage.into_iter().filter(|&c| arena.contains(c)).collect();
                self.mark(arena, id, kept, roots.clone(), decoration);
            }
            Err(_) => {
                // Placeholder stays childless; usage children have nowhere to go.
                for &child in &usage {
                    arena.remove_subtree(child);
                }
                if let Some(placeholder) = arena.get_mut(id) {
                    decoration.apply_to(&mut placeholder.visual);
                }
                self.mark(arena, id, Vec::new(), Vec::new(), Decoration::default());
            }
        }
        result
    }

    /// Capture usage children and decoration, and drop a previous expansion.
    fn detach(
        &self,
        arena: &mut RenderArena,
        id: ElementId,
    ) -> Result<(String, Option<ComponentId>, Vec<ElementId>, Decoration), ExpandError> {
        let element = arena.get(id).ok_or(ExpandError::NotAnInstance(id))?;
        let ElementKind::ComponentInstance { name, definition, expanded, usage, roots, decoration, .. } =
            &element.kind
        else {
            return Err(ExpandError::NotAnInstance(id));
        };
        let name = name.clone();
        let definition = *definition;
        let stored = *decoration;
        let (usage, old_roots) = if *expanded {
            (usage.clone(), roots.clone())
        } else {
            (element.children.clone(), Vec::new())
        };

        // The placeholder keeps no decoration of its own once expanded.
        let taken = match arena.get_mut(id) {
            Some(element) => Decoration::take(&mut element.visual),
            None => Decoration::default(),
        };
        let decoration = if stored == Decoration::default() { taken } else { stored };

        for &child in &usage {
            arena.unlink(child);
        }
        for root in old_roots {
            arena.remove_subtree(root);
        }
        // Anything else still attached is a stale stub.
        for child in arena.children(id).to_vec() {
            arena.remove_subtree(child);
        }
        Ok((name, definition, usage, decoration))
    }

    fn mark(
        &self,
        arena: &mut RenderArena,
        id: ElementId,
        new_usage: Vec<ElementId>,
        new_roots: Vec<ElementId>,
        new_decoration: Decoration,
    ) {
        if let Some(element) = arena.get_mut(id) {
            if let ElementKind::ComponentInstance { expanded, usage, roots, decoration, .. } = &mut element.kind {
                *expanded = true;
                *usage = new_usage;
                *roots = new_roots;
                *decoration = new_decoration;
            }
        }
    }

    fn splice(
        &mut self,
        arena: &mut RenderArena,
        id: ElementId,
        name: &str,
        definition: Option<ComponentId>,
        usage: &[ElementId],
        decoration: Decoration,
    ) -> Result<Vec<ElementId>, ExpandError> {
        let component = definition.ok_or_else(|| ExpandError::UnknownComponent(name.to_string()))?;
        let def = self
            .document
            .component(component)
            .ok_or_else(|| ExpandError::UnknownComponent(name.to_string()))?;
        if self.stack.contains(&component) {
            return Err(ExpandError::Recursive(name.to_string()));
        }
        if self.stack.len() >= MAX_DEPTH {
            return Err(ExpandError::TooDeep(MAX_DEPTH));
        }

        let graph = decode_template(&def.template).map_err(|source| ExpandError::Template {
            component: name.to_string(),
            source,
        })?;

        let (instance_name, instance_style, instance_width, instance_height, instance_grows, props) = {
            let Some(placeholder) = arena.get(id) else {
                return Err(ExpandError::NotAnInstance(id));
            };
            let props = match &placeholder.kind {
                ElementKind::ComponentInstance { props, .. } => props.clone(),
                ElementKind::Standard(_) => Vec::new(),
            };
            (
                placeholder.name.clone(),
                placeholder.header.style_id,
                placeholder.sizing.width,
                placeholder.sizing.height,
                placeholder.grows(),
                props,
            )
        };

        // Splice nodes with fresh ids.
        let mut local_to_id = Vec::with_capacity(graph.nodes.len());
        for (local, node) in graph.nodes.iter().enumerate() {
            let mut header = node.record.header;
            if local == 0 && instance_style != 0 {
                header.style_id = instance_style;
            }
            let source = ElementSource::Template { component, local };
            let new_id = materialize(arena, source, header, &node.record, self.document, self.config);
            if let Some(element) = arena.get_mut(new_id) {
                if let Some(text) = element.text.as_deref().and_then(|t| t.strip_prefix('$')) {
                    if let Some(value) = props.iter().find(|(k, _)| k == text).map(|(_, v)| v) {
                        element.text = Some(prop_text(value, self.document));
                    }
                }
                if local == 0 {
                    decoration.apply_to(&mut element.visual);
                    if instance_name.is_some() {
                        element.name = instance_name.clone();
                    }
                    if instance_width.is_some() {
                        element.sizing.width = instance_width;
                    }
                    if instance_height.is_some() {
                        element.sizing.height = instance_height;
                    }
                    if instance_grows {
                        element.layout |= LayoutFlags::GROW;
                    }
                }
            }
            local_to_id.push(new_id);
        }

        // Template edges, then roots under the placeholder.
        for edge in &graph.edges {
            let (parent, child) = (local_to_id[edge.parent], local_to_id[edge.child]);
            if let Err(err) = arena.link(parent, child) {
                warn!(component = name, "template link rejected: {err}");
            }
        }
        for unresolved in &graph.unresolved {
            warn!(
                component = name,
                node = unresolved.parent,
                offset = unresolved.offset,
                problem = ?unresolved.problem,
                "skipping template child reference"
            );
        }
        let roots: Vec<ElementId> = graph.roots().into_iter().map(|l| local_to_id[l]).collect();
        for &root in &roots {
            if let Err(err) = arena.link(id, root) {
                warn!(component = name, "template root link rejected: {err}");
            }
        }

        // Nested instances, depth first.
        self.stack.push(component);
        for &nested in &local_to_id {
            let is_instance = arena.get(nested).is_some_and(|e| e.is_instance());
            if is_instance {
                if let Err(err) = self.expand(arena, nested) {
                    warn!(component = name, element = %nested, "nested expansion failed: {err}");
                }
            }
        }
        self.stack.pop();

        // Usage children go to the slot, else the first root.
        let slot = local_to_id
            .iter()
            .copied()
            .find(|&n| arena.get(n).is_some_and(|e| e.slot));
        match slot.or_else(|| roots.first().copied()) {
            Some(target) => {
                for &child in usage {
                    if let Err(err) = arena.link(target, child) {
                        warn!(component = name, child = %child, "usage child rejected: {err}");
                    }
                }
            }
            None if !usage.is_empty() => {
                warn!(component = name, count = usage.len(), "template has no root, dropping usage children");
                for &child in usage {
                    arena.remove_subtree(child);
                }
            }
            None => {}
        }

        trace!(component = name, nodes = local_to_id.len(), roots = roots.len(), "template spliced");
        Ok(roots)
    }
}

/// Text form of an instance property for `$name` substitution.
pub fn prop_text(value: &PropValue, document: &Document) -> String {
    match value {
        PropValue::None => String::new(),
        PropValue::String(i) | PropValue::Resource(i) => {
            document.string(*i).unwrap_or_default().to_string()
        }
        PropValue::Byte(v) | PropValue::Enum(v) => v.to_string(),
        PropValue::Short(v) => v.to_string(),
        PropValue::Percentage(v) => format!("{}%", (*v as u32 * 100) / 256),
        PropValue::Color(c) => format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a),
        PropValue::Edges(e) => format!("{} {} {} {}", e.top, e.right, e.bottom, e.left),
        PropValue::Raw { .. } => String::new(),
    }
}
