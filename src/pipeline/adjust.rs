//! Post-layout adjustment.
//!
//! After layout, every component instance whose name has a registered
//! [`AdjustHandler`] gets one call per frame. Handlers read geometry
//! through an [`AdjustContext`] and record changes in a [`GeometryPatch`];
//! the dispatcher applies the patch and re-lays out the subtrees the
//! handler asked for, so a handler never holds a mutable tree.

use tracing::{debug, warn};

use crate::document::{Document, PropValue};
use crate::engine::{ElementId, RenderArena, RenderElement};
use crate::error::AdjustError;
use crate::layout::LayoutEngine;
use crate::style::RenderConfig;
use crate::tree::prop_text;
use crate::types::Rect;

use super::registry::HandlerRegistry;

/// Read-only view handed to adjustment handlers.
pub struct AdjustContext<'a> {
    pub arena: &'a RenderArena,
    pub document: &'a Document,
    pub config: &'a RenderConfig,
}

impl<'a> AdjustContext<'a> {
    pub fn element(&self, id: ElementId) -> Result<&'a RenderElement, AdjustError> {
        self.arena.get(id).ok_or(AdjustError::Missing(id))
    }

    pub fn parent(&self, id: ElementId) -> Result<&'a RenderElement, AdjustError> {
        let parent = self.arena.parent(id).ok_or(AdjustError::NoParent(id))?;
        self.element(parent)
    }

    /// The other children of `id`'s parent, in child order.
    pub fn siblings(&self, id: ElementId) -> Vec<&'a RenderElement> {
        let Some(parent) = self.arena.parent(id) else {
            return Vec::new();
        };
        self.arena
            .children(parent)
            .iter()
            .filter(|&&c| c != id)
            .filter_map(|&c| self.arena.get(c))
            .collect()
    }

    /// Rect of `id` minus its border and padding.
    pub fn content_box(&self, id: ElementId) -> Option<Rect> {
        self.arena.get(id).map(RenderElement::content_rect)
    }

    pub fn instance_prop(&self, id: ElementId, key: &str) -> Option<&'a PropValue> {
        self.arena.get(id).and_then(|e| e.kind.instance_prop(key))
    }

    /// Instance property rendered as text (string values resolved).
    pub fn instance_prop_text(&self, id: ElementId, key: &str) -> Option<String> {
        self.instance_prop(id, key).map(|v| prop_text(v, self.document))
    }
}

/// Geometry changes requested by a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryPatch {
    rects: Vec<(ElementId, Rect)>,
    relayout: Vec<ElementId>,
}

impl GeometryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rect of `id`. A later call for the same id wins.
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        self.rects.retain(|(existing, _)| *existing != id);
        self.rects.push((id, rect));
    }

    /// Lay out the children of `id` again once the patch is applied.
    pub fn relayout(&mut self, id: ElementId) {
        if !self.relayout.contains(&id) {
            self.relayout.push(id);
        }
    }

    pub fn rects(&self) -> &[(ElementId, Rect)] {
        &self.rects
    }

    pub fn relayouts(&self) -> &[ElementId] {
        &self.relayout
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.relayout.is_empty()
    }

    /// Write the patch into the arena. Returns the number of rects changed.
    pub fn apply(&self, arena: &mut RenderArena, engine: &LayoutEngine<'_>) -> usize {
        let mut changed = 0;
        for &(id, rect) in &self.rects {
            let Some(element) = arena.get_mut(id) else {
                warn!(element = %id, "patch targets a missing element");
                continue;
            };
            element.rect = Rect::new(rect.x, rect.y, rect.width.max(1), rect.height.max(1));
            changed += 1;
        }
        for &id in &self.relayout {
            engine.relayout(arena, id);
        }
        changed
    }
}

/// Custom post-layout geometry for one component kind.
pub trait AdjustHandler {
    fn adjust(
        &self,
        target: ElementId,
        ctx: &AdjustContext<'_>,
        patch: &mut GeometryPatch,
    ) -> Result<(), AdjustError>;
}

impl<F> AdjustHandler for F
where
    F: Fn(ElementId, &AdjustContext<'_>, &mut GeometryPatch) -> Result<(), AdjustError>,
{
    fn adjust(
        &self,
        target: ElementId,
        ctx: &AdjustContext<'_>,
        patch: &mut GeometryPatch,
    ) -> Result<(), AdjustError> {
        self(target, ctx, patch)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustStats {
    pub invoked: usize,
    pub failed: usize,
}

/// Run every registered handler once, in element id order.
///
/// A failing handler is logged and its partial patch is still applied; the
/// remaining instances are adjusted normally.
pub fn run_adjustments(
    arena: &mut RenderArena,
    document: &Document,
    config: &RenderConfig,
    registry: &HandlerRegistry,
    engine: &LayoutEngine<'_>,
) -> AdjustStats {
    let targets: Vec<(ElementId, String)> = arena
        .iter()
        .filter_map(|e| e.component_name().map(|n| (e.id, n.to_string())))
        .filter(|(_, name)| registry.has_adjuster(name))
        .collect();

    let mut stats = AdjustStats::default();
    for (id, name) in targets {
        let Some(handler) = registry.adjuster(&name) else {
            continue;
        };
        let mut patch = GeometryPatch::new();
        let result = {
            let ctx = AdjustContext { arena: &*arena, document, config };
            handler.adjust(id, &ctx, &mut patch)
        };
        stats.invoked += 1;
        if let Err(err) = result {
            stats.failed += 1;
            warn!(element = %id, component = %name, "adjustment failed: {err}");
        }
        let changed = patch.apply(arena, engine);
        debug!(element = %id, component = %name, changed, "adjusted");
    }
    stats
}
