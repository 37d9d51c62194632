//! Render arena - element storage addressed by [`ElementId`].
//!
//! Parent and children are stored as ids inside each element, so the tree is
//! a plain forest over one `Vec`. Document elements occupy ids `0..n`;
//! elements created by component expansion are appended after them and
//! therefore always have larger ids. Removed slots are never reused.

use std::fmt;

use crate::error::LinkError;

use super::element::{ElementSource, RenderElement};
use crate::document::ElementHeader;

/// Stable element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

impl ElementId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderArena {
    slots: Vec<Option<RenderElement>>,
}

impl RenderArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh element. Ids only grow.
    pub fn push(&mut self, source: ElementSource, header: ElementHeader) -> ElementId {
        let id = ElementId(self.slots.len() as u32);
        self.slots.push(Some(RenderElement::new(id, source, header)));
        id
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the largest id ever allocated.
    pub fn next_id(&self) -> ElementId {
        ElementId(self.slots.len() as u32)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ElementId) -> Option<&RenderElement> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut RenderElement> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Live elements in id order (document order, then expansion order).
    pub fn iter(&self) -> impl Iterator<Item = &RenderElement> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.iter().map(|e| e.id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map_or(&[], |e| e.children.as_slice())
    }

    /// Unparented elements in id order.
    pub fn roots(&self) -> Vec<ElementId> {
        self.iter().filter(|e| e.parent.is_none()).map(|e| e.id).collect()
    }

    /// True if `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Append `child` to `parent`'s children.
    pub fn link(&mut self, parent: ElementId, child: ElementId) -> Result<(), LinkError> {
        if parent == child {
            return Err(LinkError::SelfLink(child));
        }
        let existing = match self.get(child) {
            Some(c) => c.parent,
            None => return Err(LinkError::Missing(child)),
        };
        if !self.contains(parent) {
            return Err(LinkError::Missing(parent));
        }
        if let Some(existing) = existing {
            return Err(LinkError::AlreadyParented { child, parent: existing });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LinkError::WouldCycle { parent, child });
        }

        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        Ok(())
    }

    /// Detach `child` from its parent, if any.
    pub fn unlink(&mut self, child: ElementId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = None;
        }
    }

    /// `id` and all its descendants, parents before children.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Detach and free `id` with its whole subtree.
    pub fn remove_subtree(&mut self, id: ElementId) -> usize {
        self.unlink(id);
        let doomed = self.descendants(id);
        for d in &doomed {
            if let Some(slot) = self.slots.get_mut(d.index()) {
                *slot = None;
            }
        }
        doomed.len()
    }
}

/// Read-only view of the render tree handed out by a session.
#[derive(Debug, Clone, Copy)]
pub struct RenderTree<'a> {
    arena: &'a RenderArena,
}

impl<'a> RenderTree<'a> {
    pub fn new(arena: &'a RenderArena) -> Self {
        Self { arena }
    }

    /// Every element, flat, in id order.
    pub fn elements(&self) -> impl Iterator<Item = &'a RenderElement> + 'a {
        self.arena.iter()
    }

    pub fn roots(&self) -> Vec<ElementId> {
        self.arena.roots()
    }

    pub fn children(&self, id: ElementId) -> &'a [ElementId] {
        self.arena.children(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.arena.parent(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&'a RenderElement> {
        self.arena.get(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// First element with the given name, in id order.
    pub fn find_by_name(&self, name: &str) -> Option<&'a RenderElement> {
        self.arena.iter().find(|e| e.name.as_deref() == Some(name))
    }

    pub fn arena(&self) -> &'a RenderArena {
        self.arena
    }
}
