//! Mouse Module - hit testing and event dispatch
//!
//! Hit regions are collected in paint order, so the last region containing
//! a point is the topmost element there. Events resolve to an element and
//! fire the callback named by its binding, bubbling up the parent chain
//! until a bound element is found.
//!
//! # API
//!
//! - [`HitMap::build`] - Collect visible element rects in paint order
//! - [`hit_test`] - Topmost visible element at a point
//! - [`MouseState::dispatch`] - Route a [`MouseEvent`] to bound callbacks
//!
//! A click is a press and release over the same element.

use tracing::trace;

use crate::document::EventType;
use crate::engine::{ElementId, RenderArena};
use crate::pipeline::HandlerRegistry;
use crate::types::Rect;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub x: i32,
    pub y: i32,
}

impl MouseEvent {
    pub fn down(x: i32, y: i32) -> Self {
        Self { action: MouseAction::Down, x, y }
    }

    pub fn up(x: i32, y: i32) -> Self {
        Self { action: MouseAction::Up, x, y }
    }

    pub fn move_to(x: i32, y: i32) -> Self {
        Self { action: MouseAction::Move, x, y }
    }
}

// =============================================================================
// HIT MAP
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRegion {
    pub rect: Rect,
    pub id: ElementId,
}

/// Element rects in paint order.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    regions: Vec<HitRegion>,
}

impl HitMap {
    /// Walk every root depth-first, skipping hidden subtrees.
    pub fn build(arena: &RenderArena) -> Self {
        let mut regions = Vec::new();
        let mut stack: Vec<ElementId> = arena.roots().into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            let Some(element) = arena.get(id) else {
                continue;
            };
            if !element.is_visible() {
                continue;
            }
            regions.push(HitRegion { rect: element.rect, id });
            stack.extend(element.children().iter().rev().copied());
        }
        Self { regions }
    }

    pub fn hit_test(&self, x: i32, y: i32) -> Option<ElementId> {
        self.regions.iter().rev().find(|r| r.rect.contains(x, y)).map(|r| r.id)
    }

    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Topmost visible element at `(x, y)`.
pub fn hit_test(arena: &RenderArena, x: i32, y: i32) -> Option<ElementId> {
    HitMap::build(arena).hit_test(x, y)
}

/// Nearest element on `id`'s parent chain bound to `event`, with the
/// callback name.
pub fn bound_target(arena: &RenderArena, id: ElementId, event: EventType) -> Option<(ElementId, String)> {
    let mut current = Some(id);
    while let Some(candidate) = current {
        let element = arena.get(candidate)?;
        if let Some(callback) = element.callback_for(event) {
            return Some((candidate, callback.to_string()));
        }
        current = element.parent();
    }
    None
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Pointer tracking between events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    pub hovered: Option<ElementId>,
    pub pressed: Option<ElementId>,
}

impl MouseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one event. Returns true if any callback ran.
    pub fn dispatch(&mut self, event: MouseEvent, arena: &RenderArena, registry: &mut HandlerRegistry) -> bool {
        let target = hit_test(arena, event.x, event.y);
        let mut handled = false;

        if target != self.hovered {
            self.hovered = target;
            if let Some(id) = target {
                handled |= fire(arena, registry, id, EventType::Hover);
            }
        }

        match event.action {
            MouseAction::Down => {
                self.pressed = target;
                if let Some(id) = target {
                    handled |= fire(arena, registry, id, EventType::Press);
                }
            }
            MouseAction::Up => {
                let pressed = self.pressed.take();
                if let Some(id) = target {
                    handled |= fire(arena, registry, id, EventType::Release);
                    if pressed == Some(id) {
                        handled |= fire(arena, registry, id, EventType::Click);
                    }
                }
            }
            MouseAction::Move => {}
        }
        handled
    }
}

fn fire(arena: &RenderArena, registry: &mut HandlerRegistry, id: ElementId, event: EventType) -> bool {
    let Some((bound, callback)) = bound_target(arena, id, event) else {
        return false;
    };
    trace!(element = %bound, ?event, callback = %callback, "mouse event");
    registry.invoke_callback(&callback)
}

// =============================================================================
// TESTS
// =============================================================================
