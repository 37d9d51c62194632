//! TabBar - a bar docked along one edge of its parent.
//!
//! The bar keeps the thickness layout gave it and takes the full length of
//! the parent's content box along its edge. The first growing flow sibling
//! (or, failing that, the next flow sibling) shrinks to the remaining area.

use std::str::FromStr;

use crate::engine::{ElementId, RenderElement};
use crate::error::AdjustError;
use crate::pipeline::{AdjustContext, AdjustHandler, GeometryPatch};
use crate::types::Rect;

pub const TAB_BAR: &str = "TabBar";

/// Instance property naming the docking edge.
pub const POSITION_KEY: &str = "position";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DockEdge {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl FromStr for DockEdge {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

impl DockEdge {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Split `area` into (bar, rest) for a bar of `thickness`.
    pub fn split(self, area: Rect, thickness: i32) -> (Rect, Rect) {
        let t = if self.is_horizontal() {
            thickness.clamp(0, area.height)
        } else {
            thickness.clamp(0, area.width)
        };
        match self {
            Self::Top => (
                Rect::new(area.x, area.y, area.width, t),
                Rect::new(area.x, area.y + t, area.width, area.height - t),
            ),
            Self::Bottom => (
                Rect::new(area.x, area.bottom() - t, area.width, t),
                Rect::new(area.x, area.y, area.width, area.height - t),
            ),
            Self::Left => (
                Rect::new(area.x, area.y, t, area.height),
                Rect::new(area.x + t, area.y, area.width - t, area.height),
            ),
            Self::Right => (
                Rect::new(area.right() - t, area.y, t, area.height),
                Rect::new(area.x, area.y, area.width - t, area.height),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TabBarAdjuster;

impl TabBarAdjuster {
    fn edge(target: ElementId, ctx: &AdjustContext<'_>) -> Result<DockEdge, AdjustError> {
        match ctx.instance_prop_text(target, POSITION_KEY) {
            None => Ok(DockEdge::Top),
            Some(value) => value
                .parse()
                .map_err(|_| AdjustError::InvalidProperty { property: POSITION_KEY.to_string(), value }),
        }
    }

    /// First growing flow sibling, else the first flow sibling after the bar.
    fn content_sibling<'a>(target: ElementId, ctx: &AdjustContext<'a>) -> Option<&'a RenderElement> {
        let siblings = ctx.siblings(target);
        if let Some(grower) = siblings.iter().find(|s| s.in_flow() && s.grows()) {
            return Some(*grower);
        }
        let parent = ctx.arena.parent(target)?;
        ctx.arena
            .children(parent)
            .iter()
            .skip_while(|&&c| c != target)
            .skip(1)
            .filter_map(|&c| ctx.arena.get(c))
            .find(|s| s.in_flow())
    }
}

impl AdjustHandler for TabBarAdjuster {
    fn adjust(
        &self,
        target: ElementId,
        ctx: &AdjustContext<'_>,
        patch: &mut GeometryPatch,
    ) -> Result<(), AdjustError> {
        let bar = ctx.element(target)?;
        let parent = ctx.parent(target)?;
        let edge = Self::edge(target, ctx)?;

        let thickness = if edge.is_horizontal() { bar.rect.height } else { bar.rect.width };
        let (bar_rect, rest) = edge.split(parent.content_rect(), thickness);
        patch.set_rect(target, bar_rect);
        patch.relayout(target);

        if let Some(sibling) = Self::content_sibling(target, ctx) {
            patch.set_rect(sibling.id, rest);
            patch.relayout(sibling.id);
        }
        Ok(())
    }
}
