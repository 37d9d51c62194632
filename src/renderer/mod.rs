//! Renderer - paint the laid-out tree through a [`Painter`].
//!
//! # Traversal Order
//!
//! Depth-first from each root, children in child order:
//!
//! ```text
//! background → border → text / texture → children
//! ```
//!
//! Hidden elements are skipped with their subtrees. Opacity scales the alpha
//! of everything the element itself draws.

use crate::engine::{ElementId, RenderArena, RenderElement, TextStyle};
use crate::pipeline::TextureInfo;
use crate::style::effective_background;
use crate::types::{Edges, Rect, Rgba};

/// Drawing backend.
pub trait Painter {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    /// Stroke a border of per-edge `widths` just inside `rect`.
    fn stroke_border(&mut self, rect: Rect, widths: Edges, color: Rgba);
    fn draw_text(&mut self, rect: Rect, text: &str, style: &TextStyle);
    fn draw_texture(&mut self, rect: Rect, texture: TextureInfo);
}

/// Paint every root. Returns the number of elements visited.
pub fn paint(arena: &RenderArena, painter: &mut dyn Painter) -> usize {
    let mut painted = 0;
    let mut stack: Vec<ElementId> = arena.roots().into_iter().rev().collect();
    while let Some(id) = stack.pop() {
        let Some(element) = arena.get(id) else {
            continue;
        };
        if !element.is_visible() {
            continue;
        }
        paint_element(element, painter);
        painted += 1;
        stack.extend(element.children().iter().rev().copied());
    }
    painted
}

fn paint_element(element: &RenderElement, painter: &mut dyn Painter) {
    let opacity = element.visual.opacity as f32 / 255.0;

    let background = effective_background(element);
    if !background.is_transparent() {
        painter.fill_rect(element.rect, background);
    }

    if element.visual.has_visible_border() {
        if let Some(color) = element.visual.border_color {
            painter.stroke_border(element.rect, element.visual.border, color.with_opacity(opacity));
        }
    }

    let content = element.content_rect();
    if element.element_type().is_text_bearing() {
        if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
            let mut style = element.text_style.clone();
            style.color = style.color.with_opacity(opacity);
            painter.draw_text(content, text, &style);
        }
    } else if let Some(texture) = element.texture.filter(|_| element.texture_loaded) {
        painter.draw_texture(content, texture);
    }
}

// =============================================================================
// Recording painter
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill { rect: Rect, color: Rgba },
    Border { rect: Rect, widths: Edges, color: Rgba },
    Text { rect: Rect, text: String, color: Rgba, font_size: u16 },
    Texture { rect: Rect, texture: TextureInfo },
}

/// Painter that records commands, for tests and display-list backends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Painter for DrawList {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::Fill { rect, color });
    }

    fn stroke_border(&mut self, rect: Rect, widths: Edges, color: Rgba) {
        self.commands.push(DrawCommand::Border { rect, widths, color });
    }

    fn draw_text(&mut self, rect: Rect, text: &str, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            rect,
            text: text.to_string(),
            color: style.color,
            font_size: style.font_size,
        });
    }

    fn draw_texture(&mut self, rect: Rect, texture: TextureInfo) {
        self.commands.push(DrawCommand::Texture { rect, texture });
    }
}
