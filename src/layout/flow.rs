//! Flow Layout Engine
//!
//! Computes an absolute rect for every element in the arena.
//!
//! # Algorithm
//!
//! 1. **Measure** (bottom-up): base size of every element. Explicit size,
//!    then max size, then content (text, image, or the hug of its flow
//!    children), plus border and padding.
//! 2. **Layout** (top-down, one recursive call per child): each root gets
//!    the viewport; each parent splits its children into flow, absolute and
//!    hidden, distributes growth, aligns, and recurses.
//! 3. **Finalize** per element after its children: auto-size to children,
//!    minimum visible size for decorated containers, clamp to at least 1×1.

use crate::engine::{ElementId, RenderArena, RenderElement};
use crate::style::RenderConfig;
use crate::types::{Rect, Size};

use super::flags::{Alignment, Direction};
use super::text_measure::TextMeasure;

/// How an element's rect was decided, which controls finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Forced to the viewport.
    Root,
    /// Positioned by the parent's flow.
    Flow,
    /// Parent content origin plus header offset.
    Absolute,
    /// Not visible; placed at the content origin.
    Hidden,
    /// Rect set from outside (adjustment patches); only children move.
    Fixed,
}

/// One flow child during distribution.
#[derive(Debug, Clone, Copy)]
struct Item {
    id: ElementId,
    main: i32,
    cross: i32,
    explicit_cross: Option<i32>,
    grows: bool,
}

pub struct LayoutEngine<'a> {
    config: &'a RenderConfig,
    measure: &'a dyn TextMeasure,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a RenderConfig, measure: &'a dyn TextMeasure) -> Self {
        Self { config, measure }
    }

    /// Lay out every root at `viewport`. Returns the number of elements
    /// positioned.
    pub fn layout(&self, arena: &mut RenderArena, viewport: Size) -> usize {
        let roots = arena.roots();
        let mut count = 0;
        for &root in &roots {
            self.measure(arena, root);
        }
        for root in roots {
            let rect = Rect::new(0, 0, viewport.width, viewport.height);
            count += self.layout_element(arena, root, rect, Placement::Root);
        }
        count
    }

    /// Lay out the children of `id` again inside its current rect. Used after
    /// an adjustment patch changed that rect.
    pub fn relayout(&self, arena: &mut RenderArena, id: ElementId) -> usize {
        let Some(rect) = arena.get(id).map(|e| e.rect) else {
            return 0;
        };
        self.layout_element(arena, id, rect, Placement::Fixed)
    }

    // =========================================================================
    // Measure
    // =========================================================================

    /// Compute `intrinsic` for `id` and its subtree, children first.
    pub fn measure(&self, arena: &mut RenderArena, id: ElementId) {
        let children = arena.children(id).to_vec();
        for &child in &children {
            self.measure(arena, child);
        }
        let Some(element) = arena.get(id) else {
            return;
        };
        let size = self.base_size(arena, element, &children);
        if let Some(element) = arena.get_mut(id) {
            element.intrinsic = size;
        }
    }

    fn base_size(&self, arena: &RenderArena, element: &RenderElement, children: &[ElementId]) -> Size {
        let content = self.content_size(arena, element, children);
        let sizing = &element.sizing;
        Size::new(
            sizing.width.or(sizing.max_width).unwrap_or(content.width).max(0),
            sizing.height.or(sizing.max_height).unwrap_or(content.height).max(0),
        )
    }

    /// Content size plus border and padding. Zero when there is no content.
    fn content_size(&self, arena: &RenderArena, element: &RenderElement, children: &[ElementId]) -> Size {
        let insets = element.visual.insets();
        let inner = if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
            if element.element_type().is_text_bearing() {
                let font_size = element.text_style.font_size as f32 * self.config.scale;
                self.measure.measure(text, font_size)
            } else {
                Size::ZERO
            }
        } else if let Some(texture) = element.texture.filter(|_| element.texture_loaded) {
            Size::new(texture.width as i32, texture.height as i32)
        } else {
            hug(arena, element, children)
        };

        if inner == Size::ZERO {
            return Size::ZERO;
        }
        Size::new(inner.width + insets.horizontal(), inner.height + insets.vertical())
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn layout_element(&self, arena: &mut RenderArena, id: ElementId, rect: Rect, placement: Placement) -> usize {
        match arena.get_mut(id) {
            Some(element) => element.rect = rect,
            None => return 0,
        }
        let count = 1 + self.layout_children(arena, id);
        self.finalize(arena, id, placement);
        count
    }

    fn layout_children(&self, arena: &mut RenderArena, parent: ElementId) -> usize {
        let Some(p) = arena.get(parent) else {
            return 0;
        };
        let content = p.content_rect();
        let direction = p.layout.direction();
        let alignment = p.layout.alignment();
        let cross_align = p.sizing.cross_align.unwrap_or(alignment).cross();
        let wraps = p.layout.wraps();
        let gap = p.sizing.gap.max(0);
        let children = p.children.clone();

        let mut count = 0;
        let mut flow = Vec::new();
        for &child in &children {
            let Some(c) = arena.get(child) else {
                continue;
            };
            if !c.is_visible() {
                let rect = Rect::new(content.x, content.y, c.intrinsic.width, c.intrinsic.height);
                count += self.layout_element(arena, child, rect, Placement::Hidden);
            } else if c.is_absolute() {
                let rect = Rect::new(
                    content.x + c.header.x as i32,
                    content.y + c.header.y as i32,
                    c.intrinsic.width,
                    c.intrinsic.height,
                );
                count += self.layout_element(arena, child, rect, Placement::Absolute);
            } else {
                let is_row = direction.is_row();
                let (explicit_main, explicit_cross) = if is_row {
                    (c.sizing.width, c.sizing.height)
                } else {
                    (c.sizing.height, c.sizing.width)
                };
                let (main, cross) = if is_row {
                    (c.intrinsic.width, c.intrinsic.height)
                } else {
                    (c.intrinsic.height, c.intrinsic.width)
                };
                flow.push(Item {
                    id: child,
                    main: explicit_main.unwrap_or(main),
                    cross,
                    explicit_cross,
                    grows: c.grows(),
                });
            }
        }

        if flow.is_empty() {
            return count;
        }

        let (main_avail, cross_avail) = if direction.is_row() {
            (content.width, content.height)
        } else {
            (content.height, content.width)
        };

        let lines = break_lines(&flow, main_avail, gap, wraps);
        let mut cross_offset = 0;
        for line in lines {
            let items = &flow[line.clone()];
            let line_cross = if wraps {
                let natural = items
                    .iter()
                    .map(|i| i.explicit_cross.unwrap_or(i.cross))
                    .max()
                    .unwrap_or(0);
                if natural > 0 { natural } else { cross_avail }
            } else {
                cross_avail
            };

            let mains = distribute(items, main_avail, gap);
            let used: i32 = mains.iter().sum::<i32>() + gap * (items.len() as i32 - 1);
            let free = (main_avail - used).max(0);
            let (mut cursor, spacing) = main_start(alignment, free, gap, items.len());

            for (item, &main) in items.iter().zip(&mains) {
                let cross = item.explicit_cross.unwrap_or(if item.grows || item.cross <= 0 {
                    line_cross
                } else {
                    item.cross
                });
                let cross_pos = cross_offset
                    + match cross_align {
                        Alignment::Center => (line_cross - cross) / 2,
                        Alignment::End => line_cross - cross,
                        Alignment::Start | Alignment::SpaceBetween => 0,
                    };
                let main_pos = if direction.is_reverse() {
                    main_avail - cursor - main
                } else {
                    cursor
                };
                cursor += main + spacing;

                let rect = match direction {
                    Direction::Row | Direction::RowReverse => {
                        Rect::new(content.x + main_pos, content.y + cross_pos, main, cross)
                    }
                    Direction::Column | Direction::ColumnReverse => {
                        Rect::new(content.x + cross_pos, content.y + main_pos, cross, main)
                    }
                };
                count += self.layout_element(arena, item.id, rect, Placement::Flow);
            }
            cross_offset += line_cross + gap;
        }
        count
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    fn finalize(&self, arena: &mut RenderArena, id: ElementId, placement: Placement) {
        let extent = if placement == Placement::Flow {
            arena.get(id).and_then(|e| flow_extent(arena, e))
        } else {
            None
        };
        let unit = self.config.scaled_unit();

        let Some(element) = arena.get_mut(id) else {
            return;
        };

        // Auto-size to flow children on axes without an explicit size.
        if let Some((right, bottom)) = extent {
            if !element.grows() {
                let insets = element.visual.insets();
                if element.sizing.width.is_none() {
                    element.rect.width = right - element.rect.x + insets.right as i32;
                }
                if element.sizing.height.is_none() {
                    element.rect.height = bottom - element.rect.y + insets.bottom as i32;
                }
            }
        }

        // Decorated containers never collapse to a line.
        let (w, h) = (element.rect.width, element.rect.height);
        if element.element_type().is_container_like() && element.visual.has_visible_decoration() {
            if w <= 0 && h > 0 {
                element.rect.width = unit;
            } else if h <= 0 && w > 0 {
                element.rect.height = unit;
            }
        }

        element.rect.width = element.rect.width.max(1);
        element.rect.height = element.rect.height.max(1);
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Sum of flow children along the main axis plus gaps, max across.
fn hug(arena: &RenderArena, element: &RenderElement, children: &[ElementId]) -> Size {
    let is_row = element.layout.direction().is_row();
    let gap = element.sizing.gap.max(0);
    let mut main = 0;
    let mut cross = 0;
    let mut n = 0;
    for c in children.iter().filter_map(|&c| arena.get(c)).filter(|c| c.in_flow()) {
        let (m, x) = if is_row {
            (c.intrinsic.width, c.intrinsic.height)
        } else {
            (c.intrinsic.height, c.intrinsic.width)
        };
        main += m;
        cross = cross.max(x);
        n += 1;
    }
    if n == 0 {
        return Size::ZERO;
    }
    main += gap * (n - 1);
    if is_row { Size::new(main, cross) } else { Size::new(cross, main) }
}

/// Right/bottom edge of the element's flow children, if it has any.
fn flow_extent(arena: &RenderArena, element: &RenderElement) -> Option<(i32, i32)> {
    element
        .children
        .iter()
        .filter_map(|&c| arena.get(c))
        .filter(|c| c.in_flow())
        .map(|c| (c.rect.right(), c.rect.bottom()))
        .reduce(|(r, b), (r2, b2)| (r.max(r2), b.max(b2)))
}

/// Split items into lines. Without wrapping everything is one line.
fn break_lines(items: &[Item], main_avail: i32, gap: i32, wraps: bool) -> Vec<std::ops::Range<usize>> {
    if !wraps {
        return vec![0..items.len()];
    }
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, item) in items.iter().enumerate() {
        let next = if i == start { item.main } else { used + gap + item.main };
        if i > start && next > main_avail {
            lines.push(start..i);
            start = i;
            used = item.main;
        } else {
            used = next;
        }
    }
    lines.push(start..items.len());
    lines
}

/// Main sizes for a line. Growers share what the fixed items and gaps leave;
/// the last grower takes the remainder.
fn distribute(items: &[Item], main_avail: i32, gap: i32) -> Vec<i32> {
    let growers = items.iter().filter(|i| i.grows).count() as i32;
    if growers == 0 {
        return items.iter().map(|i| i.main).collect();
    }
    let fixed: i32 = items.iter().filter(|i| !i.grows).map(|i| i.main).sum();
    let gaps = gap * (items.len() as i32 - 1);
    let leftover = (main_avail - fixed - gaps).max(0);
    let share = leftover / growers;
    let remainder = leftover % growers;

    let last_grower = items.iter().rposition(|i| i.grows);
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match (item.grows, Some(idx) == last_grower) {
            (true, true) => share + remainder,
            (true, false) => share,
            (false, _) => item.main,
        })
        .collect()
}

/// Starting offset and spacing between items along the main axis.
fn main_start(alignment: Alignment, free: i32, gap: i32, n: usize) -> (i32, i32) {
    match alignment {
        Alignment::Start => (0, gap),
        Alignment::Center => (free / 2, gap),
        Alignment::End => (free, gap),
        Alignment::SpaceBetween if n > 1 => (0, gap + free / (n as i32 - 1)),
        Alignment::SpaceBetween => (free / 2, gap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ElementHeader, ElementType};
    use crate::engine::ElementSource;
    use crate::layout::{CellMeasure, LayoutFlags};
    use crate::types::{Edges, Rgba};

    struct Tree {
        arena: RenderArena,
    }

    impl Tree {
        fn new() -> Self {
            Self { arena: RenderArena::new() }
        }

        fn add(&mut self, ty: ElementType, parent: Option<ElementId>) -> ElementId {
            let n = self.arena.next_id().index();
            let id = self.arena.push(ElementSource::Document(n), ElementHeader::new(ty));
            self.arena.get_mut(id).unwrap().text_style.font_size = 16;
            if let Some(p) = parent {
                self.arena.link(p, id).unwrap();
            }
            id
        }

        fn sized(&mut self, parent: ElementId, w: i32, h: i32) -> ElementId {
            let id = self.add(ElementType::Container, Some(parent));
            let el = self.arena.get_mut(id).unwrap();
            el.sizing.width = Some(w);
            el.sizing.height = Some(h);
            id
        }

        fn el(&mut self, id: ElementId) -> &mut RenderElement {
            self.arena.get_mut(id).unwrap()
        }

        fn rect(&self, id: ElementId) -> Rect {
            self.arena.get(id).unwrap().rect
        }

        fn run(&mut self, w: i32, h: i32) {
            let config = RenderConfig::default();
            LayoutEngine::new(&config, &CellMeasure).layout(&mut self.arena, Size::new(w, h));
        }
    }

    #[test]
    fn test_space_between_row() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        let row = t.sized(root, 700, 500);
        t.el(row).layout = LayoutFlags::empty().with_alignment(Alignment::SpaceBetween);
        let a = t.sized(row, 100, 20);
        let b = t.sized(row, 50, 20);
        let c = t.sized(row, 150, 20);
        t.run(800, 600);
        assert_eq!(t.rect(a).x, 0);
        assert_eq!(t.rect(b).x, 300);
        assert_eq!(t.rect(c).x, 550);
    }

    #[test]
    fn test_space_between_single_child_centered() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        t.el(root).layout = LayoutFlags::empty().with_alignment(Alignment::SpaceBetween);
        let only = t.sized(root, 100, 10);
        t.run(300, 100);
        assert_eq!(t.rect(only).x, 100);
    }

    #[test]
    fn test_growth_remainder_goes_to_last() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        let fixed = t.sized(root, 100, 10);
        let g1 = t.add(ElementType::Container, Some(root));
        let g2 = t.add(ElementType::Container, Some(root));
        let g3 = t.add(ElementType::Container, Some(root));
        for g in [g1, g2, g3] {
            t.el(g).layout = LayoutFlags::GROW;
        }
        t.run(402, 50);
        // leftover 302 → 100, 100, 102
        assert_eq!(t.rect(fixed).width, 100);
        assert_eq!(t.rect(g1).width, 100);
        assert_eq!(t.rect(g2).width, 100);
        assert_eq!(t.rect(g3).width, 102);
        assert_eq!(t.rect(g3).x, 300);
        // growers fill the cross axis
        assert_eq!(t.rect(g1).height, 50);
    }

    #[test]
    fn test_column_center_alignment() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        t.el(root).layout = LayoutFlags::empty()
            .with_direction(Direction::Column)
            .with_alignment(Alignment::Center);
        let a = t.sized(root, 40, 20);
        let b = t.sized(root, 60, 20);
        t.run(200, 100);
        assert_eq!(t.rect(a).y, 30);
        assert_eq!(t.rect(b).y, 50);
        // cross alignment follows main alignment
        assert_eq!(t.rect(a).x, 80);
        assert_eq!(t.rect(b).x, 70);
    }

    #[test]
    fn test_row_reverse() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        t.el(root).layout = LayoutFlags::empty().with_direction(Direction::RowReverse);
        let a = t.sized(root, 40, 10);
        let b = t.sized(root, 60, 10);
        t.run(200, 50);
        assert_eq!(t.rect(a).x, 160);
        assert_eq!(t.rect(b).x, 100);
    }

    #[test]
    fn test_wrap_breaks_lines() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        t.el(root).layout = LayoutFlags::WRAP;
        let a = t.sized(root, 60, 10);
        let b = t.sized(root, 60, 20);
        let c = t.sized(root, 60, 10);
        t.run(150, 100);
        assert_eq!((t.rect(a).x, t.rect(a).y), (0, 0));
        assert_eq!((t.rect(b).x, t.rect(b).y), (60, 0));
        assert_eq!((t.rect(c).x, t.rect(c).y), (0, 20));
    }

    #[test]
    fn test_absolute_child_offset_from_content_origin() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        t.el(root).visual.padding = Edges::uniform(5);
        let abs = t.sized(root, 10, 10);
        t.el(abs).header.x = 20;
        t.el(abs).header.y = 30;
        let flow = t.sized(root, 10, 10);
        t.run(100, 100);
        assert_eq!(t.rect(abs), Rect::new(25, 35, 10, 10));
        // absolute children do not take flow space
        assert_eq!(t.rect(flow).x, 5);
    }

    #[test]
    fn test_text_is_measured_and_container_hugs() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        t.el(root).layout = LayoutFlags::empty().with_direction(Direction::Column);
        let boxed = t.add(ElementType::Container, Some(root));
        t.el(boxed).visual.padding = Edges::uniform(2);
        let label = t.add(ElementType::Text, Some(boxed));
        t.el(label).text = Some("abcd".into());
        t.run(400, 300);
        assert_eq!(t.rect(label).size(), Size::new(32, 16));
        assert_eq!(t.rect(boxed).size(), Size::new(36, 20));
    }

    #[test]
    fn test_min_visible_size_for_decorated_container() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        t.el(root).layout = LayoutFlags::empty().with_direction(Direction::Column);
        let bar = t.add(ElementType::Container, Some(root));
        t.el(bar).sizing.width = Some(100);
        t.el(bar).visual.background = Rgba::RED;
        t.run(400, 300);
        assert_eq!(t.rect(bar).height, 16);
    }

    #[test]
    fn test_everything_at_least_one() {
        let mut t = Tree::new();
        let root = t.add(ElementType::App, None);
        let empty = t.add(ElementType::Container, Some(root));
        let hidden = t.add(ElementType::Container, Some(root));
        t.el(hidden).visual.visible = false;
        let image = t.add(ElementType::Image, Some(root));
        t.run(0, 0);
        for id in [root, empty, hidden, image] {
            let r = t.rect(id);
            assert!(r.width >= 1 && r.height >= 1, "{id} has {r:?}");
        }
    }

    #[test]
    fn test_multiple_roots_get_viewport() {
        let mut t = Tree::new();
        let a = t.add(ElementType::App, None);
        let b = t.add(ElementType::Container, None);
        t.run(320, 240);
        assert_eq!(t.rect(a), Rect::new(0, 0, 320, 240));
        assert_eq!(t.rect(b), Rect::new(0, 0, 320, 240));
    }
}
