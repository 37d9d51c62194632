//! Inheritance resolution for text attributes.
//!
//! Walks every root top-down with an explicit stack. An element's explicit
//! value replaces the inherited one for its whole subtree; anything left
//! unset takes the nearest explicit ancestor value, then the config default.
//!
//! Only the computed [`TextStyle`] is written, never the explicit `Visual`
//! fields, so running the pass again after a re-expansion gives the same
//! answer for untouched elements.

use crate::engine::{ElementId, RenderArena, TextStyle, Visual};

use super::RenderConfig;

/// The context a root starts from.
pub fn root_text_style(config: &RenderConfig) -> TextStyle {
    TextStyle {
        color: config.foreground,
        font_size: config.font_size,
        font_family: config.font_family.clone(),
        font_weight: config.font_weight,
        align: config.text_align,
    }
}

fn compute(visual: &Visual, inherited: &TextStyle) -> TextStyle {
    TextStyle {
        color: visual.foreground.unwrap_or(inherited.color),
        font_size: visual.font_size.unwrap_or(inherited.font_size),
        font_family: visual
            .font_family
            .clone()
            .unwrap_or_else(|| inherited.font_family.clone()),
        font_weight: visual.font_weight.unwrap_or(inherited.font_weight),
        align: visual.text_align.unwrap_or(inherited.align),
    }
}

/// Recompute `text_style` for every element in the arena.
pub fn resolve_inheritance(arena: &mut RenderArena, config: &RenderConfig) {
    let base = root_text_style(config);
    for root in arena.roots() {
        resolve_subtree(arena, root, &base);
    }
}

/// Recompute `text_style` for `root` and its descendants, starting from
/// `inherited`.
pub fn resolve_subtree(arena: &mut RenderArena, root: ElementId, inherited: &TextStyle) {
    let mut stack: Vec<(ElementId, TextStyle)> = vec![(root, inherited.clone())];
    while let Some((id, context)) = stack.pop() {
        let Some(element) = arena.get_mut(id) else {
            continue;
        };
        let computed = compute(&element.visual, &context);
        element.text_style = computed.clone();
        for &child in element.children.iter().rev() {
            stack.push((child, computed.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ElementHeader, ElementType};
    use crate::engine::ElementSource;
    use crate::types::Rgba;

    fn setup() -> (RenderArena, ElementId, ElementId, ElementId) {
        let mut arena = RenderArena::new();
        let root = arena.push(ElementSource::Document(0), ElementHeader::new(ElementType::App));
        let mid = arena.push(ElementSource::Document(1), ElementHeader::new(ElementType::Container));
        let leaf = arena.push(ElementSource::Document(2), ElementHeader::new(ElementType::Text));
        arena.link(root, mid).unwrap();
        arena.link(mid, leaf).unwrap();
        (arena, root, mid, leaf)
    }

    #[test]
    fn test_unset_takes_nearest_explicit_ancestor() {
        let (mut arena, root, mid, leaf) = setup();
        arena.get_mut(root).unwrap().visual.foreground = Some(Rgba::RED);
        arena.get_mut(mid).unwrap().visual.foreground = Some(Rgba::GREEN);
        resolve_inheritance(&mut arena, &RenderConfig::default());
        assert_eq!(arena.get(leaf).unwrap().text_style.color, Rgba::GREEN);
    }

    #[test]
    fn test_explicit_never_replaced() {
        let (mut arena, root, _, leaf) = setup();
        arena.get_mut(root).unwrap().visual.font_size = Some(30);
        arena.get_mut(leaf).unwrap().visual.font_size = Some(12);
        resolve_inheritance(&mut arena, &RenderConfig::default());
        assert_eq!(arena.get(leaf).unwrap().text_style.font_size, 12);
    }

    #[test]
    fn test_config_is_terminal_fallback() {
        let (mut arena, _, _, leaf) = setup();
        let config = RenderConfig::default();
        resolve_inheritance(&mut arena, &config);
        let style = &arena.get(leaf).unwrap().text_style;
        assert_eq!(style.color, config.foreground);
        assert_eq!(style.font_family, config.font_family);
    }

    #[test]
    fn test_rerun_is_stable() {
        let (mut arena, root, mid, leaf) = setup();
        arena.get_mut(root).unwrap().visual.foreground = Some(Rgba::RED);
        let config = RenderConfig::default();
        resolve_inheritance(&mut arena, &config);
        // Explicit value on the middle element appears after the first pass.
        arena.get_mut(mid).unwrap().visual.foreground = Some(Rgba::BLUE);
        resolve_inheritance(&mut arena, &config);
        assert_eq!(arena.get(leaf).unwrap().text_style.color, Rgba::BLUE);
        arena.get_mut(mid).unwrap().visual.foreground = None;
        resolve_inheritance(&mut arena, &config);
        assert_eq!(arena.get(leaf).unwrap().text_style.color, Rgba::RED);
    }
}
