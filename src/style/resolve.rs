//! Style & property resolution: defaults, then style, then direct.

use tracing::{trace, warn};

use crate::document::{Document, ElementRecord, ElementType, EventType, PropValue, Property, PropertyId, SLOT_KEY};
use crate::engine::{EventBinding, RenderElement};
use crate::layout::{Alignment, LayoutFlags};
use crate::types::{CursorType, Edges, Rgba, TextAlign};

use super::config::{font_weight, RenderConfig};

/// Resolve the visual and sizing attributes of `element` from `record`.
///
/// Only the element's own resolved fields are written.
pub fn resolve_element(
    element: &mut RenderElement,
    record: &ElementRecord,
    document: &Document,
    config: &RenderConfig,
) {
    apply_defaults(element, config);

    // Style layer
    let style_id = element.header.style_id;
    if style_id != 0 {
        match document.style(style_id) {
            Some(style) => {
                for prop in &style.properties {
                    apply_property(element, prop, document);
                }
            }
            None => warn!(element = %element.id, style_id, "unknown style id, keeping defaults"),
        }
    }

    // Header hints sit between style and direct properties.
    let header = element.header;
    if header.width != 0 {
        element.sizing.width = Some(header.width as i32);
    }
    if header.height != 0 {
        element.sizing.height = Some(header.height as i32);
    }
    if !header.layout.is_empty() {
        element.layout = header.layout;
    }

    // Direct layer
    for prop in &record.properties {
        apply_property(element, prop, document);
    }

    apply_border_rules(element, config);

    element.name = document.name(header.name_index).map(str::to_string);
    element.slot = record.custom(document, SLOT_KEY).is_some();
    element.events = record
        .events
        .iter()
        .filter_map(|e| {
            let Some(event) = EventType::from_u8(e.event_type) else {
                warn!(element = %element.id, event_type = e.event_type, "unknown event type");
                return None;
            };
            let Some(callback) = document.string(e.callback) else {
                warn!(element = %element.id, index = e.callback, "event callback name out of range");
                return None;
            };
            Some(EventBinding { event, callback: callback.to_string() })
        })
        .collect();
}

fn apply_defaults(element: &mut RenderElement, config: &RenderConfig) {
    element.visual = Default::default();
    element.sizing = Default::default();
    element.layout = LayoutFlags::empty();
    element.text = None;
    element.resource = None;
    element.visual.visible = config.visible;
    element.visual.border = Edges::uniform(config.border_width);

    match element.element_type() {
        ElementType::App => element.visual.background = config.background,
        ElementType::Button => element.visual.cursor = CursorType::Pointer,
        ElementType::Input => element.visual.cursor = CursorType::Text,
        _ => {}
    }
}

/// Border color set with zero widths gets width 1; nonzero widths without a
/// visible color get the configured border color.
fn apply_border_rules(element: &mut RenderElement, config: &RenderConfig) {
    let v = &mut element.visual;
    let colored = v.border_color.is_some_and(|c| !c.is_transparent());
    if colored && v.border.is_zero() {
        v.border = Edges::uniform(1);
    } else if !v.border.is_zero() && !colored {
        v.border_color = Some(config.border_color);
    }
}

/// Apply one property to the element's resolved fields.
pub fn apply_property(element: &mut RenderElement, prop: &Property, document: &Document) {
    let value = &prop.value;
    let applied = match prop.id {
        PropertyId::BackgroundColor => value.as_color().map(|c| element.visual.background = c),
        PropertyId::ForegroundColor => value.as_color().map(|c| element.visual.foreground = Some(c)),
        PropertyId::BorderColor => value.as_color().map(|c| element.visual.border_color = Some(c)),
        PropertyId::BorderWidth => value.as_edges().map(|e| element.visual.border = e),
        PropertyId::Padding => value.as_edges().map(|e| element.visual.padding = e),
        PropertyId::TextContent => value
            .as_string_index()
            .and_then(|i| document.string(i))
            .map(|s| element.text = Some(s.to_string())),
        PropertyId::FontSize => value
            .as_u16()
            .filter(|&v| v > 0)
            .map(|v| element.visual.font_size = Some(v)),
        PropertyId::FontWeight => font_weight(value).map(|w| element.visual.font_weight = Some(w)),
        PropertyId::TextAlignment => value
            .as_u16()
            .map(|v| element.visual.text_align = Some(TextAlign::from(v as u8))),
        PropertyId::ImageSource => match value {
            PropValue::Resource(i) => {
                element.resource = Some(*i);
                Some(())
            }
            _ => None,
        },
        PropertyId::Opacity => opacity(value).map(|o| element.visual.opacity = o),
        PropertyId::Visibility => value.as_u16().map(|v| element.visual.visible = v != 0),
        PropertyId::Gap => value.as_u16().map(|v| element.sizing.gap = v as i32),
        PropertyId::MaxWidth => value.as_u16().map(|v| element.sizing.max_width = Some(v as i32)),
        PropertyId::MaxHeight => value.as_u16().map(|v| element.sizing.max_height = Some(v as i32)),
        PropertyId::Width => value.as_u16().map(|v| element.sizing.width = Some(v as i32)),
        PropertyId::Height => value.as_u16().map(|v| element.sizing.height = Some(v as i32)),
        PropertyId::LayoutFlags => value
            .as_u16()
            .map(|v| element.layout = LayoutFlags::from_bits_retain(v as u8)),
        PropertyId::Cursor => value
            .as_u16()
            .map(|v| element.visual.cursor = CursorType::from(v as u8)),
        PropertyId::FontFamily => value
            .as_string_index()
            .and_then(|i| document.string(i))
            .map(|s| element.visual.font_family = Some(s.to_string())),
        PropertyId::CrossAlignment => value
            .as_u16()
            .map(|v| element.sizing.cross_align = Some(Alignment::from(v as u8))),
        // Window-level properties only matter on the App element's config.
        PropertyId::WindowWidth
        | PropertyId::WindowHeight
        | PropertyId::WindowTitle
        | PropertyId::ScaleFactor => Some(()),
        PropertyId::Other(raw) => {
            trace!(element = %element.id, id = raw, "ignoring unknown property");
            Some(())
        }
    };
    if applied.is_none() {
        trace!(element = %element.id, id = ?prop.id, value = ?value, "property value has unexpected type");
    }
}

fn opacity(value: &PropValue) -> Option<u8> {
    match value {
        PropValue::Byte(b) => Some(*b),
        PropValue::Percentage(p) => Some(((*p).min(256) as u32 * 255 / 256) as u8),
        _ => None,
    }
}

/// Resolved background color after opacity.
pub fn effective_background(element: &RenderElement) -> Rgba {
    element
        .visual
        .background
        .with_opacity(element.visual.opacity as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentBuilder, ElementSpec};
    use crate::engine::{ElementId, ElementSource};

    fn resolve(doc: &Document, index: usize) -> RenderElement {
        let record = &doc.elements[index];
        let mut el = RenderElement::new(ElementId(index as u32), ElementSource::Document(index), record.header);
        resolve_element(&mut el, record, doc, &RenderConfig::default());
        el
    }

    #[test]
    fn test_direct_overrides_style_overrides_default() {
        let mut b = DocumentBuilder::new();
        let style = b.style(
            "card",
            vec![
                Property::color(PropertyId::BackgroundColor, Rgba::RED),
                Property::color(PropertyId::ForegroundColor, Rgba::GREEN),
            ],
        );
        b.push(ElementSpec::container().style(style).background(Rgba::BLUE), None);
        let el = resolve(&b.build(), 0);
        assert_eq!(el.visual.background, Rgba::BLUE);
        assert_eq!(el.visual.foreground, Some(Rgba::GREEN));
    }

    #[test]
    fn test_border_color_only_gets_width_one() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::container().border_color(Rgba::RED), None);
        let el = resolve(&b.build(), 0);
        assert_eq!(el.visual.border, Edges::uniform(1));
    }

    #[test]
    fn test_app_border_width_seeds_every_element() {
        let mut b = DocumentBuilder::new();
        let app = b.push(ElementSpec::app().border_width(2), None);
        b.push(ElementSpec::container().size(10, 10), Some(app));
        b.push(ElementSpec::container().border_width(5), Some(app));
        let doc = b.build();
        let config = RenderConfig::from_document(&doc);
        assert_eq!(config.border_width, 2);

        let resolve_with = |index: usize| {
            let record = &doc.elements[index];
            let mut el = RenderElement::new(ElementId(index as u32), ElementSource::Document(index), record.header);
            resolve_element(&mut el, record, &doc, &config);
            el
        };
        let child = resolve_with(1);
        assert_eq!(child.visual.border, Edges::uniform(2));
        assert_eq!(child.visual.border_color, Some(config.border_color));
        assert_eq!(resolve_with(2).visual.border, Edges::uniform(5));
    }

    #[test]
    fn test_border_width_only_gets_config_color() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::container().border_width(2), None);
        let el = resolve(&b.build(), 0);
        assert_eq!(el.visual.border_color, Some(RenderConfig::default().border_color));
    }

    #[test]
    fn test_width_precedence() {
        let mut b = DocumentBuilder::new();
        let style = b.style("w", vec![Property::short(PropertyId::Width, 10)]);
        b.push(ElementSpec::container().style(style), None);
        b.push(ElementSpec::container().style(style).size(20, 0), None);
        b.push(
            ElementSpec::container()
                .style(style)
                .size(20, 0)
                .prop(PropertyId::Width, PropValue::Short(30)),
            None,
        );
        let doc = b.build();
        assert_eq!(resolve(&doc, 0).sizing.width, Some(10));
        assert_eq!(resolve(&doc, 1).sizing.width, Some(20));
        assert_eq!(resolve(&doc, 2).sizing.width, Some(30));
    }

    #[test]
    fn test_app_background_defaults_to_config() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::app(), None);
        b.push(ElementSpec::container(), Some(0));
        let doc = b.build();
        assert_eq!(resolve(&doc, 0).visual.background, Rgba::BLACK);
        assert_eq!(resolve(&doc, 1).visual.background, Rgba::TRANSPARENT);
    }

    #[test]
    fn test_unknown_style_keeps_defaults() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::container().style(9), None);
        let el = resolve(&b.build(), 0);
        assert_eq!(el.visual.background, Rgba::TRANSPARENT);
        assert!(el.visual.border.is_zero());
    }

    #[test]
    fn test_events_resolve_callback_names() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::button("Go").on(EventType::Click, "go_clicked"), None);
        let el = resolve(&b.build(), 0);
        assert_eq!(el.callback_for(EventType::Click), Some("go_clicked"));
        assert_eq!(el.visual.cursor, CursorType::Pointer);
        assert_eq!(el.text.as_deref(), Some("Go"));
    }
}
