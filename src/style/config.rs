//! Render configuration - document-wide defaults.
//!
//! Established once per load from the first `App` element (its style, then
//! its direct properties). Every value has a hard-coded fallback used when
//! the document has no App element or leaves the value unset.

use tracing::debug;

use crate::document::{Document, ElementRecord, PropValue, Property, PropertyId};
use crate::types::{FontWeight, Rgba, TextAlign};

// =============================================================================
// Fallbacks
// =============================================================================

pub const DEFAULT_FONT_SIZE: u16 = 16;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_WINDOW_WIDTH: u16 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u16 = 600;
pub const DEFAULT_TITLE: &str = "krb";

/// Document-wide defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub background: Rgba,
    pub foreground: Rgba,
    pub border_color: Rgba,
    pub border_width: u16,
    pub text_align: TextAlign,
    pub visible: bool,
    pub font_size: u16,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub scale: f32,
    pub window_width: u16,
    pub window_height: u16,
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Rgba::BLACK,
            foreground: Rgba::WHITE,
            border_color: Rgba::GRAY,
            border_width: 0,
            text_align: TextAlign::Start,
            visible: true,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_weight: FontWeight::Normal,
            scale: 1.0,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl RenderConfig {
    /// Build from the document's first App element.
    pub fn from_document(document: &Document) -> Self {
        let mut config = Self::default();
        let Some(app) = document.app_element() else {
            debug!("no App element, using built-in defaults");
            return config;
        };

        if let Some(style) = document.style(app.header.style_id) {
            for prop in &style.properties {
                config.apply(prop, document);
            }
        }
        config.apply_header(app);
        for prop in &app.properties {
            config.apply(prop, document);
        }

        debug!(
            width = config.window_width,
            height = config.window_height,
            scale = config.scale,
            "render config established"
        );
        config
    }

    fn apply_header(&mut self, app: &ElementRecord) {
        if app.header.width != 0 {
            self.window_width = app.header.width;
        }
        if app.header.height != 0 {
            self.window_height = app.header.height;
        }
    }

    fn apply(&mut self, prop: &Property, document: &Document) {
        let value = &prop.value;
        match prop.id {
            PropertyId::BackgroundColor => set(&mut self.background, value.as_color()),
            PropertyId::ForegroundColor => set(&mut self.foreground, value.as_color()),
            PropertyId::BorderColor => set(&mut self.border_color, value.as_color()),
            PropertyId::BorderWidth => set(&mut self.border_width, value.as_u16()),
            PropertyId::TextAlignment => {
                set(&mut self.text_align, value.as_u16().map(|v| TextAlign::from(v as u8)))
            }
            PropertyId::Visibility => set(&mut self.visible, value.as_u16().map(|v| v != 0)),
            PropertyId::FontSize => set(&mut self.font_size, value.as_u16().filter(|&v| v > 0)),
            PropertyId::FontWeight => set(&mut self.font_weight, font_weight(value)),
            PropertyId::FontFamily => set(&mut self.font_family, string(value, document)),
            PropertyId::WindowWidth => set(&mut self.window_width, value.as_u16().filter(|&v| v > 0)),
            PropertyId::WindowHeight => set(&mut self.window_height, value.as_u16().filter(|&v| v > 0)),
            PropertyId::WindowTitle => set(&mut self.title, string(value, document)),
            PropertyId::ScaleFactor => set(&mut self.scale, scale_factor(value)),
            _ => {}
        }
    }

    /// `round(font_size × scale)`, at least 1.
    pub fn scaled_unit(&self) -> i32 {
        ((self.font_size as f32 * self.scale).round() as i32).max(1)
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn string(value: &PropValue, document: &Document) -> Option<String> {
    value
        .as_string_index()
        .and_then(|i| document.string(i))
        .map(str::to_string)
}

/// Numeric weights below 10 are read on the 1-9 scale (`7` = 700).
pub(crate) fn font_weight(value: &PropValue) -> Option<FontWeight> {
    let w = value.as_u16()?;
    Some(FontWeight::from(if w < 10 { w * 100 } else { w }))
}

/// Percentage and short values are 8.8 fixed point; a byte is a whole factor.
pub(crate) fn scale_factor(value: &PropValue) -> Option<f32> {
    let scale = match value {
        PropValue::Percentage(v) | PropValue::Short(v) => *v as f32 / 256.0,
        PropValue::Byte(v) => *v as f32,
        _ => return None,
    };
    (scale > 0.0).then_some(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentBuilder, ElementSpec};

    #[test]
    fn test_fallbacks_without_app() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::container(), None);
        let config = RenderConfig::from_document(&b.build());
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.foreground, Rgba::WHITE);
    }

    #[test]
    fn test_direct_overrides_style() {
        let mut b = DocumentBuilder::new();
        let style = b.style(
            "root",
            vec![
                Property::color(PropertyId::BackgroundColor, Rgba::RED),
                Property::short(PropertyId::FontSize, 20),
            ],
        );
        b.push(
            ElementSpec::app()
                .style(style)
                .background(Rgba::BLUE)
                .prop(PropertyId::WindowWidth, PropValue::Short(1024))
                .prop(PropertyId::ScaleFactor, PropValue::Percentage(512)),
            None,
        );
        let config = RenderConfig::from_document(&b.build());
        assert_eq!(config.background, Rgba::BLUE);
        assert_eq!(config.font_size, 20);
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, DEFAULT_WINDOW_HEIGHT);
        assert_eq!(config.scale, 2.0);
        assert_eq!(config.scaled_unit(), 40);
    }

    #[test]
    fn test_title_from_string_table() {
        let mut b = DocumentBuilder::new();
        let title = b.intern("Demo");
        b.push(
            ElementSpec::app().prop(PropertyId::WindowTitle, PropValue::String(title)),
            None,
        );
        let config = RenderConfig::from_document(&b.build());
        assert_eq!(config.title, "Demo");
    }
}
