//! Text Measurement
//!
//! Text size in layout units, behind the [`TextMeasure`] trait so embedders
//! can plug in real font metrics.
//!
//! The built-in [`CellMeasure`] works on display cells:
//! - ASCII characters: 1 cell
//! - CJK characters: 2 cells (fullwidth)
//! - Emoji: 2 cells (most)
//! - Zero-width characters: 0 cells
//!
//! and converts cells to units with a fixed advance of half the font size.

use unicode_width::UnicodeWidthStr;

use crate::types::Size;

/// Measures a run of text at a given (already scaled) font size.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> Size;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32) -> Size,
{
    fn measure(&self, text: &str, font_size: f32) -> Size {
        self(text, font_size)
    }
}

/// Monospace approximation: advance = cells × font_size / 2,
/// line height = font_size.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn measure(&self, text: &str, font_size: f32) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let cells = text.lines().map(string_width).max().unwrap_or(0);
        let lines = text.lines().count().max(1);
        Size::new(
            (cells as f32 * font_size / 2.0).ceil() as i32,
            (lines as f32 * font_size).ceil() as i32,
        )
    }
}

/// Measure the display width of a string in cells.
pub fn string_width(s: &str) -> usize {
    s.width()
}
