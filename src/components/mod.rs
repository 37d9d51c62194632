//! Built-in component adjusters.

mod tab_bar;

pub use tab_bar::{DockEdge, TabBarAdjuster, POSITION_KEY, TAB_BAR};
