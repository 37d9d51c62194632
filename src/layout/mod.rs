//! Layout Module
//!
//! Flow-and-absolute layout over the render arena.
//!
//! # Architecture
//!
//! - [`LayoutFlags`]: the packed layout byte (direction, alignment, wrap,
//!   grow, absolute)
//! - [`TextMeasure`]: text sizing collaborator, [`CellMeasure`] by default
//! - [`LayoutEngine`]: measure bottom-up, position top-down, finalize
//!
//! # Example
//!
//! ```ignore
//! use krb_runtime::layout::{CellMeasure, LayoutEngine};
//!
//! let engine = LayoutEngine::new(&config, &CellMeasure);
//! engine.layout(&mut arena, Size::new(800, 600));
//! ```

mod flags;
mod flow;
mod text_measure;

pub use flags::*;
pub use flow::LayoutEngine;
pub use text_measure::*;
