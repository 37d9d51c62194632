//! Style resolution.
//!
//! - [`RenderConfig`]: document-wide defaults from the App element
//! - [`resolve_element`]: default → style → direct precedence per element
//! - [`resolve_inheritance`]: inherited text attributes, top-down

mod config;
mod inheritance;
mod resolve;

pub use config::*;
pub use inheritance::*;
pub use resolve::*;
