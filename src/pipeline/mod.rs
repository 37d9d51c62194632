//! Render Pipeline
//!
//! Connects the document to a positioned render tree.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Document → ingest → build_tree → expand → textures → inheritance
//!          → (per frame) layout → adjust → paint
//! ```
//!
//! ## Data Flow
//!
//! 1. **Session::load** - builds the arena once from the read-only document
//! 2. **Session::frame** - lays out every root, then runs adjustment handlers
//! 3. **paint / hit_test** - read the final geometry
//!
//! ## Key Design Principles
//!
//! - **Read-only document**: the session borrows it for its whole lifetime
//! - **Patch-based adjustment**: handlers see a shared view and return a
//!   [`GeometryPatch`]; only the dispatcher mutates geometry after layout

mod adjust;
mod registry;
mod resources;
mod session;

pub use adjust::{run_adjustments, AdjustContext, AdjustHandler, AdjustStats, GeometryPatch};
pub use registry::{Callback, HandlerRegistry};
pub use resources::{NullLoader, ResourceLoader, TextureCache, TextureInfo};
pub use session::{FrameStats, Session, SessionOptions};
