//! Render Engine - element arena and the resolved element record.
//!
//! Elements are addressed by [`ElementId`] and owned by one [`RenderArena`].
//! Parent/child structure lives in the arena as ids, never as references:
//!
//! ```text
//! #0 App        (parent=None, children=[#1, #2])
//! #1 Container  (parent=#0,   children=[#3])
//! #2 Text       (parent=#0,   children=[])
//! #3 Container  (expanded from a template)
//! ```

mod arena;
mod element;

pub use arena::*;
pub use element::*;
