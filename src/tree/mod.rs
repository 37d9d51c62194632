//! Render tree construction.
//!
//! Ingestion resolves every document element into the arena, the builder
//! links them from child refs, and the expander splices component templates
//! under their placeholders.

mod builder;
mod expand;
mod ingest;
mod template;

pub use builder::build_tree;
pub use expand::{prop_text, Expander, MAX_DEPTH};
pub use ingest::{classify, ingest, instance_props, materialize};
pub use template::{decode_template, ChildEdge, RefProblem, TemplateGraph, TemplateNode, UnresolvedRef};
