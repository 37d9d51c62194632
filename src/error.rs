//! Error types.
//!
//! Structural failures abort [`Session::load`](crate::Session::load); every
//! other kind is logged at the element boundary and the pipeline continues
//! with a safe default.

use thiserror::Error;

use crate::engine::ElementId;

/// Failure decoding an element record or a template block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of data at offset {offset}: needed {needed} more byte(s)")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("record at offset {offset} is too large to reference (max {max})")]
    OffsetOverflow { offset: usize, max: usize },
}

/// Fatal document load failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("document has {elements} element(s) but no root")]
    NoRoots { elements: usize },
    #[error("element offset table has {offsets} entries for {elements} elements")]
    OffsetTableMismatch { offsets: usize, elements: usize },
    #[error("malformed element record: {0}")]
    Decode(#[from] DecodeError),
}

/// Rejected parent/child link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("element {0} does not exist")]
    Missing(ElementId),
    #[error("element {0} cannot be its own child")]
    SelfLink(ElementId),
    #[error("element {child} already has parent {parent}")]
    AlreadyParented { child: ElementId, parent: ElementId },
    #[error("linking {child} under {parent} would create a cycle")]
    WouldCycle { parent: ElementId, child: ElementId },
}

/// Component expansion failures. The expander logs these and leaves the
/// placeholder childless.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("component `{0}` is not defined")]
    UnknownComponent(String),
    #[error("component `{0}` instantiates itself")]
    Recursive(String),
    #[error("component nesting deeper than {0} levels")]
    TooDeep(usize),
    #[error("template of `{component}` is malformed: {source}")]
    Template {
        component: String,
        #[source]
        source: DecodeError,
    },
    #[error("element {0} is not a component instance")]
    NotAnInstance(ElementId),
}

/// Errors reported by adjustment handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjustError {
    #[error("element {0} has no parent to adjust against")]
    NoParent(ElementId),
    #[error("element {0} is missing from the render tree")]
    Missing(ElementId),
    #[error("invalid value `{value}` for property `{property}`")]
    InvalidProperty { property: String, value: String },
    #[error("{0}")]
    Other(String),
}

/// Texture loading failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("resource index {0} is not in the resource table")]
    UnknownResource(u8),
    #[error("failed to load `{path}`: {reason}")]
    LoadFailed { path: String, reason: String },
}
