//! # krb-runtime
//!
//! Render-tree pipeline for compiled KRB UI documents.
//!
//! ## Architecture
//!
//! A [`Document`] is the parsed, immutable binary UI file. A [`Session`]
//! turns it into a render tree held in an arena of elements addressed by
//! [`ElementId`], expands component templates, and lays the tree out every
//! frame:
//!
//! ```text
//! Document → resolve styles → link tree → expand components → inherit text
//!          → layout → adjust → paint
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Rgba, Edges, Rect, text enums)
//! - [`document`] - Document model, record codec, builder
//! - [`engine`] - Render arena and elements
//! - [`style`] - Config, property resolution, inheritance
//! - [`tree`] - Ingestion, tree building, component expansion
//! - [`layout`] - Flow/absolute layout and text measurement
//! - [`pipeline`] - Session, adjustment dispatch, textures
//! - [`state`] - Hit testing and mouse dispatch
//! - [`renderer`] - Painter trait and paint traversal
//! - [`components`] - Built-in adjusters
//!
//! ## Example
//!
//! ```ignore
//! use krb_runtime::{DocumentBuilder, ElementSpec, HandlerRegistry, Session, SessionOptions};
//!
//! let mut builder = DocumentBuilder::new();
//! let app = builder.push(ElementSpec::app().size(640, 480), None);
//! builder.push(ElementSpec::button("Save").on(EventType::Click, "save"), Some(app));
//! let document = builder.build();
//!
//! let mut registry = HandlerRegistry::with_builtin_handlers();
//! registry.register_callback("save", || println!("saved"));
//!
//! let mut session = Session::load(&document, registry, SessionOptions::default())?;
//! session.frame();
//! session.click(10, 10);
//! ```

pub mod components;
pub mod document;
pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod style;
pub mod tree;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use document::{
    ComponentDef, Document, DocumentBuilder, ElementSpec, ElementType, EventType, PropValue,
    PropertyDecl, PropertyId, TemplateWriter,
};

pub use engine::{ElementId, ElementKind, RenderArena, RenderElement, RenderTree};

pub use error::{AdjustError, DecodeError, ExpandError, LinkError, LoadError, ResourceError};

pub use layout::{CellMeasure, Direction, Alignment, LayoutEngine, LayoutFlags, TextMeasure};

pub use pipeline::{
    AdjustContext, AdjustHandler, FrameStats, GeometryPatch, HandlerRegistry, NullLoader,
    ResourceLoader, Session, SessionOptions, TextureInfo,
};

pub use renderer::{paint, DrawCommand, DrawList, Painter};

pub use state::{hit_test, MouseEvent};

pub use style::RenderConfig;

pub use components::TabBarAdjuster;
