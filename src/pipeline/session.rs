//! Session - one loaded document and its render tree.
//!
//! ```text
//! load:  config → ingest → build_tree → expand → textures → inheritance
//! frame: layout → adjust
//! ```

use std::fmt;

use tracing::{debug, info};

use crate::document::Document;
use crate::engine::{ElementId, RenderArena, RenderElement, RenderTree};
use crate::error::{ExpandError, LoadError};
use crate::layout::{CellMeasure, LayoutEngine, TextMeasure};
use crate::renderer::{paint, Painter};
use crate::state::{hit_test, MouseEvent, MouseState};
use crate::style::{resolve_inheritance, RenderConfig};
use crate::tree::{build_tree, ingest, Expander};
use crate::types::Size;

use super::adjust::run_adjustments;
use super::registry::HandlerRegistry;
use super::resources::{NullLoader, ResourceLoader, TextureCache};

/// Collaborators and overrides for [`Session::load`].
pub struct SessionOptions {
    /// Viewport size. Defaults to the App element's window size.
    pub viewport: Option<Size>,
    pub measure: Box<dyn TextMeasure>,
    pub loader: Box<dyn ResourceLoader>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            viewport: None,
            measure: Box::new(CellMeasure),
            loader: Box::new(NullLoader),
        }
    }
}

impl SessionOptions {
    pub fn viewport(mut self, width: i32, height: i32) -> Self {
        self.viewport = Some(Size::new(width, height));
        self
    }

    pub fn measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    pub fn loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }
}

/// Counters for one [`Session::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub laid_out: usize,
    pub adjusted: usize,
    pub adjust_failures: usize,
}

pub struct Session<'doc> {
    document: &'doc Document,
    config: RenderConfig,
    arena: RenderArena,
    registry: HandlerRegistry,
    textures: TextureCache,
    measure: Box<dyn TextMeasure>,
    loader: Box<dyn ResourceLoader>,
    mouse: MouseState,
    viewport: Size,
    dirty: bool,
}

impl<'doc> Session<'doc> {
    /// Build the render tree for `document`.
    pub fn load(
        document: &'doc Document,
        registry: HandlerRegistry,
        options: SessionOptions,
    ) -> Result<Self, LoadError> {
        let SessionOptions { viewport, measure, mut loader } = options;
        let config = RenderConfig::from_document(document);

        let mut arena = RenderArena::new();
        ingest(&mut arena, document, &config);
        let roots = build_tree(&mut arena, document)?;

        let expanded = Expander::new(document, &config).expand_all(&mut arena);
        let mut textures = TextureCache::new();
        textures.load_all(&mut arena, document, loader.as_mut());
        resolve_inheritance(&mut arena, &config);

        let viewport =
            viewport.unwrap_or(Size::new(config.window_width as i32, config.window_height as i32));
        info!(
            elements = arena.len(),
            roots = roots.len(),
            expanded,
            width = viewport.width,
            height = viewport.height,
            "document loaded"
        );

        Ok(Self {
            document,
            config,
            arena,
            registry,
            textures,
            measure,
            loader,
            mouse: MouseState::new(),
            viewport,
            dirty: true,
        })
    }

    /// Lay out every root at the viewport, then run adjustment handlers.
    pub fn frame(&mut self) -> FrameStats {
        let engine = LayoutEngine::new(&self.config, self.measure.as_ref());
        let laid_out = engine.layout(&mut self.arena, self.viewport);
        let adjust = run_adjustments(&mut self.arena, self.document, &self.config, &self.registry, &engine);
        self.dirty = false;
        debug!(laid_out, adjusted = adjust.invoked, failures = adjust.failed, "frame");
        FrameStats {
            laid_out,
            adjusted: adjust.invoked,
            adjust_failures: adjust.failed,
        }
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        let viewport = Size::new(width, height);
        if viewport != self.viewport {
            self.viewport = viewport;
            self.dirty = true;
        }
    }

    /// True when the tree changed since the last frame.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Discard the expansion under instance `id` and expand it again.
    pub fn reexpand(&mut self, id: ElementId) -> Result<Vec<ElementId>, ExpandError> {
        let roots = Expander::new(self.document, &self.config).expand(&mut self.arena, id);
        self.textures.load_all(&mut self.arena, self.document, self.loader.as_mut());
        resolve_inheritance(&mut self.arena, &self.config);
        self.dirty = true;
        roots
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn tree(&self) -> RenderTree<'_> {
        RenderTree::new(&self.arena)
    }

    pub fn arena(&self) -> &RenderArena {
        &self.arena
    }

    pub fn get(&self, id: ElementId) -> Option<&RenderElement> {
        self.arena.get(id)
    }

    pub fn roots(&self) -> Vec<ElementId> {
        self.arena.roots()
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.arena.children(id)
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn document(&self) -> &'doc Document {
        self.document
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    // =========================================================================
    // Output and input
    // =========================================================================

    /// Paint the current geometry. Returns the number of elements painted.
    pub fn paint(&self, painter: &mut dyn Painter) -> usize {
        paint(&self.arena, painter)
    }

    pub fn hit_test(&self, x: i32, y: i32) -> Option<ElementId> {
        hit_test(&self.arena, x, y)
    }

    /// Route a pointer event. Returns true if a callback ran.
    pub fn dispatch_mouse(&mut self, event: MouseEvent) -> bool {
        self.mouse.dispatch(event, &self.arena, &mut self.registry)
    }

    /// Press and release at `(x, y)`. Returns true if a callback ran.
    pub fn click(&mut self, x: i32, y: i32) -> bool {
        let pressed = self.dispatch_mouse(MouseEvent::down(x, y));
        let released = self.dispatch_mouse(MouseEvent::up(x, y));
        pressed || released
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("elements", &self.arena.len())
            .field("viewport", &self.viewport)
            .field("registry", &self.registry)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
