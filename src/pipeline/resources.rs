//! Texture loading.
//!
//! The runtime never touches files itself; a [`ResourceLoader`] turns a
//! resource path into a [`TextureInfo`]. [`TextureCache`] makes loading
//! idempotent per resource index, failures included.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::document::Document;
use crate::engine::RenderArena;
use crate::error::ResourceError;

/// A loaded texture as reported by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureInfo {
    /// Opaque handle owned by the loader.
    pub handle: u64,
    pub width: u32,
    pub height: u32,
}

pub trait ResourceLoader {
    fn load(&mut self, path: &str) -> Result<TextureInfo, ResourceError>;
}

impl<F> ResourceLoader for F
where
    F: FnMut(&str) -> Result<TextureInfo, ResourceError>,
{
    fn load(&mut self, path: &str) -> Result<TextureInfo, ResourceError> {
        self(path)
    }
}

/// Loader that fails every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLoader;

impl ResourceLoader for NullLoader {
    fn load(&mut self, path: &str) -> Result<TextureInfo, ResourceError> {
        Err(ResourceError::LoadFailed {
            path: path.to_string(),
            reason: "no resource loader configured".to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<u8, Result<TextureInfo, ResourceError>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load resource `index` at most once.
    pub fn get_or_load(
        &mut self,
        index: u8,
        document: &Document,
        loader: &mut dyn ResourceLoader,
    ) -> Result<TextureInfo, ResourceError> {
        self.entries
            .entry(index)
            .or_insert_with(|| match document.resource(index) {
                Some(path) => loader.load(path),
                None => Err(ResourceError::UnknownResource(index)),
            })
            .clone()
    }

    /// Number of resource indices attempted so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach textures to every element with a resource reference.
    /// Returns `(loaded, failed)` element counts.
    pub fn load_all(
        &mut self,
        arena: &mut RenderArena,
        document: &Document,
        loader: &mut dyn ResourceLoader,
    ) -> (usize, usize) {
        let wanted: Vec<_> = arena
            .iter()
            .filter(|e| !e.texture_loaded)
            .filter_map(|e| e.resource.map(|r| (e.id, r)))
            .collect();

        let (mut loaded, mut failed) = (0, 0);
        for (id, index) in wanted {
            let result = self.get_or_load(index, document, loader);
            let Some(element) = arena.get_mut(id) else {
                continue;
            };
            match result {
                Ok(texture) => {
                    element.texture = Some(texture);
                    element.texture_loaded = true;
                    loaded += 1;
                }
                Err(err) => {
                    element.texture = None;
                    element.texture_loaded = false;
                    failed += 1;
                    warn!(element = %id, resource = index, "texture unavailable: {err}");
                }
            }
        }
        if loaded + failed > 0 {
            debug!(loaded, failed, "textures resolved");
        }
        (loaded, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentBuilder, ElementSpec, ElementType};
    use crate::style::RenderConfig;
    use crate::tree::ingest;

    #[test]
    fn test_loads_each_resource_once() {
        let mut b = DocumentBuilder::new();
        let root = b.push(ElementSpec::app(), None);
        b.push(ElementSpec::new(ElementType::Image).image("logo.png"), Some(root));
        b.push(ElementSpec::new(ElementType::Image).image("logo.png"), Some(root));
        let doc = b.build();
        let mut arena = RenderArena::new();
        ingest(&mut arena, &doc, &RenderConfig::default());

        let mut calls = 0;
        let mut loader = |path: &str| -> Result<TextureInfo, ResourceError> {
            calls += 1;
            assert_eq!(path, "logo.png");
            Ok(TextureInfo { handle: 7, width: 64, height: 32 })
        };
        let mut cache = TextureCache::new();
        assert_eq!(cache.load_all(&mut arena, &doc, &mut loader), (2, 0));
        assert_eq!(calls, 1);
        let image = arena.iter().find(|e| e.texture_loaded).unwrap();
        assert_eq!(image.texture.map(|t| t.width), Some(64));
    }

    #[test]
    fn test_failures_are_cached() {
        let mut b = DocumentBuilder::new();
        b.push(ElementSpec::new(ElementType::Image).image("missing.png"), None);
        let doc = b.build();
        let mut cache = TextureCache::new();
        let mut loader = NullLoader;
        assert!(cache.get_or_load(0, &doc, &mut loader).is_err());
        assert!(cache.get_or_load(0, &doc, &mut loader).is_err());
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get_or_load(5, &doc, &mut loader),
            Err(ResourceError::UnknownResource(5))
        );
    }
}
