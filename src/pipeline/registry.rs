//! Named handlers supplied by the embedding application.
//!
//! Adjusters are keyed by component name, callbacks by the name stored in an
//! element's event binding. Both are registered before a session loads.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::components::{TabBarAdjuster, TAB_BAR};

use super::adjust::AdjustHandler;

pub type Callback = Box<dyn FnMut()>;

#[derive(Default)]
pub struct HandlerRegistry {
    adjusters: HashMap<String, Box<dyn AdjustHandler>>,
    callbacks: HashMap<String, Callback>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in component adjusters.
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        registry.register_adjuster(TAB_BAR, TabBarAdjuster);
        registry
    }

    /// Register `handler` for instances of `component`. Replaces any
    /// previous handler for that name.
    pub fn register_adjuster(&mut self, component: impl Into<String>, handler: impl AdjustHandler + 'static) {
        let component = component.into();
        if self.adjusters.insert(component.clone(), Box::new(handler)).is_some() {
            debug!(component = %component, "adjuster replaced");
        }
    }

    pub fn register_callback(&mut self, name: impl Into<String>, callback: impl FnMut() + 'static) {
        self.callbacks.insert(name.into(), Box::new(callback));
    }

    pub fn has_adjuster(&self, component: &str) -> bool {
        self.adjusters.contains_key(component)
    }

    pub fn adjuster(&self, component: &str) -> Option<&dyn AdjustHandler> {
        self.adjusters.get(component).map(|h| h.as_ref())
    }

    pub fn has_callback(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Run the callback registered as `name`. Returns false (with a warning)
    /// when nothing is registered under that name.
    pub fn invoke_callback(&mut self, name: &str) -> bool {
        match self.callbacks.get_mut(name) {
            Some(callback) => {
                callback();
                true
            }
            None => {
                warn!(callback = name, "no callback registered");
                false
            }
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut adjusters: Vec<_> = self.adjusters.keys().collect();
        let mut callbacks: Vec<_> = self.callbacks.keys().collect();
        adjusters.sort();
        callbacks.sort();
        f.debug_struct("HandlerRegistry")
            .field("adjusters", &adjusters)
            .field("callbacks", &callbacks)
            .finish()
    }
}
