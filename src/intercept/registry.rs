/*!
 * Intercept Registry
 * Idempotent per-module-id cache of interception handles
 */

use super::module::{InterceptedModule, ModuleExports};
use crate::core::data_structures::InlineString;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Cache of intercepted modules keyed by module identifier
///
/// The first interception request for an id wins; later requests get the
/// existing handle and their allow/deny lists are ignored. This guards
/// against double-wrapping when independent instrumentation features
/// intercept the same host module.
pub struct InterceptRegistry {
    modules: DashMap<InlineString, Arc<InterceptedModule>>,
}

impl InterceptRegistry {
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
        }
    }

    /// Intercept a module's exports, or return the existing handle
    pub fn intercept_module(
        &self,
        id: &str,
        exports: ModuleExports,
        allow: &[&str],
        deny: &[&str],
    ) -> Arc<InterceptedModule> {
        match self.modules.entry(id.into()) {
            Entry::Occupied(existing) => {
                tracing::debug!(module = id, "module already intercepted, reusing handle");
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => {
                let module = Arc::new(InterceptedModule::build(id, exports, allow, deny));
                slot.insert(Arc::clone(&module));
                module
            }
        }
    }

    /// Look up an existing handle
    pub fn get(&self, id: &str) -> Option<Arc<InterceptedModule>> {
        self.modules.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of intercepted modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for InterceptRegistry {
    fn default() -> Self {
        Self::new()
    }
}
