/*!
 * Module Interception
 * Drop-in replacement exports with per-export observation capability
 *
 * Wrapping never fails as a whole: a requested export that is missing or
 * deny-listed is recorded as not intercepted and left as a pass-through.
 * Partial success is the normal case.
 */

use super::func::{FuncInterceptor, InterceptControl};
use crate::core::data_structures::InlineString;
use crate::core::errors::{InterceptError, InterceptResult};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// Classification of one export binding after interception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// Allow-listed and wrapped; calls fire hooks
    Intercepted,
    /// Present but not selected; behaves exactly like the original
    PassThrough,
    /// Allow-listed but deny-listed too; deny wins, left untouched
    Denied,
    /// Allow-listed but absent from the exports object
    Missing,
}

struct ErasedExport {
    /// `Arc<FuncInterceptor<A, R>>` behind `Any` for typed retrieval
    typed: Arc<dyn Any + Send + Sync>,
    /// Signature-independent control over the same interceptor
    control: Arc<dyn InterceptControl>,
}

/// Builder for a module's exports object: export name → callable
#[derive(Default)]
pub struct ModuleExports {
    entries: Vec<(InlineString, ErasedExport)>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an exported function under a name
    ///
    /// The callable is wrapped in a (disabled) interceptor up front; the
    /// interception step only decides which ones get enabled.
    pub fn export<A: 'static, R: 'static>(
        mut self,
        name: &str,
        f: impl Fn(&A) -> R + Send + Sync + 'static,
    ) -> Self {
        let interceptor = Arc::new(FuncInterceptor::new(name, f));
        self.entries.push((
            name.into(),
            ErasedExport {
                typed: interceptor.clone(),
                control: interceptor,
            },
        ));
        self
    }

    /// Registered export names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

struct ModuleEntry {
    status: ExportStatus,
    export: Option<ErasedExport>,
}

/// Handle to a patched module
///
/// Created once per module identifier and cached for the process lifetime;
/// see [`InterceptRegistry`](super::InterceptRegistry).
pub struct InterceptedModule {
    id: InlineString,
    entries: AHashMap<InlineString, ModuleEntry>,
    /// Export order plus trailing missing names, for deterministic listing
    order: Vec<InlineString>,
}

impl InterceptedModule {
    pub(crate) fn build(
        id: &str,
        exports: ModuleExports,
        allow: &[&str],
        deny: &[&str],
    ) -> Self {
        let mut entries = AHashMap::new();
        let mut order = Vec::new();

        for (name, export) in exports.entries {
            let status = if deny.contains(&name.as_str()) {
                ExportStatus::Denied
            } else if allow.contains(&name.as_str()) {
                export.control.set_enabled(true);
                ExportStatus::Intercepted
            } else {
                ExportStatus::PassThrough
            };
            order.push(name.clone());
            entries.insert(
                name,
                ModuleEntry {
                    status,
                    export: Some(export),
                },
            );
        }

        for &name in allow {
            if !entries.contains_key(name) {
                tracing::warn!(module = id, export = name, "requested export not found");
                let name = InlineString::from(name);
                order.push(name.clone());
                entries.insert(
                    name,
                    ModuleEntry {
                        status: ExportStatus::Missing,
                        export: None,
                    },
                );
            }
        }

        Self {
            id: id.into(),
            entries,
            order,
        }
    }

    /// Module identifier this handle was created for
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Status of one export binding, if it was ever present or requested
    pub fn status(&self, name: &str) -> Option<ExportStatus> {
        self.entries.get(name).map(|entry| entry.status)
    }

    /// Whether calls to this export currently fire hooks
    pub fn is_intercepted(&self, name: &str) -> bool {
        self.status(name) == Some(ExportStatus::Intercepted)
    }

    /// Per-binding statuses, exports first then missing requests
    pub fn statuses(&self) -> impl Iterator<Item = (&str, ExportStatus)> {
        self.order
            .iter()
            .filter_map(|name| Some((name.as_str(), self.entries.get(name)?.status)))
    }

    /// Names that were requested but ended up not intercepted
    pub fn not_intercepted(&self) -> Vec<&str> {
        self.statuses()
            .filter(|(_, status)| {
                matches!(status, ExportStatus::Missing | ExportStatus::Denied)
            })
            .map(|(name, _)| name)
            .collect()
    }

    /// Typed access to an export's indirection point
    ///
    /// Works for intercepted and pass-through bindings alike; calling a
    /// pass-through binding simply delegates to the original.
    pub fn interceptor<A: 'static, R: 'static>(
        &self,
        name: &str,
    ) -> InterceptResult<Arc<FuncInterceptor<A, R>>> {
        let entry = self
            .entries
            .get(name)
            .and_then(|entry| entry.export.as_ref())
            .ok_or_else(|| InterceptError::UnknownExport {
                module: self.id.clone(),
                export: name.into(),
            })?;

        entry
            .typed
            .clone()
            .downcast::<FuncInterceptor<A, R>>()
            .map_err(|_| InterceptError::SignatureMismatch {
                module: self.id.clone(),
                export: name.into(),
            })
    }
}
