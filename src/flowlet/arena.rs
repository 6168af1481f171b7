/*!
 * Flowlet Arena
 * Append-only storage of immutable causal-context nodes
 *
 * Flowlets reference their parent by stable index rather than by pointer,
 * so parent chains are acyclic by construction: a parent must already be in
 * the arena before a child can name it.
 */

use crate::core::data_structures::InlineString;
use crate::core::errors::{FlowletError, FlowletResult};
use crate::core::limits::{FLOWLET_SEPARATOR, MAX_FLOWLET_DEPTH};
use crate::core::types::{now_ns, TimestampNs};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Stable identifier of a flowlet within its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FlowletId(u32);

impl FlowletId {
    /// Arena slot index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn raw(self) -> u32 {
        self.0
    }
}

/// An immutable causal-context node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowletRecord {
    /// Display name, one segment of the full causal path
    pub name: InlineString,
    /// Parent by arena index; `None` for causal roots
    pub parent: Option<FlowletId>,
    /// Creation timestamp
    pub timestamp_ns: TimestampNs,
}

/// Arena of flowlet records addressed by stable index
pub struct FlowletArena {
    records: RwLock<Vec<FlowletRecord>>,
}

impl FlowletArena {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a flowlet, optionally chained to an existing parent
    ///
    /// The parent must already exist in this arena.
    pub fn create(
        &self,
        name: impl Into<InlineString>,
        parent: Option<FlowletId>,
    ) -> FlowletResult<FlowletId> {
        let mut records = self.records.write();

        if let Some(parent) = parent {
            if parent.index() >= records.len() {
                return Err(FlowletError::UnknownId(parent.raw()));
            }
        }

        let id = FlowletId(records.len() as u32);
        records.push(FlowletRecord {
            name: name.into(),
            parent,
            timestamp_ns: now_ns(),
        });
        Ok(id)
    }

    /// Look up a flowlet record
    pub fn get(&self, id: FlowletId) -> Option<FlowletRecord> {
        self.records.read().get(id.index()).cloned()
    }

    /// Display name of a single flowlet
    pub fn name(&self, id: FlowletId) -> Option<InlineString> {
        self.records
            .read()
            .get(id.index())
            .map(|r| r.name.clone())
    }

    /// Full causal path, root to leaf, joined with the fixed separator
    ///
    /// Pure and deterministic for a given chain shape.
    pub fn full_name(&self, id: FlowletId) -> FlowletResult<String> {
        let records = self.records.read();

        let mut segments: Vec<&str> = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let record = records
                .get(current.index())
                .ok_or(FlowletError::UnknownId(current.raw()))?;
            segments.push(record.name.as_str());
            if segments.len() > MAX_FLOWLET_DEPTH {
                return Err(FlowletError::DepthExceeded(MAX_FLOWLET_DEPTH));
            }
            cursor = record.parent;
        }

        segments.reverse();
        let mut full = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum());
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                full.push(FLOWLET_SEPARATOR);
            }
            full.push_str(segment);
        }
        Ok(full)
    }

    /// Number of flowlets created so far
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for FlowletArena {
    fn default() -> Self {
        Self::new()
    }
}
