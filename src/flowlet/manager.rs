/*!
 * Flowlet Manager
 * Tracks the active causal context per logical execution context
 *
 * Each OS thread gets its own LIFO stack of active flowlets. Continuations
 * crossing an async boundary carry their flowlet explicitly via [`FlowletManager::wrap`],
 * which restores the flowlet captured at schedule time around the
 * continuation's execution.
 */

use super::arena::{FlowletArena, FlowletId};
use crate::channel::{Channel, ChannelEvent, FlowletPhase, Payload};
use crate::core::data_structures::InlineString;
use crate::core::errors::{FlowletError, FlowletResult};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Tracks which flowlet is currently "top" per execution context
pub struct FlowletManager {
    arena: Arc<FlowletArena>,
    stacks: DashMap<ThreadId, Vec<FlowletId>>,
    channel: RwLock<Option<Arc<Channel>>>,
}

impl FlowletManager {
    pub fn new() -> Self {
        Self::with_arena(Arc::new(FlowletArena::new()))
    }

    /// Create a manager over an existing arena
    pub fn with_arena(arena: Arc<FlowletArena>) -> Self {
        Self {
            arena,
            stacks: DashMap::new(),
            channel: RwLock::new(None),
        }
    }

    /// The arena backing this manager's flowlets
    pub fn arena(&self) -> &Arc<FlowletArena> {
        &self.arena
    }

    /// Attach a channel to receive flowlet-lifecycle events
    pub fn attach_channel(&self, channel: Arc<Channel>) {
        *self.channel.write() = Some(channel);
    }

    /// Create a flowlet chained to the currently active one
    ///
    /// Captures ambient causality: the caller never needs to pass the
    /// parent explicitly.
    pub fn create(&self, name: impl Into<InlineString>) -> FlowletResult<FlowletId> {
        self.create_with_parent(name, self.top())
    }

    /// Create a flowlet with an explicit parent (or none, for a causal root)
    pub fn create_with_parent(
        &self,
        name: impl Into<InlineString>,
        parent: Option<FlowletId>,
    ) -> FlowletResult<FlowletId> {
        let id = self.arena.create(name, parent)?;
        self.publish_phase(id, FlowletPhase::Created);
        Ok(id)
    }

    /// Full causal path of a flowlet
    pub fn full_name(&self, id: FlowletId) -> FlowletResult<String> {
        self.arena.full_name(id)
    }

    /// Enter a causal scope
    pub fn push(&self, id: FlowletId) -> FlowletResult<()> {
        if self.arena.get(id).is_none() {
            return Err(FlowletError::UnknownId(id.raw()));
        }
        self.stacks
            .entry(thread::current().id())
            .or_default()
            .push(id);
        self.publish_phase(id, FlowletPhase::Pushed);
        Ok(())
    }

    /// Exit the current causal scope
    ///
    /// Popping an empty stack is a structural bug in the instrumenting code
    /// and surfaces loudly rather than returning a default.
    pub fn pop(&self) -> FlowletResult<FlowletId> {
        let tid = thread::current().id();
        let popped = self.stacks.get_mut(&tid).and_then(|mut stack| stack.pop());

        match popped {
            Some(id) => {
                self.publish_phase(id, FlowletPhase::Popped);
                Ok(id)
            }
            None => {
                tracing::error!("flowlet pop on empty stack, causal attribution is corrupt");
                Err(FlowletError::EmptyStack)
            }
        }
    }

    /// Currently active flowlet for this execution context, if any
    pub fn top(&self) -> Option<FlowletId> {
        self.stacks
            .get(&thread::current().id())
            .and_then(|stack| stack.last().copied())
    }

    /// Nesting depth of the current execution context's stack
    pub fn depth(&self) -> usize {
        self.stacks
            .get(&thread::current().id())
            .map_or(0, |stack| stack.len())
    }

    /// Enter a causal scope that exits on drop
    pub fn scope(&self, id: FlowletId) -> FlowletResult<FlowletScope<'_>> {
        self.push(id)?;
        Ok(FlowletScope { manager: self, id })
    }

    /// Bridge a causal scope across an async boundary
    ///
    /// Captures the flowlet active *now* (schedule time) and restores it as
    /// "top" around the returned continuation, no matter what intervening
    /// work pushed or popped in between.
    pub fn wrap<F, R>(self: &Arc<Self>, f: F) -> impl FnOnce() -> R + Send + 'static
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let captured = self.top();
        let manager = Arc::clone(self);
        move || {
            let Some(id) = captured else { return f() };
            match manager.push(id) {
                Ok(()) => {
                    let result = f();
                    if let Err(error) = manager.pop() {
                        tracing::error!(%error, "continuation left its flowlet scope unbalanced");
                    }
                    result
                }
                Err(error) => {
                    tracing::error!(%error, "failed to restore flowlet for continuation");
                    f()
                }
            }
        }
    }

    fn publish_phase(&self, id: FlowletId, phase: FlowletPhase) {
        let channel = self.channel.read().clone();
        if let Some(channel) = channel {
            let full_name = self.arena.full_name(id).unwrap_or_default();
            channel.publish(
                ChannelEvent::new(Payload::FlowletEvent {
                    flowlet: id,
                    full_name,
                    phase,
                })
                .with_flowlet(id),
            );
        }
    }
}

impl Default for FlowletManager {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII causal scope: pushed on creation, popped on drop
pub struct FlowletScope<'a> {
    manager: &'a FlowletManager,
    id: FlowletId,
}

impl FlowletScope<'_> {
    /// The flowlet this scope holds active
    pub fn flowlet(&self) -> FlowletId {
        self.id
    }
}

impl Drop for FlowletScope<'_> {
    fn drop(&mut self) {
        match self.manager.pop() {
            Ok(popped) if popped == self.id => {}
            Ok(popped) => tracing::error!(
                expected = self.id.index(),
                actual = popped.index(),
                "flowlet scope popped a different flowlet than it pushed"
            ),
            Err(error) => tracing::error!(%error, "flowlet scope pop failed"),
        }
    }
}
