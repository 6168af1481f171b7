/*!
 * Function Interceptor
 * First-class indirection point around an original callable
 *
 * Interception creates the *capability* to observe calls; attaching actual
 * pre/post hooks is a separate, decoupled registration step. A disabled
 * interceptor delegates straight to the original, so pass-through exports
 * pay one atomic load and nothing else.
 */

use crate::core::data_structures::InlineString;
use crate::core::types::HookId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Signature-independent control surface of a [`FuncInterceptor`]
///
/// Lets module handles flip interception on type-erased exports without
/// knowing their argument/return types.
pub trait InterceptControl: Send + Sync {
    /// Export name the interceptor wraps
    fn export_name(&self) -> &str;

    /// Enable or disable hook dispatch
    fn set_enabled(&self, enabled: bool);

    /// Whether calls currently fire hooks
    fn is_enabled(&self) -> bool;
}

/// Which hook list a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookSlot {
    Args,
    Value,
}

/// Opaque handle for removing a registered hook
#[derive(Debug, Clone)]
pub struct HookHandle {
    slot: HookSlot,
    id: HookId,
}

type ArgsObserver<A> = Arc<dyn Fn(&A) + Send + Sync>;
type ValueObserver<A, R> = Arc<dyn Fn(&A, &R) + Send + Sync>;

/// Observable wrapper around a function of `&Args -> Ret`
///
/// Calling through the interceptor is observably equivalent to calling the
/// original: identical arguments, identical return value (success or error
/// alike, since `Ret` may itself be a `Result`), plus hook side effects.
pub struct FuncInterceptor<Args, Ret> {
    name: InlineString,
    original: Arc<dyn Fn(&Args) -> Ret + Send + Sync>,
    args_observers: Mutex<Vec<(HookId, ArgsObserver<Args>)>>,
    value_observers: Mutex<Vec<(HookId, ValueObserver<Args, Ret>)>>,
    enabled: AtomicBool,
    next_hook: AtomicU64,
}

impl<Args: 'static, Ret: 'static> FuncInterceptor<Args, Ret> {
    /// Wrap an original callable; starts disabled (pure pass-through)
    pub fn new(
        name: impl Into<InlineString>,
        original: impl Fn(&Args) -> Ret + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            original: Arc::new(original),
            args_observers: Mutex::new(Vec::new()),
            value_observers: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(false),
            next_hook: AtomicU64::new(1),
        }
    }

    /// Export name this interceptor wraps
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Call through the indirection point
    ///
    /// Pre-call hooks see the arguments, the original runs with those exact
    /// arguments, post-call hooks see arguments and result by reference,
    /// and the result is returned untouched.
    pub fn call(&self, args: Args) -> Ret {
        if !self.enabled.load(Ordering::Acquire) {
            return (self.original)(&args);
        }

        // Snapshot hook lists so hooks may register/remove hooks re-entrantly.
        let args_observers: Vec<ArgsObserver<Args>> = self
            .args_observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in &args_observers {
            observer(&args);
        }

        let result = (self.original)(&args);

        let value_observers: Vec<ValueObserver<Args, Ret>> = self
            .value_observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in &value_observers {
            observer(&args, &result);
        }

        result
    }

    /// Attach a pre-call hook observing the arguments
    pub fn on_args(&self, observer: impl Fn(&Args) + Send + Sync + 'static) -> HookHandle {
        let id = self.next_hook.fetch_add(1, Ordering::Relaxed);
        self.args_observers.lock().push((id, Arc::new(observer)));
        HookHandle {
            slot: HookSlot::Args,
            id,
        }
    }

    /// Attach a post-call hook observing arguments and result
    pub fn on_value(
        &self,
        observer: impl Fn(&Args, &Ret) + Send + Sync + 'static,
    ) -> HookHandle {
        let id = self.next_hook.fetch_add(1, Ordering::Relaxed);
        self.value_observers.lock().push((id, Arc::new(observer)));
        HookHandle {
            slot: HookSlot::Value,
            id,
        }
    }

    /// Remove a hook; returns whether it was still registered
    pub fn remove_hook(&self, handle: &HookHandle) -> bool {
        match handle.slot {
            HookSlot::Args => {
                let mut list = self.args_observers.lock();
                let before = list.len();
                list.retain(|(id, _)| *id != handle.id);
                list.len() != before
            }
            HookSlot::Value => {
                let mut list = self.value_observers.lock();
                let before = list.len();
                list.retain(|(id, _)| *id != handle.id);
                list.len() != before
            }
        }
    }

    /// Enable hook dispatch for this interceptor
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Whether calls currently fire hooks
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl<Args: 'static, Ret: 'static> InterceptControl for FuncInterceptor<Args, Ret> {
    fn export_name(&self) -> &str {
        self.name.as_str()
    }

    fn set_enabled(&self, enabled: bool) {
        FuncInterceptor::set_enabled(self, enabled);
    }

    fn is_enabled(&self) -> bool {
        FuncInterceptor::is_enabled(self)
    }
}
