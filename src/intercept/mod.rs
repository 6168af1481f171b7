/*!
 * Module Interceptor
 * Observable wrappers around selected module exports
 *
 * Call sites behave identically through the wrappers; interception only
 * adds a stable indirection point hooks can attach to later.
 */

mod func;
mod module;
mod registry;

pub use func::{FuncInterceptor, HookHandle, InterceptControl};
pub use module::{ExportStatus, InterceptedModule, ModuleExports};
pub use registry::InterceptRegistry;
