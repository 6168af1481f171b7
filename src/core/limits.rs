/*!
 * Instrumentation Limits
 * Compile-time bounds and defaults for the instrumentation layer
 */

/// Maximum flowlet parent-chain depth walked during full-name reconstruction
///
/// The arena is acyclic by construction, so this bounds pathological
/// nesting (e.g. a publisher opening scopes in an unbounded loop), not
/// cycles.
pub const MAX_FLOWLET_DEPTH: usize = 64;

/// Default heartbeat interval in milliseconds
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Default DOM attribute carrying the surface identifier
pub const DEFAULT_SURFACE_ATTRIBUTE: &str = "data-surfaceid";

/// Separator joining flowlet names into a full causal path
pub const FLOWLET_SEPARATOR: char = '.';
