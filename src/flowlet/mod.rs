/*!
 * Flowlets
 * Hierarchical causal-context values and the per-context active stack
 *
 * A flowlet answers "who caused this": each one chains to a parent, and the
 * root-to-leaf name chain reconstructs the full causal path
 * (click → request → response → re-render).
 */

mod arena;
mod manager;

pub use arena::{FlowletArena, FlowletId, FlowletRecord};
pub use manager::{FlowletManager, FlowletScope};
