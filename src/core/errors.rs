/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::data_structures::InlineString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event channel errors with serialization support
///
/// Only structural misuse is an error; observer failures are routed to the
/// channel's error sink and never surface here.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ChannelError {
    #[error("Subscription handle belongs to channel {handle_channel}, not channel {channel}")]
    #[diagnostic(
        code(channel::foreign_handle),
        help("Unsubscribe handles are only valid on the channel that issued them.")
    )]
    ForeignHandle { handle_channel: u64, channel: u64 },
}

/// Flowlet errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum FlowletError {
    #[error("Flowlet stack is empty for this execution context")]
    #[diagnostic(
        code(flowlet::empty_stack),
        help("Pop without a matching push indicates a structural bug in the instrumenting code.")
    )]
    EmptyStack,

    #[error("Unknown flowlet id {0}")]
    #[diagnostic(
        code(flowlet::unknown_id),
        help("Flowlet ids are only valid against the arena that created them.")
    )]
    UnknownId(u32),

    #[error("Flowlet chain exceeds maximum depth {0}")]
    #[diagnostic(
        code(flowlet::depth_exceeded),
        help("A causal chain this deep usually means scopes are opened in a loop without closing.")
    )]
    DepthExceeded(usize),
}

/// Module interception errors with serialization support
///
/// Partial interception (missing or deny-listed exports) is recorded state,
/// not an error; these cover typed access to the indirection points.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum InterceptError {
    #[error("Module {module} has no export named {export}")]
    #[diagnostic(
        code(intercept::unknown_export),
        help("The export was never present on the intercepted module's exports object.")
    )]
    UnknownExport {
        module: InlineString,
        export: InlineString,
    },

    #[error("Export {export} of module {module} has a different call signature")]
    #[diagnostic(
        code(intercept::signature_mismatch),
        help("The argument/return types requested do not match the types the export was registered with.")
    )]
    SignatureMismatch {
        module: InlineString,
        export: InlineString,
    },
}

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Result type for flowlet operations
pub type FlowletResult<T> = Result<T, FlowletError>;

/// Result type for interception operations
pub type InterceptResult<T> = Result<T, InterceptError>;
