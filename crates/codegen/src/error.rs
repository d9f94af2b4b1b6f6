//! Error types for IMP code generation.
//!
//! Code generation trusts the (external) verifier for everything else;
//! the errors here are the conditions it detects rather than recovers
//! from. Internal invariants such as stack-depth accounting are plain
//! assertions, not error values.

use thiserror::Error;

/// Errors produced while lowering a module to bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A name that resolves to nothing in any enclosing scope.
    #[error("unbound name '{name}'")]
    UnboundName { name: String },

    /// A prototype whose primitive name is missing from the runtime table.
    #[error("unknown primitive \"{name}\"")]
    UnknownPrimitive { name: String },

    /// An assignment whose target is a function or prototype.
    #[error("cannot assign to '{name}'")]
    UnassignableName { name: String },
}
