//! IMP common types and bytecode format.
//!
//! This crate provides the foundational data structures shared by the
//! compiler and the interpreter:
//!
//! - [`Opcode`] — the closed instruction set
//! - [`Value`] — runtime value representation for the interpreter stack
//! - [`ProtoId`] — handle of a host primitive
//! - [`Program`] — the flat byte stream with typed cursor reads
//! - [`DecodeError`] — errors from decoding byte streams
//!
//! The bytecode format is the contract between code generation and
//! execution: a single opcode byte followed by that opcode's fixed-size
//! immediate, stored in host byte order.
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime
//! cost) and has no other dependencies.

pub mod error;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use opcode::Opcode;
pub use program::Program;
pub use value::{ProtoId, Value};
