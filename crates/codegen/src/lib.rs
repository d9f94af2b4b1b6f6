//! IMP code generation — lowers a parsed module to executable bytecode.
//!
//! Lowering walks the AST once, resolving names through a lexically
//! nested scope chain, tracking the stack depth every opcode implies at
//! runtime, and patching forward jump targets through a label fixup
//! table. The produced [`Program`](imp_common::Program) starts with the
//! top-level statements, then a terminating `STOP`, then the bodies of
//! the user-defined functions.
//!
//! # Usage
//!
//! ```
//! use imp_codegen::translate;
//! use imp_syntax::{lexer, parser};
//!
//! let tokens = lexer::tokenize("1 + 2;").unwrap();
//! let module = parser::parse(tokens).unwrap();
//! let program = translate(&module).unwrap();
//! assert!(!program.is_empty());
//! ```

pub mod codegen;
pub mod disasm;
pub mod error;
pub mod scope;

pub use codegen::translate;
pub use disasm::disassemble;
pub use error::CodegenError;
