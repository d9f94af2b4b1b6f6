//! IMP virtual machine — executes the bytecode produced by codegen.
//!
//! The VM is a stack machine with a single operand stack; calls are not
//! native. The caller pushes arguments in reverse source order and then
//! the callee; CALL saves the return address on the same stack, and RET
//! unwinds the frame shape `[args, saved-pc, locals, result]` so the
//! result lands where the callee value used to be.
//!
//! # Usage
//!
//! ```
//! use imp_common::{Opcode, Program};
//! use imp_vm::run;
//!
//! let mut code = vec![Opcode::PushInt as u8];
//! code.extend_from_slice(&7i64.to_ne_bytes());
//! code.push(Opcode::Pop as u8);
//! code.push(Opcode::Stop as u8);
//!
//! run(&Program::new(code)).unwrap();
//! ```

pub mod error;
pub mod execute;
pub mod machine;
pub mod runtime;

pub use error::RuntimeError;
pub use machine::Vm;

use imp_common::Program;

/// Execute a program, writing primitive output to stdout.
///
/// This is the primary entry point for embedders. Execution proceeds
/// from offset 0 until a STOP opcode; any fault aborts with a
/// [`RuntimeError`] carrying the offset of the faulting opcode.
pub fn run(program: &Program) -> Result<(), RuntimeError> {
    let mut vm = Vm::new(program);
    vm.run()
}
