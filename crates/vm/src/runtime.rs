//! The runtime primitive table.
//!
//! Prototypes declared in source are bound to host functions by name at
//! codegen time; the bytecode carries the table index. The table is
//! process-wide, initialized-once, read-only data, safe to share if an
//! embedder runs several interpreters.

use imp_common::{ProtoId, Value};

use crate::error::RuntimeError;
use crate::machine::Vm;

/// A host primitive: consumes its arguments from the interpreter stack
/// and pushes its result.
pub type RuntimeFn = fn(&mut Vm<'_>) -> Result<(), RuntimeError>;

/// Primitive-name string → host implementation. `ProtoId` is the index
/// into this table.
pub static RUNTIME_TABLE: &[(&str, RuntimeFn)] = &[("print_int", print_int)];

/// Resolve a primitive name to its handle.
pub fn lookup(name: &str) -> Option<ProtoId> {
    RUNTIME_TABLE
        .iter()
        .position(|(n, _)| *n == name)
        .map(|index| ProtoId(index as u32))
}

/// Resolve a handle to its implementation.
pub fn get(id: ProtoId) -> Option<RuntimeFn> {
    RUNTIME_TABLE.get(id.0 as usize).map(|(_, f)| *f)
}

/// `print_int(x: int): int` — writes `x` and a newline to the sink and
/// returns `x`.
fn print_int(vm: &mut Vm<'_>) -> Result<(), RuntimeError> {
    let value = vm.pop_int()?;
    vm.write_int(value)?;
    vm.push(Value::Int(value))
}
