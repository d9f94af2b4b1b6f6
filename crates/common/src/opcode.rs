//! Opcode definitions for the IMP bytecode.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// Each opcode occupies a single byte in the instruction stream, followed
/// by its fixed-size immediate (if any). The `#[repr(u8)]` attribute
/// ensures each variant has a stable byte value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Pushes
    /// Push the entry address of a user function. Immediate: u64 address.
    PushFunc = 0x01,
    /// Push a handle to a host primitive. Immediate: u32 handle.
    PushProto = 0x02,
    /// Push an integer constant. Immediate: i64.
    PushInt = 0x03,

    // Stack access
    /// Push a copy of the element at the given index from the top
    /// (top = 0). Immediate: u32 index.
    Peek = 0x04,
    /// Drop the top of the stack.
    Pop = 0x05,
    /// Pop a value and write it into the element at the given index from
    /// the new top. Immediate: u32 index.
    Store = 0x06,

    // Calls
    /// Pop the callee and transfer control to it.
    Call = 0x10,

    // Arithmetic
    /// Pop rhs, pop lhs, push lhs + rhs. Overflow is a runtime fault.
    Add = 0x20,
    /// Pop rhs, pop lhs, push lhs - rhs. Overflow is a runtime fault.
    Sub = 0x21,
    /// Pop rhs, pop lhs, push lhs * rhs. Overflow is a runtime fault.
    Mul = 0x22,
    /// Pop rhs, pop lhs, push lhs / rhs. Division by zero is a runtime fault.
    Div = 0x23,
    /// Pop rhs, pop lhs, push lhs % rhs. Division by zero is a runtime fault.
    Mod = 0x24,

    // Comparison
    /// Pop rhs, pop lhs, push 1 if lhs > rhs, else 0.
    Greater = 0x30,
    /// Pop rhs, pop lhs, push 1 if lhs < rhs, else 0.
    Lower = 0x31,
    /// Pop rhs, pop lhs, push 1 if lhs >= rhs, else 0.
    GreaterEq = 0x32,
    /// Pop rhs, pop lhs, push 1 if lhs <= rhs, else 0.
    LowerEq = 0x33,
    /// Pop rhs, pop lhs, push 1 if lhs == rhs, else 0.
    IsEq = 0x34,

    // Control flow
    /// Return from the current function. Immediates: u32 local count to
    /// drop, u32 argument count to drop.
    Ret = 0x40,
    /// Pop a value; jump to the immediate address if it is falsy.
    /// Immediate: u64 address.
    JumpFalse = 0x50,
    /// Unconditional jump. Immediate: u64 address.
    Jump = 0x51,

    /// Stop execution.
    Stop = 0xFE,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 21] = [
    Opcode::PushFunc,
    Opcode::PushProto,
    Opcode::PushInt,
    Opcode::Peek,
    Opcode::Pop,
    Opcode::Store,
    Opcode::Call,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Mod,
    Opcode::Greater,
    Opcode::Lower,
    Opcode::GreaterEq,
    Opcode::LowerEq,
    Opcode::IsEq,
    Opcode::Ret,
    Opcode::JumpFalse,
    Opcode::Jump,
    Opcode::Stop,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Opcode::PushFunc),
            0x02 => Ok(Opcode::PushProto),
            0x03 => Ok(Opcode::PushInt),
            0x04 => Ok(Opcode::Peek),
            0x05 => Ok(Opcode::Pop),
            0x06 => Ok(Opcode::Store),
            0x10 => Ok(Opcode::Call),
            0x20 => Ok(Opcode::Add),
            0x21 => Ok(Opcode::Sub),
            0x22 => Ok(Opcode::Mul),
            0x23 => Ok(Opcode::Div),
            0x24 => Ok(Opcode::Mod),
            0x30 => Ok(Opcode::Greater),
            0x31 => Ok(Opcode::Lower),
            0x32 => Ok(Opcode::GreaterEq),
            0x33 => Ok(Opcode::LowerEq),
            0x34 => Ok(Opcode::IsEq),
            0x40 => Ok(Opcode::Ret),
            0x50 => Ok(Opcode::JumpFalse),
            0x51 => Ok(Opcode::Jump),
            0xFE => Ok(Opcode::Stop),
            other => Err(DecodeError::InvalidOpcode(other)),
        }
    }
}

impl Opcode {
    /// Returns the mnemonic used by the disassembler.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::PushFunc => "PUSH_FUNC",
            Opcode::PushProto => "PUSH_PROTO",
            Opcode::PushInt => "PUSH_INT",
            Opcode::Peek => "PEEK",
            Opcode::Pop => "POP",
            Opcode::Store => "STORE",
            Opcode::Call => "CALL",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Greater => "GREATER",
            Opcode::Lower => "LOWER",
            Opcode::GreaterEq => "GREATER_EQ",
            Opcode::LowerEq => "LOWER_EQ",
            Opcode::IsEq => "IS_EQ",
            Opcode::Ret => "RET",
            Opcode::JumpFalse => "JUMP_FALSE",
            Opcode::Jump => "JUMP",
            Opcode::Stop => "STOP",
        }
    }
}
