//! Program representation for IMP bytecode streams.
//!
//! A program is a flat, byte-addressable instruction stream: one opcode
//! byte followed by that opcode's fixed-size immediate. Immediates are
//! stored in host byte order via unaligned copies; the format is not
//! portable across machines and does not need to be.

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// An IMP program: an immutable, contiguous sequence of bytes.
///
/// The program itself carries no cursor; readers walk it with a
/// caller-managed byte offset, which each `read_*` call advances past
/// the value it decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    /// Create a program from an emitted byte stream.
    pub fn new(code: Vec<u8>) -> Self {
        Self { code }
    }

    /// The raw byte stream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Number of bytes in the program.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the program has no code.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read the opcode byte at `pc` and advance past it.
    pub fn read_opcode(&self, pc: &mut usize) -> Result<Opcode, DecodeError> {
        let byte = *self
            .code
            .get(*pc)
            .ok_or(DecodeError::TruncatedStream { at: *pc })?;
        let op = Opcode::try_from(byte)?;
        *pc += 1;
        Ok(op)
    }

    /// Read a u32 immediate at `pc` and advance past it.
    pub fn read_u32(&self, pc: &mut usize) -> Result<u32, DecodeError> {
        Ok(u32::from_ne_bytes(self.read_array(pc)?))
    }

    /// Read a u64 immediate at `pc` and advance past it.
    pub fn read_u64(&self, pc: &mut usize) -> Result<u64, DecodeError> {
        Ok(u64::from_ne_bytes(self.read_array(pc)?))
    }

    /// Read an i64 immediate at `pc` and advance past it.
    pub fn read_i64(&self, pc: &mut usize) -> Result<i64, DecodeError> {
        Ok(i64::from_ne_bytes(self.read_array(pc)?))
    }

    fn read_array<const N: usize>(&self, pc: &mut usize) -> Result<[u8; N], DecodeError> {
        let end = pc
            .checked_add(N)
            .ok_or(DecodeError::TruncatedStream { at: *pc })?;
        let slice = self
            .code
            .get(*pc..end)
            .ok_or(DecodeError::TruncatedStream { at: *pc })?;
        let array: [u8; N] = slice.try_into().expect("slice length checked above");
        *pc = end;
        Ok(array)
    }
}
