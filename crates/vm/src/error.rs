//! Runtime faults raised by the IMP interpreter.
//!
//! Faults abort execution and propagate to the embedder; there is no
//! in-language handling or recovery. Every execution fault carries the
//! byte offset of the opcode that raised it.

use imp_common::DecodeError;
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// ADD, SUB or MUL overflowed 64-bit two's-complement, or DIV/MOD
    /// hit `i64::MIN / -1`.
    #[error("overflow error at offset {at}")]
    Overflow { at: usize },

    /// DIV or MOD with a zero right-hand side.
    #[error("division by 0 at offset {at}")]
    DivisionByZero { at: usize },

    /// CALL on an integer value.
    #[error("cannot call integer at offset {at}")]
    CallInteger { at: usize },

    /// Arithmetic or comparison on a non-integer value.
    #[error("type error: expected integer at offset {at}")]
    ExpectedInt { at: usize },

    /// RET found something other than a return address where the frame
    /// saved one.
    #[error("type error: expected return address at offset {at}")]
    ExpectedAddr { at: usize },

    /// Pop on an empty stack, or RET unwinding more values than exist.
    #[error("stack underflow at offset {at}")]
    StackUnderflow { at: usize },

    /// The stack exceeded [`MAX_STACK_DEPTH`](crate::machine::MAX_STACK_DEPTH).
    #[error("stack overflow at offset {at}")]
    StackOverflow { at: usize },

    /// PEEK or STORE addressed an element past the bottom of the stack.
    #[error("stack index {index} out of range (size {size}) at offset {at}")]
    IndexOutOfRange { at: usize, index: u32, size: usize },

    /// PUSH_PROTO or CALL referenced a primitive handle missing from the
    /// runtime table.
    #[error("unknown primitive handle {handle} at offset {at}")]
    UnknownPrimitive { at: usize, handle: u32 },

    /// The output sink failed. Stringified to keep faults comparable.
    #[error("i/o error: {0}")]
    Io(String),

    /// The instruction stream could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_messages() {
        assert_eq!(
            RuntimeError::Overflow { at: 3 }.to_string(),
            "overflow error at offset 3"
        );
        assert_eq!(
            RuntimeError::DivisionByZero { at: 9 }.to_string(),
            "division by 0 at offset 9"
        );
        assert_eq!(
            RuntimeError::CallInteger { at: 0 }.to_string(),
            "cannot call integer at offset 0"
        );
    }

    #[test]
    fn decode_errors_pass_through() {
        let e = RuntimeError::from(DecodeError::TruncatedStream { at: 4 });
        assert_eq!(e.to_string(), "truncated stream at offset 4");
    }
}
