//! Decode errors for IMP bytecode streams.

use thiserror::Error;

/// Errors that occur while decoding a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The byte at the cursor is not a known opcode.
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    /// The stream ended in the middle of an opcode or immediate.
    #[error("truncated stream at offset {at}")]
    TruncatedStream { at: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_opcode() {
        assert_eq!(
            DecodeError::InvalidOpcode(0x7F).to_string(),
            "invalid opcode: 0x7f"
        );
    }

    #[test]
    fn display_truncated_stream() {
        assert_eq!(
            DecodeError::TruncatedStream { at: 12 }.to_string(),
            "truncated stream at offset 12"
        );
    }
}
