//! Disassembler: bytecode → readable listing.
//!
//! One instruction per line, prefixed with its byte offset. Jump and
//! call targets appear as absolute byte offsets, so a listing can be
//! cross-checked against itself.

use imp_common::{DecodeError, Opcode, Program};

/// Disassemble a program into a textual listing.
pub fn disassemble(program: &Program) -> Result<String, DecodeError> {
    let mut lines = Vec::new();
    let mut pc = 0;

    while pc < program.len() {
        let at = pc;
        let op = program.read_opcode(&mut pc)?;

        let line = match op {
            Opcode::PushFunc | Opcode::JumpFalse | Opcode::Jump => {
                let address = program.read_u64(&mut pc)?;
                format!("{at}: {} {address}", op.mnemonic())
            }
            Opcode::PushProto | Opcode::Peek | Opcode::Store => {
                let index = program.read_u32(&mut pc)?;
                format!("{at}: {} {index}", op.mnemonic())
            }
            Opcode::PushInt => {
                let value = program.read_i64(&mut pc)?;
                format!("{at}: {} {value}", op.mnemonic())
            }
            Opcode::Ret => {
                let depth = program.read_u32(&mut pc)?;
                let nargs = program.read_u32(&mut pc)?;
                format!("{at}: {} {depth} {nargs}", op.mnemonic())
            }
            _ => format!("{at}: {}", op.mnemonic()),
        };
        lines.push(line);
    }

    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program() {
        let program = Program::new(vec![]);
        assert_eq!(disassemble(&program).unwrap(), "");
    }

    #[test]
    fn lists_offsets_and_immediates() {
        let mut code = vec![Opcode::PushInt as u8];
        code.extend_from_slice(&7i64.to_ne_bytes());
        code.push(Opcode::Pop as u8);
        code.push(Opcode::Stop as u8);
        let program = Program::new(code);

        assert_eq!(
            disassemble(&program).unwrap(),
            "0: PUSH_INT 7\n9: POP\n10: STOP\n"
        );
    }

    #[test]
    fn ret_shows_both_immediates() {
        let mut code = vec![Opcode::Ret as u8];
        code.extend_from_slice(&2u32.to_ne_bytes());
        code.extend_from_slice(&1u32.to_ne_bytes());
        let program = Program::new(code);

        assert_eq!(disassemble(&program).unwrap(), "0: RET 2 1\n");
    }

    #[test]
    fn invalid_opcode_is_reported() {
        let program = Program::new(vec![0x7F]);
        assert_eq!(
            disassemble(&program),
            Err(DecodeError::InvalidOpcode(0x7F))
        );
    }

    #[test]
    fn truncated_immediate_is_reported() {
        // PUSH_INT with only 4 of its 8 immediate bytes.
        let mut code = vec![Opcode::PushInt as u8];
        code.extend_from_slice(&[0, 0, 0, 0]);
        let program = Program::new(code);

        assert_eq!(
            disassemble(&program),
            Err(DecodeError::TruncatedStream { at: 1 })
        );
    }
}
