//! Main execution loop and opcode dispatch for the IMP interpreter.

use imp_common::{Opcode, ProtoId, Value};

use crate::error::RuntimeError;
use crate::machine::Vm;
use crate::runtime;

impl Vm<'_> {
    /// Execute the program from offset 0 until STOP or a fault.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            self.at = self.pc;
            let op = self.program.read_opcode(&mut self.pc)?;

            match op {
                Opcode::PushFunc => {
                    let address = self.program.read_u64(&mut self.pc)?;
                    self.push(Value::Addr(address))?;
                }
                Opcode::PushProto => {
                    let handle = self.program.read_u32(&mut self.pc)?;
                    self.push(Value::Proto(ProtoId(handle)))?;
                }
                Opcode::PushInt => {
                    let value = self.program.read_i64(&mut self.pc)?;
                    self.push(Value::Int(value))?;
                }
                Opcode::Peek => {
                    let index = self.program.read_u32(&mut self.pc)?;
                    let value = self.peek(index)?;
                    self.push(value)?;
                }
                Opcode::Pop => {
                    self.pop()?;
                }
                Opcode::Store => {
                    let index = self.program.read_u32(&mut self.pc)?;
                    let value = self.pop()?;
                    self.store(index, value)?;
                }
                Opcode::Call => self.exec_call()?,

                Opcode::Add => self.exec_arith(i64::checked_add)?,
                Opcode::Sub => self.exec_arith(i64::checked_sub)?,
                Opcode::Mul => self.exec_arith(i64::checked_mul)?,
                Opcode::Div => self.exec_div_mod(i64::checked_div)?,
                Opcode::Mod => self.exec_div_mod(i64::checked_rem)?,

                Opcode::Greater => self.exec_compare(|lhs, rhs| lhs > rhs)?,
                Opcode::Lower => self.exec_compare(|lhs, rhs| lhs < rhs)?,
                Opcode::GreaterEq => self.exec_compare(|lhs, rhs| lhs >= rhs)?,
                Opcode::LowerEq => self.exec_compare(|lhs, rhs| lhs <= rhs)?,
                Opcode::IsEq => self.exec_compare(|lhs, rhs| lhs == rhs)?,

                Opcode::Ret => self.exec_ret()?,
                Opcode::JumpFalse => {
                    let address = self.program.read_u64(&mut self.pc)?;
                    let cond = self.pop()?;
                    if !cond.is_truthy() {
                        self.pc = address as usize;
                    }
                }
                Opcode::Jump => {
                    self.pc = self.program.read_u64(&mut self.pc)? as usize;
                }
                Opcode::Stop => return Ok(()),
            }
        }
    }

    /// Pop the callee and dispatch on its variant.
    fn exec_call(&mut self) -> Result<(), RuntimeError> {
        match self.pop()? {
            // The primitive is responsible for its own stack discipline.
            Value::Proto(id) => {
                let f = runtime::get(id).ok_or(RuntimeError::UnknownPrimitive {
                    at: self.at,
                    handle: id.0,
                })?;
                f(self)
            }
            // Save the return address (just past CALL) and enter the
            // function.
            Value::Addr(address) => {
                let return_to = self.pc as u64;
                self.push(Value::Addr(return_to))?;
                self.pc = address as usize;
                Ok(())
            }
            Value::Int(_) => Err(RuntimeError::CallInteger { at: self.at }),
        }
    }

    /// Binary arithmetic: pop rhs, pop lhs, push `lhs OP rhs`. Overflow
    /// is a fault, not a wrap.
    fn exec_arith(&mut self, f: fn(i64, i64) -> Option<i64>) -> Result<(), RuntimeError> {
        let rhs = self.pop_int()?;
        let lhs = self.pop_int()?;
        let result = f(lhs, rhs).ok_or(RuntimeError::Overflow { at: self.at })?;
        self.push(Value::Int(result))
    }

    /// DIV and MOD: a zero divisor is its own fault; `i64::MIN / -1`
    /// overflows.
    fn exec_div_mod(&mut self, f: fn(i64, i64) -> Option<i64>) -> Result<(), RuntimeError> {
        let rhs = self.pop_int()?;
        let lhs = self.pop_int()?;
        if rhs == 0 {
            return Err(RuntimeError::DivisionByZero { at: self.at });
        }
        let result = f(lhs, rhs).ok_or(RuntimeError::Overflow { at: self.at })?;
        self.push(Value::Int(result))
    }

    /// Comparison: pop rhs, pop lhs, push 1 if `lhs OP rhs` holds, else 0.
    fn exec_compare(&mut self, f: fn(i64, i64) -> bool) -> Result<(), RuntimeError> {
        let rhs = self.pop_int()?;
        let lhs = self.pop_int()?;
        self.push(Value::Int(f(lhs, rhs) as i64))
    }

    /// Unwind one frame: pop the return value, drop the frame's locals,
    /// restore the caller's pc, drop the caller-pushed arguments, push
    /// the return value where the callee used to live.
    fn exec_ret(&mut self) -> Result<(), RuntimeError> {
        let depth = self.program.read_u32(&mut self.pc)?;
        let nargs = self.program.read_u32(&mut self.pc)?;

        let value = self.pop()?;
        self.drop_values(depth as usize)?;
        self.pc = self.pop_addr()? as usize;
        self.drop_values(nargs as usize)?;
        self.push(value)
    }
}
