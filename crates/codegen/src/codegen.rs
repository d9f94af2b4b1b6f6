//! Lowering of an IMP module to bytecode.
//!
//! Translation is a single pass over the tree. Forward references are
//! handled assembler-style: emitting a reference to an unbound label
//! writes a zero placeholder and records the site; emitting the label
//! patches every pending site and records the address for later
//! references to use directly.
//!
//! A stack-depth counter models the runtime stack size within the
//! current function frame. Every emitted opcode updates the counter to
//! match its runtime effect; function bodies must enter and leave at
//! depth zero and blocks must leave at the depth they entered. These are
//! internal invariants enforced by assertions.

use std::collections::HashMap;

use imp_common::{Opcode, Program, ProtoId};
use imp_syntax::ast::{BinOp, Expr, FuncDecl, Item, Module, Stmt};
use imp_vm::runtime;

use crate::error::CodegenError;
use crate::scope::{Binding, GlobalScope, Label, Scope};

/// Lower a module to an executable program.
///
/// The emitted stream holds the top-level statements first, so execution
/// starts with them at offset 0, then a `STOP`, then the bodies of the
/// user-defined functions in source order.
pub fn translate(module: &Module) -> Result<Program, CodegenError> {
    let mut cg = Codegen::default();

    // Record every function and prototype declaration in the global
    // symbol table before lowering anything: top-level code may call a
    // function declared after it.
    let mut global = GlobalScope::default();
    for item in &module.items {
        match item {
            Item::Proto(proto) => {
                let id = runtime::lookup(&proto.primitive).ok_or_else(|| {
                    CodegenError::UnknownPrimitive {
                        name: proto.primitive.clone(),
                    }
                })?;
                global.protos.insert(proto.name.clone(), id);
            }
            Item::Func(func) => {
                let entry = cg.make_label();
                global.funcs.insert(func.name.clone(), entry);
            }
            Item::Stmt(_) => {}
        }
    }

    // Top-level statements run in one implicit block under the global
    // scope, so `let` works at module level and its locals are popped
    // before the terminating STOP.
    let global_scope = Scope::Global(&global);
    {
        let mut top = Scope::block(&global_scope);
        for item in &module.items {
            if let Item::Stmt(stmt) = item {
                cg.lower_stmt(&mut top, stmt)?;
            }
        }
        for _ in 0..top.local_count() {
            cg.emit_pop();
        }
    }
    assert_eq!(cg.depth, 0, "invalid stack depth at end of top level");
    cg.emit_op(Opcode::Stop);

    for item in &module.items {
        if let Item::Func(func) = item {
            let entry = global.funcs[&func.name];
            cg.lower_func_decl(&global_scope, entry, func)?;
        }
    }

    assert!(cg.fixups.is_empty(), "dangling label fixups");
    Ok(Program::new(cg.code))
}

#[derive(Default)]
struct Codegen {
    /// The emitted byte stream.
    code: Vec<u8>,
    /// Runtime stack size within the current function frame.
    depth: u32,
    /// Label identities are minted monotonically.
    next_label: u32,
    /// Resolved label addresses.
    labels: HashMap<Label, u64>,
    /// Pending patch sites per unresolved label.
    fixups: HashMap<Label, Vec<usize>>,
    /// Argument count of the function being lowered; zero at top level.
    fn_arg_count: u32,
}

impl Codegen {
    // ---- Statements ----

    fn lower_stmt(&mut self, scope: &mut Scope<'_>, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Block(stmts) => self.lower_block_stmt(scope, stmts),
            Stmt::While { cond, body } => self.lower_while_stmt(scope, cond, body),
            Stmt::If { cond, then, els } => self.lower_if_stmt(scope, cond, then, els.as_deref()),
            Stmt::Expr(expr) => {
                self.lower_expr(scope, expr)?;
                self.emit_pop();
                Ok(())
            }
            Stmt::Return(expr) => {
                self.lower_expr(scope, expr)?;
                self.emit_ret();
                Ok(())
            }
            Stmt::Let { name, init, .. } => {
                match init {
                    Some(expr) => self.lower_expr(scope, expr)?,
                    // A let without an initialiser still owns a stack
                    // slot: the block exit pops one value per local.
                    None => self.emit_push_int(0),
                }
                scope.bind_local(name.clone(), self.depth);
                Ok(())
            }
            Stmt::Assign { name, value } => self.lower_assign_stmt(scope, name, value),
        }
    }

    fn lower_block_stmt(&mut self, scope: &Scope<'_>, stmts: &[Stmt]) -> Result<(), CodegenError> {
        let depth_in = self.depth;

        let mut block = Scope::block(scope);
        for stmt in stmts {
            self.lower_stmt(&mut block, stmt)?;
        }

        // Locals go out of scope LIFO, one pop per local declared
        // directly in this block.
        for _ in 0..block.local_count() {
            self.emit_pop();
        }

        assert_eq!(self.depth, depth_in, "mismatched block depth on exit");
        Ok(())
    }

    fn lower_while_stmt(
        &mut self,
        scope: &mut Scope<'_>,
        cond: &Expr,
        body: &Stmt,
    ) -> Result<(), CodegenError> {
        let entry = self.make_label();
        let exit = self.make_label();

        self.emit_label(entry);
        self.lower_expr(scope, cond)?;
        self.emit_jump_false(exit);
        self.lower_stmt(scope, body)?;
        self.emit_jump(entry);
        self.emit_label(exit);
        Ok(())
    }

    fn lower_if_stmt(
        &mut self,
        scope: &mut Scope<'_>,
        cond: &Expr,
        then: &Stmt,
        els: Option<&Stmt>,
    ) -> Result<(), CodegenError> {
        let entry = self.make_label();
        let else_label = self.make_label();
        let exit = self.make_label();

        self.emit_label(entry);
        self.lower_expr(scope, cond)?;
        self.emit_jump_false(else_label);
        self.lower_stmt(scope, then)?;
        self.emit_jump(exit);
        self.emit_label(else_label);
        if let Some(els) = els {
            self.lower_stmt(scope, els)?;
        }
        self.emit_label(exit);
        Ok(())
    }

    fn lower_assign_stmt(
        &mut self,
        scope: &Scope<'_>,
        name: &str,
        value: &Expr,
    ) -> Result<(), CodegenError> {
        self.lower_expr(scope, value)?;
        // Index arithmetic mirrors PEEK, adjusted for the value that
        // STORE pops before writing.
        match scope.lookup(name) {
            Some(Binding::Local { depth }) => {
                let index = self.depth - 1 - depth;
                self.emit_store(index);
                Ok(())
            }
            Some(Binding::Arg { index }) => {
                let index = self.depth + index;
                self.emit_store(index);
                Ok(())
            }
            Some(Binding::Func { .. }) | Some(Binding::Proto { .. }) => {
                Err(CodegenError::UnassignableName {
                    name: name.to_string(),
                })
            }
            None => Err(CodegenError::UnboundName {
                name: name.to_string(),
            }),
        }
    }

    // ---- Expressions ----

    fn lower_expr(&mut self, scope: &Scope<'_>, expr: &Expr) -> Result<(), CodegenError> {
        match expr {
            Expr::Int(value) => {
                self.emit_push_int(*value);
                Ok(())
            }
            Expr::Ref(name) => self.lower_ref_expr(scope, name),
            Expr::Binary { op, lhs, rhs } => {
                self.lower_expr(scope, lhs)?;
                self.lower_expr(scope, rhs)?;
                self.emit_binary(binary_opcode(*op));
                Ok(())
            }
            Expr::Call { callee, args } => {
                // Arguments are evaluated in reverse source order so the
                // first argument ends up closest to the saved return
                // address; the callee value sits on top for CALL.
                for arg in args.iter().rev() {
                    self.lower_expr(scope, arg)?;
                }
                self.lower_expr(scope, callee)?;
                self.emit_op(Opcode::Call);
                self.depth -= args.len() as u32;
                Ok(())
            }
        }
    }

    fn lower_ref_expr(&mut self, scope: &Scope<'_>, name: &str) -> Result<(), CodegenError> {
        match scope.lookup(name) {
            Some(Binding::Func { entry }) => {
                self.emit_push_func(entry);
                Ok(())
            }
            Some(Binding::Proto { id }) => {
                self.emit_push_proto(id);
                Ok(())
            }
            // Frame layout, top of stack first:
            //   [top, ..., local_1, local_0, saved-pc, arg_0, ..., arg_{n-1}]
            Some(Binding::Arg { index }) => {
                self.emit_peek(self.depth + index + 1);
                Ok(())
            }
            Some(Binding::Local { depth }) => {
                self.emit_peek(self.depth - depth);
                Ok(())
            }
            None => Err(CodegenError::UnboundName {
                name: name.to_string(),
            }),
        }
    }

    // ---- Functions ----

    fn lower_func_decl(
        &mut self,
        global_scope: &Scope<'_>,
        entry: Label,
        decl: &FuncDecl,
    ) -> Result<(), CodegenError> {
        self.emit_label(entry);

        assert_eq!(self.depth, 0, "invalid stack depth at function entry");
        self.fn_arg_count = decl.args.len() as u32;

        let mut args = HashMap::new();
        for (index, (name, _ty)) in decl.args.iter().enumerate() {
            args.insert(name.clone(), index as u32);
        }
        let scope = Scope::Func {
            parent: global_scope,
            args,
        };

        match &decl.body {
            Stmt::Block(stmts) => self.lower_block_stmt(&scope, stmts)?,
            other => {
                // The parser only produces blocks as function bodies.
                unreachable!("function body must be a block, got {other:?}")
            }
        }

        // A body that structurally falls through returns 0 rather than
        // walking into the next function's code.
        self.emit_push_int(0);
        self.emit_ret();

        assert_eq!(self.depth, 0, "invalid stack depth on function exit");
        self.fn_arg_count = 0;
        Ok(())
    }

    // ---- Labels ----

    fn make_label(&mut self) -> Label {
        self.next_label += 1;
        Label(self.next_label)
    }

    /// Bind a label to the current stream offset, patching every pending
    /// reference to it.
    fn emit_label(&mut self, label: Label) {
        let address = self.code.len() as u64;
        if let Some(sites) = self.fixups.remove(&label) {
            for site in sites {
                self.code[site..site + 8].copy_from_slice(&address.to_ne_bytes());
            }
        }
        self.labels.insert(label, address);
    }

    /// Emit the address of a label, or a placeholder to be patched once
    /// the label is bound.
    fn emit_fixup(&mut self, label: Label) {
        if let Some(&address) = self.labels.get(&label) {
            self.emit_u64(address);
        } else {
            self.fixups.entry(label).or_default().push(self.code.len());
            self.emit_u64(0);
        }
    }

    // ---- Raw emission ----

    fn emit_op(&mut self, op: Opcode) {
        self.code.push(op as u8);
    }

    fn emit_u32(&mut self, value: u32) {
        self.code.extend_from_slice(&value.to_ne_bytes());
    }

    fn emit_u64(&mut self, value: u64) {
        self.code.extend_from_slice(&value.to_ne_bytes());
    }

    fn emit_i64(&mut self, value: i64) {
        self.code.extend_from_slice(&value.to_ne_bytes());
    }

    // ---- Typed emission with depth accounting ----

    fn emit_push_func(&mut self, entry: Label) {
        self.depth += 1;
        self.emit_op(Opcode::PushFunc);
        self.emit_fixup(entry);
    }

    fn emit_push_proto(&mut self, id: ProtoId) {
        self.depth += 1;
        self.emit_op(Opcode::PushProto);
        self.emit_u32(id.0);
    }

    fn emit_push_int(&mut self, value: i64) {
        self.depth += 1;
        self.emit_op(Opcode::PushInt);
        self.emit_i64(value);
    }

    fn emit_peek(&mut self, index: u32) {
        self.depth += 1;
        self.emit_op(Opcode::Peek);
        self.emit_u32(index);
    }

    fn emit_pop(&mut self) {
        assert!(self.depth > 0, "no elements on stack");
        self.depth -= 1;
        self.emit_op(Opcode::Pop);
    }

    fn emit_store(&mut self, index: u32) {
        assert!(self.depth > 0, "no elements on stack");
        self.depth -= 1;
        self.emit_op(Opcode::Store);
        self.emit_u32(index);
    }

    fn emit_binary(&mut self, op: Opcode) {
        assert!(self.depth > 0, "no elements on stack");
        self.depth -= 1;
        self.emit_op(op);
    }

    fn emit_ret(&mut self) {
        assert!(self.depth > 0, "no elements on stack");
        self.depth -= 1;
        self.emit_op(Opcode::Ret);
        // Locals left in the frame below the return value, then the
        // caller-pushed argument count.
        self.emit_u32(self.depth);
        self.emit_u32(self.fn_arg_count);
    }

    fn emit_jump_false(&mut self, label: Label) {
        assert!(self.depth > 0, "no elements on stack");
        self.depth -= 1;
        self.emit_op(Opcode::JumpFalse);
        self.emit_fixup(label);
    }

    fn emit_jump(&mut self, label: Label) {
        self.emit_op(Opcode::Jump);
        self.emit_fixup(label);
    }
}

fn binary_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Add => Opcode::Add,
        BinOp::Sub => Opcode::Sub,
        BinOp::Mul => Opcode::Mul,
        BinOp::Div => Opcode::Div,
        BinOp::Mod => Opcode::Mod,
        BinOp::Greater => Opcode::Greater,
        BinOp::Lower => Opcode::Lower,
        BinOp::GreaterEq => Opcode::GreaterEq,
        BinOp::LowerEq => Opcode::LowerEq,
        BinOp::IsEq => Opcode::IsEq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_op(program: &Program, pc: &mut usize) -> Opcode {
        program.read_opcode(pc).unwrap()
    }

    #[test]
    fn empty_module_is_stop() {
        let program = translate(&Module::default()).unwrap();
        assert_eq!(program.as_bytes(), &[Opcode::Stop as u8]);
    }

    #[test]
    fn expr_stmt_pushes_then_pops() {
        let module = Module {
            items: vec![Item::Stmt(Stmt::Expr(Expr::Int(42)))],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(42));
        assert_eq!(read_op(&program, &mut pc), Opcode::Pop);
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);
        assert_eq!(pc, program.len());
    }

    #[test]
    fn binary_expr_is_postorder() {
        // 10 - 3 * 2 emits 10, 3, 2, MUL, SUB.
        let module = Module {
            items: vec![Item::Stmt(Stmt::Expr(Expr::Binary {
                op: BinOp::Sub,
                lhs: Box::new(Expr::Int(10)),
                rhs: Box::new(Expr::Binary {
                    op: BinOp::Mul,
                    lhs: Box::new(Expr::Int(3)),
                    rhs: Box::new(Expr::Int(2)),
                }),
            }))],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(10));
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(3));
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(2));
        assert_eq!(read_op(&program, &mut pc), Opcode::Mul);
        assert_eq!(read_op(&program, &mut pc), Opcode::Sub);
        assert_eq!(read_op(&program, &mut pc), Opcode::Pop);
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);
    }

    #[test]
    fn while_jumps_resolve_to_opcode_boundaries() {
        // while (1) { 2; }
        let module = Module {
            items: vec![Item::Stmt(Stmt::While {
                cond: Expr::Int(1),
                body: Box::new(Stmt::Block(vec![Stmt::Expr(Expr::Int(2))])),
            })],
        };
        let program = translate(&module).unwrap();

        // Layout: entry: PUSH_INT 1; JUMP_FALSE exit; PUSH_INT 2; POP;
        //         JUMP entry; exit: STOP
        let mut pc = 0;
        let entry = pc as u64;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        program.read_i64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::JumpFalse);
        let exit = program.read_u64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        program.read_i64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::Pop);
        assert_eq!(read_op(&program, &mut pc), Opcode::Jump);
        assert_eq!(program.read_u64(&mut pc), Ok(entry));
        assert_eq!(exit as usize, pc, "JUMP_FALSE lands after the loop");
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);
    }

    #[test]
    fn if_without_else_branches_join() {
        // if (0) { 1; }
        let module = Module {
            items: vec![Item::Stmt(Stmt::If {
                cond: Expr::Int(0),
                then: Box::new(Stmt::Block(vec![Stmt::Expr(Expr::Int(1))])),
                els: None,
            })],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        program.read_i64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::JumpFalse);
        let else_addr = program.read_u64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        program.read_i64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::Pop);
        assert_eq!(read_op(&program, &mut pc), Opcode::Jump);
        let exit_addr = program.read_u64(&mut pc).unwrap();
        // With no else branch both targets are the join point.
        assert_eq!(else_addr, pc as u64);
        assert_eq!(exit_addr, pc as u64);
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);
    }

    #[test]
    fn let_without_init_pushes_sentinel() {
        // { let x: int; }
        let module = Module {
            items: vec![Item::Stmt(Stmt::Block(vec![Stmt::Let {
                name: "x".to_string(),
                ty: "int".to_string(),
                init: None,
            }]))],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(0));
        assert_eq!(read_op(&program, &mut pc), Opcode::Pop);
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);
    }

    #[test]
    fn local_peek_index_counts_from_top() {
        // let a: int = 1; let b: int = 2; a;
        let module = Module {
            items: vec![
                Item::Stmt(Stmt::Let {
                    name: "a".to_string(),
                    ty: "int".to_string(),
                    init: Some(Expr::Int(1)),
                }),
                Item::Stmt(Stmt::Let {
                    name: "b".to_string(),
                    ty: "int".to_string(),
                    init: Some(Expr::Int(2)),
                }),
                Item::Stmt(Stmt::Expr(Expr::Ref("a".to_string()))),
            ],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        for _ in 0..2 {
            assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
            program.read_i64(&mut pc).unwrap();
        }
        // With both locals live, `a` is one below the top.
        assert_eq!(read_op(&program, &mut pc), Opcode::Peek);
        assert_eq!(program.read_u32(&mut pc), Ok(1));
    }

    #[test]
    fn function_entry_matches_push_func_immediate() {
        // func zero(): int { return 0; }  zero();
        let module = Module {
            items: vec![
                Item::Func(FuncDecl {
                    name: "zero".to_string(),
                    args: vec![],
                    ret_type: "int".to_string(),
                    body: Stmt::Block(vec![Stmt::Return(Expr::Int(0))]),
                }),
                Item::Stmt(Stmt::Expr(Expr::Call {
                    callee: Box::new(Expr::Ref("zero".to_string())),
                    args: vec![],
                })),
            ],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushFunc);
        let entry = program.read_u64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::Call);
        assert_eq!(read_op(&program, &mut pc), Opcode::Pop);
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);

        // The function body starts right after STOP.
        assert_eq!(entry as usize, pc);
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(0));
        assert_eq!(read_op(&program, &mut pc), Opcode::Ret);
        assert_eq!(program.read_u32(&mut pc), Ok(0)); // no locals
        assert_eq!(program.read_u32(&mut pc), Ok(0)); // no args
    }

    #[test]
    fn ret_records_locals_and_args() {
        // func f(a: int): int { let x: int = 1; return x; }
        let module = Module {
            items: vec![Item::Func(FuncDecl {
                name: "f".to_string(),
                args: vec![("a".to_string(), "int".to_string())],
                ret_type: "int".to_string(),
                body: Stmt::Block(vec![
                    Stmt::Let {
                        name: "x".to_string(),
                        ty: "int".to_string(),
                        init: Some(Expr::Int(1)),
                    },
                    Stmt::Return(Expr::Ref("x".to_string())),
                ]),
            })],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt); // x = 1
        program.read_i64(&mut pc).unwrap();
        // With only x live, it sits on top of the frame.
        assert_eq!(read_op(&program, &mut pc), Opcode::Peek); // x
        assert_eq!(program.read_u32(&mut pc), Ok(0));
        assert_eq!(read_op(&program, &mut pc), Opcode::Ret);
        assert_eq!(program.read_u32(&mut pc), Ok(1)); // one local to drop
        assert_eq!(program.read_u32(&mut pc), Ok(1)); // one argument
    }

    #[test]
    fn call_args_lowered_in_reverse() {
        // func f(a: int, b: int): int { return a; }  f(1, 2);
        let module = Module {
            items: vec![
                Item::Func(FuncDecl {
                    name: "f".to_string(),
                    args: vec![
                        ("a".to_string(), "int".to_string()),
                        ("b".to_string(), "int".to_string()),
                    ],
                    ret_type: "int".to_string(),
                    body: Stmt::Block(vec![Stmt::Return(Expr::Ref("a".to_string()))]),
                }),
                Item::Stmt(Stmt::Expr(Expr::Call {
                    callee: Box::new(Expr::Ref("f".to_string())),
                    args: vec![Expr::Int(1), Expr::Int(2)],
                })),
            ],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(2)); // last arg first
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(1));
        assert_eq!(read_op(&program, &mut pc), Opcode::PushFunc);
        program.read_u64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::Call);
    }

    #[test]
    fn arg_peek_skips_saved_pc() {
        // Inside f(a), referencing `a` at depth 0 peeks past the saved
        // return address: index 0 + 0 + 1.
        let module = Module {
            items: vec![Item::Func(FuncDecl {
                name: "f".to_string(),
                args: vec![("a".to_string(), "int".to_string())],
                ret_type: "int".to_string(),
                body: Stmt::Block(vec![Stmt::Return(Expr::Ref("a".to_string()))]),
            })],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::Stop);
        assert_eq!(read_op(&program, &mut pc), Opcode::Peek);
        assert_eq!(program.read_u32(&mut pc), Ok(1));
    }

    #[test]
    fn assign_to_local_stores_at_its_slot() {
        // let i: int = 0; i = 5;
        let module = Module {
            items: vec![
                Item::Stmt(Stmt::Let {
                    name: "i".to_string(),
                    ty: "int".to_string(),
                    init: Some(Expr::Int(0)),
                }),
                Item::Stmt(Stmt::Assign {
                    name: "i".to_string(),
                    value: Expr::Int(5),
                }),
            ],
        };
        let program = translate(&module).unwrap();

        let mut pc = 0;
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        program.read_i64(&mut pc).unwrap();
        assert_eq!(read_op(&program, &mut pc), Opcode::PushInt);
        assert_eq!(program.read_i64(&mut pc), Ok(5));
        assert_eq!(read_op(&program, &mut pc), Opcode::Store);
        // After STORE pops the value, `i` is on top.
        assert_eq!(program.read_u32(&mut pc), Ok(0));
    }

    #[test]
    fn unbound_name_is_an_error() {
        let module = Module {
            items: vec![Item::Stmt(Stmt::Expr(Expr::Ref("ghost".to_string())))],
        };
        assert_eq!(
            translate(&module),
            Err(CodegenError::UnboundName {
                name: "ghost".to_string()
            })
        );
    }

    #[test]
    fn unknown_primitive_is_an_error() {
        let module = Module {
            items: vec![Item::Proto(imp_syntax::ast::ProtoDecl {
                name: "f".to_string(),
                args: vec![],
                ret_type: "int".to_string(),
                primitive: "no_such_primitive".to_string(),
            })],
        };
        assert_eq!(
            translate(&module),
            Err(CodegenError::UnknownPrimitive {
                name: "no_such_primitive".to_string()
            })
        );
    }

    #[test]
    fn assign_to_function_is_an_error() {
        let module = Module {
            items: vec![
                Item::Func(FuncDecl {
                    name: "f".to_string(),
                    args: vec![],
                    ret_type: "int".to_string(),
                    body: Stmt::Block(vec![Stmt::Return(Expr::Int(0))]),
                }),
                Item::Stmt(Stmt::Assign {
                    name: "f".to_string(),
                    value: Expr::Int(1),
                }),
            ],
        };
        assert_eq!(
            translate(&module),
            Err(CodegenError::UnassignableName {
                name: "f".to_string()
            })
        );
    }

    #[test]
    fn translation_is_deterministic() {
        let module = Module {
            items: vec![
                Item::Func(FuncDecl {
                    name: "f".to_string(),
                    args: vec![("n".to_string(), "int".to_string())],
                    ret_type: "int".to_string(),
                    body: Stmt::Block(vec![Stmt::Return(Expr::Ref("n".to_string()))]),
                }),
                Item::Stmt(Stmt::Expr(Expr::Call {
                    callee: Box::new(Expr::Ref("f".to_string())),
                    args: vec![Expr::Int(3)],
                })),
            ],
        };
        let first = translate(&module).unwrap();
        let second = translate(&module).unwrap();
        assert_eq!(first, second);
    }
}
