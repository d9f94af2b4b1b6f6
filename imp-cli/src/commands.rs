//! CLI command implementations.

use std::fs;

use imp_common::Program;

/// Compile a .imp source file to .impb bytecode.
pub fn compile(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: compile requires an input file");
        eprintln!("Usage: imp compile <input.imp> [-o output.impb]");
        return Err(1);
    }

    let input = &args[0];

    // Parse -o flag
    let output = if args.len() >= 3 && args[1] == "-o" {
        args[2].clone()
    } else if input.ends_with(".imp") {
        format!("{input}b")
    } else {
        format!("{input}.impb")
    };

    let program = compile_file(input)?;
    let bytes = program.as_bytes();

    fs::write(&output, bytes).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!("compiled {} bytes -> {output}", bytes.len());
    Ok(())
}

/// Compile and execute a .imp source file.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: imp run <input.imp>");
        return Err(1);
    }

    let program = compile_file(&args[0])?;

    match imp_vm::run(&program) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Disassemble a .impb bytecode file to text.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: imp disassemble <input.impb>");
        return Err(1);
    }

    let input = &args[0];
    let bytes = fs::read(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    let program = Program::new(bytes);
    let text = imp_codegen::disassemble(&program).map_err(|e| {
        eprintln!("error: invalid bytecode: {e}");
        1
    })?;
    print!("{text}");
    Ok(())
}

// --- Helpers ---

/// Run the frontend and code generator over a source file.
fn compile_file(path: &str) -> Result<Program, i32> {
    let source = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    let tokens = imp_syntax::lexer::tokenize(&source).map_err(|e| {
        eprintln!("error: {path}:{e}");
        1
    })?;

    let module = imp_syntax::parser::parse(tokens).map_err(|e| {
        eprintln!("error: {path}:{e}");
        1
    })?;

    imp_codegen::translate(&module).map_err(|e| {
        eprintln!("error: {path}: {e}");
        1
    })
}
