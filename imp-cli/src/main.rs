//! IMP CLI — compile, run, and disassemble.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/lex/parse/codegen error
//! - 3: Runtime fault

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "compile" => commands::compile(&args[2..]),
        "run" => commands::run(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: imp <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  compile <input.imp> [-o output.impb]   Compile source to bytecode");
    eprintln!("  run <input.imp>                        Compile and execute a source file");
    eprintln!("  disassemble <input.impb>               Disassemble bytecode to text");
}
