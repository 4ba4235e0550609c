use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use bytelox::vm::{InterpretError, VM};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut vm = VM::default();
    match args.len() {
        1 => repl(&mut vm),
        2 => run_file(&mut vm, &args[1]),
        _ => {
            eprintln!("Usage: bytelox [path]");
            process::exit(64);
        }
    }
}

fn repl(vm: &mut VM) {
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                if line.trim().is_empty() {
                    continue;
                }
                // errors were already reported on stderr; keep the loop alive
                let _ = vm.interpret(&line);
            }
            Err(e) => {
                eprintln!("Read error: {e}");
                break;
            }
        }
    }
}

fn run_file(vm: &mut VM, path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read \"{path}\": {e}");
            process::exit(74);
        }
    };

    match vm.interpret(&source) {
        Ok(_) => {}
        Err(InterpretError::Compile) => process::exit(65),
        Err(InterpretError::Runtime) => process::exit(70),
    }
}
