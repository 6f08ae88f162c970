use std::io::{self, BufRead, Write};
use std::process;
use std::{env, fs};

use kyle::error::Error;
use kyle::interpreter::Interpreter;
use kyle::value::Value;
use kyle::{lexer, parser};

const EXTENSION: &str = ".kyle";

fn main() {
    match env::args().nth(1) {
        Some(path) => run_file(&path),
        None => interactive_loop(),
    }
}

fn run_file(path: &str) {
    if !path.ends_with(EXTENSION) {
        eprintln!(
            "'{}' is not a {} file; rename it to something like 'demo{}'",
            path, EXTENSION, EXTENSION
        );
        return;
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("could not read '{}': {}", path, err);
            return;
        }
    };

    let outcome = lexer::tokenize(&source)
        .and_then(parser::parse)
        .and_then(|program| Interpreter::new().interpret(&program));
    match outcome {
        Ok(Some(result)) => println!("{}", result),
        Ok(None) => (),
        // A lexical failure is unrecoverable and takes the process down with
        // it; later-stage errors are reported without changing the exit code.
        Err(err) if err.is_fatal() => {
            eprintln!("[ fatal ] {}: {}", err.category(), err);
            process::exit(1);
        }
        Err(err) => eprintln!("{}: {}", err.category(), err),
    }
}

fn interactive_loop() {
    println!("kyle {}", env!("CARGO_PKG_VERSION"));
    println!("Enter 'exit' to quit, 'help' for commands");

    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();

    loop {
        print!(">>> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => (),
        }

        match line.trim() {
            "" => (),
            "exit" => break,
            "help" => print_help(),
            "env" => dump_environment(&interpreter),
            "clear" => {
                // A fresh interpreter is the whole "wipe", builtins included.
                interpreter = Interpreter::new();
                println!("Environment cleared");
            }
            code => match run_line(&mut interpreter, code) {
                Ok(Some(result)) => println!("Result: {}", result),
                Ok(None) => (),
                Err(err) => eprintln!("{}: {}", err.category(), err),
            },
        }
    }
}

fn run_line(interpreter: &mut Interpreter, code: &str) -> Result<Option<Value>, Error> {
    let tokens = lexer::tokenize(code)?;
    let program = parser::parse(tokens)?;
    interpreter.interpret(&program)
}

fn print_help() {
    println!("Available commands:");
    println!("  exit  - Exit interactive mode");
    println!("  help  - Show this help");
    println!("  env   - Show environment variables");
    println!("  clear - Clear environment");
}

fn dump_environment(interpreter: &Interpreter) {
    let mut bindings: Vec<_> = interpreter.environment().iter().collect();
    bindings.sort_by_key(|(name, _)| name.as_str());
    println!("Environment:");
    for (name, value) in bindings {
        println!("  {} = {}", name, value);
    }
}
