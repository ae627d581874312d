use std::io::{self, Write};

use crate::environment::{Env, Environment};
use crate::evaluator::Evaluator;
use crate::object::Object;
use crate::parser::parse;

const PROMPT: &str = ">> ";

/// Read-eval-print loop. Bindings persist between lines.
pub fn start() {
    println!("Lingo Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let env = Environment::with_builtins();
    let mut evaluator = Evaluator::new();

    loop {
        print!("{}", PROMPT);
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, &mut evaluator, &env);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command(source: &str, evaluator: &mut Evaluator, env: &Env) {
    let (program, errors) = parse(source);
    if !errors.is_empty() {
        for error in &errors {
            error.report(source, None);
        }
        return;
    }

    match evaluator.eval(&program, env) {
        Object::Null => {}
        value => println!("{}", value),
    }
}
