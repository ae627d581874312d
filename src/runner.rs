use ariadne::{Color, Fmt};

use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::object::Object;
use crate::parser::parse;

/// What `run` does with a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Evaluate,
    /// Print the token stream.
    Tokens,
    /// Print the parsed program in canonical form.
    Ast,
}

/// Runs a whole script. Returns `false` if it had syntax or runtime errors.
pub fn run(source: &str, filename: Option<&str>) -> bool {
    run_with_mode(source, filename, Mode::Evaluate)
}

pub fn run_with_mode(source: &str, filename: Option<&str>, mode: Mode) -> bool {
    if mode == Mode::Tokens {
        for token in Lexer::new(source) {
            println!("{}", token);
        }
        return true;
    }

    let (program, errors) = parse(source);
    if !errors.is_empty() {
        for error in &errors {
            error.report(source, filename);
        }
        return false;
    }

    if mode == Mode::Ast {
        println!("{}", program);
        return true;
    }

    let env = Environment::with_builtins();
    let mut evaluator = Evaluator::new();
    match evaluator.eval(&program, &env) {
        Object::Error(message) => {
            eprintln!("{}: {}", "Runtime Error".fg(Color::Magenta), message);
            false
        }
        _ => true,
    }
}
