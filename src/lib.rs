// Lingo Language Interpreter Library
//
// A tree-walking interpreter for a small C-like scripting language:
// source text is lexed into tokens, parsed into an AST with a Pratt parser,
// and evaluated over a tagged object model with closures.

// Public modules
pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod token;

// Re-export commonly used items
pub use ast::{BlockStatement, Expression, Program, Statement};
pub use builtins::{Builtin, Output, Stdout};
pub use environment::{Env, Environment};
pub use error::{RuntimeError, Span, SyntaxError};
pub use evaluator::{Evaluator, Node};
pub use lexer::Lexer;
pub use object::{HashKey, Object};
pub use parser::{parse, Parser};
pub use token::{Token, TokenKind};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
