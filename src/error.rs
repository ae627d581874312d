use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::ast::{InfixOperator, PrefixOperator};
use crate::token::TokenKind;

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An illegal token produced by the lexer reached the parser.
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub span: Span,
    pub found: TokenKind,
    pub expected: Option<TokenKind>,
    pub message: String,
    pub help: Option<String>,
}

impl SyntaxError {
    pub fn new(kind: ErrorKind, span: Span, found: TokenKind, message: String) -> Self {
        Self {
            kind,
            span,
            found,
            expected: None,
            message,
            help: None,
        }
    }

    pub fn unexpected(span: Span, expected: TokenKind, found: TokenKind) -> Self {
        Self {
            kind: ErrorKind::Parse,
            span,
            found,
            expected: Some(expected),
            message: format!(
                "expected next token to be {}, got {} instead",
                expected, found
            ),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let (color, kind_str) = match self.kind {
            ErrorKind::Lex => (Color::Red, "Lexical Error"),
            ErrorKind::Parse => (Color::Yellow, "Syntax Error"),
        };

        // The EOF token sits one past the last byte.
        let end = source.len();
        let start = self.span.start.min(end);
        let stop = self.span.end.clamp(start, end);

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, start..stop))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(e) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            eprintln!("{}: {} ({})", kind_str, self.message, e);
        }
    }
}

/// Errors raised while evaluating a program. The `Display` form is the
/// message carried by the resulting `Object::Error`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: &'static str,
    },

    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },

    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },

    #[error("integer overflow: {left} {operator} {right}")]
    IntegerOverflow {
        left: i64,
        operator: InfixOperator,
        right: i64,
    },

    #[error("integer overflow: -{0}")]
    NegationOverflow(i64),

    #[error("division by zero")]
    DivisionByZero,

    #[error("not a function: {0}")]
    NotAFunction(&'static str),

    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArgumentCount { want: usize, got: usize },

    #[error("argument to `{builtin}` not supported, got {got}")]
    UnsupportedArgument {
        builtin: &'static str,
        got: &'static str,
    },

    #[error("argument to `{builtin}` must be {expected}, got {got}")]
    ArgumentMustBe {
        builtin: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error("unusable as hash key: {0}")]
    UnusableAsHashKey(&'static str),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(&'static str),
}
