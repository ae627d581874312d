use std::fmt;

use crate::error::RuntimeError;
use crate::object::{Object, NULL};

/// Where `puts` sends its lines. The host decides what that means.
pub trait Output {
    fn write_line(&mut self, line: &str);
}

/// Writes each line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Output for Stdout {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Captures lines in memory.
impl Output for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

pub type BuiltinFn = fn(&[Object], &mut dyn Output) -> Result<Object, RuntimeError>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "len", func: len },
    Builtin { name: "first", func: first },
    Builtin { name: "last", func: last },
    Builtin { name: "rest", func: rest },
    Builtin { name: "push", func: push },
    Builtin { name: "puts", func: puts },
    Builtin { name: "type", func: type_of },
];

fn expect_args(args: &[Object], want: usize) -> Result<(), RuntimeError> {
    if args.len() == want {
        Ok(())
    } else {
        Err(RuntimeError::WrongArgumentCount {
            want,
            got: args.len(),
        })
    }
}

fn expect_array<'a>(builtin: &'static str, arg: &'a Object) -> Result<&'a [Object], RuntimeError> {
    match arg {
        Object::Array(elements) => Ok(elements),
        other => Err(RuntimeError::ArgumentMustBe {
            builtin,
            expected: "ARRAY",
            got: other.type_name(),
        }),
    }
}

fn len(args: &[Object], _: &mut dyn Output) -> Result<Object, RuntimeError> {
    expect_args(args, 1)?;

    match &args[0] {
        Object::String(s) => Ok(Object::Integer(s.chars().count() as i64)),
        Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
        Object::Hash(pairs) => Ok(Object::Integer(pairs.len() as i64)),
        other => Err(RuntimeError::UnsupportedArgument {
            builtin: "len",
            got: other.type_name(),
        }),
    }
}

fn first(args: &[Object], _: &mut dyn Output) -> Result<Object, RuntimeError> {
    expect_args(args, 1)?;
    let elements = expect_array("first", &args[0])?;
    Ok(elements.first().cloned().unwrap_or(NULL))
}

fn last(args: &[Object], _: &mut dyn Output) -> Result<Object, RuntimeError> {
    expect_args(args, 1)?;
    let elements = expect_array("last", &args[0])?;
    Ok(elements.last().cloned().unwrap_or(NULL))
}

/// Everything but the first element, as a new array.
fn rest(args: &[Object], _: &mut dyn Output) -> Result<Object, RuntimeError> {
    expect_args(args, 1)?;
    let elements = expect_array("rest", &args[0])?;

    match elements.split_first() {
        Some((_, tail)) => Ok(Object::Array(tail.to_vec())),
        None => Ok(NULL),
    }
}

/// Returns a new array with the value appended; the argument is untouched.
fn push(args: &[Object], _: &mut dyn Output) -> Result<Object, RuntimeError> {
    expect_args(args, 2)?;
    let elements = expect_array("push", &args[0])?;

    let mut pushed = Vec::with_capacity(elements.len() + 1);
    pushed.extend_from_slice(elements);
    pushed.push(args[1].clone());
    Ok(Object::Array(pushed))
}

fn puts(args: &[Object], output: &mut dyn Output) -> Result<Object, RuntimeError> {
    for arg in args {
        output.write_line(&arg.to_string());
    }
    Ok(NULL)
}

fn type_of(args: &[Object], _: &mut dyn Output) -> Result<Object, RuntimeError> {
    expect_args(args, 1)?;
    Ok(Object::String(args[0].type_name().to_string()))
}
