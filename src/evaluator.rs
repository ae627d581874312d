use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{
    BlockStatement, Expression, InfixOperator, LogicalOperator, PrefixOperator, Program,
    Statement,
};
use crate::builtins::{Output, Stdout};
use crate::environment::{Env, Environment};
use crate::error::RuntimeError;
use crate::object::{Function, Object, NULL};

/// Why evaluation of a node stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
    /// A `return` unwinding to the nearest call boundary.
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Interrupt::Error(error)
    }
}

pub type EvalResult = Result<Object, Interrupt>;

/// Anything `Evaluator::eval` accepts.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(statement: &'a Statement) -> Self {
        Node::Statement(statement)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expression: &'a Expression) -> Self {
        Node::Expression(expression)
    }
}

/// Tree-walking evaluator. `O` receives the lines written by `puts`.
pub struct Evaluator<O: Output = Stdout> {
    output: O,
}

impl Evaluator<Stdout> {
    pub fn new() -> Self {
        Self { output: Stdout }
    }
}

impl Default for Evaluator<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Output> Evaluator<O> {
    pub fn with_output(output: O) -> Self {
        Self { output }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Reduces `node` to an object. Runtime errors come back as
    /// `Object::Error`; a top-level `return` yields its value.
    pub fn eval<'a>(&mut self, node: impl Into<Node<'a>>, env: &Env) -> Object {
        let result = match node.into() {
            Node::Program(program) => self.eval_statements(&program.statements, env),
            Node::Statement(statement) => self.eval_statement(statement, env),
            Node::Expression(expression) => self.eval_expression(expression, env),
        };

        match result {
            Ok(value) | Err(Interrupt::Return(value)) => value,
            Err(Interrupt::Error(error)) => {
                tracing::debug!(%error, "evaluation failed");
                Object::Error(error.to_string())
            }
        }
    }

    fn eval_statements(&mut self, statements: &[Statement], env: &Env) -> EvalResult {
        let mut result = NULL;

        for statement in statements {
            result = self.eval_statement(statement, env)?;
        }

        Ok(result)
    }

    fn eval_block(&mut self, block: &BlockStatement, env: &Env) -> EvalResult {
        self.eval_statements(&block.statements, env)
    }

    fn eval_statement(&mut self, statement: &Statement, env: &Env) -> EvalResult {
        match statement {
            Statement::Let { name, value } => {
                let value = self.eval_expression(value, env)?;
                env.borrow_mut().set(name.as_str(), value);
                Ok(NULL)
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => NULL,
                };
                Err(Interrupt::Return(value))
            }
            Statement::Expression(expr) => self.eval_expression(expr, env),
            Statement::Block(block) => self.eval_block(block, env),
        }
    }

    fn eval_expression(&mut self, expr: &Expression, env: &Env) -> EvalResult {
        match expr {
            Expression::Integer(value) => Ok(Object::Integer(*value)),
            Expression::Boolean(value) => Ok(Object::native_bool(*value)),
            Expression::String(value) => Ok(Object::String(value.clone())),
            Expression::Identifier(name) => {
                let value = env.borrow().get(name);
                value.ok_or_else(|| RuntimeError::IdentifierNotFound(name.clone()).into())
            }
            Expression::Prefix { operator, right } => {
                let right = self.eval_expression(right, env)?;
                Ok(eval_prefix(*operator, right)?)
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                Ok(eval_infix(*operator, left, right)?)
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.eval_expression(left, env)?.is_truthy();
                let value = match operator {
                    LogicalOperator::Or if left => true,
                    LogicalOperator::And if !left => false,
                    _ => self.eval_expression(right, env)?.is_truthy(),
                };
                Ok(Object::native_bool(value))
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env)?;
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(NULL)
                }
            }
            Expression::Function { parameters, body } => {
                Ok(Object::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    env: Rc::clone(env),
                })))
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, env)?;
                let arguments = self.eval_expressions(arguments, env)?;
                self.apply_function(function, arguments)
            }
            Expression::Array(elements) => Ok(Object::Array(self.eval_expressions(elements, env)?)),
            Expression::Index { left, index } => {
                let left = self.eval_expression(left, env)?;
                let index = self.eval_expression(index, env)?;
                Ok(eval_index(left, index)?)
            }
            Expression::Hash(pairs) => {
                let mut hash = HashMap::with_capacity(pairs.len());
                for (key_expr, value_expr) in pairs {
                    let key = self.eval_expression(key_expr, env)?;
                    let hash_key = key
                        .hash_key()
                        .ok_or(RuntimeError::UnusableAsHashKey(key.type_name()))?;
                    let value = self.eval_expression(value_expr, env)?;
                    hash.insert(hash_key, value);
                }
                Ok(Object::Hash(hash))
            }
        }
    }

    /// Left to right, stopping at the first error.
    fn eval_expressions(
        &mut self,
        expressions: &[Expression],
        env: &Env,
    ) -> Result<Vec<Object>, Interrupt> {
        expressions
            .iter()
            .map(|expr| self.eval_expression(expr, env))
            .collect()
    }

    #[tracing::instrument(level = "trace", skip_all, fields(callee = function.type_name(), args = arguments.len()))]
    fn apply_function(&mut self, function: Object, arguments: Vec<Object>) -> EvalResult {
        match function {
            Object::Function(function) => {
                if arguments.len() != function.parameters.len() {
                    return Err(RuntimeError::WrongArgumentCount {
                        want: function.parameters.len(),
                        got: arguments.len(),
                    }
                    .into());
                }

                // Lexical scoping: the new frame hangs off the defining
                // environment, not the caller's.
                let frame = Environment::new_enclosed(&function.env);
                {
                    let mut frame = frame.borrow_mut();
                    for (parameter, argument) in function.parameters.iter().zip(arguments) {
                        frame.set(parameter.as_str(), argument);
                    }
                }

                match self.eval_block(&function.body, &frame) {
                    Err(Interrupt::Return(value)) => Ok(value),
                    other => other,
                }
            }
            Object::Builtin(builtin) => Ok((builtin.func)(&arguments, &mut self.output)?),
            other => Err(RuntimeError::NotAFunction(other.type_name()).into()),
        }
    }
}

fn eval_prefix(operator: PrefixOperator, right: Object) -> Result<Object, RuntimeError> {
    match operator {
        PrefixOperator::Not => Ok(Object::native_bool(!right.is_truthy())),
        PrefixOperator::Negate => match right {
            Object::Integer(value) => value
                .checked_neg()
                .map(Object::Integer)
                .ok_or(RuntimeError::NegationOverflow(value)),
            other => Err(RuntimeError::UnknownPrefixOperator {
                operator,
                operand: other.type_name(),
            }),
        },
    }
}

fn eval_infix(operator: InfixOperator, left: Object, right: Object) -> Result<Object, RuntimeError> {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Object::Boolean(l), Object::Boolean(r)) => match operator {
            InfixOperator::Equal => Ok(Object::native_bool(l == r)),
            InfixOperator::NotEqual => Ok(Object::native_bool(l != r)),
            _ => Err(unknown_infix(operator, &left, &right)),
        },
        (Object::String(l), Object::String(r)) => match operator {
            InfixOperator::Add => Ok(Object::String(format!("{}{}", l, r))),
            _ => Err(unknown_infix(operator, &left, &right)),
        },
        _ if left.type_name() != right.type_name() => Err(RuntimeError::TypeMismatch {
            left: left.type_name(),
            operator,
            right: right.type_name(),
        }),
        _ => Err(unknown_infix(operator, &left, &right)),
    }
}

fn eval_integer_infix(operator: InfixOperator, l: i64, r: i64) -> Result<Object, RuntimeError> {
    let overflow = || RuntimeError::IntegerOverflow {
        left: l,
        operator,
        right: r,
    };

    match operator {
        InfixOperator::Add => l.checked_add(r).map(Object::Integer).ok_or_else(overflow),
        InfixOperator::Subtract => l.checked_sub(r).map(Object::Integer).ok_or_else(overflow),
        InfixOperator::Multiply => l.checked_mul(r).map(Object::Integer).ok_or_else(overflow),
        InfixOperator::Divide => {
            if r == 0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                l.checked_div(r).map(Object::Integer).ok_or_else(overflow)
            }
        }
        InfixOperator::Equal => Ok(Object::native_bool(l == r)),
        InfixOperator::NotEqual => Ok(Object::native_bool(l != r)),
        InfixOperator::Less => Ok(Object::native_bool(l < r)),
        InfixOperator::LessEqual => Ok(Object::native_bool(l <= r)),
        InfixOperator::Greater => Ok(Object::native_bool(l > r)),
        InfixOperator::GreaterEqual => Ok(Object::native_bool(l >= r)),
    }
}

fn unknown_infix(operator: InfixOperator, left: &Object, right: &Object) -> RuntimeError {
    RuntimeError::UnknownInfixOperator {
        left: left.type_name(),
        operator,
        right: right.type_name(),
    }
}

fn eval_index(left: Object, index: Object) -> Result<Object, RuntimeError> {
    match (&left, &index) {
        // Out of range, negative included, is null rather than an error
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(NULL)),
        (Object::Hash(pairs), key) => {
            let key = key
                .hash_key()
                .ok_or(RuntimeError::UnusableAsHashKey(key.type_name()))?;
            Ok(pairs.get(&key).cloned().unwrap_or(NULL))
        }
        _ => Err(RuntimeError::IndexNotSupported(left.type_name())),
    }
}
