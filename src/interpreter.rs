//! Direct AST evaluation.
//!
//! `evaluate` and `execute` are mutually recursive walks that return an
//! [`Exec`] result. The error side, [`Unwind`], multiplexes the three ways a
//! walk can stop early (a runtime error, a `return`, a failed write to the
//! output sink) and every caller propagates it with `?` unless it is the one
//! place entitled to consume it: a function call consumes `Return`,
//! `interpret` consumes the rest.

use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::callable::{natives, Callable, LoxFunction};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, RuntimeError};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Why an evaluation stopped before producing a normal result.
#[derive(Debug, Error)]
pub enum Unwind {
    #[error(transparent)]
    Error(#[from] RuntimeError),

    /// A `return` statement on its way to the enclosing call.
    #[error("return signal with value: {0}")]
    Return(Value),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenient alias for interpreter results.
pub type Exec<T> = Result<T, Unwind>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an interpreter printing to `out`, with natives bound in the
    /// global scope.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_ref();

        for native in natives() {
            debug!("Defining native function '{}'", native.name());
            let name = native.name().to_string();
            globals
                .borrow_mut()
                .define(&name, Value::Callable(Rc::new(native)));
        }

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Records that the variable node `id` binds `depth` scopes out.
    /// Called by the resolver.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("Noting local {:?} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// The binding distance recorded for `id`; `None` means global.
    pub fn depth_of(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Runs a program. The first runtime error stops it.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), LoxError> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(Unwind::Error(e)) => return Err(LoxError::Runtime(e)),
                Err(Unwind::Io(e)) => return Err(LoxError::Io(e)),
                // The resolver rejects top-level `return`.
                Err(Unwind::Return(_)) => break,
            }
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Evaluates a standalone expression (no resolution needed for globals).
    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, LoxError> {
        match self.evaluate(expr) {
            Ok(value) => Ok(value),
            Err(Unwind::Error(e)) => Err(LoxError::Runtime(e)),
            Err(Unwind::Io(e)) => Err(LoxError::Io(e)),
            Err(Unwind::Return(value)) => Ok(value),
        }
    }

    // ───────────────────────────── statements ──────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> Exec<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, scope.into_ref())?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment));
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Callable(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Err(Unwind::Return(value));
            }
        }

        Ok(())
    }

    /// Runs `statements` with `environment` as the current scope, restoring
    /// the caller's scope on every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Exec<()> {
        let previous = mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;
        result
    }

    // ───────────────────────────── expressions ─────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(operator, "Operand must be a number.").into()),
                    },
                    _ => Err(RuntimeError::new(operator, "Invalid unary operator.").into()),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                Ok(binary(operator, left, right)?)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => Ok(self.look_up_variable(*id, name)?),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call(callee, paren, args)
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn call(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> Exec<Value> {
        let Value::Callable(function) = callee else {
            return Err(RuntimeError::new(paren, "Can only call functions and classes.").into());
        };

        if args.len() != function.arity() {
            return Err(RuntimeError::new(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    function.arity(),
                    args.len()
                ),
            )
            .into());
        }

        debug!("Calling '{}' with {} argument(s)", function.name(), args.len());

        function.call(self, args)
    }
}

/// Applies a strict binary operator to two evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    use TokenType as T;

    let numbers = |op: fn(f64, f64) -> Value| match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Ok(op(*a, *b)),
        _ => Err(RuntimeError::new(operator, "Operand must be a numbers.")),
    };

    match operator.token_type {
        T::PLUS => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => Err(RuntimeError::new(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },
        T::MINUS => numbers(|a, b| Value::Number(a - b)),
        T::STAR => numbers(|a, b| Value::Number(a * b)),
        T::SLASH => numbers(|a, b| Value::Number(a / b)),
        T::GREATER => numbers(|a, b| Value::Bool(a > b)),
        T::GREATER_EQUAL => numbers(|a, b| Value::Bool(a >= b)),
        T::LESS => numbers(|a, b| Value::Bool(a < b)),
        T::LESS_EQUAL => numbers(|a, b| Value::Bool(a <= b)),
        T::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
        T::BANG_EQUAL => Ok(Value::Bool(left != right)),
        _ => Err(RuntimeError::new(operator, "Invalid binary operator.")),
    }
}
