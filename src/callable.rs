//! Callable values: user functions with their closures, and host natives.

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::{EnvRef, Environment};
use crate::interpreter::{Exec, Interpreter, Unwind};
use crate::value::Value;

/// Anything that can appear to the left of `(...)`.
pub trait Callable: fmt::Debug + fmt::Display {
    fn name(&self) -> &str;

    /// Exact number of arguments the callable accepts.
    fn arity(&self) -> usize;

    /// Runs the callable. The caller has already checked `arity`.
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Exec<Value>;
}

/// A function declared in Lox source, paired with the scope it was declared in.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef) -> Self {
        Self {
            declaration,
            closure,
        }
    }
}

impl Callable for LoxFunction {
    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Exec<Value> {
        // Parameters live in a scope chained to the closure, not the caller.
        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            frame.define(&param.lexeme, arg);
        }

        match interpreter.execute_block(&self.declaration.body, frame.into_ref()) {
            Ok(()) => Ok(Value::Nil),
            Err(Unwind::Return(value)) => {
                debug!("Function '{}' returned {}", self.name(), value);
                Ok(value)
            }
            Err(other) => Err(other),
        }
    }
}

// The closure may contain this very function, so Debug stays shallow.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.declaration.name.lexeme)
            .field("arity", &self.declaration.params.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A function implemented by the host.
#[derive(Debug, Clone)]
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    func: fn(&[Value]) -> Value,
}

impl NativeFunction {
    pub fn new(name: &'static str, arity: usize, func: fn(&[Value]) -> Value) -> Self {
        Self { name, arity, func }
    }

    /// `clock()`: wall‑clock seconds since the Unix epoch.
    pub fn clock() -> Self {
        Self::new("clock", 0, |_| {
            let micros = Utc::now().timestamp_micros();
            Value::Number(micros as f64 / 1_000_000.0)
        })
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, _interpreter: &mut Interpreter, arguments: Vec<Value>) -> Exec<Value> {
        debug!("Calling native function '{}'", self.name);
        Ok((self.func)(&arguments))
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

/// Every native bound into a fresh global scope.
pub fn natives() -> Vec<NativeFunction> {
    vec![NativeFunction::clock()]
}
