//! Session driver: runs source text through scan → parse → resolve →
//! interpret, stopping before execution if any static error was found.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, info};

use crate::error::{Diagnostics, LoxError, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Exit status for static (scan/parse/resolve) errors.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Exit status for a runtime error.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Exit status for a malformed command line.
pub const EXIT_USAGE: i32 = 64;

/// Exit status when a script cannot be read or output cannot be written.
pub const EXIT_IO_ERROR: i32 = 74;

/// How a single `run` ended.
#[derive(Debug)]
pub enum Outcome {
    Completed,

    /// Execution never started; every static error is listed.
    StaticErrors(Diagnostics),

    /// Execution started and was aborted, by a runtime error or by a
    /// failed write of `print` output.
    RuntimeError(LoxError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// Conventional process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::StaticErrors(_) => EXIT_STATIC_ERROR,
            Outcome::RuntimeError(LoxError::Io(_)) => EXIT_IO_ERROR,
            Outcome::RuntimeError(_) => EXIT_RUNTIME_ERROR,
        }
    }
}

/// A Lox session. Globals (and the resolver's binding table) persist between
/// calls to [`Lox::run`], which is what the REPL relies on.
pub struct Lox {
    interpreter: Interpreter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// Session printing to stdout.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    /// Session printing to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    /// Reads and runs a script file.
    pub fn run_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Outcome> {
        let path = path.as_ref();
        info!("Reading file: {:?}", path);

        let source = fs::read_to_string(path)?;

        info!("Read {} bytes from {:?}", source.len(), path);
        Ok(self.run(&source))
    }

    /// Runs one source buffer (a whole file or one REPL line).
    pub fn run(&mut self, source: &str) -> Outcome {
        let mut diagnostics = Diagnostics::new();

        let scanned = Scanner::new(source).scan_tokens();
        diagnostics.extend(scanned.errors);

        let parsed = Parser::new(scanned.tokens).parse();
        diagnostics.extend(parsed.errors);

        if !diagnostics.is_empty() {
            debug!("Skipping resolution: {} static error(s)", diagnostics.len());
            return Outcome::StaticErrors(diagnostics);
        }

        let statements = parsed.statements;
        diagnostics.extend(Resolver::new(&mut self.interpreter).resolve(&statements));

        if !diagnostics.is_empty() {
            debug!("Skipping execution: {} binding error(s)", diagnostics.len());
            return Outcome::StaticErrors(diagnostics);
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Outcome::Completed,
            Err(e) => Outcome::RuntimeError(e),
        }
    }
}
