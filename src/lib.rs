//! A tree-walking interpreter for Lox.
//!
//! Source text flows through four phases, each finishing before the next
//! starts:
//!
//! ```text
//! source ─▶ Scanner ─▶ tokens ─▶ Parser ─▶ AST ─▶ Resolver ─▶ Interpreter
//! ```
//!
//! The resolver annotates every variable reference with its binding distance;
//! the interpreter uses that distance to reach the right scope in its chain of
//! [`environment::Environment`]s. [`lox::Lox`] ties the phases together.

pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

pub use error::{Diagnostics, LoxError, Result, RuntimeError};
pub use lox::{Lox, Outcome};
