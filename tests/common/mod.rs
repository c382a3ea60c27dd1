#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use loxwalk::{Lox, Outcome};

/// Output sink whose contents stay readable after the interpreter takes it.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("interpreter output is UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session whose `print` output is captured.
pub fn session() -> (Lox, SharedBuf) {
    let buf = SharedBuf::default();
    (Lox::with_output(Box::new(buf.clone())), buf)
}

/// Runs `source` in a fresh session, returning the outcome and stdout.
pub fn run(source: &str) -> (Outcome, String) {
    let (mut lox, buf) = session();
    let outcome = lox.run(source);
    (outcome, buf.contents())
}

/// Runs `source`, asserting success, and returns the printed lines.
pub fn run_ok(source: &str) -> Vec<String> {
    let (outcome, out) = run(source);
    assert!(
        outcome.is_success(),
        "expected success, got {:?}\noutput so far:\n{}",
        outcome,
        out
    );
    out.lines().map(str::to_string).collect()
}

/// Renders every error of a failed run, one per entry.
pub fn error_messages(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Completed => Vec::new(),
        Outcome::StaticErrors(diagnostics) => diagnostics.iter().map(|e| e.to_string()).collect(),
        Outcome::RuntimeError(e) => vec![e.to_string()],
    }
}
