#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::error::LoxError;
use rox::lox::Lox;

/// Cloneable in‑memory sink so a test can read back what `print` wrote.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
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

/// A session plus the buffer its output lands in.
pub fn session() -> (Lox, SharedBuf) {
    let buf = SharedBuf::default();
    let lox = Lox::with_output(Box::new(buf.clone()));
    (lox, buf)
}

/// Run `source` in a fresh session, returning printed output and the outcome.
pub fn run(source: &str) -> (String, Result<(), LoxError>) {
    let (mut lox, buf) = session();
    let result = lox.run(source);
    (buf.contents(), result)
}

/// Run `source`, failing the test on any error.
pub fn run_ok(source: &str) -> String {
    let (out, result) = run(source);

    if let Err(e) = result {
        panic!("program failed: {}\noutput so far:\n{}", e, out);
    }

    out
}

/// Run `source`, failing the test unless it errors.
pub fn run_err(source: &str) -> (String, LoxError) {
    match run(source) {
        (out, Err(e)) => (out, e),
        (out, Ok(())) => panic!("program unexpectedly succeeded with output:\n{}", out),
    }
}
