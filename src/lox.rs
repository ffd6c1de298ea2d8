//! The `Lox` session: runs source text through scan → parse → resolve →
//! interpret against one persistent interpreter.
//!
//! A script run uses one session for the whole file; the REPL uses one
//! session for every line so globals, closures and classes carry over.

use std::io::Write;

use log::{debug, info};

use crate::ast::Expr;
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::value::Value;

pub struct Lox {
    interpreter: Interpreter,
    /// First expression id for the next parse; ids must stay unique for the
    /// whole session because the resolution table outlives each run.
    next_id: usize,
    had_error: bool,
    had_runtime_error: bool,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// A session printing to stdout.
    pub fn new() -> Self {
        Self::from_interpreter(Interpreter::new())
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::from_interpreter(Interpreter::with_output(out))
    }

    fn from_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_id: 0,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Static errors (scan, parse, resolve) seen since the last reset.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clear both error flags; the REPL does this after every line.
    pub fn reset_errors(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    /// Run a whole program.  Nothing executes if any static error is found;
    /// a runtime error stops execution at the failing statement.
    pub fn run(&mut self, source: &str) -> Result<()> {
        info!("Running {} byte(s) of source", source.len());

        let (tokens, mut errors) = scan_tokens(source);

        let mut parser = Parser::with_first_id(&tokens, self.next_id);
        let parsed = parser.parse();
        self.next_id = parser.next_id();

        let statements = match parsed {
            Ok(statements) => statements,
            Err(parse_errors) => {
                errors.extend(parse_errors);
                Vec::new()
            }
        };

        if !errors.is_empty() {
            debug!("Refusing to run: {} static error(s)", errors.len());
            self.had_error = true;
            return Err(LoxError::Static(errors));
        }

        let resolved = Resolver::new(&mut self.interpreter).resolve(&statements);

        if let Err(resolve_errors) = resolved {
            debug!("Refusing to run: {} resolve error(s)", resolve_errors.len());
            self.had_error = true;
            return Err(LoxError::Static(resolve_errors));
        }

        let outcome = self.interpreter.interpret(&statements);

        if outcome.is_err() {
            self.had_runtime_error = true;
        }

        outcome
    }

    /// Parse `source` as a single expression.
    pub fn parse_expression(source: &str) -> Result<Expr> {
        let (tokens, errors) = scan_tokens(source);

        if !errors.is_empty() {
            return Err(LoxError::Static(errors));
        }

        Parser::new(&tokens).parse_expression()
    }

    /// Parse and evaluate `source` as a single expression.
    pub fn evaluate(&mut self, source: &str) -> Result<Value> {
        let (tokens, errors) = scan_tokens(source);

        if !errors.is_empty() {
            self.had_error = true;
            return Err(LoxError::Static(errors));
        }

        let mut parser = Parser::with_first_id(&tokens, self.next_id);
        let parsed = parser.parse_expression();
        self.next_id = parser.next_id();

        let expr = parsed.inspect_err(|_| {
            self.had_error = true;
        })?;

        self.interpreter.evaluate_expression(&expr).inspect_err(|_| {
            self.had_runtime_error = true;
        })
    }
}
