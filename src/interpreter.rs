use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info, trace};
use thiserror::Error;

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::callable::{LoxFunction, NativeFunction};
use crate::class::LoxClass;
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Deepest chain of active Lox calls before a runtime "Stack overflow.".
pub const MAX_CALL_DEPTH: usize = 1000;

/// Host stack kept free before each call; below it the stack is grown.
const RED_ZONE: usize = 256 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Why evaluation stopped early: a genuine error, or a `return` unwinding
/// to the function call that will consume it.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error(transparent)]
    Runtime(#[from] LoxError),

    #[error("Return signal with value: {0}")]
    ReturnSignal(Value),
}

/// Convenient alias for interpreter results.
pub type IResult<T> = std::result::Result<T, InterpretError>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Resolved scope distance per expression; absent means global.
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
    /// Lox calls currently on the stack.
    call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter printing to stdout, with native functions such
    /// as `clock` defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an interpreter whose `print` statements write to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let millis: i64 = Utc::now().timestamp_millis();
                    Value::Number(millis as f64 / 1000.0)
                },
            })),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            call_depth: 0,
            out,
        }
    }

    /// Called by the resolver: `id` refers to a binding `depth` scopes out.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        trace!("Noting {:?} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error aborts the rest.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(InterpretError::Runtime(e)) => {
                    // A failed call may leave us in its scope.
                    self.environment = Rc::clone(&self.globals);
                    return Err(e);
                }
                // Rejected by the resolver; ignore if it slips through.
                Err(InterpretError::ReturnSignal(_)) => {}
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Evaluates a standalone expression against the global scope.
    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value> {
        match self.evaluate(expr) {
            Ok(value) => Ok(value),
            Err(InterpretError::Runtime(e)) => Err(e),
            Err(InterpretError::ReturnSignal(value)) => Ok(value),
        }
    }

    // ───────────────────────────── statements ───────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> IResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value).map_err(LoxError::from)?;
                debug!("Printed value: {}", value);
                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(())
            }

            Stmt::Block(statements) => {
                let environment: EnvRef =
                    Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();
                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(function));
                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(InterpretError::ReturnSignal(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Runs `statements` in `environment`, restoring the current scope
    /// afterwards whether they finish, fail or `return`.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<()> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);

        let result: IResult<()> = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;
        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> IResult<()> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass: Option<LoxClass> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let at: &Token = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(LoxError::runtime(at, "Superclass must be a class.").into());
                }
            },
            None => None,
        };

        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        // Methods of a subclass close over an extra scope holding `super`.
        let method_env: EnvRef = match &superclass {
            Some(superclass) => {
                let mut environment = Environment::with_enclosing(Rc::clone(&self.environment));
                environment.define("super", Value::Class(superclass.clone()));
                environment.into_ref()
            }
            None => Rc::clone(&self.environment),
        };

        let methods: HashMap<String, LoxFunction> = methods
            .iter()
            .map(|method| {
                let function = LoxFunction::new(
                    Rc::clone(method),
                    Rc::clone(&method_env),
                    method.name.lexeme == "init",
                );
                (method.name.lexeme.clone(), function)
            })
            .collect();

        let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(class))?;

        info!("Class '{}' defined", name.lexeme);
        Ok(())
    }

    // ──────────────────────────── expressions ───────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuit: bool = if operator.token_type == TokenType::OR {
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

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        if !Environment::assign_at(&self.environment, distance, &name.lexeme, value.clone()) {
                            return Err(undefined_variable(name).into());
                        }
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                debug!("Assigned {} to '{}'", value, name.lexeme);
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Ok(instance.get(name)?),
                _ => Err(LoxError::runtime(name, "Only instances have properties.").into()),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields.").into());
                };

                let value: Value = self.evaluate(value)?;
                instance.set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> IResult<Value> {
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.").into()),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(LoxError::runtime(operator, "Invalid unary operator.").into()),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> IResult<Value> {
        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        trace!("Binary '{}' on {} and {}", operator.lexeme, left, right);

        let value: Value = match operator.token_type {
            TokenType::PLUS => add(operator, &left, &right)?,

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Number(a - b)
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Number(a * b)
            }

            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Number(a / b)
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a > b)
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a >= b)
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a < b)
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a <= b)
            }

            TokenType::EQUAL_EQUAL => Value::Bool(left == right),

            TokenType::BANG_EQUAL => Value::Bool(left != right),

            _ => return Err(LoxError::runtime(operator, "Invalid binary operator.").into()),
        };

        Ok(value)
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> IResult<Value> {
        let callee: Value = self.evaluate(callee)?;

        let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        let Some(callable) = callee.as_callable() else {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Can only call functions and classes, not {}.",
                    callee.type_name()
                ),
            )
            .into());
        };

        if values.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    values.len()
                ),
            )
            .into());
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(paren, "Stack overflow.").into());
        }

        debug!("Calling {} with {} argument(s)", callee, values.len());

        self.call_depth += 1;
        let result: IResult<Value> =
            stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || callable.call(self, values));
        self.call_depth -= 1;

        result
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let distance: usize = *self
            .locals
            .get(&id)
            .ok_or_else(|| LoxError::runtime(keyword, "Can't use 'super' outside of a class."))?;

        let superclass: LoxClass = match Environment::get_at(&self.environment, distance, "super") {
            Some(Value::Class(class)) => class,
            _ => return Err(LoxError::runtime(keyword, "Superclass must be a class.").into()),
        };

        // `this` always lives in the scope just inside the one holding `super`.
        let object = match distance
            .checked_sub(1)
            .and_then(|d| Environment::get_at(&self.environment, d, "this"))
        {
            Some(Value::Instance(instance)) => instance,
            _ => {
                return Err(
                    LoxError::runtime(keyword, "Can't use 'super' outside of a method.").into(),
                )
            }
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(found.bind(&object))),
            None => Err(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )
            .into()),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme)
                .ok_or_else(|| undefined_variable(name).into()),
            None => Ok(self.globals.borrow().get(name)?),
        }
    }
}

fn undefined_variable(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

/// Both operands as numbers, accepting numeric strings.
fn number_operands(operator: &Token, left: &Value, right: &Value) -> IResult<(f64, f64)> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(LoxError::runtime(operator, "Operand must be numbers.").into()),
    }
}

/// `+`: numbers add; two strings add as numbers when both parse and
/// concatenate otherwise; a number and a string add numerically.
fn add(operator: &Token, left: &Value, right: &Value) -> IResult<Value> {
    let mismatch = || -> InterpretError {
        LoxError::runtime(operator, "Operands must be two numbers or two strings.").into()
    };

    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

        (Value::String(a), Value::String(b)) => match (left.as_number(), right.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Number(x + y)),
            _ => Ok(Value::String(format!("{}{}", a, b))),
        },

        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            match (left.as_number(), right.as_number()) {
                (Some(x), Some(y)) => Ok(Value::Number(x + y)),
                _ => Err(mismatch()),
            }
        }

        _ => Err(mismatch()),
    }
}
