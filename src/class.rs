use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, LoxFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::{IResult, Interpreter};
use crate::token::Token;
use crate::value::Value;

struct ClassData {
    name: String,
    superclass: Option<LoxClass>,
    methods: HashMap<String, LoxFunction>,
}

/// A class value.  Cheap to clone; clones share the same class.
#[derive(Clone)]
pub struct LoxClass(Rc<ClassData>);

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<LoxClass>,
        methods: HashMap<String, LoxFunction>,
    ) -> Self {
        LoxClass(Rc::new(ClassData {
            name,
            superclass,
            methods,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Look `name` up on this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<LoxFunction> {
        if let Some(method) = self.0.methods.get(name) {
            return Some(method.clone());
        }

        self.0
            .superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    pub fn ptr_eq(&self, other: &LoxClass) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Callable for LoxClass {
    /// A class takes whatever its `init` takes, or nothing.
    fn arity(&self) -> usize {
        self.find_method("init")
            .map_or(0, |initializer| initializer.arity())
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> IResult<Value> {
        debug!("Constructing instance of '{}'", self.name());

        let instance = LoxInstance::new(self.clone());

        if let Some(initializer) = self.find_method("init") {
            initializer.bind(&instance).call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.0.name)
    }
}

struct InstanceData {
    class: LoxClass,
    fields: HashMap<String, Value>,
}

/// An object created by calling a class.  Fields spring into existence on
/// first assignment.
#[derive(Clone)]
pub struct LoxInstance(Rc<RefCell<InstanceData>>);

impl LoxInstance {
    pub fn new(class: LoxClass) -> Self {
        LoxInstance(Rc::new(RefCell::new(InstanceData {
            class,
            fields: HashMap::new(),
        })))
    }

    pub fn class(&self) -> LoxClass {
        self.0.borrow().class.clone()
    }

    /// Fields shadow methods; a method comes back bound to this instance.
    pub fn get(&self, name: &Token) -> Result<Value> {
        let field: Option<Value> = self.0.borrow().fields.get(&name.lexeme).cloned();

        if let Some(value) = field {
            return Ok(value);
        }

        match self.class().find_method(&name.lexeme) {
            Some(method) => Ok(Value::Function(method.bind(self))),
            None => Err(LoxError::runtime(
                name,
                format!("Undefined property '{}'.", name.lexeme),
            )),
        }
    }

    pub fn set(&self, name: &Token, value: Value) {
        self.0
            .borrow_mut()
            .fields
            .insert(name.lexeme.clone(), value);
    }

    pub fn ptr_eq(&self, other: &LoxInstance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance of {}>", self.0.borrow().class.name())
    }
}
