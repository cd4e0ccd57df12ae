//! A concrete state for execution over Fixpoint IL.

use crate::analysis::{ConstantValue, Environment};
use crate::executor::eval;
use crate::il;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// A concrete value held by a variable or a storage location.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Value {
    Constant(il::Constant),
    /// A reference to the storage location with this name.
    Reference(String),
}

impl From<il::Constant> for Value {
    fn from(constant: il::Constant) -> Value {
        Value::Constant(constant)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Constant(ref constant) => write!(f, "{}", constant),
            Value::Reference(ref location) => write!(f, "&{}", location),
        }
    }
}

/// A concrete `State`.
///
/// Every variable remembers when it was last written, which is how a phi
/// picks the argument that arrived along the edge just taken.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct State {
    variables: BTreeMap<String, (Value, usize)>,
    clock: usize,
    memory: BTreeMap<String, Option<Value>>,
    allocations: usize,
    input: VecDeque<il::Constant>,
}

impl State {
    /// Create a new, empty `State`.
    pub fn new() -> State {
        State::default()
    }

    /// Create a `State` with every constant in `environment` bound.
    ///
    /// Names which are not constants are left unbound.
    pub fn from_environment(environment: &Environment<ConstantValue>) -> State {
        let mut state = State::new();
        for (name, value) in environment {
            if let ConstantValue::Constant(constant) = *value {
                state.set_variable(name.clone(), constant.into());
            }
        }
        state
    }

    /// Set the value of a variable.
    pub fn set_variable<S: Into<String>>(&mut self, name: S, value: Value) {
        self.clock += 1;
        self.variables.insert(name.into(), (value, self.clock));
    }

    /// Get the value of a variable.
    pub fn variable(&self, name: &str) -> Result<&Value, Error> {
        self.variables
            .get(name)
            .map(|(value, _)| value)
            .ok_or_else(|| Error::Lookup {
                name: name.to_string(),
            })
    }

    /// Get the value of a variable which must hold a constant.
    pub fn constant(&self, name: &str) -> Result<il::Constant, Error> {
        match *self.variable(name)? {
            Value::Constant(constant) => Ok(constant),
            Value::Reference(_) => Err(Error::Custom(format!("`{}` holds a reference", name))),
        }
    }

    /// Get the storage location a variable which must hold a reference points
    /// to.
    pub fn reference(&self, name: &str) -> Result<&str, Error> {
        match *self.variable(name)? {
            Value::Reference(ref location) => Ok(location),
            Value::Constant(_) => Err(Error::Custom(format!("`{}` is not a reference", name))),
        }
    }

    /// Every variable, with its value.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables
            .iter()
            .map(|(name, (value, _))| (name.as_str(), value))
    }

    /// Of the given variables, the value of the one written most recently.
    pub fn newest(&self, names: &[String]) -> Result<&Value, Error> {
        names
            .iter()
            .filter_map(|name| self.variables.get(name))
            .max_by_key(|(_, written)| *written)
            .map(|(value, _)| value)
            .ok_or_else(|| Error::Lookup {
                name: names.join(", "),
            })
    }

    /// Create a new storage location for the `Alloca` at `site`, and return
    /// its name.
    ///
    /// Each execution of the same alloca creates a distinct location, named
    /// `ref_<site>_<n>`.
    pub fn allocate(&mut self, site: usize) -> String {
        let location = format!("{}_{}", il::location_name(site), self.allocations);
        self.allocations += 1;
        self.memory.insert(location.clone(), None);
        location
    }

    /// Get the value stored at a location.
    pub fn load(&self, location: &str) -> Result<&Value, Error> {
        match self.memory.get(location) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(Error::Custom(format!("`{}` is uninitialized", location))),
            None => Err(Error::Lookup {
                name: location.to_string(),
            }),
        }
    }

    /// Store a value at a location.
    pub fn store(&mut self, location: &str, value: Value) -> Result<(), Error> {
        match self.memory.get_mut(location) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(Error::Lookup {
                name: location.to_string(),
            }),
        }
    }

    /// Queue a value for `Read` to return.
    pub fn push_input(&mut self, constant: il::Constant) {
        self.input.push_back(constant);
    }

    /// Take the next queued input value.
    pub fn read_input(&mut self) -> Result<il::Constant, Error> {
        self.input
            .pop_front()
            .ok_or_else(|| Error::Custom("No input left to read".to_string()))
    }

    /// Execute an `Operation` over this state.
    ///
    /// Branches do not change the state. Choosing the next instruction is up to
    /// the `Driver`.
    pub fn execute(&mut self, instruction: &il::Instruction) -> Result<(), Error> {
        match *instruction.operation() {
            il::Operation::Binary {
                op,
                ref dst,
                ref lhs,
                ref rhs,
            } => {
                let result = eval::binary(op, self.constant(lhs)?, self.constant(rhs)?)?;
                self.set_variable(dst.clone(), result.into());
            }
            il::Operation::Branch { .. } => {}
            il::Operation::Move { ref dst, ref src } => {
                let value = self.variable(src)?.clone();
                self.set_variable(dst.clone(), value);
            }
            il::Operation::Alloca { ref dst } => {
                let location = self.allocate(instruction.id());
                self.set_variable(dst.clone(), Value::Reference(location));
            }
            il::Operation::Load { ref dst, ref src } => {
                let value = self.load(self.reference(src)?)?.clone();
                self.set_variable(dst.clone(), value);
            }
            il::Operation::Store { ref dst, ref src } => {
                let location = self.reference(dst)?.to_string();
                let value = self.variable(src)?.clone();
                self.store(&location, value)?;
            }
            il::Operation::Phi { ref dst, ref args } => {
                let value = self.newest(args)?.clone();
                self.set_variable(dst.clone(), value);
            }
            il::Operation::Read { ref dst } => {
                let constant = self.read_input()?;
                self.set_variable(dst.clone(), constant.into());
            }
        }
        Ok(())
    }
}
