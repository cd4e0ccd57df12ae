use crate::analysis::ConstantValue;
use crate::il;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// A mapping from names to abstract values.
///
/// Names are the `name()` of equations: variables, or generated names such as
/// `IN_3`. An environment is filled in by a solver, and handed back once a
/// fixed point is reached.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Environment<V> {
    values: BTreeMap<String, V>,
}

impl<V> Environment<V> {
    /// Create an empty `Environment`.
    pub fn new() -> Environment<V> {
        Environment {
            values: BTreeMap::new(),
        }
    }

    /// Get the value bound to `name`, failing with `Error::Lookup` if there is
    /// none.
    pub fn get(&self, name: &str) -> Result<&V, Error> {
        self.values.get(name).ok_or_else(|| Error::Lookup {
            name: name.to_string(),
        })
    }

    /// Get the value bound to `name`, if any.
    pub fn value(&self, name: &str) -> Option<&V> {
        self.values.get(name)
    }

    /// Bind `name` to `value`, returning the previous value.
    pub fn set<S: Into<String>>(&mut self, name: S, value: V) -> Option<V> {
        self.values.insert(name.into(), value)
    }

    /// Bind `name` to `value` only if `name` is not already bound.
    pub fn seed<S: Into<String>>(&mut self, name: S, value: V) {
        self.values.entry(name.into()).or_insert(value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, V> {
        self.values.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|name| name.as_str())
    }

    pub fn into_inner(self) -> BTreeMap<String, V> {
        self.values
    }
}

impl Environment<ConstantValue> {
    /// Parse an initial environment of literal values, such as
    /// `{"zero": 0, "one": 1, "p": true}`.
    pub fn from_json(json: &str) -> Result<Environment<ConstantValue>, Error> {
        let constants: BTreeMap<String, il::Constant> = serde_json::from_str(json)?;
        Ok(constants
            .into_iter()
            .map(|(name, constant)| (name, ConstantValue::Constant(constant)))
            .collect())
    }
}

impl<V> Default for Environment<V> {
    fn default() -> Environment<V> {
        Environment::new()
    }
}

impl<S: Into<String>, V> FromIterator<(S, V)> for Environment<V> {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Environment<V> {
        Environment {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

impl<'e, V> IntoIterator for &'e Environment<V> {
    type Item = (&'e String, &'e V);
    type IntoIter = btree_map::Iter<'e, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<V: fmt::Display> fmt::Display for Environment<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, value) in &self.values {
            writeln!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}
