//! A `Constant` holds a single concrete value.
//!
//! The IL only knows exact integers and booleans. Booleans take part in
//! arithmetic as 0 and 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant value for the IL
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum Constant {
    Bool(bool),
    Int(i64),
}

impl Constant {
    /// The integer value of this `Constant`, with booleans as 0 or 1.
    pub fn value(&self) -> i64 {
        match *self {
            Constant::Bool(b) => b as i64,
            Constant::Int(i) => i,
        }
    }

    /// The truth value of this `Constant`. Any non-zero integer is true.
    pub fn is_true(&self) -> bool {
        self.value() != 0
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Constant {
        Constant::Int(value)
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Constant {
        Constant::Bool(value)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int(i) => write!(f, "{}", i),
        }
    }
}
