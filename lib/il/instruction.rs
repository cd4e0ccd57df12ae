use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The outgoing edges of an instruction.
///
/// Branches always have two slots, ordered `[true, false]`, which may be unset
/// until the branch is fully linked.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
enum Successors {
    Sequential(Vec<usize>),
    Branch {
        on_true: Option<usize>,
        on_false: Option<usize>,
    },
}

/// An instruction in a `Program`.
///
/// Instructions are created by, and owned by, a `Program`. The id of an
/// instruction is its index in that program, and is its identity.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Instruction {
    id: usize,
    operation: Operation,
    successors: Successors,
    predecessors: Vec<usize>,
}

impl Instruction {
    pub(crate) fn new(id: usize, operation: Operation) -> Instruction {
        let successors = if operation.is_branch() {
            Successors::Branch {
                on_true: None,
                on_false: None,
            }
        } else {
            Successors::Sequential(Vec::new())
        };
        Instruction {
            id,
            operation,
            successors,
            predecessors: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn is_branch(&self) -> bool {
        self.operation.is_branch()
    }

    pub fn definition(&self) -> BTreeSet<&str> {
        self.operation.definition()
    }

    pub fn uses(&self) -> BTreeSet<&str> {
        self.operation.uses()
    }

    /// The ids of the successors of this instruction, in order.
    ///
    /// For a branch this is `[true, false]`, skipping any edge which has not
    /// been linked.
    pub fn successors(&self) -> Vec<usize> {
        match self.successors {
            Successors::Sequential(ref successors) => successors.clone(),
            Successors::Branch { on_true, on_false } => {
                on_true.into_iter().chain(on_false).collect()
            }
        }
    }

    /// The ids of the predecessors of this instruction, in the order they were
    /// linked.
    pub fn predecessors(&self) -> &[usize] {
        &self.predecessors
    }

    /// The successor taken when this branch's condition holds.
    pub fn true_successor(&self) -> Result<usize, Error> {
        match self.successors {
            Successors::Branch { on_true, .. } => {
                on_true.ok_or(Error::MissingEdge(self.id, "true"))
            }
            Successors::Sequential(_) => Err(Error::NotABranch(self.id)),
        }
    }

    /// The successor taken when this branch's condition does not hold.
    pub fn false_successor(&self) -> Result<usize, Error> {
        match self.successors {
            Successors::Branch { on_false, .. } => {
                on_false.ok_or(Error::MissingEdge(self.id, "false"))
            }
            Successors::Sequential(_) => Err(Error::NotABranch(self.id)),
        }
    }

    /// The successor control falls through to, if any.
    ///
    /// For a branch, this is the false edge.
    pub fn next(&self) -> Result<Option<usize>, Error> {
        match self.successors {
            Successors::Sequential(ref successors) => Ok(successors.first().cloned()),
            Successors::Branch { .. } => self.false_successor().map(Some),
        }
    }

    /// Appends a successor, or sets the false edge of a branch. Returns the
    /// successor this replaced, if any.
    pub(crate) fn push_successor(&mut self, successor: usize) -> Option<usize> {
        match self.successors {
            Successors::Sequential(ref mut successors) => {
                successors.push(successor);
                None
            }
            Successors::Branch {
                ref mut on_false, ..
            } => on_false.replace(successor),
        }
    }

    pub(crate) fn set_true_successor(&mut self, successor: usize) -> Result<Option<usize>, Error> {
        match self.successors {
            Successors::Branch {
                ref mut on_true, ..
            } => Ok(on_true.replace(successor)),
            Successors::Sequential(_) => Err(Error::NotABranch(self.id)),
        }
    }

    pub(crate) fn set_false_successor(&mut self, successor: usize) -> Result<Option<usize>, Error> {
        match self.successors {
            Successors::Branch {
                ref mut on_false, ..
            } => Ok(on_false.replace(successor)),
            Successors::Sequential(_) => Err(Error::NotABranch(self.id)),
        }
    }

    pub(crate) fn push_predecessor(&mut self, predecessor: usize) {
        self.predecessors.push(predecessor);
    }

    /// Removes one occurrence of `predecessor`.
    pub(crate) fn remove_predecessor(&mut self, predecessor: usize) {
        if let Some(position) = self.predecessors.iter().position(|&p| p == predecessor) {
            self.predecessors.remove(position);
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.operation)
    }
}
