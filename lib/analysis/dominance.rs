//! Dominators, as a data-flow problem.
//!
//! `D(n) = {n} ∪ ⋂ D(p)` over the predecessors `p` of `n`. A root, the
//! program entry or an instruction without predecessors, is `D(n) = {n}`.

use crate::analysis::fixed_point::{self, Options, Solution, Strategy};
use crate::analysis::{DominatorSet, Environment, Equation};
use crate::il;
use crate::Error;
use std::fmt;

/// The name holding the dominators of `id`.
pub fn name(id: usize) -> String {
    format!("D_{}", id)
}

/// The dominance equation of one instruction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DominanceEquation {
    id: usize,
    name: String,
    predecessors: Vec<usize>,
    dependencies: Vec<String>,
}

impl DominanceEquation {
    /// Create the equation of `instruction`. A `root` is dominated by itself
    /// alone, even when back edges lead into it.
    pub fn new(instruction: &il::Instruction, root: bool) -> DominanceEquation {
        let predecessors = if root {
            Vec::new()
        } else {
            instruction.predecessors().to_vec()
        };
        DominanceEquation {
            id: instruction.id(),
            name: name(instruction.id()),
            dependencies: predecessors
                .iter()
                .map(|&predecessor| name(predecessor))
                .collect(),
            predecessors,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_root(&self) -> bool {
        self.predecessors.is_empty()
    }
}

impl Equation for DominanceEquation {
    type Value = DominatorSet;

    fn name(&self) -> &str {
        &self.name
    }

    fn deps(&self) -> Vec<&str> {
        self.dependencies.iter().map(|name| name.as_str()).collect()
    }

    fn eval_aux(&self, environment: &Environment<DominatorSet>) -> Result<DominatorSet, Error> {
        if self.is_root() {
            return Ok(DominatorSet::singleton(self.id));
        }
        let mut dominators = DominatorSet::Universal;
        for predecessor in &self.dependencies {
            dominators = dominators.intersection(environment.get(predecessor)?);
        }
        dominators.insert(self.id);
        Ok(dominators)
    }
}

impl fmt::Display for DominanceEquation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return write!(f, "D({}) = {{{}}}", self.id, self.id);
        }
        let predecessors = self
            .predecessors
            .iter()
            .map(|predecessor| format!("D({})", predecessor))
            .collect::<Vec<String>>()
            .join(", ");
        write!(
            f,
            "D({}) = {{{}}} U Intersection( {} )",
            self.id, self.id, predecessors
        )
    }
}

/// Generate the dominance equations for `program`, in id order.
pub fn equations(program: &il::Program) -> Vec<DominanceEquation> {
    let entry = program.entry().map(|entry| entry.id());
    program
        .instructions()
        .iter()
        .map(|instruction| DominanceEquation::new(instruction, Some(instruction.id()) == entry))
        .collect()
}

/// Compute the dominators of every instruction in `program`.
///
/// The entry is always a root. Instructions unreachable from the entry or from
/// any other instruction without predecessors keep `DominatorSet::Universal`.
pub fn dominators(
    program: &il::Program,
    strategy: Strategy,
    options: &Options,
) -> Result<Solution<DominatorSet>, Error> {
    fixed_point::solve(strategy, &equations(program), Environment::new(), options)
}

/// Returns true if `dominator` dominates `id` in a solved environment.
pub fn dominates(
    environment: &Environment<DominatorSet>,
    dominator: usize,
    id: usize,
) -> Result<bool, Error> {
    Ok(environment.get(&name(id))?.contains(dominator))
}
