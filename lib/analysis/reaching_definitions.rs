//! Reaching definitions.
//!
//! Every instruction gets two names, `IN_<id>` and `OUT_<id>`, holding the
//! set of `(variable, id)` definitions which reach the point before and after
//! it.

use crate::analysis::fixed_point::{self, Options, Solution, Strategy};
use crate::analysis::{DefinitionSet, Environment, Equation, Lattice};
use crate::il;
use crate::Error;
use std::fmt;

/// The name of the definitions reaching the point before `id`.
pub fn name_in(id: usize) -> String {
    format!("IN_{}", id)
}

/// The name of the definitions reaching the point after `id`.
pub fn name_out(id: usize) -> String {
    format!("OUT_{}", id)
}

/// An equation for reaching definitions.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ReachingDefinitionsEquation {
    /// `OUT[p] = {(v, p)} ∪ (IN[p] \ {(v, _)})` for every `v` that `p`
    /// defines.
    Out {
        id: usize,
        name: String,
        input: String,
        definitions: Vec<String>,
    },
    /// `OUT[p] = IN[p]`, for instructions which define nothing.
    Identity { name: String, input: String },
    /// `IN[p] = ∪ OUT[q]` over every predecessor `q` of `p`.
    In {
        name: String,
        predecessors: Vec<String>,
    },
}

impl ReachingDefinitionsEquation {
    pub fn out(instruction: &il::Instruction) -> ReachingDefinitionsEquation {
        let definitions: Vec<String> = instruction
            .definition()
            .into_iter()
            .map(|variable| variable.to_string())
            .collect();
        if definitions.is_empty() {
            ReachingDefinitionsEquation::Identity {
                name: name_out(instruction.id()),
                input: name_in(instruction.id()),
            }
        } else {
            ReachingDefinitionsEquation::Out {
                id: instruction.id(),
                name: name_out(instruction.id()),
                input: name_in(instruction.id()),
                definitions,
            }
        }
    }

    pub fn input(instruction: &il::Instruction) -> ReachingDefinitionsEquation {
        ReachingDefinitionsEquation::In {
            name: name_in(instruction.id()),
            predecessors: instruction
                .predecessors()
                .iter()
                .map(|&predecessor| name_out(predecessor))
                .collect(),
        }
    }
}

impl Equation for ReachingDefinitionsEquation {
    type Value = DefinitionSet;

    fn name(&self) -> &str {
        match *self {
            ReachingDefinitionsEquation::Out { ref name, .. }
            | ReachingDefinitionsEquation::Identity { ref name, .. }
            | ReachingDefinitionsEquation::In { ref name, .. } => name,
        }
    }

    fn deps(&self) -> Vec<&str> {
        match *self {
            ReachingDefinitionsEquation::Out { ref input, .. }
            | ReachingDefinitionsEquation::Identity { ref input, .. } => vec![input.as_str()],
            ReachingDefinitionsEquation::In {
                ref predecessors, ..
            } => predecessors.iter().map(|name| name.as_str()).collect(),
        }
    }

    fn eval_aux(&self, environment: &Environment<DefinitionSet>) -> Result<DefinitionSet, Error> {
        match *self {
            ReachingDefinitionsEquation::Out {
                id,
                ref input,
                ref definitions,
                ..
            } => {
                let mut out = environment.get(input)?.clone();
                for variable in definitions {
                    out.kill(variable);
                    out.insert(variable.clone(), id);
                }
                Ok(out)
            }
            ReachingDefinitionsEquation::Identity { ref input, .. } => {
                Ok(environment.get(input)?.clone())
            }
            ReachingDefinitionsEquation::In {
                ref predecessors, ..
            } => {
                let mut reaching = DefinitionSet::new();
                for predecessor in predecessors {
                    reaching = reaching.meet(environment.get(predecessor)?);
                }
                Ok(reaching)
            }
        }
    }
}

impl fmt::Display for ReachingDefinitionsEquation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReachingDefinitionsEquation::Out {
                id,
                ref name,
                ref input,
                ref definitions,
            } => {
                let generated = definitions
                    .iter()
                    .map(|variable| format!("({}, {})", variable, id))
                    .collect::<Vec<String>>()
                    .join(" + ");
                let killed = definitions
                    .iter()
                    .map(|variable| format!("({}, _)", variable))
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "{}: {} + ({} - {})", name, generated, input, killed)
            }
            ReachingDefinitionsEquation::Identity {
                ref name,
                ref input,
            } => write!(f, "{}: {}", name, input),
            ReachingDefinitionsEquation::In {
                ref name,
                ref predecessors,
            } => write!(f, "{}: Union( {} )", name, predecessors.join(", ")),
        }
    }
}

/// Generate the reaching-definitions equations for `program`.
///
/// The `OUT` equation of every instruction comes first, in id order, followed
/// by every `IN` equation.
pub fn equations(program: &il::Program) -> Vec<ReachingDefinitionsEquation> {
    let outs = program
        .instructions()
        .iter()
        .map(ReachingDefinitionsEquation::out);
    let ins = program
        .instructions()
        .iter()
        .map(ReachingDefinitionsEquation::input);
    outs.chain(ins).collect()
}

/// Compute the definitions reaching every point of `program`.
pub fn reaching_definitions(
    program: &il::Program,
    strategy: Strategy,
    options: &Options,
) -> Result<Solution<DefinitionSet>, Error> {
    fixed_point::solve(strategy, &equations(program), Environment::new(), options)
}
