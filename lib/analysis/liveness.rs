//! Live variables, solved backwards over the control-flow graph.
//!
//! `IN_<id>` holds the variables live before an instruction, and `OUT_<id>`
//! the variables live after it.

use crate::analysis::fixed_point::{self, Options, Solution, Strategy};
use crate::analysis::reaching_definitions::{name_in, name_out};
use crate::analysis::{Environment, Equation, Lattice, LocationSet};
use crate::il;
use crate::Error;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// An equation for liveness.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum LivenessEquation {
    /// `IN[p] = uses(p) ∪ (OUT[p] \ defs(p))`
    In {
        name: String,
        output: String,
        uses: Vec<String>,
        definitions: Vec<String>,
    },
    /// `OUT[p] = ∪ IN[s]` over every successor `s` of `p`.
    Out {
        name: String,
        successors: Vec<String>,
    },
}

impl LivenessEquation {
    pub fn input(instruction: &il::Instruction) -> LivenessEquation {
        LivenessEquation::In {
            name: name_in(instruction.id()),
            output: name_out(instruction.id()),
            uses: instruction
                .uses()
                .into_iter()
                .map(|name| name.to_string())
                .collect(),
            definitions: instruction
                .definition()
                .into_iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    pub fn out(instruction: &il::Instruction) -> LivenessEquation {
        LivenessEquation::Out {
            name: name_out(instruction.id()),
            successors: instruction
                .successors()
                .into_iter()
                .map(name_in)
                .collect(),
        }
    }
}

impl Equation for LivenessEquation {
    type Value = LocationSet;

    fn name(&self) -> &str {
        match *self {
            LivenessEquation::In { ref name, .. } | LivenessEquation::Out { ref name, .. } => name,
        }
    }

    fn deps(&self) -> Vec<&str> {
        match *self {
            LivenessEquation::In { ref output, .. } => vec![output.as_str()],
            LivenessEquation::Out { ref successors, .. } => {
                successors.iter().map(|name| name.as_str()).collect()
            }
        }
    }

    fn eval_aux(&self, environment: &Environment<LocationSet>) -> Result<LocationSet, Error> {
        match *self {
            LivenessEquation::In {
                ref output,
                ref uses,
                ref definitions,
                ..
            } => {
                let mut live = environment.get(output)?.clone();
                for definition in definitions {
                    live.remove(definition);
                }
                for used in uses {
                    live.insert(used.clone());
                }
                Ok(live)
            }
            LivenessEquation::Out { ref successors, .. } => {
                let mut live = LocationSet::initial();
                for successor in successors {
                    live = live.meet(environment.get(successor)?);
                }
                Ok(live)
            }
        }
    }
}

impl fmt::Display for LivenessEquation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LivenessEquation::In {
                ref name,
                ref output,
                ref uses,
                ref definitions,
            } => write!(
                f,
                "{}: {{{}}} + ({} - {{{}}})",
                name,
                uses.join(", "),
                output,
                definitions.join(", ")
            ),
            LivenessEquation::Out {
                ref name,
                ref successors,
            } => write!(f, "{}: Union( {} )", name, successors.join(", ")),
        }
    }
}

/// Generate the liveness equations for `program`.
///
/// Every `IN` equation comes first, in reverse id order, followed by every
/// `OUT` equation in reverse id order. Information flows backwards, so this
/// tends to need fewer chaotic passes.
pub fn equations(program: &il::Program) -> Vec<LivenessEquation> {
    let ins = program
        .instructions()
        .iter()
        .rev()
        .map(LivenessEquation::input);
    let outs = program
        .instructions()
        .iter()
        .rev()
        .map(LivenessEquation::out);
    ins.chain(outs).collect()
}

/// The variables live at every point of a program.
#[derive(Clone, Debug, PartialEq)]
pub struct Liveness {
    solution: Solution<LocationSet>,
}

impl Liveness {
    pub fn solution(&self) -> &Solution<LocationSet> {
        &self.solution
    }

    /// The variables live before instruction `id`.
    pub fn live_in(&self, id: usize) -> Result<&LocationSet, Error> {
        self.solution.environment().get(&name_in(id))
    }

    /// The variables live after instruction `id`.
    pub fn live_out(&self, id: usize) -> Result<&LocationSet, Error> {
        self.solution.environment().get(&name_out(id))
    }

    /// Build the interference graph of `program`.
    ///
    /// Two variables interfere when one is defined at a point where the other
    /// is live after it. Every variable of the program is a vertex, even one
    /// which interferes with nothing.
    pub fn interference_graph(
        &self,
        program: &il::Program,
    ) -> Result<BTreeMap<String, BTreeSet<String>>, Error> {
        let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for instruction in program.instructions() {
            for name in instruction.definition().into_iter().chain(instruction.uses()) {
                graph.entry(name.to_string()).or_default();
            }
        }

        for instruction in program.instructions() {
            let live_out = self.live_out(instruction.id())?;
            for defined in instruction.definition() {
                for live in live_out.locations() {
                    if live == defined {
                        continue;
                    }
                    graph
                        .entry(defined.to_string())
                        .or_default()
                        .insert(live.clone());
                    graph
                        .entry(live.clone())
                        .or_default()
                        .insert(defined.to_string());
                }
            }
        }
        Ok(graph)
    }

    /// Variables live at the entry of `program` which `environment` does not
    /// bind. These are read before they are ever written.
    pub fn undefined_variables<V>(
        &self,
        program: &il::Program,
        environment: &Environment<V>,
    ) -> Result<LocationSet, Error> {
        let entry = match program.entry() {
            Some(entry) => entry,
            None => return Ok(LocationSet::new()),
        };
        Ok(self
            .live_in(entry.id())?
            .locations()
            .iter()
            .filter(|name| !environment.contains(name))
            .cloned()
            .collect())
    }
}

/// Compute the variables live at every point of `program`.
pub fn liveness(
    program: &il::Program,
    strategy: Strategy,
    options: &Options,
) -> Result<Liveness, Error> {
    let solution = fixed_point::solve(strategy, &equations(program), Environment::new(), options)?;
    Ok(Liveness { solution })
}
