//! Inclusion-based (Andersen-style) points-to analysis.
//!
//! Every `Alloca` creates one static storage location, `ref_<id>`. Each
//! variable, and each storage location, has a set of the locations it may
//! reference. Moves and phis give fixed inclusion edges. Loads and stores give
//! edges which depend on what their reference may point to, so they are
//! regenerated from the current points-to sets in rounds until nothing
//! changes.

use crate::analysis::fixed_point::{self, Options, Strategy};
use crate::analysis::{Environment, Equation, LocationSet};
use crate::il;
use crate::Error;
use log::{debug, trace};
use std::collections::BTreeSet;
use std::fmt;

/// The inclusion edge `Alias(dst) ⊇ Alias(src)`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InclusionEdge {
    dst: String,
    src: String,
}

impl InclusionEdge {
    pub fn new<S: Into<String>>(dst: S, src: S) -> InclusionEdge {
        InclusionEdge {
            dst: dst.into(),
            src: src.into(),
        }
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

impl Equation for InclusionEdge {
    type Value = LocationSet;

    fn name(&self) -> &str {
        &self.dst
    }

    fn deps(&self) -> Vec<&str> {
        vec![self.dst.as_str(), self.src.as_str()]
    }

    fn eval_aux(&self, environment: &Environment<LocationSet>) -> Result<LocationSet, Error> {
        let mut locations = environment.get(&self.dst)?.clone();
        locations.extend(environment.get(&self.src)?);
        Ok(locations)
    }
}

impl fmt::Display for InclusionEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Alias({}) >= Alias({})", self.dst, self.src)
    }
}

/// The starting environment for `program`.
///
/// Every name the program mentions, and every static storage location, is
/// bound to an empty set, except the destination of each `Alloca`, which
/// holds that alloca's location.
pub fn initial_environment(program: &il::Program) -> Environment<LocationSet> {
    let mut environment = Environment::new();
    for instruction in program.instructions() {
        for name in instruction.definition().into_iter().chain(instruction.uses()) {
            environment.seed(name, LocationSet::new());
        }
        if let il::Operation::Alloca { ref dst } = *instruction.operation() {
            let location = il::location_name(instruction.id());
            environment.seed(location.clone(), LocationSet::new());
            let mut locations = environment.value(dst).cloned().unwrap_or_default();
            locations.insert(location);
            environment.set(dst.clone(), locations);
        }
    }
    environment
}

/// The edges which do not depend on any points-to set: one for each move,
/// and one for each argument of each phi.
pub fn static_edges(program: &il::Program) -> BTreeSet<InclusionEdge> {
    let mut edges = BTreeSet::new();
    for instruction in program.instructions() {
        match *instruction.operation() {
            il::Operation::Move { ref dst, ref src } => {
                edges.insert(InclusionEdge::new(dst.as_str(), src.as_str()));
            }
            il::Operation::Phi { ref dst, ref args } => {
                for arg in args {
                    edges.insert(InclusionEdge::new(dst.as_str(), arg.as_str()));
                }
            }
            _ => {}
        }
    }
    edges
}

/// The edges loads and stores give under the current points-to sets.
///
/// `d = *r` gives `d ⊇ t`, and `*r = s` gives `t ⊇ s`, for every `t` which `r`
/// may point to.
pub fn memory_edges(
    program: &il::Program,
    environment: &Environment<LocationSet>,
) -> Result<BTreeSet<InclusionEdge>, Error> {
    let mut edges = BTreeSet::new();
    for instruction in program.instructions() {
        match *instruction.operation() {
            il::Operation::Load { ref dst, ref src } => {
                for target in environment.get(src)?.locations() {
                    edges.insert(InclusionEdge::new(dst.as_str(), target.as_str()));
                }
            }
            il::Operation::Store { ref dst, ref src } => {
                for target in environment.get(dst)?.locations() {
                    edges.insert(InclusionEdge::new(target.as_str(), src.as_str()));
                }
            }
            _ => {}
        }
    }
    Ok(edges)
}

/// The result of points-to analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct PointsTo {
    environment: Environment<LocationSet>,
    edges: BTreeSet<InclusionEdge>,
    evaluations: usize,
    rounds: usize,
}

impl PointsTo {
    /// The locations every name may point to.
    pub fn environment(&self) -> &Environment<LocationSet> {
        &self.environment
    }

    /// The locations `name` may point to.
    pub fn alias(&self, name: &str) -> Result<&LocationSet, Error> {
        self.environment.get(name)
    }

    /// Every inclusion edge discovered.
    pub fn edges(&self) -> &BTreeSet<InclusionEdge> {
        &self.edges
    }

    /// The equation evaluations across every round.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// The number of rounds of edge generation.
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

/// Compute what every variable and storage location of `program` may point
/// to.
///
/// Each round adds the edges loads and stores give under the current sets,
/// then solves every edge found so far with `strategy`. Analysis stops after
/// a round which neither finds a new edge nor changes a set. The evaluation
/// budget in `options` covers every round.
pub fn points_to(
    program: &il::Program,
    strategy: Strategy,
    options: &Options,
) -> Result<PointsTo, Error> {
    let mut environment = initial_environment(program);
    let mut edges = static_edges(program);
    let mut evaluations = 0;
    let mut rounds = 0;

    loop {
        rounds += 1;
        let known = edges.len();
        edges.extend(memory_edges(program, &environment)?);
        let new_edges = edges.len() != known;

        let equations: Vec<InclusionEdge> = edges.iter().cloned().collect();
        let mut round_options = options.clone();
        round_options.set_max_evaluations(options.max_evaluations().saturating_sub(evaluations));

        let previous = environment.clone();
        let solution = fixed_point::solve(strategy, &equations, environment, &round_options)
            .map_err(|error| match error {
                Error::NonTermination {
                    evaluations: in_round,
                } => Error::NonTermination {
                    evaluations: evaluations + in_round,
                },
                error => error,
            })?;
        evaluations += solution.evaluations();
        environment = solution.into_environment();
        let changed = environment != previous;

        trace!(
            "points-to: round {}, {} edges, new edges: {}, changed: {}",
            rounds,
            edges.len(),
            new_edges,
            changed
        );
        if !new_edges && !changed {
            break;
        }
    }

    debug!(
        "points-to: {} rounds, {} edges, {} evaluations",
        rounds,
        edges.len(),
        evaluations
    );
    Ok(PointsTo {
        environment,
        edges,
        evaluations,
        rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations(names: &[&str]) -> LocationSet {
        names.iter().cloned().collect()
    }

    #[test]
    fn load_through_a_stored_pointer() {
        // p0 = alloca; p1 = alloca; *p0 = p1; t = *p0
        let mut program = il::Program::new();
        let i0 = program.alloca("p0");
        let i1 = program.alloca("p1");
        let i2 = program.store("p0", "p1");
        let i3 = program.load("t", "p0");
        program.sequence(&[i0, i1, i2, i3]).unwrap();

        for strategy in [Strategy::Chaotic, Strategy::Worklist] {
            let points_to = points_to(&program, strategy, &Options::new()).unwrap();
            assert_eq!(points_to.alias("p0").unwrap(), &locations(&["ref_0"]));
            assert_eq!(points_to.alias("ref_0").unwrap(), &locations(&["ref_1"]));
            let t = points_to.alias("t").unwrap();
            assert!(points_to.alias("p1").unwrap().is_subset(t));
            assert_eq!(t, &locations(&["ref_1"]));
        }
    }

    #[test]
    fn stores_through_copies() {
        // p0 = alloca; p1 = alloca; *p0 = p1; p2 = *p0; *p2 = one;
        // p3 = p1; *p3 = two
        let mut program = il::Program::new();
        let ids = vec![
            program.alloca("p0"),
            program.alloca("p1"),
            program.store("p0", "p1"),
            program.load("p2", "p0"),
            program.store("p2", "one"),
            program.mov("p3", "p1"),
            program.store("p3", "two"),
        ];
        program.sequence(&ids).unwrap();

        let points_to = points_to(&program, Strategy::Worklist, &Options::new()).unwrap();
        assert_eq!(points_to.alias("p0").unwrap(), &locations(&["ref_0"]));
        assert_eq!(points_to.alias("p1").unwrap(), &locations(&["ref_1"]));
        assert_eq!(points_to.alias("p2").unwrap(), &locations(&["ref_1"]));
        assert_eq!(points_to.alias("p3").unwrap(), &locations(&["ref_1"]));
        assert_eq!(points_to.alias("ref_0").unwrap(), &locations(&["ref_1"]));
        assert!(points_to.alias("ref_1").unwrap().is_empty());
        assert!(points_to.rounds() >= 2);
    }

    #[test]
    fn phi_merges_targets() {
        let mut program = il::Program::new();
        let i0 = program.alloca("a");
        let i1 = program.alloca("b");
        let i2 = program.phi("c", vec!["a", "b"]);
        program.sequence(&[i0, i1, i2]).unwrap();

        let points_to = points_to(&program, Strategy::Chaotic, &Options::new()).unwrap();
        assert_eq!(points_to.alias("c").unwrap(), &locations(&["ref_0", "ref_1"]));
        assert!(points_to
            .edges()
            .contains(&InclusionEdge::new("c", "a")));
    }

    #[test]
    fn no_pointers() {
        let mut program = il::Program::new();
        let i0 = program.add("x", "a", "b");
        let i1 = program.read("y");
        program.link(i0, i1).unwrap();

        let points_to = points_to(&program, Strategy::Worklist, &Options::new()).unwrap();
        assert_eq!(points_to.rounds(), 1);
        assert!(points_to.edges().is_empty());
        assert!(points_to.alias("x").unwrap().is_empty());
    }

    #[test]
    fn edge_display() {
        let edge = InclusionEdge::new("a", "b");
        assert_eq!(edge.to_string(), "Alias(a) >= Alias(b)");
        assert_eq!(edge.name(), "a");
        assert_eq!(edge.deps(), vec!["a", "b"]);
    }
}
