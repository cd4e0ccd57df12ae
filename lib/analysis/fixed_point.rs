//! Solve a set of equations to a fixed point.
//!
//! Two solvers are provided. `chaotic` evaluates every equation, in order,
//! until a full pass changes nothing. `worklist` only re-evaluates the
//! equations which read a name whose value changed, using a
//! `DependencyGraph`. Given the same equations and the same starting
//! environment, both reach the same environment.

use crate::analysis::{Environment, Equation, Lattice};
use crate::Error;
use log::{debug, trace};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which solver to use.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Strategy {
    Chaotic,
    Worklist,
}

impl Default for Strategy {
    fn default() -> Strategy {
        Strategy::Worklist
    }
}

/// The order in which the worklist solver pops equations.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum WorklistOrder {
    /// First in, first out
    Fifo,
    /// Last in, first out
    Lifo,
}

impl Default for WorklistOrder {
    fn default() -> WorklistOrder {
        WorklistOrder::Fifo
    }
}

const DEFAULT_MAX_EVALUATIONS: usize = 1_000_000;

fn default_max_evaluations() -> usize {
    DEFAULT_MAX_EVALUATIONS
}

/// Options which change the behavior of the solvers.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Options {
    #[serde(default = "default_max_evaluations")]
    max_evaluations: usize,
    #[serde(default)]
    order: WorklistOrder,
}

impl Options {
    /// Create a new set of Options with the default settings.
    pub fn new() -> Options {
        Options::default()
    }

    /// The number of equation evaluations after which a solver gives up with
    /// `Error::NonTermination`.
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    pub fn set_max_evaluations(&mut self, max_evaluations: usize) {
        self.max_evaluations = max_evaluations;
    }

    /// The order in which the worklist solver pops equations. Ignored by the
    /// chaotic solver.
    pub fn order(&self) -> WorklistOrder {
        self.order
    }

    pub fn set_order(&mut self, order: WorklistOrder) {
        self.order = order;
    }
}

impl Default for Options {
    fn default() -> Options {
        Options {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            order: WorklistOrder::default(),
        }
    }
}

/// Build `Options` without needing `mut`.
#[derive(Clone, Debug, Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    pub fn new() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    pub fn max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.options.set_max_evaluations(max_evaluations);
        self
    }

    pub fn order(mut self, order: WorklistOrder) -> Self {
        self.options.set_order(order);
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

/// The result of solving a set of equations.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<V> {
    environment: Environment<V>,
    evaluations: usize,
}

impl<V> Solution<V> {
    pub fn new(environment: Environment<V>, evaluations: usize) -> Solution<V> {
        Solution {
            environment,
            evaluations,
        }
    }

    /// The environment at the fixed point.
    pub fn environment(&self) -> &Environment<V> {
        &self.environment
    }

    /// How many equation evaluations it took to get there.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn into_environment(self) -> Environment<V> {
        self.environment
    }
}

/// Maps a name to the equations which read it.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    dependents: FxHashMap<String, Vec<usize>>,
}

impl DependencyGraph {
    /// Build the dependency graph for `equations`. The indices in the graph
    /// are indices into `equations`.
    pub fn new<E: Equation>(equations: &[E]) -> DependencyGraph {
        let mut dependents: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (index, equation) in equations.iter().enumerate() {
            for dep in equation.deps() {
                let readers = dependents.entry(dep.to_string()).or_default();
                if !readers.contains(&index) {
                    readers.push(index);
                }
            }
        }
        DependencyGraph { dependents }
    }

    /// The indices of the equations which read `name`, in equation order.
    pub fn dependents(&self, name: &str) -> &[usize] {
        self.dependents
            .get(name)
            .map(|dependents| dependents.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}

/// Bind every equation name missing from the environment to
/// `Lattice::initial()`.
fn seed<E: Equation>(equations: &[E], environment: &mut Environment<E::Value>) {
    for equation in equations {
        environment.seed(equation.name(), E::Value::initial());
    }
}

fn check_budget(evaluations: usize, options: &Options) -> Result<(), Error> {
    if evaluations >= options.max_evaluations() {
        Err(Error::NonTermination { evaluations })
    } else {
        Ok(())
    }
}

/// Solve `equations` by chaotic iteration.
///
/// Every equation is evaluated, in order, until a pass over all of them
/// changes nothing.
pub fn chaotic<E: Equation>(
    equations: &[E],
    mut environment: Environment<E::Value>,
    options: &Options,
) -> Result<Solution<E::Value>, Error> {
    debug!("chaotic: solving {} equations", equations.len());
    seed(equations, &mut environment);

    let mut evaluations = 0;
    let mut passes = 0;
    loop {
        let mut changed = false;
        for equation in equations {
            check_budget(evaluations, options)?;
            evaluations += 1;
            if equation.evaluate(&mut environment)? {
                trace!("chaotic: {} changed", equation);
                changed = true;
            }
        }
        passes += 1;
        if !changed {
            break;
        }
    }

    debug!(
        "chaotic: fixed point after {} passes, {} evaluations",
        passes, evaluations
    );
    Ok(Solution::new(environment, evaluations))
}

/// Solve `equations` with a worklist.
///
/// The worklist starts with every equation, in order. When an equation changes
/// the value of its name, every equation which reads that name and is not
/// already waiting is pushed back on the worklist.
pub fn worklist<E: Equation>(
    equations: &[E],
    mut environment: Environment<E::Value>,
    options: &Options,
) -> Result<Solution<E::Value>, Error> {
    debug!(
        "worklist: solving {} equations, {:?}",
        equations.len(),
        options.order()
    );
    seed(equations, &mut environment);

    let dependency_graph = DependencyGraph::new(equations);

    let mut queue: VecDeque<usize> = (0..equations.len()).collect();
    let mut pending = vec![true; equations.len()];

    let mut evaluations = 0;
    loop {
        let index = match options.order() {
            WorklistOrder::Fifo => queue.pop_front(),
            WorklistOrder::Lifo => queue.pop_back(),
        };
        let index = match index {
            Some(index) => index,
            None => break,
        };
        pending[index] = false;

        let equation = &equations[index];
        check_budget(evaluations, options)?;
        evaluations += 1;
        if !equation.evaluate(&mut environment)? {
            continue;
        }
        trace!("worklist: {} changed", equation);

        for &dependent in dependency_graph.dependents(equation.name()) {
            if !pending[dependent] {
                pending[dependent] = true;
                queue.push_back(dependent);
            }
        }
    }

    debug!("worklist: fixed point after {} evaluations", evaluations);
    Ok(Solution::new(environment, evaluations))
}

/// Solve `equations` with the given `Strategy`.
pub fn solve<E: Equation>(
    strategy: Strategy,
    equations: &[E],
    environment: Environment<E::Value>,
    options: &Options,
) -> Result<Solution<E::Value>, Error> {
    match strategy {
        Strategy::Chaotic => chaotic(equations, environment, options),
        Strategy::Worklist => worklist(equations, environment, options),
    }
}
