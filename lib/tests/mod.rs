//! Properties which should hold for every analysis, checked over generated
//! programs.

use crate::analysis::fixed_point::{self, Options, OptionsBuilder, Strategy, WorklistOrder};
use crate::analysis::{constants, dominance, liveness, points_to, reaching_definitions};
use crate::analysis::{
    ConstantValue, DefinitionSet, DominatorSet, Environment, Equation, Lattice, LocationSet,
};
use crate::executor;
use crate::il::{self, Constant};
use crate::Error;

const SEEDS: u64 = 64;

/// A linear congruential generator, so generated programs are the same on
/// every run.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Lcg {
        let mut lcg = Lcg { state: seed };
        lcg.next();
        lcg
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }

    fn chance(&mut self, one_in: usize) -> bool {
        self.below(one_in) == 0
    }

    fn pick(&mut self, names: &[String]) -> String {
        names[self.below(names.len())].clone()
    }
}

fn names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

/// An arbitrary control-flow graph over a few reused variables, with branches
/// and back edges.
fn random_cfg(seed: u64) -> il::Program {
    let mut lcg = Lcg::new(seed);
    let variables = names("v", 4);
    let len = 2 + lcg.below(14);

    let mut program = il::Program::new();
    for _ in 0..len {
        let dst = lcg.pick(&variables);
        let lhs = lcg.pick(&variables);
        let rhs = lcg.pick(&variables);
        match lcg.below(6) {
            0 => program.add(dst, lhs, rhs),
            1 => program.mul(dst, lhs, rhs),
            2 => program.lth(dst, lhs, rhs),
            3 => program.bt(lhs),
            4 => program.read(dst),
            _ => program.mov(dst, lhs),
        };
    }

    for id in 0..len {
        let fallthrough = if id + 1 < len { id + 1 } else { lcg.below(len) };
        if program.instruction(id).unwrap().is_branch() {
            program.link_true(id, lcg.below(len)).unwrap();
            program.link_false(id, fallthrough).unwrap();
        } else {
            if id + 1 < len {
                program.link(id, id + 1).unwrap();
            }
            if lcg.chance(4) {
                program.link(id, lcg.below(len)).unwrap();
            }
        }
    }
    program
}

/// A straight-line SSA program over literal values, with the input its reads
/// consume.
fn random_ssa(seed: u64) -> (il::Program, Environment<ConstantValue>, Vec<Constant>) {
    let mut lcg = Lcg::new(seed);
    let literals = names("c", 3);
    let environment: Environment<ConstantValue> = literals
        .iter()
        .map(|name| {
            let value = lcg.below(4) as i64;
            (name.clone(), ConstantValue::Constant(Constant::Int(value)))
        })
        .collect();

    let mut defined = literals;
    let mut inputs = Vec::new();
    let mut program = il::Program::new();
    let len = 1 + lcg.below(12);
    for i in 0..len {
        let dst = format!("x{}", i);
        let lhs = lcg.pick(&defined);
        let rhs = lcg.pick(&defined);
        match lcg.below(6) {
            0 => program.add(dst.clone(), lhs, rhs),
            1 => program.mul(dst.clone(), lhs, rhs),
            2 => program.lth(dst.clone(), lhs, rhs),
            3 => program.phi(dst.clone(), vec![lhs, rhs]),
            4 => {
                inputs.push(Constant::Int(lcg.below(4) as i64));
                program.read(dst.clone())
            }
            _ => program.mov(dst.clone(), lhs),
        };
        defined.push(dst);
    }
    let ids: Vec<usize> = (0..len).collect();
    program.sequence(&ids).unwrap();

    (program, environment, inputs)
}

/// A program which shuffles pointers around through memory.
fn random_pointers(seed: u64) -> il::Program {
    let mut lcg = Lcg::new(seed);
    let pointers = names("p", 5);
    let values = names("w", 2);

    let mut program = il::Program::new();
    let len = 1 + lcg.below(14);
    for _ in 0..len {
        let dst = lcg.pick(&pointers);
        let src = lcg.pick(&pointers);
        match lcg.below(6) {
            0 => program.alloca(dst),
            1 => program.mov(dst, src),
            2 => program.load(dst, src),
            3 => program.store(dst, src),
            4 => program.store(dst, lcg.pick(&values)),
            _ => {
                let other = lcg.pick(&pointers);
                program.phi(dst, vec![src, other])
            }
        };
    }
    let ids: Vec<usize> = (0..len).collect();
    program.sequence(&ids).unwrap();
    program
}

/// Chaotic iteration and the worklist, in both orders, must find the same
/// fixed point, and nothing may change when the fixed point is evaluated
/// again.
fn assert_solvers_agree<E: Equation>(equations: &[E], environment: Environment<E::Value>) {
    let expected = fixed_point::chaotic(equations, environment.clone(), &Options::new()).unwrap();
    for order in [WorklistOrder::Fifo, WorklistOrder::Lifo] {
        let options = OptionsBuilder::new().order(order).build();
        let solution = fixed_point::worklist(equations, environment.clone(), &options).unwrap();
        assert_eq!(solution.environment(), expected.environment());
    }

    // Solving again from the fixed point evaluates every equation once and
    // changes nothing.
    let solved = expected.environment().clone();
    let again = fixed_point::chaotic(equations, solved.clone(), &Options::new()).unwrap();
    assert_eq!(again.evaluations(), equations.len());
    assert_eq!(again.environment(), &solved);
    for order in [WorklistOrder::Fifo, WorklistOrder::Lifo] {
        let options = OptionsBuilder::new().order(order).build();
        let again = fixed_point::worklist(equations, solved.clone(), &options).unwrap();
        assert_eq!(again.evaluations(), equations.len());
        assert_eq!(again.environment(), &solved);
    }

    let mut environment = expected.into_environment();
    for equation in equations {
        assert!(
            !equation.evaluate(&mut environment).unwrap(),
            "{} changed at the fixed point",
            equation
        );
    }
}

/// Every equation must be monotone: `lower ⊑ upper` pointwise implies
/// `eval(lower) ⊑ eval(upper)`.
fn assert_monotone<E: Equation>(
    equations: &[E],
    lower: &Environment<E::Value>,
    upper: &Environment<E::Value>,
) {
    for (name, value) in lower {
        assert!(value <= upper.get(name).unwrap());
    }
    for equation in equations {
        let low = equation.eval_aux(lower).unwrap();
        let high = equation.eval_aux(upper).unwrap();
        assert!(low <= high, "{} is not monotone", equation);
    }
}

/// Lower some values of a solved environment, keeping the rest.
fn lower<V: Lattice, F>(environment: &Environment<V>, lcg: &mut Lcg, mut lower_value: F) -> Environment<V>
where
    F: FnMut(&V, &mut Lcg) -> V,
{
    environment
        .iter()
        .map(|(name, value)| {
            let value = if lcg.chance(2) {
                lower_value(value, &mut *lcg)
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

#[test]
fn reaching_definitions_properties() {
    for seed in 0..SEEDS {
        let program = random_cfg(seed);
        let equations = reaching_definitions::equations(&program);
        assert_solvers_agree(&equations, Environment::new());

        let mut lcg = Lcg::new(seed);
        let solution =
            reaching_definitions::reaching_definitions(&program, Strategy::Chaotic, &Options::new())
                .unwrap();
        let upper = solution.environment();
        let lower = lower(upper, &mut lcg, |value, lcg| {
            let mut thinned = DefinitionSet::new();
            for (variable, id) in value.definitions() {
                if lcg.chance(2) {
                    thinned.insert(variable.clone(), *id);
                }
            }
            thinned
        });
        assert_monotone(&equations, &lower, upper);
    }
}

#[test]
fn dominance_properties() {
    for seed in 0..SEEDS {
        let program = random_cfg(seed);
        let equations = dominance::equations(&program);
        assert_solvers_agree(&equations, Environment::new());

        let mut lcg = Lcg::new(seed);
        let solution = dominance::dominators(&program, Strategy::Worklist, &Options::new()).unwrap();
        let upper = solution.environment();
        let lower = lower(upper, &mut lcg, |_, _| DominatorSet::Universal);
        assert_monotone(&equations, &lower, upper);

        // Every instruction dominates itself.
        for instruction in program.instructions() {
            assert!(dominance::dominates(upper, instruction.id(), instruction.id()).unwrap());
        }
        // The entry is dominated by itself alone, even when it heads a loop.
        assert_eq!(
            upper.get(&dominance::name(0)).unwrap(),
            &DominatorSet::singleton(0)
        );
    }
}

#[test]
fn liveness_properties() {
    for seed in 0..SEEDS {
        let program = random_cfg(seed);
        let equations = liveness::equations(&program);
        assert_solvers_agree(&equations, Environment::new());

        let mut lcg = Lcg::new(seed);
        let liveness = liveness::liveness(&program, Strategy::Worklist, &Options::new()).unwrap();
        let upper = liveness.solution().environment();
        let lower = lower(upper, &mut lcg, |value, lcg| {
            value
                .locations()
                .iter()
                .filter(|_| lcg.chance(2))
                .cloned()
                .collect()
        });
        assert_monotone(&equations, &lower, upper);

        // Whatever an instruction uses is live before it.
        for instruction in program.instructions() {
            let live_in = liveness.live_in(instruction.id()).unwrap();
            for used in instruction.uses() {
                assert!(live_in.contains(used));
            }
        }

        // Interference is symmetric.
        let graph = liveness.interference_graph(&program).unwrap();
        for (variable, neighbours) in &graph {
            for neighbour in neighbours {
                assert!(graph[neighbour].contains(variable));
            }
        }
    }
}

#[test]
fn constants_properties() {
    for seed in 0..SEEDS {
        let (program, environment, _) = random_ssa(seed);
        let equations = constants::equations(&program).unwrap();
        assert_solvers_agree(&equations, environment.clone());

        let mut lcg = Lcg::new(seed);
        let solution =
            constants::constants(&program, environment, Strategy::Worklist, &Options::new())
                .unwrap();
        let solved = solution.environment();
        let lower = lower(solved, &mut lcg, |_, _| ConstantValue::Undef);
        let upper: Environment<ConstantValue> = solved
            .iter()
            .map(|(name, value)| {
                let value = if lcg.chance(3) {
                    ConstantValue::Nac
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect();
        assert_monotone(&equations, &lower, solved);
        assert_monotone(&equations, solved, &upper);
    }
}

/// Whatever constant propagation calls a constant, execution agrees with.
#[test]
fn constants_agree_with_execution() {
    for seed in 0..SEEDS {
        let (program, environment, inputs) = random_ssa(seed);
        let solution = constants::constants(
            &program,
            environment.clone(),
            Strategy::Worklist,
            &Options::new(),
        )
        .unwrap();

        let mut state = executor::State::from_environment(&environment);
        for input in inputs {
            state.push_input(input);
        }
        let state = match executor::execute(&program, state, &executor::Options::new()) {
            Ok(state) => state,
            // Overflow is not a constant, so there is nothing to compare.
            Err(Error::Arithmetic(_)) => continue,
            Err(error) => panic!("{}", error),
        };

        for (name, value) in solution.environment() {
            if let ConstantValue::Constant(constant) = *value {
                assert_eq!(
                    state.variable(name).unwrap(),
                    &executor::Value::Constant(constant),
                    "{} in\n{}",
                    name,
                    program
                );
            }
        }
    }
}

#[test]
fn points_to_properties() {
    for seed in 0..SEEDS {
        let program = random_pointers(seed);
        let expected = points_to::points_to(&program, Strategy::Chaotic, &Options::new()).unwrap();
        for order in [WorklistOrder::Fifo, WorklistOrder::Lifo] {
            let options = OptionsBuilder::new().order(order).build();
            let result = points_to::points_to(&program, Strategy::Worklist, &options).unwrap();
            assert_eq!(result.environment(), expected.environment());
            assert_eq!(result.edges(), expected.edges());
        }

        // At the fixed point, loads and stores give no edge not already
        // known, and every edge holds.
        let environment = expected.environment();
        let edges = points_to::memory_edges(&program, environment).unwrap();
        assert!(edges.is_subset(expected.edges()));
        for edge in expected.edges() {
            let src = environment.get(edge.src()).unwrap();
            assert!(src.is_subset(environment.get(edge.dst()).unwrap()));
        }

        // Every alloca's destination points to its location.
        for instruction in program.instructions() {
            if let il::Operation::Alloca { ref dst } = *instruction.operation() {
                let location = il::location_name(instruction.id());
                assert!(environment.get(dst).unwrap().contains(&location));
            }
        }
    }
}

#[test]
fn reaching_definitions_scenario() {
    let mut program = il::Program::new();
    let i0 = program.add("x", "a", "b");
    let i1 = program.add("y", "x", "x");
    program.link(i0, i1).unwrap();

    let solution =
        reaching_definitions::reaching_definitions(&program, Strategy::Worklist, &Options::new())
            .unwrap();
    let environment = solution.environment();
    let out0 = environment.get(&reaching_definitions::name_out(i0)).unwrap();
    let in1 = environment.get(&reaching_definitions::name_in(i1)).unwrap();
    let out1 = environment.get(&reaching_definitions::name_out(i1)).unwrap();
    assert!(out0.contains("x", i0) && out0.len() == 1);
    assert_eq!(in1, out0);
    assert!(out1.contains("x", i0) && out1.contains("y", i1) && out1.len() == 2);
}

#[test]
fn constant_propagation_scenario() {
    let mut program = il::Program::new();
    let i0 = program.add("x", "ZERO", "ONE");
    let i1 = program.read("y");
    let i2 = program.add("z", "x", "y");
    program.sequence(&[i0, i1, i2]).unwrap();

    let environment = Environment::from_json(r#"{"ZERO": 0, "ONE": 1}"#).unwrap();
    let solution =
        constants::constants(&program, environment, Strategy::Chaotic, &Options::new()).unwrap();
    let environment = solution.environment();
    assert_eq!(
        environment.get("x").unwrap(),
        &ConstantValue::Constant(Constant::Int(1))
    );
    assert!(environment.get("y").unwrap().is_nac());
    assert!(environment.get("z").unwrap().is_nac());
}

#[test]
fn dominance_scenario() {
    let mut program = il::Program::new();
    let i0 = program.bt("p");
    let i1 = program.read("a");
    let i2 = program.read("b");
    let i3 = program.phi("c", vec!["a", "b"]);
    program.link_true(i0, i1).unwrap();
    program.link_false(i0, i2).unwrap();
    program.sequence(&[i1, i3]).unwrap();
    program.sequence(&[i2, i3]).unwrap();

    let solution = dominance::dominators(&program, Strategy::Chaotic, &Options::new()).unwrap();
    let environment = solution.environment();
    assert_eq!(
        environment.get(&dominance::name(i0)).unwrap(),
        &DominatorSet::singleton(i0)
    );
    let d3 = environment.get(&dominance::name(i3)).unwrap();
    assert_eq!(d3.ids().map(|ids| ids.len()), Some(2));
    assert!(d3.contains(i0) && d3.contains(i3));
}

#[test]
fn points_to_scenario() {
    let mut program = il::Program::new();
    let i0 = program.alloca("p0");
    let i1 = program.alloca("p1");
    let i2 = program.store("p0", "p1");
    let i3 = program.load("t", "p0");
    program.sequence(&[i0, i1, i2, i3]).unwrap();

    let result = points_to::points_to(&program, Strategy::Worklist, &Options::new()).unwrap();
    let expected: LocationSet = vec![il::location_name(i0)].into_iter().collect();
    assert_eq!(result.alias("p0").unwrap(), &expected);
    assert!(result
        .alias("p1")
        .unwrap()
        .is_subset(result.alias("t").unwrap()));
}

#[test]
fn phi_meet_scenario() {
    let mut program = il::Program::new();
    program.phi("x", vec!["c1", "c2"]);

    let same = Environment::from_json(r#"{"c1": 2, "c2": 2}"#).unwrap();
    let solution = constants::constants(&program, same, Strategy::Worklist, &Options::new()).unwrap();
    assert_eq!(
        solution.environment().get("x").unwrap(),
        &ConstantValue::Constant(Constant::Int(2))
    );

    let different = Environment::from_json(r#"{"c1": 1, "c2": 2}"#).unwrap();
    let solution =
        constants::constants(&program, different, Strategy::Worklist, &Options::new()).unwrap();
    assert!(solution.environment().get("x").unwrap().is_nac());
}
