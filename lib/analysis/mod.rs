//! Data-flow analyses over Fixpoint IL.
//!
//! An analysis turns a `Program` into a list of `Equation`s, one or two per
//! instruction, over some `Lattice` of abstract values. The solvers in
//! `fixed_point` then evaluate those equations until nothing changes.

pub mod constants;
pub mod dominance;
mod environment;
mod equation;
pub mod fixed_point;
mod lattice;
pub mod liveness;
mod location_set;
pub mod points_to;
pub mod reaching_definitions;

pub use self::constants::constants;
pub use self::dominance::dominators;
pub use self::environment::Environment;
pub use self::equation::Equation;
pub use self::fixed_point::{Options, OptionsBuilder, Solution, Strategy, WorklistOrder};
pub use self::lattice::{ConstantValue, DefinitionSet, DominatorSet, Lattice};
pub use self::liveness::{liveness, Liveness};
pub use self::location_set::LocationSet;
pub use self::points_to::{points_to, PointsTo};
pub use self::reaching_definitions::reaching_definitions;
