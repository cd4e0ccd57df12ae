//! Fixpoint Intermediate Language.
//!
//! # An Introduction
//!
//! The IL is a small, three-address language, just rich enough to exercise
//! the analyses in `crate::analysis`.
//!
//! ## `Operation`
//!
//! An `Operation` applies a transformation over some state. There are eight
//! types of `Operation`:
//!
//! * `Binary`: `dst = op lhs rhs`, where `op` is one of `add`, `mul`, `lth`
//! (less than) or `geq` (greater than or equal).
//! * `Branch`: `bt condition`, which diverts control flow to the true successor
//! if `condition` holds, and to the false successor otherwise.
//! * `Move`: `dst = src`.
//! * `Alloca`: `dst = alloca`, which creates a new storage location. Every
//! location created by the same instruction shares the static name
//! `ref_<id>`.
//! * `Load`: `dst = *src`.
//! * `Store`: `*dst = src`.
//! * `Phi`: `dst = phi[args]`, a merge of several incoming values.
//! * `Read`: `dst = read`, a value from outside the program.
//!
//! Operands are always variable names. Literal values enter a program through
//! its initial environment.
//!
//! ## `Instruction`
//!
//! An `Instruction` gives an `Operation` an id, and a place in the
//! control-flow graph. Ordinary instructions have any number of successors,
//! linked in order. Branches have exactly two slots, `[true, false]`. Asking a
//! branch for a slot which has not been linked is an error.
//!
//! ## `Program`
//!
//! A `Program` is the arena which owns every `Instruction`. You should not
//! create an `Instruction` explicitly, but instead call the method on
//! `Program` corresponding to the `Operation` you wish to emit, and then link
//! instructions together with `link`, `link_true` and `link_false`. The
//! program keeps the successor and predecessor lists of its instructions
//! consistent.
//!
//! ```
//! use fixpoint::il::Program;
//!
//! let mut program = Program::new();
//! let i0 = program.lth("p", "n", "m");
//! let i1 = program.bt("p");
//! let i2 = program.add("answer", "n", "zero");
//! let i3 = program.add("answer", "m", "zero");
//! program.link(i0, i1).unwrap();
//! program.link_true(i1, i2).unwrap();
//! program.link_false(i1, i3).unwrap();
//!
//! assert_eq!(program.instruction(i2).unwrap().predecessors(), &[i1]);
//! ```

mod constant;
mod instruction;
mod operation;
mod program;

pub use self::constant::*;
pub use self::instruction::*;
pub use self::operation::*;
pub use self::program::*;

/// The static name of the storage location created by the `Alloca` with the
/// given id.
pub fn location_name(site: usize) -> String {
    format!("ref_{}", site)
}
