//! Sparse constant propagation over SSA variables.
//!
//! Every variable defined by the program gets one equation, named after the
//! variable itself. Literal values enter through the initial environment.

use crate::analysis::fixed_point::{self, Options, Solution, Strategy};
use crate::analysis::{ConstantValue, Environment, Equation, Lattice};
use crate::executor::eval;
use crate::il;
use crate::Error;
use std::fmt;

/// An equation for constant propagation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ConstantEquation {
    /// `dst = op lhs rhs`
    Binary {
        op: il::BinaryOperator,
        dst: String,
        lhs: String,
        rhs: String,
    },
    /// `dst = src`
    Move { dst: String, src: String },
    /// `dst = read`, which is never a constant.
    Read { dst: String },
    /// `dst = meet(args)`
    Phi { dst: String, args: Vec<String> },
}

impl ConstantEquation {
    /// Create the equation for an instruction.
    ///
    /// Returns `None` for branches, which define nothing. Memory operations
    /// have no constant-propagation semantics and fail with
    /// `Error::UnknownEquationKind`.
    pub fn new(instruction: &il::Instruction) -> Result<Option<ConstantEquation>, Error> {
        Ok(Some(match *instruction.operation() {
            il::Operation::Binary {
                op,
                ref dst,
                ref lhs,
                ref rhs,
            } => ConstantEquation::Binary {
                op,
                dst: dst.clone(),
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
            il::Operation::Move { ref dst, ref src } => ConstantEquation::Move {
                dst: dst.clone(),
                src: src.clone(),
            },
            il::Operation::Read { ref dst } => ConstantEquation::Read { dst: dst.clone() },
            il::Operation::Phi { ref dst, ref args } => ConstantEquation::Phi {
                dst: dst.clone(),
                args: args.clone(),
            },
            il::Operation::Branch { .. } => return Ok(None),
            il::Operation::Alloca { .. }
            | il::Operation::Load { .. }
            | il::Operation::Store { .. } => {
                return Err(Error::UnknownEquationKind {
                    analysis: "constant propagation",
                    instruction: instruction.to_string(),
                })
            }
        }))
    }
}

/// Apply a binary operator over abstract constants.
///
/// `Nac` wins over `Undef`, so the result is monotone in both operands.
/// Arithmetic which overflows is not a constant.
pub fn binary(op: il::BinaryOperator, lhs: &ConstantValue, rhs: &ConstantValue) -> ConstantValue {
    match (lhs, rhs) {
        (ConstantValue::Nac, _) | (_, ConstantValue::Nac) => ConstantValue::Nac,
        (ConstantValue::Undef, _) | (_, ConstantValue::Undef) => ConstantValue::Undef,
        (ConstantValue::Constant(lhs), ConstantValue::Constant(rhs)) => {
            match eval::binary(op, *lhs, *rhs) {
                Ok(constant) => ConstantValue::Constant(constant),
                Err(_) => ConstantValue::Nac,
            }
        }
    }
}

impl Equation for ConstantEquation {
    type Value = ConstantValue;

    fn name(&self) -> &str {
        match *self {
            ConstantEquation::Binary { ref dst, .. }
            | ConstantEquation::Move { ref dst, .. }
            | ConstantEquation::Read { ref dst }
            | ConstantEquation::Phi { ref dst, .. } => dst,
        }
    }

    fn deps(&self) -> Vec<&str> {
        match *self {
            ConstantEquation::Binary {
                ref lhs, ref rhs, ..
            } => vec![lhs.as_str(), rhs.as_str()],
            ConstantEquation::Move { ref src, .. } => vec![src.as_str()],
            ConstantEquation::Read { .. } => Vec::new(),
            ConstantEquation::Phi { ref args, .. } => args.iter().map(|arg| arg.as_str()).collect(),
        }
    }

    fn eval_aux(&self, environment: &Environment<ConstantValue>) -> Result<ConstantValue, Error> {
        Ok(match *self {
            ConstantEquation::Binary {
                op,
                ref lhs,
                ref rhs,
                ..
            } => binary(op, environment.get(lhs)?, environment.get(rhs)?),
            ConstantEquation::Move { ref src, .. } => environment.get(src)?.clone(),
            ConstantEquation::Read { .. } => ConstantValue::Nac,
            ConstantEquation::Phi { ref args, .. } => {
                let mut value = ConstantValue::initial();
                for arg in args {
                    value = value.meet(environment.get(arg)?);
                }
                value
            }
        })
    }
}

impl fmt::Display for ConstantEquation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConstantEquation::Binary {
                ref op,
                ref dst,
                ref lhs,
                ref rhs,
            } => write!(f, "{} = {} {} {}", dst, op.mnemonic(), lhs, rhs),
            ConstantEquation::Move { ref dst, ref src } => write!(f, "{} = {}", dst, src),
            ConstantEquation::Read { ref dst } => write!(f, "{} = NAC", dst),
            ConstantEquation::Phi { ref dst, ref args } => {
                write!(f, "{} = Meet( {} )", dst, args.join(", "))
            }
        }
    }
}

/// Generate the constant-propagation equations for `program`, in id order.
pub fn equations(program: &il::Program) -> Result<Vec<ConstantEquation>, Error> {
    let mut equations = Vec::new();
    for instruction in program.instructions() {
        if let Some(equation) = ConstantEquation::new(instruction)? {
            equations.push(equation);
        }
    }
    Ok(equations)
}

/// Propagate constants through `program`, starting from the literal values in
/// `environment`.
///
/// `program` must be in SSA form. A variable both given in `environment` and
/// redefined by the program may never settle, in which case the evaluation
/// budget in `options` ends the search.
pub fn constants(
    program: &il::Program,
    environment: Environment<ConstantValue>,
    strategy: Strategy,
    options: &Options,
) -> Result<Solution<ConstantValue>, Error> {
    fixed_point::solve(strategy, &equations(program)?, environment, options)
}
