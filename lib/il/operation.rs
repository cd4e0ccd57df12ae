use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The operator of an `Operation::Binary`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BinaryOperator {
    Add,
    Mul,
    /// Less than
    Lth,
    /// Greater than or equal
    Geq,
}

impl BinaryOperator {
    /// The mnemonic used when printing this operator.
    pub fn mnemonic(&self) -> &'static str {
        match *self {
            BinaryOperator::Add => "add",
            BinaryOperator::Mul => "mul",
            BinaryOperator::Lth => "lth",
            BinaryOperator::Geq => "geq",
        }
    }
}

/// An IL Operation updates some state.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Operation {
    /// Apply a binary operator to two variables, writing the result to `dst`.
    Binary {
        op: BinaryOperator,
        dst: String,
        lhs: String,
        rhs: String,
    },
    /// Branch to the true successor if `condition` holds, to the false
    /// successor otherwise.
    Branch { condition: String },
    /// Copy `src` into `dst`.
    Move { dst: String, src: String },
    /// Create a new storage location, and place a reference to it in `dst`.
    Alloca { dst: String },
    /// `dst = *src`
    Load { dst: String, src: String },
    /// `*dst = src`
    Store { dst: String, src: String },
    /// Merge several incoming values at a control-flow join.
    Phi { dst: String, args: Vec<String> },
    /// Read a value from outside the program.
    Read { dst: String },
}

impl Operation {
    pub fn add<S: Into<String>>(dst: S, lhs: S, rhs: S) -> Operation {
        Operation::binary(BinaryOperator::Add, dst, lhs, rhs)
    }

    pub fn mul<S: Into<String>>(dst: S, lhs: S, rhs: S) -> Operation {
        Operation::binary(BinaryOperator::Mul, dst, lhs, rhs)
    }

    pub fn lth<S: Into<String>>(dst: S, lhs: S, rhs: S) -> Operation {
        Operation::binary(BinaryOperator::Lth, dst, lhs, rhs)
    }

    pub fn geq<S: Into<String>>(dst: S, lhs: S, rhs: S) -> Operation {
        Operation::binary(BinaryOperator::Geq, dst, lhs, rhs)
    }

    pub fn binary<S: Into<String>>(op: BinaryOperator, dst: S, lhs: S, rhs: S) -> Operation {
        Operation::Binary {
            op,
            dst: dst.into(),
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    pub fn branch<S: Into<String>>(condition: S) -> Operation {
        Operation::Branch {
            condition: condition.into(),
        }
    }

    pub fn mov<S: Into<String>>(dst: S, src: S) -> Operation {
        Operation::Move {
            dst: dst.into(),
            src: src.into(),
        }
    }

    pub fn alloca<S: Into<String>>(dst: S) -> Operation {
        Operation::Alloca { dst: dst.into() }
    }

    pub fn load<S: Into<String>>(dst: S, src: S) -> Operation {
        Operation::Load {
            dst: dst.into(),
            src: src.into(),
        }
    }

    pub fn store<S: Into<String>>(dst: S, src: S) -> Operation {
        Operation::Store {
            dst: dst.into(),
            src: src.into(),
        }
    }

    pub fn phi<S: Into<String>>(dst: S, args: Vec<S>) -> Operation {
        Operation::Phi {
            dst: dst.into(),
            args: args.into_iter().map(|arg| arg.into()).collect(),
        }
    }

    pub fn read<S: Into<String>>(dst: S) -> Operation {
        Operation::Read { dst: dst.into() }
    }

    /// Returns true if this is a conditional branch.
    pub fn is_branch(&self) -> bool {
        matches!(self, Operation::Branch { .. })
    }

    /// The variables written by this operation.
    ///
    /// A store writes through a reference, and does not define a variable.
    pub fn definition(&self) -> BTreeSet<&str> {
        let mut written = BTreeSet::new();
        match *self {
            Operation::Binary { ref dst, .. }
            | Operation::Move { ref dst, .. }
            | Operation::Alloca { ref dst }
            | Operation::Load { ref dst, .. }
            | Operation::Phi { ref dst, .. }
            | Operation::Read { ref dst } => {
                written.insert(dst.as_str());
            }
            Operation::Branch { .. } | Operation::Store { .. } => {}
        }
        written
    }

    /// The variables read by this operation.
    pub fn uses(&self) -> BTreeSet<&str> {
        let mut read = BTreeSet::new();
        match *self {
            Operation::Binary {
                ref lhs, ref rhs, ..
            } => {
                read.insert(lhs.as_str());
                read.insert(rhs.as_str());
            }
            Operation::Branch { ref condition } => {
                read.insert(condition.as_str());
            }
            Operation::Move { ref src, .. } | Operation::Load { ref src, .. } => {
                read.insert(src.as_str());
            }
            Operation::Store { ref dst, ref src } => {
                read.insert(dst.as_str());
                read.insert(src.as_str());
            }
            Operation::Phi { ref args, .. } => {
                read.extend(args.iter().map(|arg| arg.as_str()));
            }
            Operation::Alloca { .. } | Operation::Read { .. } => {}
        }
        read
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operation::Binary {
                ref op,
                ref dst,
                ref lhs,
                ref rhs,
            } => write!(f, "{} = {} {} {}", dst, op.mnemonic(), lhs, rhs),
            Operation::Branch { ref condition } => write!(f, "bt {}", condition),
            Operation::Move { ref dst, ref src } => write!(f, "{} = {}", dst, src),
            Operation::Alloca { ref dst } => write!(f, "{} = alloca", dst),
            Operation::Load { ref dst, ref src } => write!(f, "{} = *{}", dst, src),
            Operation::Store { ref dst, ref src } => write!(f, "*{} = {}", dst, src),
            Operation::Phi { ref dst, ref args } => write!(f, "{} = phi[{}]", dst, args.join(", ")),
            Operation::Read { ref dst } => write!(f, "{} = read", dst),
        }
    }
}
