//! Fixpoint: a data-flow analysis engine over a small instruction IL.
//!
//! Fixpoint is split into a few modules:
//!
//! * `il` is the instruction language. A `Program` is an arena of
//! `Instruction`s, linked into a control-flow graph.
//! * `analysis` turns a `Program` into data-flow equations over abstract
//! lattices, and solves them either by chaotic iteration or with a worklist
//! driven by a dependency graph. Reaching definitions, constant propagation,
//! dominance, liveness and Andersen-style points-to are provided.
//! * `executor` concretely executes a `Program`. It is useful as an oracle when
//! checking the soundness of an analysis.

pub mod analysis;
pub mod executor;
pub mod il;
#[cfg(test)]
mod tests;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    #[error("Branch {0} has no {1} edge")]
    MissingEdge(usize, &'static str),
    #[error("Instruction {0} is not a branch")]
    NotABranch(usize),
    #[error("Instruction not found: {0}")]
    InstructionNotFound(usize),
    #[error("`{name}` is not in the environment")]
    Lookup { name: String },
    #[error("Fixed point not reached after {evaluations} equation evaluations")]
    NonTermination { evaluations: usize },
    #[error("Execution stopped after {0} steps")]
    StepLimit(usize),
    #[error("No {analysis} equation for instruction `{instruction}`")]
    UnknownEquationKind {
        analysis: &'static str,
        instruction: String,
    },
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Error: {0}")]
    Custom(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Error {
        Error::Custom(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
