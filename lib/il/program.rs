use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `Program` is an arena of `Instruction`s, linked into a control-flow
/// graph.
///
/// The first instruction created is the entry of the program. Every
/// instruction receives as its id the next index in the arena, so ids are
/// dense, unique, and follow the order in which instructions were created.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            instructions: Vec::new(),
        }
    }

    /// Create a new instruction for the given `Operation`, returning its id.
    pub fn push(&mut self, operation: Operation) -> usize {
        let id = self.instructions.len();
        self.instructions.push(Instruction::new(id, operation));
        id
    }

    /// `dst = add lhs rhs`
    pub fn add<S: Into<String>>(&mut self, dst: S, lhs: S, rhs: S) -> usize {
        self.push(Operation::add(dst, lhs, rhs))
    }

    /// `dst = mul lhs rhs`
    pub fn mul<S: Into<String>>(&mut self, dst: S, lhs: S, rhs: S) -> usize {
        self.push(Operation::mul(dst, lhs, rhs))
    }

    /// `dst = lth lhs rhs`
    pub fn lth<S: Into<String>>(&mut self, dst: S, lhs: S, rhs: S) -> usize {
        self.push(Operation::lth(dst, lhs, rhs))
    }

    /// `dst = geq lhs rhs`
    pub fn geq<S: Into<String>>(&mut self, dst: S, lhs: S, rhs: S) -> usize {
        self.push(Operation::geq(dst, lhs, rhs))
    }

    /// `bt condition`. Both edges are unset until linked.
    pub fn bt<S: Into<String>>(&mut self, condition: S) -> usize {
        self.push(Operation::branch(condition))
    }

    /// `dst = src`
    pub fn mov<S: Into<String>>(&mut self, dst: S, src: S) -> usize {
        self.push(Operation::mov(dst, src))
    }

    /// `dst = alloca`
    pub fn alloca<S: Into<String>>(&mut self, dst: S) -> usize {
        self.push(Operation::alloca(dst))
    }

    /// `dst = *src`
    pub fn load<S: Into<String>>(&mut self, dst: S, src: S) -> usize {
        self.push(Operation::load(dst, src))
    }

    /// `*dst = src`
    pub fn store<S: Into<String>>(&mut self, dst: S, src: S) -> usize {
        self.push(Operation::store(dst, src))
    }

    /// `dst = phi[args]`
    pub fn phi<S: Into<String>>(&mut self, dst: S, args: Vec<S>) -> usize {
        self.push(Operation::phi(dst, args))
    }

    /// `dst = read`
    pub fn read<S: Into<String>>(&mut self, dst: S) -> usize {
        self.push(Operation::read(dst))
    }

    /// Link `successor` after `predecessor`.
    ///
    /// When `predecessor` is a branch, this sets its false, or fallthrough,
    /// edge.
    pub fn link(&mut self, predecessor: usize, successor: usize) -> Result<(), Error> {
        self.instruction(successor)?;
        let replaced = self.instruction_mut(predecessor)?.push_successor(successor);
        self.relink(predecessor, replaced, successor)
    }

    /// Set the edge a branch follows when its condition holds.
    pub fn link_true(&mut self, branch: usize, successor: usize) -> Result<(), Error> {
        self.instruction(successor)?;
        let replaced = self.instruction_mut(branch)?.set_true_successor(successor)?;
        self.relink(branch, replaced, successor)
    }

    /// Set the edge a branch follows when its condition does not hold.
    pub fn link_false(&mut self, branch: usize, successor: usize) -> Result<(), Error> {
        self.instruction(successor)?;
        let replaced = self.instruction_mut(branch)?.set_false_successor(successor)?;
        self.relink(branch, replaced, successor)
    }

    /// Link every instruction in `ids` to the one that follows it.
    pub fn sequence(&mut self, ids: &[usize]) -> Result<(), Error> {
        for pair in ids.windows(2) {
            self.link(pair[0], pair[1])?;
        }
        Ok(())
    }

    fn relink(
        &mut self,
        predecessor: usize,
        replaced: Option<usize>,
        successor: usize,
    ) -> Result<(), Error> {
        if let Some(replaced) = replaced {
            self.instruction_mut(replaced)?
                .remove_predecessor(predecessor);
        }
        self.instruction_mut(successor)?
            .push_predecessor(predecessor);
        Ok(())
    }

    /// Get an `Instruction` by id.
    pub fn instruction(&self, id: usize) -> Result<&Instruction, Error> {
        self.instructions
            .get(id)
            .ok_or(Error::InstructionNotFound(id))
    }

    fn instruction_mut(&mut self, id: usize) -> Result<&mut Instruction, Error> {
        self.instructions
            .get_mut(id)
            .ok_or(Error::InstructionNotFound(id))
    }

    /// All instructions in this program, in id order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The entry of this program, which is the first instruction created.
    pub fn entry(&self) -> Option<&Instruction> {
        self.instructions.first()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns a string in the graphviz format
    pub fn dot_graph(&self) -> String {
        let vertices = self
            .instructions
            .iter()
            .map(|instruction| {
                format!(
                    "{} [shape=\"box\", label=\"{}\", style=\"filled\", fillcolor=\"#ffddcc\", fontcolor=\"#000000\"];",
                    instruction.id(),
                    instruction
                )
            })
            .collect::<Vec<String>>();

        let mut edges = Vec::new();
        for instruction in &self.instructions {
            if instruction.is_branch() {
                if let Ok(successor) = instruction.true_successor() {
                    edges.push(format!(
                        "{} -> {} [label=\"T\", color=\"#00aa00\"];",
                        instruction.id(),
                        successor
                    ));
                }
                if let Ok(successor) = instruction.false_successor() {
                    edges.push(format!(
                        "{} -> {} [label=\"F\", color=\"#aa0000\"];",
                        instruction.id(),
                        successor
                    ));
                }
            } else {
                for successor in instruction.successors() {
                    edges.push(format!("{} -> {};", instruction.id(), successor));
                }
            }
        }

        let options = vec![
            "graph [fontname = \"Courier New\", splines=\"polyline\"]",
            "node [fontname = \"Courier New\"]",
            "edge [fontname = \"Courier New\"]",
        ];

        format!(
            "digraph G {{\n{}\n\n{}\n{}\n}}",
            options.join("\n"),
            vertices.join("\n"),
            edges.join("\n")
        )
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
