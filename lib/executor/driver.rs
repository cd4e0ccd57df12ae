//! A driver concretely executes a Fixpoint IL program.

use crate::executor::State;
use crate::il;
use crate::Error;

/// A driver for a concrete executor over Fixpoint IL.
#[derive(Debug, Clone)]
pub struct Driver<'p> {
    program: &'p il::Program,
    location: Option<usize>,
    state: State,
}

impl<'p> Driver<'p> {
    /// Create a new driver, sitting at the entry of `program`.
    pub fn new(program: &'p il::Program, state: State) -> Driver<'p> {
        Driver {
            program,
            location: program.entry().map(|entry| entry.id()),
            state,
        }
    }

    /// Execute the instruction this driver sits on, and move to the next one.
    ///
    /// Stepping a halted driver does nothing.
    pub fn step(mut self) -> Result<Driver<'p>, Error> {
        let id = match self.location {
            Some(id) => id,
            None => return Ok(self),
        };
        let program = self.program;
        let instruction = program.instruction(id)?;
        self.state.execute(instruction)?;

        self.location = match *instruction.operation() {
            il::Operation::Branch { ref condition } => {
                if self.state.constant(condition)?.is_true() {
                    Some(instruction.true_successor()?)
                } else {
                    Some(instruction.false_successor()?)
                }
            }
            _ => instruction.next()?,
        };
        Ok(self)
    }

    /// Returns true once control has fallen off the end of the program.
    pub fn is_halted(&self) -> bool {
        self.location.is_none()
    }

    /// Retrieve the Fixpoint IL program associated with this driver.
    pub fn program(&self) -> &il::Program {
        self.program
    }

    /// The id of the instruction this driver will execute next.
    pub fn location(&self) -> Option<usize> {
        self.location
    }

    /// Retrieve the concrete `State` associated with this driver.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Retrieve a mutable reference to the `State` associated with this driver.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn into_state(self) -> State {
        self.state
    }
}
