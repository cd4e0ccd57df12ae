//! Concrete execution over Fixpoint IL.
//!
//! The executor runs a `Program` from its entry until control falls off the
//! end. It shares binary-operator semantics with constant propagation through
//! `eval::binary`, which makes it a reference for checking what analyses
//! claim.

mod driver;
pub mod eval;
mod state;

pub use self::driver::Driver;
pub use self::state::{State, Value};

use crate::il;
use crate::Error;
use log::debug;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_STEPS: usize = 100_000;

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

/// Options which change the behavior of the executor.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Options {
    #[serde(default = "default_max_steps")]
    max_steps: usize,
}

impl Options {
    /// Create a new set of Options with the default settings.
    pub fn new() -> Options {
        Options::default()
    }

    /// The number of instructions after which execution stops with
    /// `Error::StepLimit`.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps;
    }
}

impl Default for Options {
    fn default() -> Options {
        Options {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Run `program` over `state` until it halts, returning the final state.
pub fn execute(program: &il::Program, state: State, options: &Options) -> Result<State, Error> {
    let mut driver = Driver::new(program, state);
    let mut steps = 0;
    while !driver.is_halted() {
        if steps >= options.max_steps() {
            return Err(Error::StepLimit(steps));
        }
        driver = driver.step()?;
        steps += 1;
    }
    debug!("executor: halted after {} steps", steps);
    Ok(driver.into_state())
}
