use crate::analysis::{Environment, Lattice};
use crate::Error;
use std::fmt;

/// A data-flow equation: `name = f(deps)`.
///
/// Each analysis provides an enum of its equation kinds which implements this
/// trait. The solvers in `fixed_point` only ever see equations through it.
pub trait Equation: fmt::Display {
    /// The abstract values this equation computes over.
    type Value: Lattice;

    /// The name this equation writes.
    fn name(&self) -> &str;

    /// The names this equation reads. `eval_aux` must read no other name.
    fn deps(&self) -> Vec<&str>;

    /// Compute the new value of `name()` from the current environment,
    /// without writing it.
    fn eval_aux(&self, environment: &Environment<Self::Value>) -> Result<Self::Value, Error>;

    /// Evaluate this equation, writing its value to `name()` in the
    /// environment.
    ///
    /// Returns true if the value bound to `name()` changed. A name with no
    /// value is treated as holding `Lattice::initial()`.
    fn evaluate(&self, environment: &mut Environment<Self::Value>) -> Result<bool, Error> {
        let value = self.eval_aux(environment)?;
        let changed = match environment.value(self.name()) {
            Some(previous) => *previous != value,
            None => value != Self::Value::initial(),
        };
        environment.set(self.name(), value);
        Ok(changed)
    }
}
