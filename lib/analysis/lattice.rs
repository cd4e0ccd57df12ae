//! Abstract values, and the `Lattice` trait which lets the fixed-point engine
//! solve over them.

use crate::il;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, PartialOrd};
use std::collections::BTreeSet;
use std::fmt;

/// An abstract value which can be solved for by the fixed-point engine.
///
/// `PartialOrd` is the order in which values move while solving: every
/// equation must be monotone with respect to it, and `initial()` is its least
/// element. Termination of the solvers follows from this order having finite
/// height over any one program.
pub trait Lattice: Clone + fmt::Debug + PartialEq + PartialOrd {
    /// The value a name holds before it is first evaluated.
    ///
    /// This is the identity of `meet`: `initial().meet(x) == x`.
    fn initial() -> Self;

    /// Combine two values where facts merge.
    ///
    /// Must be associative, commutative and idempotent.
    fn meet(&self, other: &Self) -> Self;
}

/// A set of `(variable, instruction id)` definitions, for reaching
/// definitions.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct DefinitionSet {
    definitions: BTreeSet<(String, usize)>,
}

impl DefinitionSet {
    pub fn new() -> DefinitionSet {
        DefinitionSet {
            definitions: BTreeSet::new(),
        }
    }

    pub fn contains(&self, variable: &str, id: usize) -> bool {
        self.definitions.contains(&(variable.to_string(), id))
    }

    pub fn insert<S: Into<String>>(&mut self, variable: S, id: usize) {
        self.definitions.insert((variable.into(), id));
    }

    /// Remove every definition of `variable`, regardless of where it was
    /// defined.
    pub fn kill(&mut self, variable: &str) {
        self.definitions.retain(|(v, _)| v != variable);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &BTreeSet<(String, usize)> {
        &self.definitions
    }
}

impl PartialOrd for DefinitionSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.definitions == other.definitions {
            Some(Ordering::Equal)
        } else if self.definitions.is_subset(&other.definitions) {
            Some(Ordering::Less)
        } else if self.definitions.is_superset(&other.definitions) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl Lattice for DefinitionSet {
    fn initial() -> DefinitionSet {
        DefinitionSet::new()
    }

    fn meet(&self, other: &DefinitionSet) -> DefinitionSet {
        DefinitionSet {
            definitions: self.definitions.union(&other.definitions).cloned().collect(),
        }
    }
}

impl fmt::Display for DefinitionSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.definitions
                .iter()
                .map(|(variable, id)| format!("({}, {})", variable, id))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

/// The constant-propagation lattice: `Undef ⊑ Constant ⊑ Nac`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ConstantValue {
    /// No value has reached this name yet.
    Undef,
    Constant(il::Constant),
    /// Not a constant.
    Nac,
}

impl ConstantValue {
    /// Get the constant, if this value is one.
    pub fn get(&self) -> Option<&il::Constant> {
        match *self {
            ConstantValue::Constant(ref constant) => Some(constant),
            ConstantValue::Undef | ConstantValue::Nac => None,
        }
    }

    pub fn is_nac(&self) -> bool {
        matches!(self, ConstantValue::Nac)
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, ConstantValue::Undef)
    }
}

impl From<il::Constant> for ConstantValue {
    fn from(constant: il::Constant) -> ConstantValue {
        ConstantValue::Constant(constant)
    }
}

impl PartialOrd for ConstantValue {
    fn partial_cmp(&self, other: &ConstantValue) -> Option<Ordering> {
        match (self, other) {
            (ConstantValue::Undef, ConstantValue::Undef) | (ConstantValue::Nac, ConstantValue::Nac) => {
                Some(Ordering::Equal)
            }
            (ConstantValue::Undef, _) | (_, ConstantValue::Nac) => Some(Ordering::Less),
            (_, ConstantValue::Undef) | (ConstantValue::Nac, _) => Some(Ordering::Greater),
            (ConstantValue::Constant(lhs), ConstantValue::Constant(rhs)) => {
                if lhs == rhs {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
        }
    }
}

impl Lattice for ConstantValue {
    fn initial() -> ConstantValue {
        ConstantValue::Undef
    }

    fn meet(&self, other: &ConstantValue) -> ConstantValue {
        match (self, other) {
            (ConstantValue::Nac, _) | (_, ConstantValue::Nac) => ConstantValue::Nac,
            (ConstantValue::Undef, value) | (value, ConstantValue::Undef) => value.clone(),
            (ConstantValue::Constant(lhs), ConstantValue::Constant(rhs)) => {
                if lhs == rhs {
                    self.clone()
                } else {
                    ConstantValue::Nac
                }
            }
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConstantValue::Undef => write!(f, "UNDEF"),
            ConstantValue::Constant(ref constant) => write!(f, "{}", constant),
            ConstantValue::Nac => write!(f, "NAC"),
        }
    }
}

/// A set of dominating instruction ids.
///
/// `Universal` stands for the set of every instruction id, without having to
/// enumerate them. It is the starting value of every name in dominance
/// analysis, and intersecting it with a set yields that set.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum DominatorSet {
    Universal,
    Set(BTreeSet<usize>),
}

impl DominatorSet {
    /// A set holding only `id`.
    pub fn singleton(id: usize) -> DominatorSet {
        let mut set = BTreeSet::new();
        set.insert(id);
        DominatorSet::Set(set)
    }

    pub fn contains(&self, id: usize) -> bool {
        match *self {
            DominatorSet::Universal => true,
            DominatorSet::Set(ref set) => set.contains(&id),
        }
    }

    /// Add `id` to this set. Adding to the universal set leaves it unchanged.
    pub fn insert(&mut self, id: usize) {
        if let DominatorSet::Set(ref mut set) = *self {
            set.insert(id);
        }
    }

    pub fn intersection(&self, other: &DominatorSet) -> DominatorSet {
        match (self, other) {
            (DominatorSet::Universal, set) | (set, DominatorSet::Universal) => set.clone(),
            (DominatorSet::Set(lhs), DominatorSet::Set(rhs)) => {
                DominatorSet::Set(lhs.intersection(rhs).cloned().collect())
            }
        }
    }

    /// The ids in this set, or `None` for the universal set.
    pub fn ids(&self) -> Option<&BTreeSet<usize>> {
        match *self {
            DominatorSet::Universal => None,
            DominatorSet::Set(ref set) => Some(set),
        }
    }
}

impl PartialOrd for DominatorSet {
    fn partial_cmp(&self, other: &DominatorSet) -> Option<Ordering> {
        match (self, other) {
            (DominatorSet::Universal, DominatorSet::Universal) => Some(Ordering::Equal),
            (DominatorSet::Universal, _) => Some(Ordering::Less),
            (_, DominatorSet::Universal) => Some(Ordering::Greater),
            (DominatorSet::Set(lhs), DominatorSet::Set(rhs)) => {
                if lhs == rhs {
                    Some(Ordering::Equal)
                } else if lhs.is_superset(rhs) {
                    Some(Ordering::Less)
                } else if lhs.is_subset(rhs) {
                    Some(Ordering::Greater)
                } else {
                    None
                }
            }
        }
    }
}

impl Lattice for DominatorSet {
    fn initial() -> DominatorSet {
        DominatorSet::Universal
    }

    fn meet(&self, other: &DominatorSet) -> DominatorSet {
        self.intersection(other)
    }
}

impl fmt::Display for DominatorSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DominatorSet::Universal => write!(f, "Universal"),
            DominatorSet::Set(ref set) => write!(
                f,
                "{{{}}}",
                set.iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::Constant;

    fn constants() -> Vec<ConstantValue> {
        vec![
            ConstantValue::Undef,
            ConstantValue::Constant(Constant::Int(1)),
            ConstantValue::Constant(Constant::Int(2)),
            ConstantValue::Constant(Constant::Bool(true)),
            ConstantValue::Nac,
        ]
    }

    #[test]
    fn constant_meet() {
        let one = ConstantValue::Constant(Constant::Int(1));
        let two = ConstantValue::Constant(Constant::Int(2));
        assert_eq!(ConstantValue::Undef.meet(&one), one);
        assert_eq!(one.meet(&ConstantValue::Undef), one);
        assert_eq!(ConstantValue::Nac.meet(&one), ConstantValue::Nac);
        assert_eq!(one.meet(&one), one);
        assert_eq!(one.meet(&two), ConstantValue::Nac);
    }

    #[test]
    fn constant_meet_laws() {
        for a in constants() {
            assert_eq!(a.meet(&a), a);
            assert_eq!(ConstantValue::initial().meet(&a), a);
            for b in constants() {
                assert_eq!(a.meet(&b), b.meet(&a));
                // meet is an upper bound in the solving order
                assert!(a <= a.meet(&b));
                for c in constants() {
                    assert_eq!(a.meet(&b).meet(&c), a.meet(&b.meet(&c)));
                }
            }
        }
    }

    #[test]
    fn constant_order() {
        let one = ConstantValue::Constant(Constant::Int(1));
        let two = ConstantValue::Constant(Constant::Int(2));
        assert!(ConstantValue::Undef < one);
        assert!(one < ConstantValue::Nac);
        assert!(ConstantValue::Undef < ConstantValue::Nac);
        assert_eq!(one.partial_cmp(&two), None);
    }

    #[test]
    fn constant_accessors() {
        let one: ConstantValue = Constant::Int(1).into();
        assert_eq!(one.get(), Some(&Constant::Int(1)));
        assert!(!one.is_undef());
        assert!(!one.is_nac());

        assert_eq!(ConstantValue::Undef.get(), None);
        assert!(ConstantValue::Undef.is_undef());
        assert_eq!(ConstantValue::Nac.get(), None);
        assert!(ConstantValue::Nac.is_nac());
        assert!(!ConstantValue::Nac.is_undef());
    }

    #[test]
    fn definition_set_kill() {
        let mut set = DefinitionSet::new();
        set.insert("x", 0);
        set.insert("x", 3);
        set.insert("y", 1);
        set.kill("x");
        assert!(!set.contains("x", 0));
        assert!(!set.contains("x", 3));
        assert!(set.contains("y", 1));
        assert_eq!(set.to_string(), "{(y, 1)}");
    }

    #[test]
    fn definition_set_meet_is_union() {
        let mut a = DefinitionSet::new();
        a.insert("x", 0);
        let mut b = DefinitionSet::new();
        b.insert("x", 1);
        let c = a.meet(&b);
        assert_eq!(c.len(), 2);
        assert!(a < c);
        assert!(b < c);
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn universal_set() {
        let set: DominatorSet = DominatorSet::Set(vec![0, 1].into_iter().collect());
        assert_eq!(DominatorSet::Universal.intersection(&set), set);
        assert_eq!(set.intersection(&DominatorSet::Universal), set);
        assert!(DominatorSet::Universal.contains(42));

        let mut universal = DominatorSet::Universal;
        universal.insert(3);
        assert_eq!(universal, DominatorSet::Universal);
    }

    #[test]
    fn dominator_order() {
        let big: DominatorSet = DominatorSet::Set(vec![0, 1, 2].into_iter().collect());
        let small = DominatorSet::singleton(0);
        assert!(DominatorSet::Universal < big);
        assert!(big < small);
        assert_eq!(big.meet(&small), small);
        assert_eq!(
            DominatorSet::singleton(1).partial_cmp(&DominatorSet::singleton(2)),
            None
        );
    }
}
