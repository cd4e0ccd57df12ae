//! A partially-ordered set of names for data-flow analysis.

use crate::analysis::Lattice;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, PartialOrd};
use std::collections::BTreeSet;
use std::fmt;

/// A partially-ordered set of names used in analyses.
///
/// Points-to analysis keeps the storage locations a variable may reference in
/// a `LocationSet`. Liveness keeps the variables live at a program point.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LocationSet {
    pub locations: BTreeSet<String>,
}

impl LocationSet {
    pub fn new() -> LocationSet {
        LocationSet {
            locations: BTreeSet::new(),
        }
    }

    pub fn contains(&self, location: &str) -> bool {
        self.locations.contains(location)
    }

    pub fn insert<S: Into<String>>(&mut self, location: S) {
        self.locations.insert(location.into());
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn locations(&self) -> &BTreeSet<String> {
        &self.locations
    }

    pub fn remove(&mut self, location: &str) {
        self.locations.remove(location);
    }

    /// Add every location in `other` to this set, returning true if this set
    /// grew.
    pub fn extend(&mut self, other: &LocationSet) -> bool {
        let len = self.locations.len();
        self.locations.extend(other.locations.iter().cloned());
        self.locations.len() != len
    }

    pub fn is_subset(&self, other: &LocationSet) -> bool {
        self.locations.is_subset(&other.locations)
    }
}

impl<S: Into<String>> FromIterator<S> for LocationSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> LocationSet {
        LocationSet {
            locations: iter.into_iter().map(|location| location.into()).collect(),
        }
    }
}

impl PartialOrd for LocationSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.locations.len().cmp(&other.locations.len()) {
            Ordering::Equal => {
                for location in &self.locations {
                    if !other.locations.contains(location) {
                        return None;
                    }
                }
                Some(Ordering::Equal)
            }
            Ordering::Less => {
                for location in &self.locations {
                    if !other.locations.contains(location) {
                        return None;
                    }
                }
                Some(Ordering::Less)
            }
            Ordering::Greater => {
                for location in &other.locations {
                    if !self.locations.contains(location) {
                        return None;
                    }
                }
                Some(Ordering::Greater)
            }
        }
    }
}

impl Lattice for LocationSet {
    fn initial() -> LocationSet {
        LocationSet::new()
    }

    fn meet(&self, other: &LocationSet) -> LocationSet {
        let mut result = self.clone();
        result.extend(other);
        result
    }
}

impl fmt::Display for LocationSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.locations
                .iter()
                .cloned()
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}
