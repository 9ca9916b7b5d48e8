use thiserror::Error;

use crate::engine::cp::EmptyDomain;

/// The result of invoking a constraint programming propagator. The propagation
/// can either succeed or identify a conflict. On conflict the current branch
/// of the search has no solution and the host is expected to backtrack, which
/// also rolls back any domain changes made earlier in the same propagation.
pub type PropagationStatusCP = Result<(), Inconsistency>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    /// A domain operation left a variable with no admissible values.
    EmptyDomain,
    /// Two groups both require the same value.
    Conflict(DisjointViolation),
}

/// The single domain-specific failure of the disjoint-groups constraint: the
/// given value is required by two different groups at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value {value} is required by both group {first_group} and group {second_group}")]
pub struct DisjointViolation {
    pub value: i32,
    pub first_group: usize,
    pub second_group: usize,
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

impl From<DisjointViolation> for Inconsistency {
    fn from(violation: DisjointViolation) -> Self {
        Inconsistency::Conflict(violation)
    }
}
