use crate::engine::cp::propagation::PropagatorId;
use crate::engine::cp::trailed::TrailedBitSet;
use crate::engine::cp::trailed::TrailedInteger;
use crate::engine::cp::trailed::TrailedValues;
use crate::engine::cp::Assignments;
use crate::engine::cp::EmptyDomain;
use crate::engine::variables::IntegerVariable;

/// [`PropagationContext`] is passed to propagators for read-only access to the current variable
/// domains, for instance when synchronising after a backtrack.
#[derive(Clone, Copy, Debug)]
pub struct PropagationContext<'a> {
    pub(crate) assignments: &'a Assignments,
}

impl<'a> PropagationContext<'a> {
    pub fn new(assignments: &'a Assignments) -> Self {
        PropagationContext { assignments }
    }
}

/// The context handed to [`Propagator::notify`]: trailed state can be updated, but the domains
/// are read-only.
///
/// [`Propagator::notify`]: super::Propagator::notify
#[derive(Debug)]
pub struct PropagationContextWithTrailedValues<'a> {
    pub(crate) trailed_values: &'a mut TrailedValues,
    pub(crate) assignments: &'a Assignments,
}

impl<'a> PropagationContextWithTrailedValues<'a> {
    pub fn new(trailed_values: &'a mut TrailedValues, assignments: &'a Assignments) -> Self {
        Self {
            trailed_values,
            assignments,
        }
    }

    pub fn as_readonly(&self) -> PropagationContext<'_> {
        PropagationContext {
            assignments: self.assignments,
        }
    }
}

/// The context handed to [`Propagator::propagate`]. It is the only point of communication between
/// a propagator and the rest of the engine during propagation: it may be queried for the current
/// domains, used to remove values from them, and used to read and update trailed state.
///
/// [`Propagator::propagate`]: super::Propagator::propagate
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    pub(crate) trailed_values: &'a mut TrailedValues,
    pub(crate) assignments: &'a mut Assignments,
    pub(crate) propagator_id: PropagatorId,
}

impl<'a> PropagationContextMut<'a> {
    pub fn new(
        trailed_values: &'a mut TrailedValues,
        assignments: &'a mut Assignments,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagationContextMut {
            trailed_values,
            assignments,
            propagator_id,
        }
    }

    pub fn as_readonly(&self) -> PropagationContext<'_> {
        PropagationContext {
            assignments: self.assignments,
        }
    }

    /// Remove a value from the domain of the given variable. The removal is attributed to the
    /// propagator owning this context, so the propagator is not notified of its own change.
    pub fn remove<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        if var.contains(self.assignments, value) {
            return var.remove(self.assignments, value, Some(self.propagator_id));
        }
        Ok(())
    }
}

/// A trait which defines common methods for retrieving the [`Assignments`] from the structure
/// which implements this trait.
pub trait HasAssignments {
    /// Returns the stored [`Assignments`].
    fn assignments(&self) -> &Assignments;
}

pub trait HasTrailedValues {
    fn trailed_values(&self) -> &TrailedValues;
    fn trailed_values_mut(&mut self) -> &mut TrailedValues;
}

mod private {
    use super::*;
    use crate::engine::cp::propagation::PropagatorInitialisationContext;

    impl HasTrailedValues for PropagationContextWithTrailedValues<'_> {
        fn trailed_values(&self) -> &TrailedValues {
            self.trailed_values
        }

        fn trailed_values_mut(&mut self) -> &mut TrailedValues {
            self.trailed_values
        }
    }

    impl HasTrailedValues for PropagationContextMut<'_> {
        fn trailed_values(&self) -> &TrailedValues {
            self.trailed_values
        }

        fn trailed_values_mut(&mut self) -> &mut TrailedValues {
            self.trailed_values
        }
    }

    impl HasTrailedValues for PropagatorInitialisationContext<'_> {
        fn trailed_values(&self) -> &TrailedValues {
            self.trailed_values
        }

        fn trailed_values_mut(&mut self) -> &mut TrailedValues {
            self.trailed_values
        }
    }

    impl HasAssignments for PropagationContext<'_> {
        fn assignments(&self) -> &Assignments {
            self.assignments
        }
    }

    impl HasAssignments for PropagationContextMut<'_> {
        fn assignments(&self) -> &Assignments {
            self.assignments
        }
    }

    impl HasAssignments for PropagationContextWithTrailedValues<'_> {
        fn assignments(&self) -> &Assignments {
            self.assignments
        }
    }

    impl HasAssignments for PropagatorInitialisationContext<'_> {
        fn assignments(&self) -> &Assignments {
            self.assignments
        }
    }
}

/// Reading from and writing to the trailed store, exposed on every context which holds one.
pub trait ManipulateTrailedValues: HasTrailedValues {
    fn new_trailed_integer(&mut self, initial_value: i64) -> TrailedInteger {
        self.trailed_values_mut().grow(initial_value)
    }

    fn value(&self, trailed_integer: TrailedInteger) -> i64 {
        self.trailed_values().read(trailed_integer)
    }

    fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.trailed_values_mut()
            .add_assign(trailed_integer, addition);
    }

    fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.trailed_values_mut().assign(trailed_integer, value);
    }

    fn new_bitset(&mut self, size: usize) -> TrailedBitSet {
        self.trailed_values_mut().new_bitset(size)
    }

    fn bitset_contains(&self, bitset: TrailedBitSet, bit: usize) -> bool {
        self.trailed_values().contains(bitset, bit)
    }

    fn bitset_insert(&mut self, bitset: TrailedBitSet, bit: usize) {
        self.trailed_values_mut().insert(bitset, bit);
    }
}

impl<T: HasTrailedValues> ManipulateTrailedValues for T {}

/// Read access to the current domains, exposed on every context which holds the assignments.
pub trait ReadDomains: HasAssignments {
    /// Returns `true` if the domain of the given variable is singleton.
    fn is_fixed<Var: IntegerVariable>(&self, var: &Var) -> bool {
        self.lower_bound(var) == self.upper_bound(var)
    }

    fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(self.assignments())
    }

    fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(self.assignments())
    }

    fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(self.assignments(), value)
    }

    fn iterate_domain<Var: IntegerVariable>(&self, var: &Var) -> impl Iterator<Item = i32> {
        var.iterate_domain(self.assignments())
    }
}

impl<T: HasAssignments> ReadDomains for T {}
