use log::trace;

use crate::basic_types::DisjointViolation;
use crate::basic_types::Entailment;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::engine::cp::propagation::EnqueueDecision;
use crate::engine::cp::propagation::LocalId;
use crate::engine::cp::propagation::ManipulateTrailedValues;
use crate::engine::cp::propagation::PropagationContext;
use crate::engine::cp::propagation::PropagationContextMut;
use crate::engine::cp::propagation::PropagationContextWithTrailedValues;
use crate::engine::cp::propagation::Propagator;
use crate::engine::cp::propagation::PropagatorInitialisationContext;
use crate::engine::cp::propagation::ReadDomains;
use crate::engine::cp::trailed::TrailedBitSet;
use crate::engine::cp::trailed::TrailedInteger;
#[cfg(test)]
use crate::engine::cp::trailed::TrailedValues;
use crate::engine::cp::DomainEvents;
use crate::engine::cp::IntDomainEvent;
use crate::engine::cp::OpaqueDomainEvent;
use crate::engine::variables::IntegerVariable;
use crate::stapel_assert_moderate;
use crate::stapel_assert_simple;

/// Enforces that the groups of variables take disjoint sets of values: a value which is assigned
/// to a variable of one group cannot be assigned to a variable of any other group. Within a
/// single group a value may be shared freely.
///
/// The filtering is counting-based. For every group and value the propagator maintains the
/// number of unfixed group members which still have the value in their domain, and a bitset of
/// the values the group requires because one of its members is fixed to it. Both live in the
/// trailed store, so the host rolls them back on backtracking together with the domains.
///
/// Whenever a group starts to require a value, that value is removed from the domains of all
/// other groups' variables. A variable which collapses to a singleton because of such a removal
/// makes its own group require its value in turn, which is propagated the same way. Two groups
/// requiring the same value is a conflict.
#[derive(Debug)]
pub struct DisjointGroupsPropagator<Var> {
    variables: Box<[Var]>,

    /// Indices of the variables in group `g` are between `group_idx[g]` and `group_idx[g + 1]`.
    group_idx: Box<[u32]>,

    /// The variable domains must be contained in `[0, nb_values)`.
    nb_values: usize,

    /// `candidates[g * nb_values + v]` is the number of unfixed variables in group `g` whose
    /// domain still contains `v`.
    candidates: Box<[TrailedInteger]>,

    /// Bit `v` of `claimed[g]` is set iff some variable in group `g` is fixed to `v`.
    claimed: Box<[TrailedBitSet]>,

    /// Variables whose instantiation was reported through a notification but has not yet been
    /// propagated. Scratch state, cleared when the host backtracks.
    pending: Vec<usize>,

    first: bool,
}

impl<Var> DisjointGroupsPropagator<Var> {
    /// Create a propagator over the given groups of variables. The group membership is fixed for
    /// the lifetime of the propagator, and the variable domains must be contained in
    /// `[0, nb_values)`.
    pub fn new(groups: Vec<Vec<Var>>, nb_values: usize) -> Self {
        let mut group_idx = Vec::with_capacity(groups.len() + 1);
        group_idx.push(0_u32);

        let mut variables = Vec::new();
        for group in groups {
            variables.extend(group);
            group_idx.push(variables.len() as u32);
        }

        Self {
            variables: variables.into(),
            group_idx: group_idx.into(),
            nb_values,
            candidates: Box::new([]),
            claimed: Box::new([]),
            pending: Vec::new(),
            first: true,
        }
    }

    fn nb_groups(&self) -> usize {
        self.group_idx.len() - 1
    }

    fn group_range(&self, group: usize) -> std::ops::Range<usize> {
        self.group_idx[group] as usize..self.group_idx[group + 1] as usize
    }

    /// The group of the variable with the given flat index, found by binary search over the
    /// group boundaries.
    fn group_of(&self, variable_index: usize) -> usize {
        stapel_assert_simple!(
            variable_index < self.group_idx[self.group_idx.len() - 1] as usize,
            "variable index out of range of the partition"
        );

        let mut low = 0;
        let mut high = self.nb_groups();
        while high - low > 1 {
            let mid = (low + high) / 2;
            if variable_index >= self.group_idx[mid] as usize {
                low = mid;
            } else {
                high = mid;
            }
        }
        low
    }

    fn candidate(&self, group: usize, value: i32) -> TrailedInteger {
        self.candidates[group * self.nb_values + value as usize]
    }

    fn assert_value_in_range(&self, value: i32) {
        stapel_assert_simple!(
            value >= 0 && (value as usize) < self.nb_values,
            "variable domains must be contained in [0, {})",
            self.nb_values
        );
    }
}

impl<Var: IntegerVariable + 'static> DisjointGroupsPropagator<Var> {
    /// Derive the counters and requirement bits from the current domains. Runs once, on the
    /// first propagation.
    fn initialise_from_domains(&self, context: &mut PropagationContextMut) {
        let mut values = Vec::new();

        for group in 0..self.nb_groups() {
            for index in self.group_range(group) {
                let variable = &self.variables[index];

                if context.is_fixed(variable) {
                    let value = context.lower_bound(variable);
                    self.assert_value_in_range(value);
                    context.bitset_insert(self.claimed[group], value as usize);
                } else {
                    values.clear();
                    values.extend(context.iterate_domain(variable));
                    for &value in &values {
                        self.assert_value_in_range(value);
                        context.add_assign(self.candidate(group, value), 1);
                    }
                }
            }
        }
    }

    /// Record that `group` requires `value` and prune the other groups accordingly.
    ///
    /// A variable of another group which collapses to a singleton by losing `value` makes its
    /// group require the remaining value; such discovered requirements are processed from an
    /// explicit worklist rather than by recursion. Every processed entry either re-asserts a
    /// requirement that is already recorded or establishes a new one, which bounds the work per
    /// call.
    fn propagate_claim(
        &self,
        context: &mut PropagationContextMut,
        value: i32,
        group: usize,
    ) -> PropagationStatusCP {
        let mut worklist = vec![(value, group)];
        let mut processed = 0_usize;

        while let Some((value, group)) = worklist.pop() {
            processed += 1;
            stapel_assert_moderate!(
                processed <= self.variables.len() + 1,
                "a requirement can be discovered at most once per variable"
            );

            context.bitset_insert(self.claimed[group], value as usize);

            for other in 0..self.nb_groups() {
                if other == group {
                    continue;
                }

                if context.bitset_contains(self.claimed[other], value as usize) {
                    // The value is required by the other group as well.
                    trace!(
                        "disjoint_groups: value {value} required by both group {group} and group {other}"
                    );
                    return Err(DisjointViolation {
                        value,
                        first_group: other,
                        second_group: group,
                    }
                    .into());
                }

                if context.value(self.candidate(other, value)) > 0 {
                    // The value is still possible in the other group; forbid it there.
                    for index in self.group_range(other) {
                        let variable = &self.variables[index];
                        if !context.contains(variable, value) {
                            continue;
                        }

                        if context.remove(variable, value).is_err() {
                            // Removing the value emptied the domain, so the variable was fixed
                            // to it: the other group requires the value as well.
                            trace!(
                                "disjoint_groups: value {value} required by both group {group} and group {other}"
                            );
                            return Err(DisjointViolation {
                                value,
                                first_group: other,
                                second_group: group,
                            }
                            .into());
                        }
                        context.add_assign(self.candidate(other, value), -1);

                        if context.is_fixed(variable) {
                            let forced = context.lower_bound(variable);
                            // The variable is no longer an open candidate for the value it is
                            // now fixed to.
                            context.add_assign(self.candidate(other, forced), -1);

                            if !context.bitset_contains(self.claimed[other], forced as usize) {
                                worklist.push((forced, other));
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl<Var: IntegerVariable + 'static> Propagator for DisjointGroupsPropagator<Var> {
    fn name(&self) -> &str {
        "DisjointGroups"
    }

    fn priority(&self) -> u32 {
        4
    }

    fn initialise_at_root(
        &mut self,
        context: &mut PropagatorInitialisationContext,
    ) -> Result<(), Inconsistency> {
        for (index, variable) in self.variables.iter().enumerate() {
            let _ = context.register(
                variable.clone(),
                DomainEvents::ANY_INT,
                LocalId::from(index as u32),
            );
        }

        self.candidates = (0..self.nb_groups() * self.nb_values)
            .map(|_| context.new_trailed_integer(0))
            .collect();
        self.claimed = (0..self.nb_groups())
            .map(|_| context.new_bitset(self.nb_values))
            .collect();

        Ok(())
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatusCP {
        if self.first {
            self.first = false;
            self.initialise_from_domains(&mut context);
        }

        // Re-assert every recorded requirement. On the first call this is what turns the initial
        // fixings into prunings (or surfaces a conflict already present in the input); on later
        // calls the counters of the other groups are zero and the pass is cheap.
        for value in 0..self.nb_values as i32 {
            for group in 0..self.nb_groups() {
                if context.bitset_contains(self.claimed[group], value as usize) {
                    self.propagate_claim(&mut context, value, group)?;
                }
            }
        }

        // Process the instantiations reported since the previous call.
        while let Some(index) = self.pending.pop() {
            let variable = &self.variables[index];
            let value = context.lower_bound(variable);
            let group = self.group_of(index);

            if !context.bitset_contains(self.claimed[group], value as usize) {
                self.propagate_claim(&mut context, value, group)?;
            }
        }

        Ok(())
    }

    fn notify(
        &mut self,
        mut context: PropagationContextWithTrailedValues,
        local_id: LocalId,
        event: OpaqueDomainEvent,
    ) -> EnqueueDecision {
        if self.first {
            // The counters are derived from the domains during the first propagation; events
            // prior to that are already reflected in that scan.
            return match event.unwrap() {
                IntDomainEvent::Assign => EnqueueDecision::Enqueue,
                _ => EnqueueDecision::Skip,
            };
        }

        let index = local_id.unpack() as usize;
        let group = self.group_of(index);

        match event.unwrap() {
            IntDomainEvent::Removal => {
                let value = event.value();
                self.assert_value_in_range(value);
                context.add_assign(self.candidate(group, value), -1);

                // Bookkeeping only; a removal on its own never forces anything here.
                EnqueueDecision::Skip
            }
            IntDomainEvent::Assign => {
                let value = event.value();
                self.assert_value_in_range(value);
                // The variable stops being an open candidate for its own value. The requirement
                // itself is recorded and propagated in `propagate`.
                context.add_assign(self.candidate(group, value), -1);
                self.pending.push(index);

                EnqueueDecision::Enqueue
            }
            IntDomainEvent::LowerBound | IntDomainEvent::UpperBound => {
                // Bound changes are fully covered by the per-value removal events.
                EnqueueDecision::Skip
            }
        }
    }

    fn synchronise(&mut self, _context: PropagationContext) {
        self.pending.clear();
    }

    fn is_entailed(&self, assignment: &[i32]) -> Entailment {
        stapel_assert_simple!(
            assignment.len() == self.variables.len(),
            "the assignment must contain one value per variable"
        );

        let mut owner: Vec<Option<usize>> = vec![None; self.nb_values];

        for group in 0..self.nb_groups() {
            for index in self.group_range(group) {
                let value = assignment[index];
                self.assert_value_in_range(value);

                match owner[value as usize] {
                    Some(previous) if previous != group => return Entailment::Violated,
                    _ => owner[value as usize] = Some(group),
                }
            }
        }

        Entailment::Satisfied
    }
}

#[cfg(test)]
impl<Var> DisjointGroupsPropagator<Var> {
    pub(crate) fn candidate_count(
        &self,
        trailed_values: &TrailedValues,
        group: usize,
        value: i32,
    ) -> i64 {
        trailed_values.read(self.candidate(group, value))
    }

    pub(crate) fn is_claimed(
        &self,
        trailed_values: &TrailedValues,
        group: usize,
        value: i32,
    ) -> bool {
        trailed_values.contains(self.claimed[group], value as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::variables::DomainId;

    fn propagator_with_group_sizes(sizes: &[u32]) -> DisjointGroupsPropagator<DomainId> {
        let mut next_id = 0;
        let groups = sizes
            .iter()
            .map(|&size| {
                (0..size)
                    .map(|_| {
                        let id = DomainId::new(next_id);
                        next_id += 1;
                        id
                    })
                    .collect()
            })
            .collect();

        DisjointGroupsPropagator::new(groups, 4)
    }

    #[test]
    fn group_lookup_respects_the_partition_boundaries() {
        let propagator = propagator_with_group_sizes(&[2, 3, 1]);

        assert_eq!(propagator.group_of(0), 0);
        assert_eq!(propagator.group_of(1), 0);
        assert_eq!(propagator.group_of(2), 1);
        assert_eq!(propagator.group_of(4), 1);
        assert_eq!(propagator.group_of(5), 2);
    }

    #[test]
    fn distinct_values_across_groups_are_entailed() {
        let propagator = propagator_with_group_sizes(&[2, 2]);

        assert_eq!(
            propagator.is_entailed(&[0, 1, 2, 3]),
            Entailment::Satisfied
        );
    }

    #[test]
    fn a_value_shared_between_groups_is_a_violation() {
        let propagator = propagator_with_group_sizes(&[2, 2]);

        assert_eq!(propagator.is_entailed(&[0, 1, 0, 3]), Entailment::Violated);
    }

    #[test]
    fn a_value_shared_within_one_group_is_allowed() {
        let propagator = propagator_with_group_sizes(&[2, 2]);

        assert_eq!(
            propagator.is_entailed(&[1, 1, 2, 3]),
            Entailment::Satisfied
        );
    }
}
