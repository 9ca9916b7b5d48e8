#![cfg(any(test, doc))]
//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows
//! setting up specific scenarios under which to test the various operations of a propagator,
//! playing the role of the host search engine: it owns the domains and the trailed state,
//! routes domain events to the registered propagators, and drives checkpointing and rollback.
use std::fmt::Debug;
use std::fmt::Formatter;

use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::containers::KeyedVec;
use crate::engine::cp::propagation::EnqueueDecision;
use crate::engine::cp::propagation::PropagationContext;
use crate::engine::cp::propagation::PropagationContextMut;
use crate::engine::cp::propagation::PropagationContextWithTrailedValues;
use crate::engine::cp::propagation::Propagator;
use crate::engine::cp::propagation::PropagatorId;
use crate::engine::cp::propagation::PropagatorInitialisationContext;
use crate::engine::cp::trailed::TrailedValues;
use crate::engine::cp::Assignments;
use crate::engine::cp::EmptyDomain;
use crate::engine::cp::OpaqueDomainEvent;
use crate::engine::cp::WatchListCP;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::stapel_assert_eq_simple;
use crate::stapel_assert_simple;

/// A container for variables, trailed state and propagators, which can be used to test
/// propagators.
#[derive(Default, Debug)]
pub(crate) struct TestSolver {
    pub(crate) assignments: Assignments,
    pub(crate) trailed_values: TrailedValues,
    pub(crate) watch_list: WatchListCP,
    pub(crate) propagator_store: KeyedVec<PropagatorId, Box<dyn Propagator>>,
}

type BoxedPropagator = Box<dyn Propagator>;

impl Debug for BoxedPropagator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "test_helper::Propagator(<boxed value>)")
    }
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lb: i32, ub: i32) -> DomainId {
        self.watch_list.grow();
        self.assignments.grow(lb, ub)
    }

    /// Create a variable whose initial domain holds exactly the given values.
    pub(crate) fn new_sparse_variable(&mut self, values: &[i32]) -> DomainId {
        assert!(
            !values.is_empty(),
            "cannot create a variable with an empty domain"
        );

        let mut values = values.to_vec();
        values.sort_unstable();
        values.dedup();

        let lower_bound = values[0];
        let upper_bound = values[values.len() - 1];

        let domain_id = self.new_variable(lower_bound, upper_bound);

        let mut next_idx = 0;
        for value in lower_bound..=upper_bound {
            if next_idx < values.len() && value == values[next_idx] {
                next_idx += 1;
            } else {
                self.assignments
                    .remove_value_from_domain(domain_id, value, None)
                    .expect("the domain should not be empty");
            }
        }
        stapel_assert_eq_simple!(next_idx, values.len());

        // The removals above shape the initial domain and are not events to be replayed.
        self.assignments.drain_domain_events().for_each(drop);

        domain_id
    }

    pub(crate) fn new_propagator(
        &mut self,
        propagator: impl Propagator + 'static,
    ) -> Result<PropagatorId, Inconsistency> {
        let mut propagator: Box<dyn Propagator> = Box::new(propagator);
        let id = PropagatorId(self.propagator_store.len() as u32);

        propagator.initialise_at_root(&mut PropagatorInitialisationContext::new(
            &mut self.watch_list,
            &mut self.trailed_values,
            id,
            &self.assignments,
        ))?;

        let stored_id = self.propagator_store.push(propagator);
        stapel_assert_eq_simple!(stored_id, id);

        self.propagate_until_fixed_point(id)?;

        Ok(id)
    }

    pub(crate) fn contains<Var: IntegerVariable>(&self, var: Var, value: i32) -> bool {
        var.contains(&self.assignments, value)
    }

    pub(crate) fn lower_bound(&self, var: DomainId) -> i32 {
        self.assignments.get_lower_bound(var)
    }

    pub(crate) fn upper_bound(&self, var: DomainId) -> i32 {
        self.assignments.get_upper_bound(var)
    }

    pub(crate) fn is_fixed(&self, var: DomainId) -> bool {
        self.assignments.is_domain_assigned(var)
    }

    pub(crate) fn remove(&mut self, var: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.assignments.remove_value_from_domain(var, value, None)
    }

    pub(crate) fn assign(&mut self, var: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.assignments.make_assignment(var, value, None)
    }

    pub(crate) fn increase_decision_level(&mut self) {
        self.assignments.increase_decision_level();
        self.trailed_values.increase_decision_level();
    }

    /// Backtrack to the given decision level: domains and trailed state are rewound, and every
    /// propagator is synchronised so it can discard non-trailed scratch state.
    pub(crate) fn synchronise(&mut self, decision_level: usize) {
        stapel_assert_simple!(decision_level < self.assignments.get_decision_level());

        self.assignments.synchronise(decision_level);
        self.trailed_values.synchronise(decision_level);

        for propagator in self.propagator_store.iter_mut() {
            propagator.synchronise(PropagationContext::new(&self.assignments));
        }
    }

    /// Deliver all pending domain events to the propagators watching them, skipping the
    /// propagator that caused an event. Returns the propagators that requested to be enqueued.
    pub(crate) fn notify_propagators(&mut self) -> Vec<PropagatorId> {
        let mut enqueued = Vec::new();

        let notifications = self.assignments.drain_domain_events().collect::<Vec<_>>();
        for notification in notifications {
            let watchers = self
                .watch_list
                .get_affected_propagators(notification.event, notification.domain)
                .to_vec();

            for propagator_var in watchers {
                if notification.cause == Some(propagator_var.propagator) {
                    continue;
                }

                let context = PropagationContextWithTrailedValues::new(
                    &mut self.trailed_values,
                    &self.assignments,
                );
                let decision = self.propagator_store[propagator_var.propagator].notify(
                    context,
                    propagator_var.variable,
                    OpaqueDomainEvent::new(notification.event, notification.value),
                );

                if decision == EnqueueDecision::Enqueue
                    && !enqueued.contains(&propagator_var.propagator)
                {
                    enqueued.push(propagator_var.propagator);
                }
            }
        }

        enqueued
    }

    pub(crate) fn propagate(&mut self, propagator: PropagatorId) -> PropagationStatusCP {
        let context = PropagationContextMut::new(
            &mut self.trailed_values,
            &mut self.assignments,
            propagator,
        );
        self.propagator_store[propagator].propagate(context)
    }

    pub(crate) fn propagate_until_fixed_point(
        &mut self,
        propagator: PropagatorId,
    ) -> PropagationStatusCP {
        let mut num_trail_entries = self.assignments.num_trail_entries();
        let _ = self.notify_propagators();
        loop {
            self.propagate(propagator)?;
            let _ = self.notify_propagators();

            if self.assignments.num_trail_entries() == num_trail_entries {
                break;
            }
            num_trail_entries = self.assignments.num_trail_entries();
        }
        Ok(())
    }

    pub(crate) fn assert_bounds(&self, var: DomainId, lb: i32, ub: i32) {
        let actual_lb = self.lower_bound(var);
        let actual_ub = self.upper_bound(var);

        assert_eq!(
            (lb, ub), (actual_lb, actual_ub),
            "The expected bounds [{lb}..{ub}] did not match the actual bounds [{actual_lb}..{actual_ub}]"
        );
    }

    pub(crate) fn assert_domain(&self, var: DomainId, domain: Vec<i32>) {
        if domain.is_empty() {
            panic!("Domain provided to test solver is empty");
        }
        let min_domain = *domain.iter().min().unwrap();
        let max_domain = *domain.iter().max().unwrap();

        self.assert_bounds(var, min_domain, max_domain);
        for value in min_domain..=max_domain {
            if !domain.contains(&value) {
                assert!(
                    !self.contains(var, value),
                    "{value} was in the domain while it should not be (provided domain {domain:?})"
                )
            } else {
                assert!(
                    self.contains(var, value),
                    "{value} was not in the domain while it should be (provided domain {domain:?})"
                )
            }
        }
    }
}
