#![cfg(test)]

use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::basic_types::DisjointViolation;
use crate::basic_types::Inconsistency;
use crate::engine::cp::propagation::PropagatorId;
use crate::engine::cp::EmptyDomain;
use crate::engine::test_helper::TestSolver;
use crate::engine::variables::DomainId;
use crate::propagators::disjoint_groups::DisjointGroupsPropagator;

fn disjoint(solver: &TestSolver, id: PropagatorId) -> &DisjointGroupsPropagator<DomainId> {
    solver.propagator_store[id]
        .downcast_ref::<DisjointGroupsPropagator<DomainId>>()
        .expect("expected a disjoint groups propagator")
}

/// Two groups of two variables each, all with domain `{0, 1, 2, 3}`.
fn two_groups_of_two(solver: &mut TestSolver) -> (PropagatorId, [DomainId; 4]) {
    let x0 = solver.new_variable(0, 3);
    let x1 = solver.new_variable(0, 3);
    let y0 = solver.new_variable(0, 3);
    let y1 = solver.new_variable(0, 3);

    let propagator = solver
        .new_propagator(DisjointGroupsPropagator::new(
            vec![vec![x0, x1], vec![y0, y1]],
            4,
        ))
        .expect("no conflict at the root");

    (propagator, [x0, x1, y0, y1])
}

#[test]
fn fixing_a_variable_removes_its_value_from_the_other_group() {
    let mut solver = TestSolver::default();
    let (propagator, [x0, x1, y0, y1]) = two_groups_of_two(&mut solver);

    solver.assign(x0, 1).expect("1 is in the domain of x0");
    solver
        .propagate_until_fixed_point(propagator)
        .expect("the fixing is consistent");

    assert!(!solver.contains(y0, 1));
    assert!(!solver.contains(y1, 1));
    // Within the group the value stays available.
    assert!(solver.contains(x1, 1));

    let propagator_ref = disjoint(&solver, propagator);
    assert!(propagator_ref.is_claimed(&solver.trailed_values, 0, 1));
    assert!(!propagator_ref.is_claimed(&solver.trailed_values, 1, 1));
    assert_eq!(
        propagator_ref.candidate_count(&solver.trailed_values, 0, 1),
        1
    );
    assert_eq!(
        propagator_ref.candidate_count(&solver.trailed_values, 1, 1),
        0
    );
}

#[test]
fn fixing_a_removed_value_is_rejected_by_the_domain_store() {
    let mut solver = TestSolver::default();
    let (propagator, [x0, _, y0, _]) = two_groups_of_two(&mut solver);

    solver.assign(x0, 1).expect("1 is in the domain of x0");
    solver
        .propagate_until_fixed_point(propagator)
        .expect("the fixing is consistent");

    // The propagation already removed 1 from the other group, so the conflicting fixing
    // cannot even be made.
    assert_eq!(solver.assign(y0, 1), Err(EmptyDomain));
}

#[test]
fn conflicting_fixings_in_one_event_batch_are_a_violation() {
    let mut solver = TestSolver::default();
    let (propagator, [x0, _, y0, _]) = two_groups_of_two(&mut solver);

    solver.assign(x0, 2).expect("2 is in the domain of x0");
    solver.assign(y0, 2).expect("2 is in the domain of y0");

    let result = solver.propagate_until_fixed_point(propagator);

    assert!(matches!(
        result,
        Err(Inconsistency::Conflict(DisjointViolation { value: 2, .. }))
    ));
}

#[test]
fn conflicting_fixings_in_the_initial_domains_are_a_violation() {
    let mut solver = TestSolver::default();
    let x0 = solver.new_variable(1, 1);
    let y0 = solver.new_variable(1, 1);

    let result = solver.new_propagator(DisjointGroupsPropagator::new(
        vec![vec![x0], vec![y0]],
        4,
    ));

    assert!(matches!(
        result,
        Err(Inconsistency::Conflict(DisjointViolation { value: 1, .. }))
    ));
}

#[test]
fn initial_fixings_prune_the_other_groups_before_search() {
    let mut solver = TestSolver::default();
    let x0 = solver.new_variable(2, 2);
    let y0 = solver.new_variable(0, 3);
    let y1 = solver.new_variable(0, 3);

    let _ = solver
        .new_propagator(DisjointGroupsPropagator::new(
            vec![vec![x0], vec![y0, y1]],
            4,
        ))
        .expect("the initial fixing is consistent");

    solver.assert_domain(y0, vec![0, 1, 3]);
    solver.assert_domain(y1, vec![0, 1, 3]);
}

#[test]
fn a_removal_only_updates_the_candidate_counts() {
    let mut solver = TestSolver::default();
    let (propagator, [x0, _, _, _]) = two_groups_of_two(&mut solver);

    {
        let propagator_ref = disjoint(&solver, propagator);
        assert_eq!(
            propagator_ref.candidate_count(&solver.trailed_values, 0, 0),
            2
        );
    }

    solver.remove(x0, 0).expect("0 is in the domain of x0");
    let enqueued = solver.notify_propagators();

    // Removals are bookkeeping only; they never wake up the propagator.
    assert!(enqueued.is_empty());

    let trail_entries = solver.assignments.num_trail_entries();
    solver
        .propagate(propagator)
        .expect("a removal cannot cause a conflict");
    assert_eq!(solver.assignments.num_trail_entries(), trail_entries);

    let propagator_ref = disjoint(&solver, propagator);
    assert_eq!(
        propagator_ref.candidate_count(&solver.trailed_values, 0, 0),
        1
    );
    assert!(!propagator_ref.is_claimed(&solver.trailed_values, 0, 0));
}

#[test]
fn a_second_propagation_without_domain_changes_does_nothing() {
    let mut solver = TestSolver::default();
    let (propagator, [x0, _, _, _]) = two_groups_of_two(&mut solver);

    solver.assign(x0, 1).expect("1 is in the domain of x0");
    solver
        .propagate_until_fixed_point(propagator)
        .expect("the fixing is consistent");

    let trail_entries = solver.assignments.num_trail_entries();
    solver
        .propagate(propagator)
        .expect("no new domain changes to propagate");
    assert_eq!(solver.assignments.num_trail_entries(), trail_entries);
}

#[test]
fn a_forced_singleton_cascades_through_the_groups() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 2);
    let y = solver.new_sparse_variable(&[0, 1]);
    let z = solver.new_sparse_variable(&[1, 2]);

    let propagator = solver
        .new_propagator(DisjointGroupsPropagator::new(
            vec![vec![x], vec![y], vec![z]],
            3,
        ))
        .expect("no conflict at the root");

    solver.assign(x, 0).expect("0 is in the domain of x");
    solver
        .propagate_until_fixed_point(propagator)
        .expect("the cascade is consistent");

    // Losing 0 forces y to 1, which in turn forces z to 2.
    solver.assert_bounds(y, 1, 1);
    solver.assert_bounds(z, 2, 2);

    let propagator_ref = disjoint(&solver, propagator);
    assert!(propagator_ref.is_claimed(&solver.trailed_values, 0, 0));
    assert!(propagator_ref.is_claimed(&solver.trailed_values, 1, 1));
    assert!(propagator_ref.is_claimed(&solver.trailed_values, 2, 2));
}

#[test]
fn a_cascade_into_an_exhausted_domain_is_a_violation() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 2);
    let y = solver.new_sparse_variable(&[0, 1]);
    let z = solver.new_sparse_variable(&[0, 1]);

    let propagator = solver
        .new_propagator(DisjointGroupsPropagator::new(
            vec![vec![x], vec![y], vec![z]],
            3,
        ))
        .expect("no conflict at the root");

    // Claiming 0 for the first group forces both y and z to 1, which no two groups may share.
    solver.assign(x, 0).expect("0 is in the domain of x");
    let result = solver.propagate_until_fixed_point(propagator);

    assert!(matches!(
        result,
        Err(Inconsistency::Conflict(DisjointViolation { value: 1, .. }))
    ));
}

#[test]
fn backtracking_restores_the_claims_and_the_domains() {
    let mut solver = TestSolver::default();
    let (propagator, [x0, _, y0, y1]) = two_groups_of_two(&mut solver);

    solver.increase_decision_level();

    solver.assign(x0, 1).expect("1 is in the domain of x0");
    solver
        .propagate_until_fixed_point(propagator)
        .expect("the fixing is consistent");

    assert!(!solver.contains(y0, 1));
    assert!(disjoint(&solver, propagator).is_claimed(&solver.trailed_values, 0, 1));

    solver.synchronise(0);

    assert!(solver.contains(y0, 1));
    assert!(solver.contains(y1, 1));
    let propagator_ref = disjoint(&solver, propagator);
    assert!(!propagator_ref.is_claimed(&solver.trailed_values, 0, 1));
    assert_eq!(
        propagator_ref.candidate_count(&solver.trailed_values, 0, 1),
        2
    );
    assert_eq!(
        propagator_ref.candidate_count(&solver.trailed_values, 1, 1),
        2
    );
}

#[test]
fn after_backtracking_the_other_group_can_take_the_value() {
    let mut solver = TestSolver::default();
    let (propagator, [x0, x1, y0, _]) = two_groups_of_two(&mut solver);

    solver.increase_decision_level();
    solver.assign(x0, 1).expect("1 is in the domain of x0");
    solver
        .propagate_until_fixed_point(propagator)
        .expect("the fixing is consistent");

    solver.synchronise(0);

    // The claim from the abandoned branch must not linger.
    solver.assign(y0, 1).expect("1 is back in the domain of y0");
    solver
        .propagate_until_fixed_point(propagator)
        .expect("the fixing is consistent after backtracking");

    assert!(!solver.contains(x0, 1));
    assert!(!solver.contains(x1, 1));
    assert!(disjoint(&solver, propagator).is_claimed(&solver.trailed_values, 1, 1));
}

fn check_state(
    solver: &TestSolver,
    propagator: PropagatorId,
    groups: &[Vec<DomainId>],
    nb_values: i32,
) {
    let propagator_ref = disjoint(solver, propagator);

    for (group, members) in groups.iter().enumerate() {
        for value in 0..nb_values {
            let expected_candidates = members
                .iter()
                .filter(|&&var| !solver.is_fixed(var) && solver.contains(var, value))
                .count() as i64;
            assert_eq!(
                propagator_ref.candidate_count(&solver.trailed_values, group, value),
                expected_candidates,
                "candidate count mismatch for group {group} and value {value}"
            );

            let expected_claimed = members
                .iter()
                .any(|&var| solver.is_fixed(var) && solver.lower_bound(var) == value);
            assert_eq!(
                propagator_ref.is_claimed(&solver.trailed_values, group, value),
                expected_claimed,
                "claimed bit mismatch for group {group} and value {value}"
            );
        }
    }
}

#[test]
fn candidate_counts_track_the_domains_under_random_events() {
    let mut rng = SmallRng::seed_from_u64(42);

    let mut solver = TestSolver::default();
    let groups = (0..3)
        .map(|_| (0..2).map(|_| solver.new_variable(0, 5)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let all_variables = groups.iter().flatten().copied().collect::<Vec<_>>();

    let propagator = solver
        .new_propagator(DisjointGroupsPropagator::new(groups.clone(), 6))
        .expect("no conflict at the root");

    check_state(&solver, propagator, &groups, 6);

    for _ in 0..200 {
        let level_before = solver.assignments.get_decision_level();
        solver.increase_decision_level();

        let var = all_variables[rng.gen_range(0..all_variables.len())];
        let domain = solver.assignments.get_domain_iterator(var).collect::<Vec<_>>();

        let result = if rng.gen_bool(0.5) && domain.len() > 1 {
            let value = domain[rng.gen_range(0..domain.len())];
            solver
                .remove(var, value)
                .expect("removing from a non-singleton domain cannot fail");
            solver.propagate_until_fixed_point(propagator)
        } else if !solver.is_fixed(var) {
            let value = domain[rng.gen_range(0..domain.len())];
            solver
                .assign(var, value)
                .expect("assigning a value from the domain cannot fail");
            solver.propagate_until_fixed_point(propagator)
        } else {
            Ok(())
        };

        match result {
            Ok(()) => check_state(&solver, propagator, &groups, 6),
            Err(_) => {
                // The branch is infeasible; backtrack and verify that the state is restored.
                solver.synchronise(level_before);
                check_state(&solver, propagator, &groups, 6);
            }
        }
    }
}
