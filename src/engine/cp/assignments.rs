use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::engine::cp::event_sink::EventSink;
use crate::engine::cp::propagation::PropagatorId;
use crate::engine::cp::DomainEventNotification;
use crate::engine::cp::IntDomainEvent;
use crate::engine::variables::DomainId;
use crate::stapel_assert_eq_simple;
use crate::stapel_assert_moderate;
use crate::stapel_assert_simple;

/// The central store of variable domains.
///
/// Every mutation is pushed onto a trail together with the bounds it replaced;
/// [`Assignments::synchronise`] rewinds the trail when the host backtracks. Each mutation also
/// records domain events in an internal sink, which the host drains to notify watching
/// propagators. A mutation carries the id of the propagator that caused it (if any), so that a
/// propagator is never notified of its own changes.
#[derive(Clone, Default, Debug)]
pub struct Assignments {
    trail: Trail<ConstraintProgrammingTrailEntry>,
    domains: KeyedVec<DomainId, IntegerDomainExplicit>,
    events: EventSink,
}

/// Signals that a domain operation left a variable without any admissible value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

impl Assignments {
    pub fn increase_decision_level(&mut self) {
        self.trail.increase_decision_level()
    }

    pub fn get_decision_level(&self) -> usize {
        self.trail.get_decision_level()
    }

    pub fn num_domains(&self) -> u32 {
        self.domains.len() as u32
    }

    pub fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    /// Register the domain of a new integer variable with the given bounds.
    pub fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        let id = DomainId::new(self.num_domains());

        let stored_id = self
            .domains
            .push(IntegerDomainExplicit::new(lower_bound, upper_bound, id));
        stapel_assert_eq_simple!(stored_id, id);

        self.events.grow();

        id
    }

    pub fn drain_domain_events(&mut self) -> impl Iterator<Item = DomainEventNotification> + '_ {
        self.events.drain()
    }
}

// methods for getting info about the domains
impl Assignments {
    pub fn get_lower_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].lower_bound
    }

    pub fn get_upper_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].upper_bound
    }

    pub fn is_value_in_domain(&self, domain_id: DomainId, value: i32) -> bool {
        self.domains[domain_id].contains(value)
    }

    pub fn is_domain_assigned(&self, domain_id: DomainId) -> bool {
        self.get_lower_bound(domain_id) == self.get_upper_bound(domain_id)
    }

    pub fn is_domain_assigned_to_value(&self, domain_id: DomainId, value: i32) -> bool {
        self.is_domain_assigned(domain_id) && self.get_lower_bound(domain_id) == value
    }

    pub fn get_assigned_value(&self, domain_id: DomainId) -> i32 {
        stapel_assert_simple!(self.is_domain_assigned(domain_id));
        self.domains[domain_id].lower_bound
    }

    pub fn get_domain_iterator(&self, domain_id: DomainId) -> impl Iterator<Item = i32> + '_ {
        let domain = &self.domains[domain_id];
        (domain.lower_bound..=domain.upper_bound).filter(move |&value| domain.contains(value))
    }
}

// methods to change the domains
impl Assignments {
    pub fn tighten_lower_bound(
        &mut self,
        domain_id: DomainId,
        new_lower_bound: i32,
        cause: Option<PropagatorId>,
    ) -> Result<(), EmptyDomain> {
        if new_lower_bound <= self.get_lower_bound(domain_id) {
            return self.domains[domain_id].verify_consistency();
        }

        self.trail.push(ConstraintProgrammingTrailEntry {
            domain_id,
            change: DomainChange::LowerBound,
            old_lower_bound: self.get_lower_bound(domain_id),
            old_upper_bound: self.get_upper_bound(domain_id),
        });

        let domain = &mut self.domains[domain_id];
        domain.set_lower_bound(new_lower_bound, cause, &mut self.events);

        domain.verify_consistency()
    }

    pub fn tighten_upper_bound(
        &mut self,
        domain_id: DomainId,
        new_upper_bound: i32,
        cause: Option<PropagatorId>,
    ) -> Result<(), EmptyDomain> {
        if new_upper_bound >= self.get_upper_bound(domain_id) {
            return self.domains[domain_id].verify_consistency();
        }

        self.trail.push(ConstraintProgrammingTrailEntry {
            domain_id,
            change: DomainChange::UpperBound,
            old_lower_bound: self.get_lower_bound(domain_id),
            old_upper_bound: self.get_upper_bound(domain_id),
        });

        let domain = &mut self.domains[domain_id];
        domain.set_upper_bound(new_upper_bound, cause, &mut self.events);

        domain.verify_consistency()
    }

    pub fn make_assignment(
        &mut self,
        domain_id: DomainId,
        assigned_value: i32,
        cause: Option<PropagatorId>,
    ) -> Result<(), EmptyDomain> {
        stapel_assert_moderate!(!self.is_domain_assigned_to_value(domain_id, assigned_value));

        // only tighten the lower bound if needed
        if self.get_lower_bound(domain_id) < assigned_value {
            self.tighten_lower_bound(domain_id, assigned_value, cause)?;
        }

        // only tighten the upper bound if needed
        if self.get_upper_bound(domain_id) > assigned_value {
            self.tighten_upper_bound(domain_id, assigned_value, cause)?;
        }

        self.domains[domain_id].verify_consistency()
    }

    pub fn remove_value_from_domain(
        &mut self,
        domain_id: DomainId,
        removed_value: i32,
        cause: Option<PropagatorId>,
    ) -> Result<(), EmptyDomain> {
        if !self.domains[domain_id].contains(removed_value) {
            return self.domains[domain_id].verify_consistency();
        }

        self.trail.push(ConstraintProgrammingTrailEntry {
            domain_id,
            change: DomainChange::Removal(removed_value),
            old_lower_bound: self.get_lower_bound(domain_id),
            old_upper_bound: self.get_upper_bound(domain_id),
        });

        let domain = &mut self.domains[domain_id];
        domain.remove_value(removed_value, cause, &mut self.events);

        domain.verify_consistency()
    }

    /// Rewind all domain changes recorded after the given decision level. Events which were not
    /// yet drained are discarded; they describe changes that no longer hold.
    pub fn synchronise(&mut self, new_decision_level: usize) {
        self.events.clear();
        self.trail
            .synchronise(new_decision_level)
            .for_each(|entry| self.domains[entry.domain_id].undo_trail_entry(&entry));
    }
}

#[derive(Clone, Copy, Debug)]
struct ConstraintProgrammingTrailEntry {
    domain_id: DomainId,
    change: DomainChange,
    /// Explicitly store the bounds before the change was applied so that undoing an entry when
    /// backtracking is a plain restore.
    old_lower_bound: i32,
    old_upper_bound: i32,
}

#[derive(Clone, Copy, Debug)]
enum DomainChange {
    Removal(i32),
    LowerBound,
    UpperBound,
}

/// The representation of a domain: the current bounds plus a presence flag per value of the
/// initial domain. A value is in the domain iff it lies within the bounds and its flag is set.
///
/// When the domain is in an empty state, `lower_bound > upper_bound` and the presence flags are
/// meaningless.
#[derive(Clone, Debug)]
struct IntegerDomainExplicit {
    id: DomainId,

    lower_bound: i32,
    upper_bound: i32,
    offset: i32,

    is_value_in_domain: Box<[bool]>,
}

impl IntegerDomainExplicit {
    fn new(lower_bound: i32, upper_bound: i32, id: DomainId) -> IntegerDomainExplicit {
        stapel_assert_simple!(lower_bound <= upper_bound, "cannot create an empty domain");

        let size = upper_bound - lower_bound + 1;
        let is_value_in_domain = vec![true; size as usize];

        let offset = -lower_bound;

        IntegerDomainExplicit {
            id,
            lower_bound,
            upper_bound,
            offset,
            is_value_in_domain: is_value_in_domain.into(),
        }
    }

    fn contains(&self, value: i32) -> bool {
        self.lower_bound <= value
            && value <= self.upper_bound
            && self.is_value_in_domain[self.get_index(value)]
    }

    fn remove_value(&mut self, removed_value: i32, cause: Option<PropagatorId>, events: &mut EventSink) {
        let idx = self.get_index(removed_value);
        self.is_value_in_domain[idx] = false;

        events.event_occurred(IntDomainEvent::Removal, self.id, removed_value, cause);

        if removed_value == self.lower_bound {
            self.lower_bound += 1;
            self.advance_lower_bound_past_holes();
            events.event_occurred(IntDomainEvent::LowerBound, self.id, self.lower_bound, cause);
        }

        if removed_value == self.upper_bound {
            self.upper_bound -= 1;
            self.retreat_upper_bound_past_holes();
            events.event_occurred(IntDomainEvent::UpperBound, self.id, self.upper_bound, cause);
        }

        if self.lower_bound == self.upper_bound {
            events.event_occurred(IntDomainEvent::Assign, self.id, self.lower_bound, cause);
        }
    }

    fn set_lower_bound(
        &mut self,
        new_lower_bound: i32,
        cause: Option<PropagatorId>,
        events: &mut EventSink,
    ) {
        if new_lower_bound <= self.lower_bound {
            return;
        }

        // Every individual value that leaves the domain is reported, so that watchers tracking
        // per-value state observe bound tightenings with the same granularity as removals.
        let end = new_lower_bound.min(self.upper_bound + 1);
        for value in self.lower_bound..end {
            if self.is_value_in_domain[self.get_index(value)] {
                events.event_occurred(IntDomainEvent::Removal, self.id, value, cause);
            }
        }

        self.lower_bound = new_lower_bound;
        self.advance_lower_bound_past_holes();
        events.event_occurred(IntDomainEvent::LowerBound, self.id, self.lower_bound, cause);

        if self.lower_bound == self.upper_bound {
            events.event_occurred(IntDomainEvent::Assign, self.id, self.lower_bound, cause);
        }
    }

    fn set_upper_bound(
        &mut self,
        new_upper_bound: i32,
        cause: Option<PropagatorId>,
        events: &mut EventSink,
    ) {
        if new_upper_bound >= self.upper_bound {
            return;
        }

        let start = (new_upper_bound + 1).max(self.lower_bound);
        for value in start..=self.upper_bound {
            if self.is_value_in_domain[self.get_index(value)] {
                events.event_occurred(IntDomainEvent::Removal, self.id, value, cause);
            }
        }

        self.upper_bound = new_upper_bound;
        self.retreat_upper_bound_past_holes();
        events.event_occurred(IntDomainEvent::UpperBound, self.id, self.upper_bound, cause);

        if self.lower_bound == self.upper_bound {
            events.event_occurred(IntDomainEvent::Assign, self.id, self.lower_bound, cause);
        }
    }

    fn advance_lower_bound_past_holes(&mut self) {
        while self.lower_bound <= self.upper_bound
            && !self.is_value_in_domain[self.get_index(self.lower_bound)]
        {
            self.lower_bound += 1;
        }
    }

    fn retreat_upper_bound_past_holes(&mut self) {
        while self.lower_bound <= self.upper_bound
            && !self.is_value_in_domain[self.get_index(self.upper_bound)]
        {
            self.upper_bound -= 1;
        }
    }

    fn get_index(&self, value: i32) -> usize {
        (value + self.offset) as usize
    }

    fn verify_consistency(&self) -> Result<(), EmptyDomain> {
        if self.lower_bound > self.upper_bound {
            Err(EmptyDomain)
        } else {
            Ok(())
        }
    }

    fn undo_trail_entry(&mut self, entry: &ConstraintProgrammingTrailEntry) {
        if let DomainChange::Removal(value) = entry.change {
            let idx = self.get_index(value);
            self.is_value_in_domain[idx] = true;
        }

        self.lower_bound = entry.old_lower_bound;
        self.upper_bound = entry.old_upper_bound;
    }
}
