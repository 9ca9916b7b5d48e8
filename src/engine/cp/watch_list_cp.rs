use enumset::EnumSet;

use crate::containers::KeyedVec;
use crate::engine::cp::propagation::PropagatorVarId;
use crate::engine::cp::IntDomainEvent;
use crate::engine::variables::DomainId;

/// Routes domain events on variables to the propagators watching them.
#[derive(Default, Debug)]
pub struct WatchListCP {
    watchers: KeyedVec<DomainId, WatcherCP>,
}

#[derive(Default, Debug, Clone)]
struct WatcherCP {
    assign_watchers: Vec<PropagatorVarId>,
    lower_bound_watchers: Vec<PropagatorVarId>,
    upper_bound_watchers: Vec<PropagatorVarId>,
    removal_watchers: Vec<PropagatorVarId>,
}

impl WatchListCP {
    pub fn grow(&mut self) {
        let _ = self.watchers.push(WatcherCP::default());
    }

    pub fn num_domains(&self) -> u32 {
        self.watchers.len() as u32
    }

    pub fn get_affected_propagators(
        &self,
        event: IntDomainEvent,
        domain: DomainId,
    ) -> &[PropagatorVarId] {
        let watcher = &self.watchers[domain];

        match event {
            IntDomainEvent::Assign => &watcher.assign_watchers,
            IntDomainEvent::LowerBound => &watcher.lower_bound_watchers,
            IntDomainEvent::UpperBound => &watcher.upper_bound_watchers,
            IntDomainEvent::Removal => &watcher.removal_watchers,
        }
    }
}

/// Used by propagators during initialisation to register for the domain events of the variables
/// in their scope.
#[derive(Debug)]
pub struct Watchers<'a> {
    propagator_var: PropagatorVarId,
    watch_list: &'a mut WatchListCP,
}

impl<'a> Watchers<'a> {
    pub(crate) fn new(propagator_var: PropagatorVarId, watch_list: &'a mut WatchListCP) -> Self {
        Watchers {
            propagator_var,
            watch_list,
        }
    }

    pub fn watch_all(&mut self, domain: DomainId, events: EnumSet<IntDomainEvent>) {
        let watcher = &mut self.watch_list.watchers[domain];

        for event in events {
            let event_watchers = match event {
                IntDomainEvent::Assign => &mut watcher.assign_watchers,
                IntDomainEvent::LowerBound => &mut watcher.lower_bound_watchers,
                IntDomainEvent::UpperBound => &mut watcher.upper_bound_watchers,
                IntDomainEvent::Removal => &mut watcher.removal_watchers,
            };

            if !event_watchers.contains(&self.propagator_var) {
                event_watchers.push(self.propagator_var);
            }
        }
    }
}
