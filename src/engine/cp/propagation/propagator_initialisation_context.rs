use super::PropagationContext;
use super::PropagatorId;
use super::PropagatorVarId;
use super::ReadDomains;
use crate::engine::cp::propagation::LocalId;
use crate::engine::cp::trailed::TrailedValues;
use crate::engine::cp::Assignments;
use crate::engine::cp::DomainEvents;
use crate::engine::cp::WatchListCP;
use crate::engine::cp::Watchers;
use crate::engine::variables::IntegerVariable;

/// [`PropagatorInitialisationContext`] is used when propagators are initialised after creation.
///
/// Propagators use it to register to domain changes of variables and to allocate the trailed
/// state they maintain during search.
#[derive(Debug)]
pub struct PropagatorInitialisationContext<'a> {
    watch_list: &'a mut WatchListCP,
    pub(crate) trailed_values: &'a mut TrailedValues,
    propagator_id: PropagatorId,

    pub(crate) assignments: &'a Assignments,
}

impl PropagatorInitialisationContext<'_> {
    pub fn new<'a>(
        watch_list: &'a mut WatchListCP,
        trailed_values: &'a mut TrailedValues,
        propagator_id: PropagatorId,
        assignments: &'a Assignments,
    ) -> PropagatorInitialisationContext<'a> {
        PropagatorInitialisationContext {
            watch_list,
            trailed_values,
            propagator_id,
            assignments,
        }
    }

    pub fn as_readonly(&self) -> PropagationContext<'_> {
        PropagationContext::new(self.assignments)
    }

    /// Subscribes the propagator to the given [`DomainEvents`] of the variable.
    ///
    /// The domain events determine when `Propagator::notify()` will be called on the propagator.
    /// The [`LocalId`] identifies the variable within the propagator when it is notified; each
    /// variable *must* have a unique [`LocalId`], most often its index in the propagator's
    /// internal array of variables.
    ///
    /// Variables which are already fixed at registration time never change and are not watched.
    pub fn register<Var: IntegerVariable>(
        &mut self,
        var: Var,
        domain_events: DomainEvents,
        local_id: LocalId,
    ) -> Var {
        if PropagationContext::new(self.assignments).is_fixed(&var) {
            return var;
        }

        let propagator_var = PropagatorVarId {
            propagator: self.propagator_id,
            variable: local_id,
        };

        let mut watchers = Watchers::new(propagator_var, self.watch_list);
        var.watch_all(&mut watchers, domain_events.get_int_events());

        var
    }
}
