use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::PropagationContext;
use super::PropagationContextMut;
use super::PropagationContextWithTrailedValues;
use super::PropagatorInitialisationContext;
use crate::basic_types::Entailment;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::engine::cp::propagation::LocalId;
use crate::engine::cp::OpaqueDomainEvent;

// We need Downcast to be able to cast a `Box<dyn Propagator>` back to a concrete propagator;
// rust inherently does not allow downcasting from the trait definition to its concrete type.
impl_downcast!(Propagator);

/// All propagators implement the [`Propagator`] trait. Structs implementing the trait define the
/// main propagator logic with regards to propagation and detecting conflicts.
///
/// The only required functions are [`Propagator::name`], [`Propagator::initialise_at_root`], and
/// [`Propagator::propagate`]; all other functions have default implementations.
pub trait Propagator: Downcast {
    /// Return the name of the propagator, this is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// Initialises the propagator without performing propagation. This method is called only once
    /// by the host when the propagator is added.
    ///
    /// The method can be used to allocate trailed state and to register the variables whose
    /// domain events the propagator wants to be notified of (see [`Propagator::notify`]) by
    /// calling [`PropagatorInitialisationContext::register`].
    ///
    /// The host will call this before any call to [`Propagator::propagate`] is made.
    fn initialise_at_root(
        &mut self,
        context: &mut PropagatorInitialisationContext,
    ) -> Result<(), Inconsistency>;

    /// Propagate method that will be called by the host during search.
    ///
    /// This method extends the current partial assignment with inferred domain changes found by
    /// the propagator. In case no conflict has been detected it should return [`Result::Ok`],
    /// otherwise it should return a [`Result::Err`] with an [`Inconsistency`]; either because a
    /// propagation caused an empty domain ([`Inconsistency::EmptyDomain`]) or because the logic
    /// of the propagator found the current state to be inconsistent
    /// ([`Inconsistency::Conflict`]).
    ///
    /// Propagators are not required to propagate until a fixed point. It will be called again by
    /// the host until no further propagations happen.
    fn propagate(&mut self, context: PropagationContextMut) -> PropagationStatusCP;

    /// Called when an event happens to one of the variables the propagator is subscribed to. It
    /// indicates whether the provided event should cause the propagator to be enqueued for
    /// propagation.
    ///
    /// This can be used to incrementally maintain data structures, and should only be used for
    /// computationally cheap logic. Expensive computation should be performed in the
    /// [`Propagator::propagate`] method.
    ///
    /// By default the propagator is always enqueued for every event. Not all propagators will
    /// benefit from implementing this, so it is not required to do so.
    fn notify(
        &mut self,
        _context: PropagationContextWithTrailedValues,
        _local_id: LocalId,
        _event: OpaqueDomainEvent,
    ) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }

    /// Called each time the host backtracks; the propagator can then update its non-trailed
    /// internal data structures given the restored variable domains. Trailed state is rolled
    /// back by the host and must not be touched here.
    ///
    /// By default this function does nothing.
    fn synchronise(&mut self, _context: PropagationContext) {}

    /// Returns the priority of the propagator represented as an integer. Lower values mean
    /// higher priority and the priority determines the order in which propagators will be asked
    /// to propagate. It is custom for simpler propagators to have lower priority values.
    fn priority(&self) -> u32 {
        // setting an arbitrary priority by default
        3
    }

    /// Evaluates the constraint under a concrete assignment, given as one value per registered
    /// variable in flat registration order.
    ///
    /// Callers must only invoke this on fully fixed assignments; the behaviour on partial
    /// assignments is unspecified.
    fn is_entailed(&self, _assignment: &[i32]) -> Entailment {
        Entailment::Unknown
    }
}

/// Indicator of what to do when a propagator is notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}
