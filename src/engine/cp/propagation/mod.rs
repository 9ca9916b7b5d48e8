//! The interface between the host engine and propagator implementations.
//!
//! Propagators interact with the rest of the engine exclusively through context objects: a
//! [`PropagationContextMut`] during propagation, a [`PropagationContextWithTrailedValues`] during
//! notifications, and a [`PropagatorInitialisationContext`] when they are created.

mod local_id;
mod propagation_context;
mod propagator;
mod propagator_id;
mod propagator_initialisation_context;
mod propagator_var_id;

pub use local_id::LocalId;
pub use propagation_context::HasAssignments;
pub use propagation_context::HasTrailedValues;
pub use propagation_context::ManipulateTrailedValues;
pub use propagation_context::PropagationContext;
pub use propagation_context::PropagationContextMut;
pub use propagation_context::PropagationContextWithTrailedValues;
pub use propagation_context::ReadDomains;
pub use propagator::EnqueueDecision;
pub use propagator::Propagator;
pub use propagator_id::PropagatorId;
pub use propagator_initialisation_context::PropagatorInitialisationContext;
pub use propagator_var_id::PropagatorVarId;
