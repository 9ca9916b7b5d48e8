//! Contains the propagator implementations of this crate.
//!
//! See [`crate::engine::cp::propagation`] for the interface propagators are written against.

pub mod disjoint_groups;

pub use disjoint_groups::DisjointGroupsPropagator;
