//! Variables which propagators can read and prune through the domain store.

mod domain_id;
mod integer_variable;

pub use domain_id::DomainId;
pub use integer_variable::IntegerVariable;
