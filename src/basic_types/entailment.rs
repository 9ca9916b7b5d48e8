/// Ternary verdict of evaluating a constraint under a concrete assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entailment {
    /// The assignment satisfies the constraint.
    Satisfied,
    /// The assignment violates the constraint.
    Violated,
    /// The constraint cannot (yet) be decided.
    Unknown,
}
