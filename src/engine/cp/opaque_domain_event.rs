use super::IntDomainEvent;

/// A domain event delivered to a propagator, together with the value it concerns: the removed
/// value for removal events, the assigned value for assignment events, and the new bound for
/// bound events.
#[derive(Clone, Copy, Debug)]
pub struct OpaqueDomainEvent {
    event: IntDomainEvent,
    value: i32,
}

impl OpaqueDomainEvent {
    pub(crate) fn new(event: IntDomainEvent, value: i32) -> Self {
        OpaqueDomainEvent { event, value }
    }

    pub fn unwrap(self) -> IntDomainEvent {
        self.event
    }

    pub fn value(self) -> i32 {
        self.value
    }
}
