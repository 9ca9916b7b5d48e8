use enumset::EnumSet;

use crate::containers::KeyedVec;
use crate::engine::cp::propagation::PropagatorId;
use crate::engine::cp::IntDomainEvent;
use crate::engine::variables::DomainId;

/// While domains are mutated, the changes are captured as events in the event sink. When
/// propagation for the round is done, the sink is drained to notify the propagators that
/// subscribe to those events.
///
/// Duplicate non-removal events for the same domain are ignored; removal events are kept
/// individually because each one carries a distinct removed value.
#[derive(Default, Clone, Debug)]
pub(crate) struct EventSink {
    present: KeyedVec<DomainId, EnumSet<IntDomainEvent>>,
    events: Vec<DomainEventNotification>,
}

/// A single recorded domain event, including the value it concerns and the propagator which
/// caused it (if the change was a propagation rather than an external decision).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainEventNotification {
    pub event: IntDomainEvent,
    pub domain: DomainId,
    pub value: i32,
    pub cause: Option<PropagatorId>,
}

impl EventSink {
    pub(crate) fn grow(&mut self) {
        let _ = self.present.push(EnumSet::new());
    }

    pub(crate) fn event_occurred(
        &mut self,
        event: IntDomainEvent,
        domain: DomainId,
        value: i32,
        cause: Option<PropagatorId>,
    ) {
        if event != IntDomainEvent::Removal {
            if self.present[domain].contains(event) {
                // The event was already triggered.
                return;
            }
            let _ = self.present[domain].insert(event);
        }

        self.events.push(DomainEventNotification {
            event,
            domain,
            value,
            cause,
        });
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = DomainEventNotification> + '_ {
        self.events.drain(..).inspect(|notification| {
            let _ = self.present[notification.domain].remove(notification.event);
        })
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
        for present in self.present.iter_mut() {
            *present = EnumSet::new();
        }
    }
}
