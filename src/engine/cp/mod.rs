mod assignments;
pub mod domain_events;
mod event_sink;
mod opaque_domain_event;
pub mod propagation;
pub mod trailed;
mod watch_list_cp;

pub use assignments::Assignments;
pub use assignments::EmptyDomain;
pub use domain_events::DomainEvents;
pub use domain_events::IntDomainEvent;
pub use event_sink::DomainEventNotification;
pub(crate) use event_sink::EventSink;
pub use opaque_domain_event::OpaqueDomainEvent;
pub use watch_list_cp::WatchListCP;
pub use watch_list_cp::Watchers;
