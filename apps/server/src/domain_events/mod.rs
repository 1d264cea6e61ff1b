//! Domain events runtime bridge for the web server.
//!
//! Services emit into [`LoggingDomainEventSink`]; a background worker drains
//! the queue and records each event. This is where challenge and badge
//! tracking attach.

mod sink;

pub use sink::LoggingDomainEventSink;
