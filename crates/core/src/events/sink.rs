use std::sync::{Arc, Mutex, MutexGuard};

use super::DomainEvent;

/// Receives events after the mutation behind them has committed.
///
/// Implementations must return quickly. A sink failure never undoes the write.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

#[derive(Clone, Copy, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Records events in memory for assertions.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    recorded: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<DomainEvent>> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.recorded().clone()
    }

    /// Events touching one portfolio, in emission order.
    pub fn events_for(&self, portfolio_id: &str) -> Vec<DomainEvent> {
        self.recorded()
            .iter()
            .filter(|e| e.portfolio_id() == portfolio_id)
            .cloned()
            .collect()
    }

    pub fn take(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.recorded())
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        self.recorded().push(event);
    }
}
