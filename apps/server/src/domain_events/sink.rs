use std::sync::Mutex;

use simvest_core::events::{DomainEvent, DomainEventSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Queues domain events for a background logging worker.
///
/// `emit()` never blocks. Events sent before `start_worker()` are buffered.
pub struct LoggingDomainEventSink {
    tx: mpsc::UnboundedSender<DomainEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<DomainEvent>>>,
}

impl LoggingDomainEventSink {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Spawns the worker. Returns `None` if it is already running.
    pub fn start_worker(&self) -> Option<JoinHandle<()>> {
        let mut rx = self
            .rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()?;
        Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                log_event(&event);
            }
            tracing::debug!("Domain event worker stopped");
        }))
    }
}

impl Default for LoggingDomainEventSink {
    fn default() -> Self {
        Self::new()
    }
}

fn log_event(event: &DomainEvent) {
    let payload = serde_json::to_string(event).unwrap_or_else(|_| format!("{:?}", event));
    match event {
        DomainEvent::SimulationEnded { .. } | DomainEvent::PortfolioReset { .. } => {
            tracing::info!(portfolio_id = %event.portfolio_id(), "domain event: {}", payload)
        }
        _ => tracing::debug!(portfolio_id = %event.portfolio_id(), "domain event: {}", payload),
    }
}

impl DomainEventSink for LoggingDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Domain event dropped: worker is gone");
        }
    }
}
