//! Periodic drivers for intraday jitter and year-boundary checks.

use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::simulation_settings::TickIntervals;

/// Work performed on each tick.
#[async_trait]
pub trait TickTarget: Send + Sync + 'static {
    async fn on_jitter_tick(&self);
    async fn on_year_check(&self);
}

/// Two background loops bound to one target. Dropping the ticker stops them.
pub struct Ticker {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Ticker {
    /// Must be called from within a tokio runtime.
    pub fn spawn(target: Arc<dyn TickTarget>, intervals: TickIntervals) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let jitter = {
            let target = target.clone();
            let mut shutdown_rx = shutdown_rx.clone();
            tokio::spawn(async move {
                let mut ticks = interval(intervals.jitter);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // The first tick fires immediately.
                ticks.tick().await;
                loop {
                    tokio::select! {
                        _ = ticks.tick() => target.on_jitter_tick().await,
                        _ = shutdown_rx.changed() => break,
                    }
                }
                debug!("Jitter loop stopped");
            })
        };

        let year_check = {
            let mut shutdown_rx = shutdown_rx;
            tokio::spawn(async move {
                let mut ticks = interval(intervals.year_check);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticks.tick().await;
                loop {
                    tokio::select! {
                        _ = ticks.tick() => target.on_year_check().await,
                        _ = shutdown_rx.changed() => break,
                    }
                }
                debug!("Year check loop stopped");
            })
        };

        Self {
            shutdown_tx,
            handles: vec![jitter, year_check],
        }
    }

    /// Signals both loops and waits for them to exit.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
