//! Background monitoring loop.
//!
//! A running monitor owns one tokio task that repeats
//! refresh → evaluate → report at a fixed interval. Stopping is cooperative
//! through a `watch` channel; the bounded join only aborts a task that did
//! not observe the signal in time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use simhome_domain::event::EventKind;

use crate::automation_engine::AutomationEngine;
use crate::home::Home;
use crate::ports::{DeviceGateway, EventPublisher};

/// Timing of the monitoring loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Pause between two cycles.
    pub interval: Duration,
    /// How long `stop` waits for the task before aborting it.
    pub stop_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            stop_timeout: Duration::from_secs(1),
        }
    }
}

struct Running {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Stopped/running state machine around the monitoring task.
pub struct Monitor {
    config: MonitorConfig,
    running: Option<Running>,
}

impl Monitor {
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> MonitorConfig {
        self.config
    }

    /// Whether a monitoring task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Spawn the monitoring task. Returns `false` (and does nothing) when a
    /// task is already running.
    pub fn start<G, P>(&mut self, home: Arc<Mutex<Home<G>>>, engine: Arc<AutomationEngine<P>>) -> bool
    where
        G: DeviceGateway + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        if self.is_running() {
            tracing::warn!("monitoring already running");
            return false;
        }

        let (cancel, signal) = watch::channel(false);
        let interval = self.config.interval;
        let handle = tokio::spawn(run_loop(home, engine, interval, signal));
        self.running = Some(Running { cancel, handle });
        tracing::info!(interval_ms = interval.as_millis(), "monitoring started");
        true
    }

    /// Signal the task to stop and wait for it. Returns `false` when nothing
    /// was running.
    pub async fn stop(&mut self) -> bool {
        let Some(Running { cancel, mut handle }) = self.running.take() else {
            return false;
        };

        // the receiver is gone when the task already exited
        let _ = cancel.send(true);
        match tokio::time::timeout(self.config.stop_timeout, &mut handle).await {
            Ok(Ok(())) => tracing::info!("monitoring stopped"),
            Ok(Err(err)) => tracing::warn!(error = %err, "monitoring task ended abnormally"),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.stop_timeout.as_millis(),
                    "monitoring task did not stop in time, aborting"
                );
                handle.abort();
            }
        }
        true
    }
}

async fn run_loop<G, P>(
    home: Arc<Mutex<Home<G>>>,
    engine: Arc<AutomationEngine<P>>,
    interval: Duration,
    mut cancel: watch::Receiver<bool>,
) where
    G: DeviceGateway,
    P: EventPublisher,
{
    engine.announce(EventKind::MonitoringStarted).await;

    loop {
        if *cancel.borrow_and_update() {
            break;
        }

        {
            let mut home = home.lock().await;
            let outcome = engine.run_cycle(&mut home).await;
            tracing::debug!(
                fired = outcome.fired.len(),
                dispatched = outcome.dispatched,
                failed = outcome.failed,
                "monitoring cycle done"
            );
        }

        tokio::select! {
            changed = cancel.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            () = tokio::time::sleep(interval) => {}
        }
    }

    engine.announce(EventKind::MonitoringStopped).await;
}
