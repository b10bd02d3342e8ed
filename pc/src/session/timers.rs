//! Delayed wizard transitions
//!
//! Step-suggestion banners appear a beat after the assistant reply rather
//! than immediately. Those delays are scheduled on the session's own event
//! loop as tokio tasks whose cancellation is tied to session teardown - a
//! torn-down session can never fire a stale banner.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::WizardStep;

/// Events delivered to the wizard loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// Offer the user a transition to the given step
    SuggestStep(WizardStep),
}

/// Schedules delayed wizard events with teardown-scoped cancellation
pub struct TransitionScheduler {
    tx: mpsc::Sender<WizardEvent>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl TransitionScheduler {
    /// Create a scheduler and the receiving end of its event channel
    pub fn new() -> (Self, mpsc::Receiver<WizardEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, _) = watch::channel(false);
        (
            Self {
                tx,
                shutdown_tx,
                handles: Vec::new(),
            },
            rx,
        )
    }

    /// Schedule an event to fire after `delay`, unless torn down first
    pub fn schedule(&mut self, delay: Duration, event: WizardEvent) {
        debug!(?delay, ?event, "schedule: called");
        let tx = self.tx.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(event).await;
                }
                _ = shutdown_rx.changed() => {
                    debug!("schedule: cancelled by teardown");
                }
            }
        });

        self.handles.retain(|h| !h.is_finished());
        self.handles.push(handle);
    }

    /// Cancel all pending events
    pub fn teardown(&mut self) {
        debug!(pending = self.handles.len(), "teardown: called");
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for TransitionScheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}
