//! Typed broadcast bus for panel lifecycle events.
//!
//! The panel manager publishes shown/closed events for every scanner panel.
//! Interested panels hold a [`Subscription`]; dropping it deregisters.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const BUS_CAPACITY: usize = 64;

/// Identity of a panel. Compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelEvent {
    Shown(PanelId),
    Closed(PanelId),
}

#[derive(Debug, Clone)]
pub struct PanelBus {
    tx: broadcast::Sender<PanelEvent>,
}

impl Default for PanelBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        PanelBus { tx }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: PanelEvent) {
        match self.tx.send(event) {
            Ok(n) => debug!("Published {:?} to {} subscribers", event, n),
            Err(_) => debug!("Published {:?} with no subscribers", event),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiving end of the bus.
pub struct Subscription {
    rx: broadcast::Receiver<PanelEvent>,
}

impl Subscription {
    /// Wait for the next event. Returns None once the bus is gone.
    pub async fn recv(&mut self) -> Option<PanelEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Panel bus subscriber lagged, {} events dropped", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<PanelEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Panel bus subscriber lagged, {} events dropped", n);
                }
                Err(_) => return None,
            }
        }
    }
}
