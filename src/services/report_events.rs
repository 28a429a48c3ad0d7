use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::models::report::ReportKind;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportChange {
    Created,
    Signed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEvent {
    pub kind: ReportKind,
    pub id: String,
    pub change: ReportChange,
}

/// Fan-out of committed report mutations to whoever is drawing them.
#[derive(Debug, Clone)]
pub struct ReportEventBus {
    sender: broadcast::Sender<ReportEvent>,
}

impl ReportEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReportEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishing with nobody listening is fine.
    pub fn publish(&self, kind: ReportKind, id: impl Into<String>, change: ReportChange) {
        let event = ReportEvent {
            kind,
            id: id.into(),
            change,
        };
        trace!(target: "app::reports", ?event, "publishing report event");
        let _ = self.sender.send(event);
    }
}

impl Default for ReportEventBus {
    fn default() -> Self {
        Self::new()
    }
}
