use serde_json::Value;
use std::collections::BTreeSet;
use tokio::sync::watch;

/// Snapshot of the orchestrator's transient, UI-relevant job state. Never
/// persisted; a process restart clears it.
#[derive(Debug, Clone, Default)]
pub struct JobTracking {
    /// A create+start pair is currently in flight.
    pub generating_report: bool,
    /// Report ids with a results download in progress.
    pub downloading: BTreeSet<String>,
    /// Report ids with an executive-summary poll in progress.
    pub summarizing: BTreeSet<String>,
    /// Payload of the most recently fetched ready summary, if any.
    pub executive_summary: Option<Value>,
}

/// Instance-owned tracking state with a subscribe/observe surface.
/// Mutated only by the orchestrator.
pub struct Tracker {
    tx: watch::Sender<JobTracking>,
}

impl Tracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(JobTracking::default());
        Self { tx }
    }

    /// Observe every state change; receivers see a snapshot per update.
    pub fn subscribe(&self) -> watch::Receiver<JobTracking> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> JobTracking {
        self.tx.borrow().clone()
    }

    pub(crate) fn update<F: FnOnce(&mut JobTracking)>(&self, apply: F) {
        self.tx.send_modify(apply);
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
