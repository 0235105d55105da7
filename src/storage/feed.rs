//! Change subscriptions
//!
//! Tables publish a [`ChangeEvent`] after every successful write. Listeners
//! registered on the [`ChangeFeed`] receive the event synchronously, after
//! the table lock has been released.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::error::FedhaResult;

/// Kind of write that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single row change
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub kind: ChangeKind,
    /// The row after the change (before it, for deletes)
    pub row: serde_json::Value,
}

/// Receives change events for the tables it cares about
pub trait ChangeListener: Send + Sync {
    /// Tables and change kinds this listener wants; everything else is skipped
    fn wants(&self, table: &str, kind: ChangeKind) -> bool;

    fn on_change(&self, event: &ChangeEvent) -> FedhaResult<()>;
}

/// Fan-out point shared by every table of a store
#[derive(Default)]
pub struct ChangeFeed {
    listeners: RwLock<Vec<Arc<dyn ChangeListener>>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn ChangeListener>) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push(listener);
        }
    }

    /// Deliver an event. Listener failures are logged, never returned: a
    /// write that already succeeded is not undone by a failing subscriber.
    pub fn publish(&self, event: ChangeEvent) {
        let listeners = match self.listeners.read() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };

        for listener in listeners
            .iter()
            .filter(|l| l.wants(event.table, event.kind))
        {
            if let Err(e) = listener.on_change(&event) {
                tracing::warn!(table = event.table, error = %e, "change listener failed");
            }
        }
    }
}
