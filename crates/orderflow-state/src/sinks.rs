//! # Stock Observers
//!
//! [`SnapshotRecorder`] keeps every snapshot it receives.
//! [`TracingObserver`] forwards each snapshot to the `tracing` pipeline.

use std::cell::RefCell;
use std::fmt;

use tracing::info;

use orderflow_core::ObserverError;

use crate::observer::Observer;

/// Retains a copy of every snapshot delivered to it, oldest first.
#[derive(Debug)]
pub struct SnapshotRecorder<T> {
    name: String,
    records: RefCell<Vec<T>>,
}

impl<T: Clone> SnapshotRecorder<T> {
    /// An empty recorder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RefCell::new(Vec::new()),
        }
    }

    /// All recorded snapshots.
    pub fn records(&self) -> Vec<T> {
        self.records.borrow().clone()
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Option<T> {
        self.records.borrow().last().cloned()
    }

    /// Number of notifications received.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Whether no notification has been received yet.
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl<T: Clone> Observer<T> for SnapshotRecorder<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, snapshot: T) -> Result<(), ObserverError> {
        self.records.borrow_mut().push(snapshot);
        Ok(())
    }
}

/// Emits one `info` event per notification.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    name: String,
}

impl TracingObserver {
    /// A sink that logs under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<T: fmt::Debug> Observer<T> for TracingObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, snapshot: T) -> Result<(), ObserverError> {
        info!(observer = %self.name, snapshot = ?snapshot, "snapshot received");
        Ok(())
    }
}
