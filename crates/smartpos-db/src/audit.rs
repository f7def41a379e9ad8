//! # Audit Recorder
//!
//! Fire-and-forget audit trail.
//!
//! ```text
//! handler / coordinator                       background task
//! ┌──────────────────────┐   bounded mpsc   ┌──────────────────────┐
//! │ AuditRecorder        │ ───────────────► │ AuditWorker::run     │
//! │  .record(entry)      │   try_send       │  AuditLogRepository  │
//! │  (never blocks)      │                  │  .insert(entry)      │
//! └──────────────────────┘                  └──────────────────────┘
//! ```
//!
//! A full or closed channel drops the entry with a `warn` log. The caller's
//! request has already succeeded by then and is never failed by auditing.
//! The worker exits once every recorder clone is dropped.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

use crate::repository::audit::AuditLogRepository;
use smartpos_core::audit::AuditEntry;

/// Cloneable sending half of the audit channel.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditRecorder {
    /// Creates a recorder and the worker that drains it.
    pub fn channel(buffer: usize, storage: AuditLogRepository) -> (AuditRecorder, AuditWorker) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (AuditRecorder { tx }, AuditWorker { storage, rx })
    }

    /// Queues an entry for the worker.
    pub fn record(&self, entry: AuditEntry) {
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                warn!(
                    action = entry.action.as_str(),
                    record_id = entry.record_id,
                    "Audit channel full, entry dropped"
                );
            }
            Err(TrySendError::Closed(entry)) => {
                warn!(
                    action = entry.action.as_str(),
                    record_id = entry.record_id,
                    "Audit worker stopped, entry dropped"
                );
            }
        }
    }
}

/// Receiving half. Spawn [`AuditWorker::run`] once at startup.
pub struct AuditWorker {
    storage: AuditLogRepository,
    rx: mpsc::Receiver<AuditEntry>,
}

impl AuditWorker {
    /// Runs until every [`AuditRecorder`] is dropped.
    pub async fn run(mut self) {
        info!("Audit worker started");

        while let Some(entry) = self.rx.recv().await {
            match self.storage.insert(&entry).await {
                Ok(id) => {
                    debug!(
                        audit_id = id,
                        action = entry.action.as_str(),
                        table = entry.table_name,
                        record_id = entry.record_id,
                        "Audit entry recorded"
                    );
                }
                Err(e) => {
                    error!(error = %e, action = entry.action.as_str(), "Failed to write audit entry");
                }
            }
        }

        info!("Audit channel closed, worker stopping");
    }
}
