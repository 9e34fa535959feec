use std::sync::Arc;

use common::models::PredictionLog;
use tokio::sync::Mutex;
use tracing::warn;

use crate::persistence::SnapshotPersistence;

/// Namespace of the single record holding the serialized log sequence.
pub const SNAPSHOT_KEY: &str = "prediction_logs";

/// Keyed record of every prediction issued. At most one entry exists per
/// date; re-predicting a date replaces the entry in place without moving it.
///
/// The store is the sole owner of its entries; readers get clones. All
/// mutations run under one lock, so concurrent upserts for the same date are
/// last-writer-wins with no interleaved partial writes.
pub struct LogStore {
    entries: Mutex<Vec<PredictionLog>>,
    persistence: Arc<dyn SnapshotPersistence>,
}

impl LogStore {
    /// Loads the persisted snapshot. An unreadable medium or a corrupt
    /// snapshot degrades to an empty in-memory view with a warning; it never
    /// fails the caller.
    pub async fn open(persistence: Arc<dyn SnapshotPersistence>) -> Self {
        let entries = match persistence.load().await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<PredictionLog>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Discarding unreadable log snapshot: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Log snapshot unavailable, starting with empty view: {}", e);
                Vec::new()
            }
        };

        Self {
            entries: Mutex::new(entries),
            persistence,
        }
    }

    /// Replaces the entry with the same date, or appends a new one. An
    /// update keeps the entry's original position.
    pub async fn upsert(&self, log: PredictionLog) {
        let mut entries = self.entries.lock().await;
        match entries.iter_mut().find(|e| e.date == log.date) {
            Some(existing) => *existing = log,
            None => entries.push(log),
        }
        self.flush(&entries).await;
    }

    /// All entries in first-insertion order.
    pub async fn list_all(&self) -> Vec<PredictionLog> {
        self.entries.lock().await.clone()
    }

    /// Empties the store unconditionally. Confirmation is the caller's job.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.flush(&entries).await;
    }

    async fn flush(&self, entries: &[PredictionLog]) {
        let snapshot = match serde_json::to_string(entries) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to encode log snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self.persistence.save(&snapshot).await {
            // Non-fatal: the in-memory view stays authoritative this session.
            warn!("Failed to persist log snapshot: {}", e);
        }
    }
}
