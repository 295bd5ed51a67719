//! Ordered write-behind access to the store
//!
//! Every operation goes through one queue drained by the storage worker, so
//! writes land in the order they were issued and a read observes every write
//! queued before it. Writes are never awaited by the engine.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, warn};

use super::{Store, DEFAULT_PRESETS, KEY_PRESETS, KEY_TARGET_MINUTES, KEY_TIMER_STATE};
use crate::{
    error::TimerError,
    state::{TargetMinutes, TimerRecord},
    tasks::storage_worker_task,
};

/// A queued store operation
#[derive(Debug)]
pub enum StoreOp {
    Set {
        key: &'static str,
        value: Value,
    },
    Get {
        key: &'static str,
        reply: oneshot::Sender<Option<Value>>,
    },
    /// Replies once everything queued before it has been handled
    Flush { reply: oneshot::Sender<()> },
}

/// Handle to the storage worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Persistence {
    tx: mpsc::UnboundedSender<StoreOp>,
}

impl Persistence {
    /// Spawn a storage worker in front of `store`
    pub fn spawn(store: Arc<dyn Store>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(storage_worker_task(store, rx));
        (Self { tx }, worker)
    }

    pub fn save_record(&self, record: &TimerRecord) {
        self.enqueue_set(KEY_TIMER_STATE, record);
    }

    pub fn save_target(&self, target: TargetMinutes) {
        self.enqueue_set(KEY_TARGET_MINUTES, &target);
    }

    pub fn save_presets(&self, presets: &[f64]) {
        self.enqueue_set(KEY_PRESETS, presets);
    }

    /// The persisted record, or `None` if absent or unreadable
    pub async fn load_record(&self) -> Option<TimerRecord> {
        self.load(KEY_TIMER_STATE).await
    }

    /// The persisted target, or `None` if absent or invalid
    pub async fn load_target(&self) -> Option<TargetMinutes> {
        self.load(KEY_TARGET_MINUTES).await
    }

    /// The persisted presets, falling back to the defaults
    pub async fn load_presets(&self) -> Vec<f64> {
        match self.load::<Vec<f64>>(KEY_PRESETS).await {
            Some(presets) => match validate_presets(&presets) {
                Ok(presets) => presets,
                Err(e) => {
                    warn!("Ignoring stored presets: {}", e);
                    DEFAULT_PRESETS.to_vec()
                }
            },
            None => DEFAULT_PRESETS.to_vec(),
        }
    }

    /// Wait until every operation queued so far has been handled
    pub async fn flush(&self) {
        let (reply, done) = oneshot::channel();
        if self.tx.send(StoreOp::Flush { reply }).is_ok() {
            let _ = done.await;
        }
    }

    fn enqueue_set<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize {}: {}", key, e);
                return;
            }
        };
        if self.tx.send(StoreOp::Set { key, value }).is_err() {
            warn!("Storage worker is gone, {} not persisted", key);
        }
    }

    async fn load<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let (reply, value) = oneshot::channel();
        if self.tx.send(StoreOp::Get { key, reply }).is_err() {
            warn!("Storage worker is gone, cannot read {}", key);
            return None;
        }

        let value = value.await.ok().flatten()?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", key, e);
                None
            }
        }
    }
}

/// Presets must be non-empty and every entry a valid target
pub fn validate_presets(presets: &[f64]) -> Result<Vec<f64>, TimerError> {
    if presets.is_empty() {
        return Err(TimerError::InvalidPresets("list is empty".to_string()));
    }
    for &minutes in presets {
        TargetMinutes::new(minutes).map_err(|_| {
            TimerError::InvalidPresets(format!("{} is not a positive number", minutes))
        })?;
    }
    debug!("Presets validated: {:?}", presets);
    Ok(presets.to_vec())
}
