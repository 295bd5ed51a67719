//! Storage worker background task

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::storage::{Store, StoreOp};

/// Drain store operations in order until every `Persistence` handle is gone
pub async fn storage_worker_task(store: Arc<dyn Store>, mut ops: mpsc::UnboundedReceiver<StoreOp>) {
    info!("Starting storage worker");

    while let Some(op) = ops.recv().await {
        match op {
            StoreOp::Set { key, value } => match store.set(key, value).await {
                Ok(()) => debug!("Persisted {}", key),
                // Not retried; the engine's in-memory copy stays authoritative
                Err(e) => warn!("Failed to persist {}: {}", key, e),
            },
            StoreOp::Get { key, reply } => {
                let value = match store.get(key).await {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("Failed to read {}: {}", key, e);
                        None
                    }
                };
                let _ = reply.send(value);
            }
            StoreOp::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }

    info!("Storage worker stopped");
}
