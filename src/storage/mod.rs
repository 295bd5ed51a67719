//! Persistent key-value storage
//!
//! The engine only ever sees JSON values under three keys. `Persistence`
//! puts an ordered queue in front of whichever `Store` backs it.

pub mod json_file;
pub mod memory;
pub mod persistence;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::StoreError;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use persistence::{Persistence, StoreOp};

/// Key holding the serialized `TimerRecord`
pub const KEY_TIMER_STATE: &str = "timerState";
/// Key holding the last chosen target, in minutes
pub const KEY_TARGET_MINUTES: &str = "targetMinutes";
/// Key holding the ordered preset list
pub const KEY_PRESETS: &str = "presets";

/// Presets offered when none have been saved
pub const DEFAULT_PRESETS: [f64; 3] = [30.0, 41.0, 60.0];

/// Async get/set by key. Object safe so the engine can hold `Arc<dyn Store>`.
pub trait Store: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>>;

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>>;
}
