//! In-memory store

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;

use super::Store;
use crate::error::StoreError;

/// A store backed by a map. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Read a value without going through the async interface
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.values.lock().ok().and_then(|v| v.get(key).cloned())
    }

    /// Seed a value without going through the async interface
    pub fn insert(&self, key: &str, value: Value) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
    }

    fn lock_error() -> StoreError {
        StoreError::Unavailable("memory store lock poisoned".to_string())
    }
}

impl Store for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        let result = self
            .values
            .lock()
            .map(|values| values.get(key).cloned())
            .map_err(|_| Self::lock_error());
        future::ready(result).boxed()
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("write to {} refused", key)))
        } else {
            self.values
                .lock()
                .map(|mut values| {
                    values.insert(key.to_string(), value);
                })
                .map_err(|_| Self::lock_error())
        };
        future::ready(result).boxed()
    }
}
