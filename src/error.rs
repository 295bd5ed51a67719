//! Error types shared across the engine, storage and message channel

use thiserror::Error;

/// Rejected user input. Never surfaces to a message sender; the engine logs
/// it and keeps the previous value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimerError {
    #[error("invalid target minutes: {0} (must be a finite number > 0)")]
    InvalidTarget(f64),

    #[error("invalid presets: {0}")]
    InvalidPresets(String),
}

/// Failures of the persistent key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures talking to the engine loop
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("engine inbox is closed")]
    Closed,

    #[error("engine dropped the request without replying")]
    NoReply,
}
