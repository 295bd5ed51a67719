//! Badge Timer - a productivity countdown engine for a browser badge
//!
//! The engine keeps one timer record (idle, running or paused), persists it
//! after every transition, repaints a short badge every tick and survives
//! process restarts by computing elapsed time from the stored start instant.

pub mod api;
pub mod badge;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use channel::{EngineHandle, Message, Reply};
pub use config::Config;
pub use state::{TimerEngine, TimerRecord, TimerStatus};
pub use utils::signals::shutdown_signal;
