//! Timer state and the engine that owns it
//!
//! The record and its arithmetic live in `timer_record`; the engine wraps
//! them with persistence, the badge and the tick.

pub mod engine;
pub mod timer_record;
pub mod timer_state;

// Re-export main types
pub use engine::{EngineDeps, TimerEngine};
pub use timer_record::{TargetMinutes, TimerPhase, TimerRecord, DEFAULT_TARGET_MINUTES};
pub use timer_state::{TimerStatus, TimerUpdate};
