//! Background tasks module
//!
//! The engine loop, the badge ticker and the storage worker each run as
//! their own tokio task.

pub mod engine_loop;
pub mod storage_worker;
pub mod ticker;

// Re-export main items
pub use engine_loop::{engine_loop_task, spawn_engine};
pub use storage_worker::storage_worker_task;
pub use ticker::{TickHandle, Ticker};
