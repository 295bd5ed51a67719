//! Message channel between the UI and the engine

pub mod handle;
pub mod messages;

pub use handle::{engine_channel, EngineHandle, EngineLinks, Envelope};
pub use messages::{Message, Reply};
