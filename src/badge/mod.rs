//! Badge rendering and the sinks that receive it

pub mod format;
pub mod sink;

pub use format::badge_text;
pub use sink::{
    Badge, BadgeColor, BadgePaint, BadgeSink, LogBadgeSink, MemoryBadgeSink, WatchBadgeSink,
};
