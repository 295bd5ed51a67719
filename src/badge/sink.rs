//! Where badge paints go

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Badge background colour, one per timer situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BadgeColor {
    /// Running, still under target
    Running,
    /// Running past the target
    Overdue,
    Paused,
}

impl BadgeColor {
    pub fn hex(self) -> &'static str {
        match self {
            BadgeColor::Running => "#4CAF50",
            BadgeColor::Overdue => "#F44336",
            BadgeColor::Paused => "#FF9800",
        }
    }
}

/// The external "badge paint" interface
pub trait BadgeSink: Send + Sync {
    fn set_text(&self, text: &str);
    fn set_color(&self, color: BadgeColor);
}

/// Current badge contents, as last painted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub text: String,
    pub color: Option<String>,
}

/// Logs each paint and nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBadgeSink;

impl BadgeSink for LogBadgeSink {
    fn set_text(&self, text: &str) {
        debug!("Badge text: {:?}", text);
    }

    fn set_color(&self, color: BadgeColor) {
        debug!("Badge color: {}", color.hex());
    }
}

/// Publishes the latest badge on a watch channel so the HTTP bridge can
/// serve it to a UI that draws the real badge
#[derive(Debug)]
pub struct WatchBadgeSink {
    tx: watch::Sender<Badge>,
}

impl WatchBadgeSink {
    pub fn new() -> (Self, watch::Receiver<Badge>) {
        let (tx, rx) = watch::channel(Badge::default());
        (Self { tx }, rx)
    }
}

impl BadgeSink for WatchBadgeSink {
    fn set_text(&self, text: &str) {
        LogBadgeSink.set_text(text);
        self.tx.send_modify(|badge| badge.text = text.to_string());
    }

    fn set_color(&self, color: BadgeColor) {
        LogBadgeSink.set_color(color);
        self.tx
            .send_modify(|badge| badge.color = Some(color.hex().to_string()));
    }
}

/// A single recorded paint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgePaint {
    Text(String),
    Color(BadgeColor),
}

/// Records every paint in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryBadgeSink {
    paints: Arc<Mutex<Vec<BadgePaint>>>,
}

impl MemoryBadgeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paints(&self) -> Vec<BadgePaint> {
        self.paints.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// The most recently painted text, if any
    pub fn last_text(&self) -> Option<String> {
        self.paints().into_iter().rev().find_map(|paint| match paint {
            BadgePaint::Text(text) => Some(text),
            BadgePaint::Color(_) => None,
        })
    }

    pub fn last_color(&self) -> Option<BadgeColor> {
        self.paints().into_iter().rev().find_map(|paint| match paint {
            BadgePaint::Color(color) => Some(color),
            BadgePaint::Text(_) => None,
        })
    }

    pub fn text_paint_count(&self) -> usize {
        self.paints()
            .iter()
            .filter(|paint| matches!(paint, BadgePaint::Text(_)))
            .count()
    }

    fn push(&self, paint: BadgePaint) {
        if let Ok(mut paints) = self.paints.lock() {
            paints.push(paint);
        }
    }
}

impl BadgeSink for MemoryBadgeSink {
    fn set_text(&self, text: &str) {
        self.push(BadgePaint::Text(text.to_string()));
    }

    fn set_color(&self, color: BadgeColor) {
        self.push(BadgePaint::Color(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_sink_publishes_latest_badge() {
        let (sink, rx) = WatchBadgeSink::new();
        sink.set_text("12m");
        sink.set_color(BadgeColor::Overdue);

        let badge = rx.borrow().clone();
        assert_eq!(badge.text, "12m");
        assert_eq!(badge.color.as_deref(), Some("#F44336"));
    }

    #[test]
    fn memory_sink_tracks_last_paints() {
        let sink = MemoryBadgeSink::new();
        sink.set_text("5m");
        sink.set_color(BadgeColor::Running);
        sink.set_text("4m");

        assert_eq!(sink.last_text().as_deref(), Some("4m"));
        assert_eq!(sink.last_color(), Some(BadgeColor::Running));
        assert_eq!(sink.text_paint_count(), 2);
    }
}
