//! The timer engine: one record, its transitions and their side effects

use std::{sync::Arc, time::Duration};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{
    timer_record::{TargetMinutes, TimerPhase, TimerRecord},
    timer_state::{TimerStatus, TimerUpdate},
};
use crate::{
    badge::{badge_text, BadgeColor, BadgeSink},
    channel::{EngineLinks, Message, Reply},
    clock::Clock,
    storage::{persistence::validate_presets, Persistence},
    tasks::Ticker,
};

/// Collaborators the engine calls into
pub struct EngineDeps {
    pub persistence: Persistence,
    pub badge: Arc<dyn BadgeSink>,
    pub clock: Arc<dyn Clock>,
    pub tick_period: Duration,
}

/// Owns the timer record for the lifetime of the process.
///
/// Every transition persists the record before returning. Operations are
/// safe in any phase: invalid transitions are no-ops and invalid input is
/// logged and ignored.
pub struct TimerEngine {
    record: TimerRecord,
    persistence: Persistence,
    badge: Arc<dyn BadgeSink>,
    clock: Arc<dyn Clock>,
    ticker: Ticker,
    status_tx: watch::Sender<TimerStatus>,
    updates_tx: broadcast::Sender<TimerUpdate>,
}

impl TimerEngine {
    /// Restore the engine from the store.
    ///
    /// A RUNNING record keeps its start timestamp, so time that passed while
    /// the process was down still counts.
    pub async fn load(deps: EngineDeps, links: EngineLinks) -> Self {
        let record = match deps.persistence.load_record().await {
            Some(stored) => match stored.normalized() {
                Some(repaired) => {
                    warn!(
                        "Stored timer was inconsistent ({:?}), repaired to {}",
                        stored,
                        repaired.phase()
                    );
                    deps.persistence.save_record(&repaired);
                    repaired
                }
                None => stored,
            },
            None => {
                let target = deps.persistence.load_target().await.unwrap_or_default();
                info!("No stored timer, starting idle with target {}", target);
                TimerRecord::idle(target)
            }
        };

        let mut engine = Self {
            record,
            persistence: deps.persistence,
            badge: deps.badge,
            clock: deps.clock,
            ticker: Ticker::new(deps.tick_period, links.inbox),
            status_tx: links.status,
            updates_tx: links.updates,
        };

        match engine.record.phase() {
            TimerPhase::Running => {
                info!(
                    "Resuming running timer started at {:?}",
                    engine.record.start_timestamp
                );
                engine.ticker.start();
                engine.paint();
            }
            TimerPhase::Paused => {
                info!("Restored paused timer at {}ms", engine.record.elapsed_at_pause_millis);
                engine.paint();
            }
            TimerPhase::Idle => {}
        }
        engine.publish_status();
        engine
    }

    pub fn record(&self) -> &TimerRecord {
        &self.record
    }

    pub fn phase(&self) -> TimerPhase {
        self.record.phase()
    }

    /// Whether a tick task is currently scheduled
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    /// Start from IDLE or resume from PAUSED. No-op while RUNNING.
    ///
    /// `target_minutes` only applies when starting from IDLE.
    pub async fn start(&mut self, target_minutes: Option<f64>) -> TimerRecord {
        let now = self.clock.now();
        match self.record.phase() {
            TimerPhase::Running => {
                debug!("Start ignored, timer already running");
                return self.record.clone();
            }
            TimerPhase::Paused => {
                if target_minutes.is_some() {
                    debug!("Target ignored while resuming a paused timer");
                }
                self.record.resume(now);
                info!(
                    "Timer resumed at {}ms elapsed",
                    self.record.elapsed_millis(now)
                );
            }
            TimerPhase::Idle => {
                let target = self.target_or_persisted(target_minutes).await;
                self.record.target_minutes = target;
                self.record.begin(now);
                info!("Timer started with target {}", target);
            }
        }

        self.persistence.save_record(&self.record);
        self.ticker.start();
        self.paint();
        self.publish_status();
        self.record.clone()
    }

    /// RUNNING -> PAUSED. No-op otherwise.
    pub fn pause(&mut self) -> TimerRecord {
        if self.record.phase() != TimerPhase::Running {
            debug!("Pause ignored, timer is {}", self.record.phase());
            return self.record.clone();
        }

        let now = self.clock.now();
        self.record.pause(now);
        self.ticker.stop();
        info!(
            "Timer paused at {}ms elapsed",
            self.record.elapsed_at_pause_millis
        );

        self.persistence.save_record(&self.record);
        self.paint();
        self.publish_status();
        self.record.clone()
    }

    /// Back to IDLE from any phase, clearing the badge
    pub async fn reset(&mut self, target_minutes: Option<f64>) -> TimerRecord {
        let target = self.target_or_persisted(target_minutes).await;
        self.record.clear(target);
        self.ticker.stop();
        self.badge.set_text("");
        info!("Timer reset, target {}", target);

        self.persistence.save_record(&self.record);
        self.publish_status();
        self.record.clone()
    }

    /// Save the target the next start from IDLE or reset will pick up.
    ///
    /// The record itself is left alone. Returns the target now in effect.
    pub async fn set_target_minutes(&self, target_minutes: Option<f64>) -> TargetMinutes {
        match target_minutes.and_then(|minutes| self.accept_target(minutes)) {
            Some(target) => {
                self.persistence.save_target(target);
                info!("Saved target {} for the next start", target);
                target
            }
            None => {
                warn!("setTargetMinutes without a valid target");
                self.target_or_persisted(None).await
            }
        }
    }

    pub async fn presets(&self) -> Vec<f64> {
        self.persistence.load_presets().await
    }

    /// Replace the preset list; invalid lists leave the stored one in place
    pub async fn set_presets(&mut self, presets: Vec<f64>) -> Vec<f64> {
        match validate_presets(&presets) {
            Ok(presets) => {
                self.persistence.save_presets(&presets);
                info!("Presets set to {:?}", presets);
                presets
            }
            Err(e) => {
                warn!("Rejected presets: {}", e);
                self.persistence.load_presets().await
            }
        }
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.record.elapsed_millis(self.clock.now())
    }

    pub fn remaining_millis(&self) -> u64 {
        self.record.remaining_millis(self.clock.now())
    }

    pub fn delay_millis(&self) -> u64 {
        self.record.delay_millis(self.clock.now())
    }

    pub fn badge_text(&self) -> String {
        let status = self.status();
        badge_text(status.remaining, status.delay)
    }

    pub fn status(&self) -> TimerStatus {
        TimerStatus::of(&self.record, self.clock.now())
    }

    /// Dispatch a UI message
    pub async fn handle(&mut self, message: Message) -> Reply {
        match message {
            Message::StartTimer { target_minutes } => {
                Reply::Record(self.start(target_minutes).await)
            }
            Message::PauseTimer => Reply::Record(self.pause()),
            Message::ResetTimer { target_minutes } => {
                Reply::Record(self.reset(target_minutes).await)
            }
            Message::GetTimerStatus => Reply::Status(self.status()),
            Message::GetPresets => Reply::Presets(self.presets().await),
            Message::SetPresets { presets } => Reply::Presets(self.set_presets(presets).await),
            Message::SetTargetMinutes { target_minutes } => {
                Reply::Target(self.set_target_minutes(target_minutes).await.minutes())
            }
        }
    }

    /// Periodic repaint. Ticks from a cancelled generation are dropped.
    pub fn on_tick(&mut self, generation: u64) {
        if !self.ticker.is_current(generation) {
            debug!("Dropping stale tick {}", generation);
            return;
        }
        if self.record.phase() != TimerPhase::Running {
            self.ticker.stop();
            return;
        }

        let status = self.paint();
        // No overlay listening is fine
        let _ = self.updates_tx.send(TimerUpdate::from(&status));
        self.publish_status();
    }

    /// Stop ticking; called when the engine loop ends
    pub fn shutdown(&mut self) {
        self.ticker.stop();
    }

    async fn target_or_persisted(&self, target_minutes: Option<f64>) -> TargetMinutes {
        if let Some(target) = target_minutes.and_then(|minutes| self.accept_target(minutes)) {
            self.persistence.save_target(target);
            return target;
        }
        self.persistence
            .load_target()
            .await
            .unwrap_or(self.record.target_minutes)
    }

    fn accept_target(&self, minutes: f64) -> Option<TargetMinutes> {
        match TargetMinutes::new(minutes) {
            Ok(target) => Some(target),
            Err(e) => {
                warn!("{}, keeping previous target", e);
                None
            }
        }
    }

    fn paint(&self) -> TimerStatus {
        let status = self.status();
        let color = match self.record.phase() {
            TimerPhase::Paused => BadgeColor::Paused,
            _ if status.is_over_target() => BadgeColor::Overdue,
            _ => BadgeColor::Running,
        };
        self.badge.set_text(&badge_text(status.remaining, status.delay));
        self.badge.set_color(color);
        status
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.status());
    }
}
