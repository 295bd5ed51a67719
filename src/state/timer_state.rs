//! Derived views of the timer reported to the UI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timer_record::{TargetMinutes, TimerPhase, TimerRecord};

/// Reply to `getTimerStatus`. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub remaining: u64,
    pub delay: u64,
    pub elapsed: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub target_minutes: f64,
}

impl TimerStatus {
    /// Snapshot a record at `now`
    pub fn of(record: &TimerRecord, now: DateTime<Utc>) -> Self {
        Self {
            remaining: record.remaining_millis(now),
            delay: record.delay_millis(now),
            elapsed: record.elapsed_millis(now),
            is_running: record.is_running,
            is_paused: record.phase() == TimerPhase::Paused,
            target_minutes: record.target_minutes.minutes(),
        }
    }

    pub fn is_over_target(&self) -> bool {
        self.delay > 0
    }
}

impl Default for TimerStatus {
    /// What a UI shows when the engine cannot be reached at all
    fn default() -> Self {
        let target = TargetMinutes::default();
        Self {
            remaining: target.millis(),
            delay: 0,
            elapsed: 0,
            is_running: false,
            is_paused: false,
            target_minutes: target.minutes(),
        }
    }
}

/// Pushed to overlay listeners on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename = "timerUpdate")]
pub struct TimerUpdate {
    pub elapsed: u64,
    pub delay: u64,
}

impl From<&TimerStatus> for TimerUpdate {
    fn from(status: &TimerStatus) -> Self {
        Self {
            elapsed: status.elapsed,
            delay: status.delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn status_of_a_paused_record() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut record = TimerRecord::default();
        record.begin(t0);
        record.pause(t0 + TimeDelta::seconds(65));

        let status = TimerStatus::of(&record, t0 + TimeDelta::hours(2));
        assert_eq!(status.elapsed, 65_000);
        assert_eq!(status.remaining, 1_735_000);
        assert_eq!(status.delay, 0);
        assert!(!status.is_running);
        assert!(status.is_paused);
        assert!(!status.is_over_target());
    }

    #[test]
    fn default_status_reflects_default_target() {
        let status = TimerStatus::default();
        assert_eq!(status.remaining, 30 * 60_000);
        assert_eq!(status.target_minutes, 30.0);
    }

    #[test]
    fn timer_update_is_tagged_for_the_overlay() {
        let update = TimerUpdate {
            elapsed: 1_000,
            delay: 0,
        };
        let json = serde_json::to_value(update).unwrap();
        assert_eq!(json["action"], "timerUpdate");
        assert_eq!(json["elapsed"], 1_000);
        assert_eq!(json["delay"], 0);
    }
}
