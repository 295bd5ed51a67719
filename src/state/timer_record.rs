//! The persisted timer record and its pure time arithmetic

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Target used when neither the caller nor the store supplies one
pub const DEFAULT_TARGET_MINUTES: f64 = 30.0;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Countdown duration in minutes. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TargetMinutes(f64);

impl TargetMinutes {
    pub fn new(minutes: f64) -> Result<Self, TimerError> {
        if minutes.is_finite() && minutes > 0.0 {
            Ok(Self(minutes))
        } else {
            Err(TimerError::InvalidTarget(minutes))
        }
    }

    pub fn minutes(self) -> f64 {
        self.0
    }

    /// The target expressed in whole milliseconds
    pub fn millis(self) -> u64 {
        (self.0 * MILLIS_PER_MINUTE).round() as u64
    }
}

impl Default for TargetMinutes {
    fn default() -> Self {
        Self(DEFAULT_TARGET_MINUTES)
    }
}

impl TryFrom<f64> for TargetMinutes {
    type Error = TimerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetMinutes> for f64 {
    fn from(value: TargetMinutes) -> Self {
        value.0
    }
}

impl fmt::Display for TargetMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}min", self.0)
    }
}

/// Which of the three exclusive states a record is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Timer state as stored under the `timerState` key.
///
/// Timestamps are serialized as epoch milliseconds. While paused,
/// `start_timestamp` is kept so resuming can shift it forward by the paused
/// duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub is_running: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub start_timestamp: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub paused_at_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub elapsed_at_pause_millis: u64,
    #[serde(default)]
    pub target_minutes: TargetMinutes,
}

impl TimerRecord {
    /// A fresh idle record
    pub fn idle(target_minutes: TargetMinutes) -> Self {
        Self {
            is_running: false,
            start_timestamp: None,
            paused_at_timestamp: None,
            elapsed_at_pause_millis: 0,
            target_minutes,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.paused_at_timestamp.is_some() {
            TimerPhase::Paused
        } else {
            TimerPhase::Idle
        }
    }

    /// Whether the fields agree with the phase the record claims to be in
    pub fn is_consistent(&self) -> bool {
        match self.phase() {
            TimerPhase::Running => {
                self.start_timestamp.is_some() && self.paused_at_timestamp.is_none()
            }
            TimerPhase::Paused => self.start_timestamp.is_some(),
            TimerPhase::Idle => self.start_timestamp.is_none() && self.elapsed_at_pause_millis == 0,
        }
    }

    /// Repair a record that violates the phase invariants.
    ///
    /// Returns `None` when the record was already consistent.
    pub fn normalized(&self) -> Option<Self> {
        if self.is_consistent() {
            return None;
        }

        let repaired = match self.phase() {
            TimerPhase::Running if self.start_timestamp.is_some() => Self {
                paused_at_timestamp: None,
                ..self.clone()
            },
            // A paused record only fails the check when it lost its start
            _ => Self::idle(self.target_minutes),
        };
        Some(repaired)
    }

    /// Net running time. Clock steps backwards clamp to zero.
    pub fn elapsed_millis(&self, now: DateTime<Utc>) -> u64 {
        match self.phase() {
            TimerPhase::Running => self
                .start_timestamp
                .map(|start| millis_between(start, now))
                .unwrap_or(0),
            TimerPhase::Paused => self.elapsed_at_pause_millis,
            TimerPhase::Idle => 0,
        }
    }

    pub fn remaining_millis(&self, now: DateTime<Utc>) -> u64 {
        self.target_minutes
            .millis()
            .saturating_sub(self.elapsed_millis(now))
    }

    /// How far past the target the timer has run; zero until then
    pub fn delay_millis(&self, now: DateTime<Utc>) -> u64 {
        self.elapsed_millis(now)
            .saturating_sub(self.target_minutes.millis())
    }

    /// IDLE -> RUNNING
    pub(crate) fn begin(&mut self, now: DateTime<Utc>) {
        self.is_running = true;
        self.start_timestamp = Some(now);
        self.paused_at_timestamp = None;
        self.elapsed_at_pause_millis = 0;
    }

    /// PAUSED -> RUNNING. The start instant moves forward by the time spent
    /// paused so elapsed time continues from where it stopped.
    ///
    /// Timestamps too far apart to shift (a corrupt stored record) fall back
    /// to backdating the start from `now` by the elapsed snapshot.
    pub(crate) fn resume(&mut self, now: DateTime<Utc>) {
        let shifted = match (self.start_timestamp, self.paused_at_timestamp) {
            (Some(start), Some(paused_at)) => {
                let paused_for = (now - paused_at).max(TimeDelta::zero());
                start.checked_add_signed(paused_for)
            }
            _ => None,
        };
        self.start_timestamp = Some(shifted.unwrap_or_else(|| self.backdated_start(now)));
        self.paused_at_timestamp = None;
        self.is_running = true;
    }

    fn backdated_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        i64::try_from(self.elapsed_at_pause_millis)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|elapsed| now.checked_sub_signed(elapsed))
            .unwrap_or(now)
    }

    /// RUNNING -> PAUSED
    pub(crate) fn pause(&mut self, now: DateTime<Utc>) {
        self.elapsed_at_pause_millis = self.elapsed_millis(now);
        self.is_running = false;
        self.paused_at_timestamp = Some(now);
    }

    /// any -> IDLE
    pub(crate) fn clear(&mut self, target_minutes: TargetMinutes) {
        *self = Self::idle(target_minutes);
    }
}

impl Default for TimerRecord {
    fn default() -> Self {
        Self::idle(TargetMinutes::default())
    }
}

fn millis_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn target(minutes: f64) -> TargetMinutes {
        TargetMinutes::new(minutes).unwrap()
    }

    #[test]
    fn target_rejects_non_positive_and_non_finite() {
        assert!(TargetMinutes::new(0.0).is_err());
        assert!(TargetMinutes::new(-5.0).is_err());
        assert!(TargetMinutes::new(f64::NAN).is_err());
        assert!(TargetMinutes::new(f64::INFINITY).is_err());
        assert_eq!(target(0.5).millis(), 30_000);
        assert_eq!(TargetMinutes::default().minutes(), 30.0);
    }

    #[test]
    fn pause_resume_excludes_paused_time() {
        let mut record = TimerRecord::idle(target(30.0));
        record.begin(t0());

        let paused_at = t0() + TimeDelta::seconds(100);
        record.pause(paused_at);
        assert_eq!(record.phase(), TimerPhase::Paused);
        assert_eq!(record.elapsed_at_pause_millis, 100_000);

        // Ten minutes on the shelf
        let resumed_at = paused_at + TimeDelta::minutes(10);
        assert_eq!(record.elapsed_millis(resumed_at), 100_000);
        record.resume(resumed_at);
        assert_eq!(record.phase(), TimerPhase::Running);
        assert_eq!(record.elapsed_millis(resumed_at), 100_000);
        assert_eq!(
            record.elapsed_millis(resumed_at + TimeDelta::seconds(5)),
            105_000
        );
    }

    #[test]
    fn remaining_floors_at_zero_and_delay_grows_after_target() {
        let mut record = TimerRecord::idle(target(1.0));
        record.begin(t0());

        let at = |secs| t0() + TimeDelta::seconds(secs);
        assert_eq!(record.remaining_millis(at(20)), 40_000);
        assert_eq!(record.delay_millis(at(20)), 0);
        assert_eq!(record.remaining_millis(at(60)), 0);
        assert_eq!(record.delay_millis(at(60)), 0);
        assert_eq!(record.remaining_millis(at(90)), 0);
        assert_eq!(record.delay_millis(at(90)), 30_000);
        assert_eq!(record.delay_millis(at(120)), 60_000);
    }

    #[test]
    fn resume_with_extreme_timestamps_does_not_overflow() {
        let mut record = TimerRecord {
            is_running: false,
            start_timestamp: DateTime::from_timestamp_millis(8_000_000_000_000_000),
            paused_at_timestamp: DateTime::from_timestamp_millis(-8_000_000_000_000_000),
            elapsed_at_pause_millis: 5_000,
            target_minutes: TargetMinutes::default(),
        };
        assert!(record.start_timestamp.is_some());
        assert!(record.paused_at_timestamp.is_some());
        assert!(record.is_consistent());

        record.resume(t0());
        assert_eq!(record.phase(), TimerPhase::Running);
        assert_eq!(record.start_timestamp, Some(t0() - TimeDelta::seconds(5)));
        assert_eq!(record.elapsed_millis(t0()), 5_000);
    }

    #[test]
    fn clock_going_backwards_clamps_elapsed() {
        let mut record = TimerRecord::default();
        record.begin(t0());
        assert_eq!(record.elapsed_millis(t0() - TimeDelta::seconds(30)), 0);
    }

    #[test]
    fn normalized_repairs_inconsistent_records() {
        let mut running = TimerRecord::default();
        running.begin(t0());
        assert!(running.normalized().is_none());

        let mut stray_pause = running.clone();
        stray_pause.paused_at_timestamp = Some(t0());
        let fixed = stray_pause.normalized().unwrap();
        assert_eq!(fixed.phase(), TimerPhase::Running);
        assert!(fixed.paused_at_timestamp.is_none());

        let headless = TimerRecord {
            is_running: true,
            start_timestamp: None,
            ..TimerRecord::idle(target(45.0))
        };
        assert_eq!(headless.normalized().unwrap(), TimerRecord::idle(target(45.0)));

        let orphan_pause = TimerRecord {
            paused_at_timestamp: Some(t0()),
            elapsed_at_pause_millis: 5_000,
            ..TimerRecord::default()
        };
        assert_eq!(orphan_pause.normalized().unwrap(), TimerRecord::default());

        let leftover = TimerRecord {
            elapsed_at_pause_millis: 12,
            ..TimerRecord::default()
        };
        assert_eq!(leftover.normalized().unwrap(), TimerRecord::default());
    }

    #[test]
    fn serializes_with_camel_case_keys_and_millisecond_timestamps() {
        let mut record = TimerRecord::idle(target(41.0));
        record.begin(t0());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["isRunning"], true);
        assert_eq!(json["startTimestamp"], t0().timestamp_millis());
        assert!(json["pausedAtTimestamp"].is_null());
        assert_eq!(json["elapsedAtPauseMillis"], 0);
        assert_eq!(json["targetMinutes"], 41.0);

        let back: TimerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn deserializing_a_non_positive_target_fails() {
        let json = serde_json::json!({ "isRunning": false, "targetMinutes": -1 });
        assert!(serde_json::from_value::<TimerRecord>(json).is_err());

        let sparse = serde_json::json!({ "isRunning": false });
        let record: TimerRecord = serde_json::from_value(sparse).unwrap();
        assert_eq!(record, TimerRecord::default());
    }
}
