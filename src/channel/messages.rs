//! Messages accepted by the engine and its replies

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::state::{TimerRecord, TimerStatus};

/// UI -> engine commands, tagged by `action` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    StartTimer {
        #[serde(
            default,
            rename = "targetMinutes",
            deserialize_with = "lenient_minutes",
            skip_serializing_if = "Option::is_none"
        )]
        target_minutes: Option<f64>,
    },
    PauseTimer,
    ResetTimer {
        #[serde(
            default,
            rename = "targetMinutes",
            deserialize_with = "lenient_minutes",
            skip_serializing_if = "Option::is_none"
        )]
        target_minutes: Option<f64>,
    },
    GetTimerStatus,
    GetPresets,
    SetPresets {
        presets: Vec<f64>,
    },
    SetTargetMinutes {
        #[serde(default, rename = "targetMinutes", deserialize_with = "lenient_minutes")]
        target_minutes: Option<f64>,
    },
}

impl Message {
    /// Wire name of the action, for logging
    pub fn action(&self) -> &'static str {
        match self {
            Message::StartTimer { .. } => "startTimer",
            Message::PauseTimer => "pauseTimer",
            Message::ResetTimer { .. } => "resetTimer",
            Message::GetTimerStatus => "getTimerStatus",
            Message::GetPresets => "getPresets",
            Message::SetPresets { .. } => "setPresets",
            Message::SetTargetMinutes { .. } => "setTargetMinutes",
        }
    }
}

/// Engine -> UI replies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Record(TimerRecord),
    Status(TimerStatus),
    Presets(Vec<f64>),
    /// Target saved for the next start, in minutes
    Target(f64),
}

/// Popup inputs arrive as numbers or numeric strings. Anything else becomes
/// NaN so the engine rejects it instead of the whole message failing to parse.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Some(s.trim().parse().unwrap_or(f64::NAN)),
        _ => Some(f64::NAN),
    }))
}
