//! Badge text derivation
//!
//! The badge fits about four characters, so only the largest applicable unit
//! is shown: 125s remaining is "2m", not "2m5s".

const SECS_PER_HOUR: u64 = 3600;
const SECS_PER_MINUTE: u64 = 60;

/// Render the badge from remaining and over-target milliseconds.
///
/// While on or under target the remaining time is shown; once past it the
/// delay is shown with a leading `+`.
pub fn badge_text(remaining_ms: u64, delay_ms: u64) -> String {
    if delay_ms > 0 {
        format!("+{}", largest_unit(delay_ms / 1000))
    } else {
        largest_unit(remaining_ms / 1000)
    }
}

fn largest_unit(secs: u64) -> String {
    if secs >= SECS_PER_HOUR {
        format!("{}h", secs / SECS_PER_HOUR)
    } else if secs >= SECS_PER_MINUTE {
        format!("{}m", secs / SECS_PER_MINUTE)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET_30_MIN: u64 = 30 * 60_000;

    fn text_for_elapsed(elapsed_ms: u64, target_ms: u64) -> String {
        badge_text(
            target_ms.saturating_sub(elapsed_ms),
            elapsed_ms.saturating_sub(target_ms),
        )
    }

    #[test]
    fn shows_remaining_in_the_largest_unit() {
        assert_eq!(text_for_elapsed(65_000, TARGET_30_MIN), "28m");
        assert_eq!(text_for_elapsed(5_000, TARGET_30_MIN), "29m");
        assert_eq!(badge_text(125_000, 0), "2m");
        assert_eq!(badge_text(59_999, 0), "59s");
        assert_eq!(badge_text(60_000, 0), "1m");
        assert_eq!(badge_text(2 * 3_600_000 + 59 * 60_000, 0), "2h");
        assert_eq!(badge_text(0, 0), "0s");
    }

    #[test]
    fn shows_delay_with_a_plus_once_over_target() {
        assert_eq!(badge_text(0, 3_601_000), "+1h");
        assert_eq!(badge_text(0, 125_000), "+2m");
        assert_eq!(badge_text(0, 7_000), "+7s");
        assert_eq!(badge_text(0, 400), "+0s");
        assert_eq!(text_for_elapsed(TARGET_30_MIN + 3_601_000, TARGET_30_MIN), "+1h");
    }
}
