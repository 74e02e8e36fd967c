// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the recurring scheduler's pure decision logic.

use super::*;
use chrono::TimeZone;

fn ts(h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, h, mi, s).unwrap()
}

fn every_five_minutes() -> Schedule {
    parse_schedule("*/5 * * * *").unwrap()
}

mod parsing {
    use super::*;

    #[test]
    fn five_field_expressions_parse() {
        assert!(parse_schedule("0 0 * * *").is_ok());
        assert!(parse_schedule("30 14 1 * *").is_ok());
        assert!(parse_schedule("*/5 * * * *").is_ok());
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert!(parse_schedule("* * * *").is_err());
        assert!(parse_schedule("0 * * * * *").is_err());
        assert!(parse_schedule("").is_err());
    }

    #[test]
    fn garbage_fields_are_rejected() {
        assert!(parse_schedule("not a cron at all x").is_err());
    }

    #[test]
    fn durations_parse_like_go() {
        assert_eq!(
            parse_silence_duration("30m").unwrap(),
            chrono::Duration::minutes(30)
        );
        assert_eq!(
            parse_silence_duration("2h").unwrap(),
            chrono::Duration::hours(2)
        );
        assert!(parse_silence_duration("soon").is_err());
    }
}

mod materialization {
    use super::*;

    #[test]
    fn no_trigger_inside_lookback_window_means_not_due() {
        // At 12:07:00 with a one-minute lookback, the window (12:06:00,
        // 12:07:00) contains no */5 trigger.
        let due = should_materialize(
            &every_five_minutes(),
            None,
            ts(12, 7, 0),
            chrono::Duration::minutes(1),
        );
        assert!(!due);
    }

    #[test]
    fn trigger_inside_lookback_window_means_due() {
        // At 12:10:30 the lookback reaches 12:09:30 and the 12:10:00
        // trigger falls inside.
        let due = should_materialize(
            &every_five_minutes(),
            None,
            ts(12, 10, 30),
            chrono::Duration::minutes(1),
        );
        assert!(due);
    }

    #[test]
    fn next_trigger_after_last_scheduled_must_have_passed() {
        // Last materialization at 12:10:30; next trigger 12:15:00 is still
        // ahead at 12:12:00.
        let due = should_materialize(
            &every_five_minutes(),
            Some(ts(12, 10, 30)),
            ts(12, 12, 0),
            chrono::Duration::minutes(1),
        );
        assert!(!due);

        // At 12:15:00 the trigger has been reached.
        let due = should_materialize(
            &every_five_minutes(),
            Some(ts(12, 10, 30)),
            ts(12, 15, 0),
            chrono::Duration::minutes(1),
        );
        assert!(due);
    }

    #[test]
    fn next_trigger_is_strictly_after_now() {
        let next = next_trigger_after(&every_five_minutes(), ts(12, 10, 0)).unwrap();
        assert_eq!(next, ts(12, 15, 0));

        let next = next_trigger_after(&every_five_minutes(), ts(12, 10, 30)).unwrap();
        assert_eq!(next, ts(12, 15, 0));
    }
}

mod requeue {
    use super::*;

    #[test]
    fn horizon_tracks_the_next_trigger() {
        let requeue = requeue_horizon(Some(ts(12, 15, 0)), ts(12, 10, 30));
        assert_eq!(requeue, Duration::from_secs(270));
    }

    #[test]
    fn horizon_is_floored_at_one_minute() {
        let requeue = requeue_horizon(Some(ts(12, 10, 40)), ts(12, 10, 30));
        assert_eq!(requeue, Duration::from_secs(60));
    }

    #[test]
    fn horizon_is_capped_at_one_hour() {
        let requeue = requeue_horizon(Some(ts(18, 0, 0)), ts(12, 0, 0));
        assert_eq!(requeue, Duration::from_secs(3600));
    }

    #[test]
    fn no_next_trigger_means_hourly_checks() {
        let requeue = requeue_horizon(None, ts(12, 0, 0));
        assert_eq!(requeue, Duration::from_secs(3600));
    }
}
