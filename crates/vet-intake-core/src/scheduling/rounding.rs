//! Rounding of candidate instants and their display form.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::models::CandidateSlot;

/// Rounding granularity in seconds.
const STEP_SECS: i64 = 5 * 60;

/// Display format, e.g. "Mon, Jun 3 at 9:05 AM".
const DISPLAY_FORMAT: &str = "%a, %b %-d at %-I:%M %p";

/// Round to the nearest 5-minute boundary of the wall clock, half up,
/// with seconds and sub-seconds zeroed.
pub fn round_to_five_minutes(instant: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let local = instant.naive_local();
    let secs = local.and_utc().timestamp();
    let nanos = i64::from(local.and_utc().timestamp_subsec_nanos());

    let rem = secs.rem_euclid(STEP_SECS);
    let floor = secs - rem;
    let half_step_nanos = STEP_SECS / 2 * 1_000_000_000;
    let rounded = if rem * 1_000_000_000 + nanos >= half_step_nanos {
        floor + STEP_SECS
    } else {
        floor
    };

    DateTime::<Utc>::from_timestamp(rounded, 0)
        .map(|dt| dt.naive_utc())
        .and_then(|naive| instant.offset().from_local_datetime(&naive).single())
        .unwrap_or(instant)
}

/// Parse a collaborator timestamp. Timestamps without an offset are UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Round an instant and produce the slot shown to the client.
pub fn to_candidate_slot(instant: DateTime<FixedOffset>) -> CandidateSlot {
    let rounded = round_to_five_minutes(instant);
    CandidateSlot {
        iso: rounded.to_rfc3339_opts(SecondsFormat::Secs, true),
        display: rounded.format(DISPLAY_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    fn at(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).unwrap()
    }

    #[test]
    fn test_round_down_and_up() {
        assert_eq!(round_to_five_minutes(at("2024-06-03T09:02:29Z")), at("2024-06-03T09:00:00Z"));
        assert_eq!(round_to_five_minutes(at("2024-06-03T09:02:30Z")), at("2024-06-03T09:05:00Z"));
        assert_eq!(round_to_five_minutes(at("2024-06-03T09:57:45Z")), at("2024-06-03T10:00:00Z"));
    }

    #[test]
    fn test_round_sub_second() {
        assert_eq!(
            round_to_five_minutes(at("2024-06-03T09:02:29.999Z")),
            at("2024-06-03T09:00:00Z")
        );
    }

    #[test]
    fn test_round_keeps_offset() {
        let rounded = round_to_five_minutes(at("2024-06-03T09:03:10-04:00"));
        assert_eq!(rounded.to_rfc3339(), "2024-06-03T09:05:00-04:00");
    }

    #[test]
    fn test_candidate_slot_format() {
        let slot = to_candidate_slot(at("2024-06-03T13:06:40-04:00"));
        assert_eq!(slot.iso, "2024-06-03T13:05:00-04:00");
        assert_eq!(slot.display, "Mon, Jun 3 at 1:05 PM");

        let utc = to_candidate_slot(at("2024-06-03T09:00:00+00:00"));
        assert_eq!(utc.iso, "2024-06-03T09:00:00Z");
    }

    #[test]
    fn test_parse_instant_variants() {
        assert!(parse_instant("2024-06-03T09:00:00-04:00").is_some());
        assert_eq!(
            parse_instant("2024-06-03T09:00:00"),
            Some(at("2024-06-03T09:00:00Z"))
        );
        assert!(parse_instant("next tuesday").is_none());
    }

    proptest! {
        #[test]
        fn prop_rounded_on_five_minute_boundary(
            secs in 0i64..4_000_000_000,
            nanos in 0u32..1_000_000_000,
            quarter_hours in -48i32..=56,
        ) {
            let offset = FixedOffset::east_opt(quarter_hours * 15 * 60).unwrap();
            let instant = DateTime::<Utc>::from_timestamp(secs, nanos).unwrap().with_timezone(&offset);
            let rounded = round_to_five_minutes(instant);

            prop_assert_eq!(rounded.minute() % 5, 0);
            prop_assert_eq!(rounded.second(), 0);
            prop_assert_eq!(rounded.nanosecond(), 0);
            prop_assert!((rounded - instant).num_seconds().abs() <= 150);
        }
    }
}
