use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Time elapsed from `start` to `now`; a start in the future counts as zero.
pub(crate) fn elapsed_between(start: PrimitiveDateTime, now: PrimitiveDateTime) -> Duration {
    let elapsed = now - start;
    if elapsed.is_negative() {
        Duration::ZERO
    } else {
        elapsed
    }
}

/// Renders a duration as hours, minutes and seconds, omitting leading zero
/// units: `1h2m3s`, `4m5s`, `0s`. Fractions of a second are dropped.
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.whole_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    fn at(hour: u8, minute: u8, second: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, time::Month::March, 4).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(at(10, 20, 30)), "2025-03-04T10:20:30Z");
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        assert_eq!(elapsed_between(at(12, 0, 0), at(11, 0, 0)), Duration::ZERO);
        assert_eq!(elapsed_between(at(11, 0, 0), at(11, 4, 5)), Duration::seconds(245));
    }

    #[test]
    fn elapsed_strings_drop_leading_zero_units() {
        assert_eq!(format_elapsed(Duration::ZERO), "0s");
        assert_eq!(format_elapsed(Duration::seconds(42)), "42s");
        assert_eq!(format_elapsed(Duration::seconds(245)), "4m5s");
        assert_eq!(format_elapsed(Duration::seconds(3723)), "1h2m3s");
        assert_eq!(format_elapsed(Duration::seconds(7200)), "2h0m0s");
        assert_eq!(format_elapsed(Duration::milliseconds(1500)), "1s");
    }
}
