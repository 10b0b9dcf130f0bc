use crate::error::{config_error, BotResult};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name such as `Europe/Amsterdam`
pub fn parse_timezone(name: &str) -> BotResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| config_error(&format!("Invalid timezone: {}", name)))
}

/// Current time in the given timezone
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Timestamp written into status records, e.g. `2024-06-01T08:00:00.123456+00:00`
pub fn updated_at(now: &DateTime<Utc>) -> String {
    now.to_rfc3339()
}

/// Midnight of a date in the given timezone, as UTC.
///
/// Falls back to the earliest valid instant on DST gaps.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        chrono::LocalResult::None => {
            let one_am = date.and_hms_opt(1, 0, 0)?;
            tz.from_local_datetime(&one_am)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
